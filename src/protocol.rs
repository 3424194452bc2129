//! JSON protocol documents and the run driver.
//!
//! A protocol is the simulator-native counterpart of a robot `run(protocol)`
//! script: a reagent layout plus an ordered operation list, applied to one
//! pipette per run. The run aborts on the first error; nothing is retried.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SimError};
use crate::geometry::Location;
use crate::labware::ReagentRegistry;
use crate::pipette::{AspirationSource, Pipette, SUPPORTED_INSTRUMENT, SUPPORTED_MOUNT};
use crate::trail::RunRecord;

/// Free-form header fields carried over from the robot protocol format.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolMetadata {
    pub protocol_name: Option<String>,
    pub author: Option<String>,
    pub api_level: Option<String>,
}

/// One step of a protocol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    PickUpTip,
    DropTip,

    /// Draw `volume` µL from a configured well.
    Aspirate { volume: f32, well: String },

    /// Draw `volume` µL from a bare coordinate. Fallback path; fires an
    /// advisory and loads an unnamed reagent.
    AspirateAt { volume: f32, x: f32, y: f32, z: f32 },

    /// Dispense `volume` µL at an exact dish coordinate.
    Dispense { volume: f32, x: f32, y: f32, z: f32 },

    MoveTo { x: f32, y: f32, z: f32 },

    BlowOut,
    TouchTip,
    Mix {
        repetitions: u32,
        #[serde(default)]
        volume: Option<f32>,
    },

    // Protocol-context chatter; logged, no effect on the trail.
    Home,
    Pause {
        #[serde(default)]
        message: String,
    },
    Comment {
        #[serde(default)]
        message: String,
    },
    Delay {
        #[serde(default)]
        seconds: f32,
        #[serde(default)]
        minutes: f32,
        #[serde(default)]
        message: String,
    },
}

/// A complete protocol document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Protocol {
    #[serde(default)]
    pub metadata: ProtocolMetadata,

    /// Instrument the protocol expects; validated against the supported one
    /// when present.
    #[serde(default)]
    pub instrument: Option<String>,

    #[serde(default)]
    pub mount: Option<String>,

    /// Well id to reagent name.
    #[serde(default)]
    pub reagents: BTreeMap<String, String>,

    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl Protocol {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a protocol document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SimError::ProtocolNotFound(path.display().to_string()));
        }
        Self::from_json(&fs::read_to_string(path)?)
    }
}

/// Runs `protocol` against a fresh registry and pipette and returns the
/// recorded run.
pub fn run_protocol(protocol: &Protocol) -> Result<RunRecord> {
    let registry = ReagentRegistry::new(protocol.reagents.clone());
    let mut pipette = match (&protocol.instrument, &protocol.mount) {
        (None, None) => Pipette::new(&registry),
        (instrument, mount) => Pipette::for_instrument(
            instrument.as_deref().unwrap_or(SUPPORTED_INSTRUMENT),
            mount.as_deref().unwrap_or(SUPPORTED_MOUNT),
            &registry,
        )?,
    };

    for op in &protocol.operations {
        apply(&mut pipette, &registry, op)?;
    }

    // End-of-run check replacing a destructor-time leak warning: a finished
    // protocol should leave the instrument bare.
    if pipette.has_tip() {
        warn!("protocol ended without dropping the tip");
    }
    Ok(pipette.finish())
}

/// Applies a single operation to `pipette`.
pub fn apply(
    pipette: &mut Pipette<'_>,
    registry: &ReagentRegistry,
    op: &Operation,
) -> Result<()> {
    match op {
        Operation::PickUpTip => pipette.pick_up_tip()?,
        Operation::DropTip => pipette.drop_tip()?,
        Operation::Aspirate { volume, well } => {
            let well = registry.well(well);
            pipette.aspirate(*volume, AspirationSource::Well(well))?;
        }
        Operation::AspirateAt { volume, x, y, z } => {
            let loc = Location::new(Vec3::new(*x, *y, *z), None);
            pipette.aspirate(*volume, AspirationSource::Point(loc))?;
        }
        Operation::Dispense { volume, x, y, z } => {
            pipette.dispense(*volume, Location::new(Vec3::new(*x, *y, *z), None))?;
        }
        Operation::MoveTo { x, y, z } => {
            pipette.move_to(Location::new(Vec3::new(*x, *y, *z), None))?;
        }
        Operation::BlowOut => pipette.blow_out(),
        Operation::TouchTip => pipette.touch_tip(),
        Operation::Mix { repetitions, volume } => pipette.mix(*repetitions, *volume),
        Operation::Home => debug!("going home"),
        Operation::Pause { message } => debug!(message = %message, "robot pause"),
        Operation::Comment { message } => debug!(message = %message, "comment"),
        Operation::Delay {
            seconds,
            minutes,
            message,
        } => debug!(seconds, minutes, message = %message, "delay"),
    }
    Ok(())
}
