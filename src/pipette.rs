//! The pipette state machine: tip lifecycle, volume bookkeeping,
//! cross-contamination detection and droplet/smear recording.

use std::collections::BTreeMap;

use glam::Vec3;
use tracing::{debug, warn};

use crate::colors::resolve_visual_color;
use crate::error::{PipetteError, SimError};
use crate::geometry::{
    Location, LocationContext, REFERENCE_COLUMN, REFERENCE_ROW, SAFE_DRAW_RADIUS, same_place_2d,
    within_safe_area,
};
use crate::labware::{ReagentRegistry, Well};
use crate::trail::{DishTrail, Droplet, RunRecord, Smear};

/// The only instrument the simulator models.
pub const SUPPORTED_INSTRUMENT: &str = "p20_single_gen2";

/// The mount the supported instrument must be loaded on.
pub const SUPPORTED_MOUNT: &str = "right";

/// Capacity in µL of the p20 pipette.
pub const P20_MAX_VOLUME: f32 = 20.0;

/// Reagent sentinel reported while the pipette has never aspirated.
const EMPTY_REAGENT: &str = "orange";

/// Reagent assumed when aspirating from a bare location instead of a well.
const UNNAMED_REAGENT: &str = "white";

/// Scatter area recorded per µL dispensed.
const DROPLET_SIZE_SCALE: f32 = 100.0;

/// Dispense heights at or above this many mm trigger an advisory.
const HIGH_DISPENSE_Z: f32 = 10.0;

/// Where the pipette sits before the first operation, well away from the
/// dish.
fn parked_location() -> Location {
    Location::new(Vec3::splat(250.0), None)
}

fn tip_pickup_location() -> Location {
    Location::new(
        Vec3::new(-SAFE_DRAW_RADIUS, SAFE_DRAW_RADIUS, 0.0),
        Some(LocationContext::TipPickup),
    )
}

fn tip_drop_location() -> Location {
    Location::new(
        Vec3::new(SAFE_DRAW_RADIUS, SAFE_DRAW_RADIUS, 0.0),
        Some(LocationContext::TipDrop),
    )
}

/// Maps a well onto the dish canvas.
///
/// Row letters spread along x, column numbers along y, both scaled to the
/// safe draw radius so aspiration sources land in the same coordinate space
/// as dispense targets.
pub fn petri_location_of_well(well: &Well) -> Result<Location, PipetteError> {
    let (row, col) = well.row_col()?;
    let dx = (row as f32 - REFERENCE_ROW as u32 as f32) * SAFE_DRAW_RADIUS / 4.0;
    let dy = (col as f32 - REFERENCE_COLUMN as f32) * SAFE_DRAW_RADIUS / 6.0;
    Ok(well.top(0.0).translate(Vec3::new(dx, dy, 0.0)))
}

/// The single source a tip has drawn from since it was picked up.
#[derive(Clone, Debug, PartialEq)]
pub enum AspirationSource {
    Well(Well),
    /// A bare coordinate. Fallback path, see [`Pipette::aspirate`].
    Point(Location),
}

impl AspirationSource {
    fn describe(&self) -> String {
        match self {
            Self::Well(well) => well.id().to_string(),
            Self::Point(loc) => {
                format!("({}, {}, {})", loc.point.x, loc.point.y, loc.point.z)
            }
        }
    }
}

/// Simulated single-channel p20 pipette, bound to one reagent registry for
/// the length of a run.
///
/// Every operation validates the physical and logical constraints of the
/// real instrument before mutating state. The one exception is smear
/// resolution, which commits before validation: the streak is a consequence
/// of the previous dispense, not of the incoming call.
pub struct Pipette<'r> {
    registry: &'r ReagentRegistry,
    max_volume: f32,
    has_tip: bool,
    tip_count: u32,
    current_volume: f32,
    current_reagent: String,
    aspiration_source: Option<AspirationSource>,
    last_location: Location,
    pending_dispense_mark: Option<Location>,
    trail: DishTrail,
    total_aspirated: BTreeMap<String, f32>,
    total_dispensed: BTreeMap<String, f32>,
}

impl<'r> Pipette<'r> {
    /// A p20 pipette bound to `registry`.
    pub fn new(registry: &'r ReagentRegistry) -> Self {
        Self {
            registry,
            max_volume: P20_MAX_VOLUME,
            has_tip: false,
            tip_count: 0,
            current_volume: 0.0,
            current_reagent: EMPTY_REAGENT.to_string(),
            aspiration_source: None,
            last_location: parked_location(),
            pending_dispense_mark: None,
            trail: DishTrail::new(),
            total_aspirated: BTreeMap::new(),
            total_dispensed: BTreeMap::new(),
        }
    }

    /// Like [`new`](Self::new), but validating the instrument and mount
    /// names a protocol asked for.
    pub fn for_instrument(
        instrument: &str,
        mount: &str,
        registry: &'r ReagentRegistry,
    ) -> Result<Self, SimError> {
        if instrument != SUPPORTED_INSTRUMENT {
            return Err(SimError::UnsupportedInstrument(instrument.to_string()));
        }
        if mount != SUPPORTED_MOUNT {
            return Err(SimError::UnsupportedMount(mount.to_string()));
        }
        Ok(Self::new(registry))
    }

    pub fn has_tip(&self) -> bool {
        self.has_tip
    }

    /// Tips consumed so far this run.
    pub fn tip_count(&self) -> u32 {
        self.tip_count
    }

    /// Liquid currently held, in µL.
    pub fn current_volume(&self) -> f32 {
        self.current_volume
    }

    pub fn max_volume(&self) -> f32 {
        self.max_volume
    }

    /// Raw name of the liquid currently loaded.
    pub fn current_reagent(&self) -> &str {
        &self.current_reagent
    }

    pub fn last_location(&self) -> Location {
        self.last_location
    }

    pub fn trail(&self) -> &DishTrail {
        &self.trail
    }

    /// Mounts a fresh tip.
    pub fn pick_up_tip(&mut self) -> Result<(), PipetteError> {
        let loc = tip_pickup_location();
        self.resolve_pending_smear(&loc);
        if self.has_tip {
            return Err(PipetteError::AlreadyHoldingTip);
        }
        debug_assert!(self.aspiration_source.is_none());
        self.has_tip = true;
        self.tip_count += 1;
        self.current_volume = 0.0;
        self.aspiration_source = None;
        self.last_location = loc;
        debug!(tip_count = self.tip_count, "picked up tip");
        Ok(())
    }

    /// Unmounts the current tip, emptying it.
    pub fn drop_tip(&mut self) -> Result<(), PipetteError> {
        let loc = tip_drop_location();
        self.resolve_pending_smear(&loc);
        if !self.has_tip {
            return Err(PipetteError::NoTipMounted { op: "drop_tip" });
        }
        self.has_tip = false;
        self.current_volume = 0.0;
        self.aspiration_source = None;
        self.last_location = loc;
        debug!("dropped tip");
        Ok(())
    }

    /// Draws `volume` µL from `source`.
    ///
    /// A tip may only draw from one distinct source until it is dropped.
    /// Well sources must be configured in the registry. Bare-location
    /// sources are a fallback that loads an unnamed reagent and fires an
    /// advisory.
    pub fn aspirate(
        &mut self,
        volume: f32,
        source: AspirationSource,
    ) -> Result<(), PipetteError> {
        let new_location = match &source {
            AspirationSource::Well(well) => petri_location_of_well(well)?,
            AspirationSource::Point(loc) => *loc,
        };
        self.resolve_pending_smear(&new_location);

        if !self.has_tip {
            return Err(PipetteError::NoTipMounted { op: "aspirate" });
        }
        if volume <= 0.0 {
            return Err(PipetteError::InvalidVolume { volume });
        }
        if self.current_volume + volume > self.max_volume {
            return Err(PipetteError::CapacityExceeded {
                requested: volume,
                held: self.current_volume,
                max: self.max_volume,
            });
        }
        if let Some(previous) = &self.aspiration_source
            && *previous != source
        {
            return Err(PipetteError::CrossContamination {
                first: previous.describe(),
                second: source.describe(),
            });
        }

        let reagent = match &source {
            AspirationSource::Well(well) => {
                if !self.registry.contains_reagent_for(well.id()) {
                    return Err(PipetteError::UnknownReagent {
                        well: well.id().to_string(),
                    });
                }
                well.reagent().to_string()
            }
            AspirationSource::Point(loc) => {
                warn!(
                    x = loc.point.x,
                    y = loc.point.y,
                    "aspirating from a bare location instead of a well"
                );
                if loc.point.z < 0.0 {
                    return Err(PipetteError::NegativeZ { z: loc.point.z });
                }
                UNNAMED_REAGENT.to_string()
            }
        };

        self.current_volume += volume;
        self.current_reagent = reagent.clone();
        *self.total_aspirated.entry(reagent).or_insert(0.0) += volume;
        self.aspiration_source = Some(source);
        self.last_location = new_location;
        debug!(volume, held = self.current_volume, "aspirated");
        Ok(())
    }

    /// Dispenses `volume` µL at an exact dish coordinate, recording a
    /// droplet.
    pub fn dispense(&mut self, volume: f32, location: Location) -> Result<(), PipetteError> {
        self.resolve_pending_smear(&location);

        if !self.has_tip {
            return Err(PipetteError::NoTipMounted { op: "dispense" });
        }
        let (x, y) = (location.point.x, location.point.y);
        if !within_safe_area(x, y) {
            return Err(PipetteError::OutOfBounds {
                x,
                y,
                radius: SAFE_DRAW_RADIUS,
            });
        }
        if volume <= 0.0 {
            return Err(PipetteError::InvalidVolume { volume });
        }
        if volume > self.current_volume {
            return Err(PipetteError::InsufficientVolume {
                requested: volume,
                held: self.current_volume,
            });
        }
        if location.point.z < 0.0 {
            return Err(PipetteError::NegativeZ {
                z: location.point.z,
            });
        }
        if location.point.z >= HIGH_DISPENSE_Z {
            warn!(z = location.point.z, "dispensing unusually high above the dish");
        }

        self.current_volume -= volume;
        self.trail.add_droplet(Droplet {
            x,
            y,
            size: volume * DROPLET_SIZE_SCALE,
            color: resolve_visual_color(&self.current_reagent),
        });
        *self
            .total_dispensed
            .entry(self.current_reagent.clone())
            .or_insert(0.0) += volume;
        self.last_location = location;
        self.pending_dispense_mark = Some(location);
        debug!(volume, x, y, held = self.current_volume, "dispensed");
        Ok(())
    }

    /// Transit move. No tip or volume requirement.
    pub fn move_to(&mut self, location: Location) -> Result<(), PipetteError> {
        self.resolve_pending_smear(&location);
        if location.point.z < 0.0 {
            return Err(PipetteError::NegativeZ {
                z: location.point.z,
            });
        }
        self.last_location = location;
        Ok(())
    }

    /// Blows out any remaining liquid. No droplet is drawn.
    pub fn blow_out(&mut self) {
        self.current_volume = 0.0;
        debug!("blow out");
    }

    /// Touches the tip against the well walls. Visual no-op.
    pub fn touch_tip(&self) {
        debug!("touch tip");
    }

    /// Mixes by aspirating and dispensing in place. Visual no-op.
    pub fn mix(&self, repetitions: u32, volume: Option<f32>) {
        debug!(repetitions, ?volume, "mix");
    }

    /// Consumes the pipette and hands the recorded run to the rendering
    /// sink.
    pub fn finish(self) -> RunRecord {
        RunRecord {
            trail: self.trail,
            total_aspirated: self.total_aspirated,
            total_dispensed: self.total_dispensed,
            tip_count: self.tip_count,
        }
    }

    /// Draws the half-length streak a dragging tip leaves when it moves
    /// right after dispensing, then clears the mark.
    ///
    /// The mark is cleared whether or not a streak was drawn, and before the
    /// caller validates its own preconditions.
    fn resolve_pending_smear(&mut self, new_location: &Location) {
        if let Some(mark) = self.pending_dispense_mark.take()
            && !same_place_2d(&mark, new_location)
        {
            let end = mark.translate(0.5 * (new_location.point - mark.point));
            self.trail.add_smear(Smear {
                x: [mark.point.x, end.point.x],
                y: [mark.point.y, end.point.y],
                color: resolve_visual_color(&self.current_reagent),
            });
        }
    }
}
