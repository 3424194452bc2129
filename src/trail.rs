//! The recorded output of a run: droplets, smears and volume totals.
//!
//! The trail is the "phenotype" of a protocol: everything downstream
//! consumers need to draw the finished plate, decoupled from the pipette
//! that produced it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One dispensed droplet, in dish coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Droplet {
    /// mm from dish center.
    pub x: f32,

    /// mm from dish center.
    pub y: f32,

    /// Scatter area: µL dispensed times 100.
    pub size: f32,

    /// Resolved display color token.
    pub color: String,
}

/// A streak left by lateral tip movement right after a dispense.
///
/// Endpoints run from the dispense mark to the halfway point toward the
/// pipette's next stop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Smear {
    pub x: [f32; 2],
    pub y: [f32; 2],
    pub color: String,
}

/// Append-only droplet and smear records, in dispense order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DishTrail {
    pub droplets: Vec<Droplet>,
    pub smears: Vec<Smear>,
}

impl DishTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_droplet(&mut self, droplet: Droplet) {
        self.droplets.push(droplet);
    }

    pub(crate) fn add_smear(&mut self, smear: Smear) {
        self.smears.push(smear);
    }
}

/// Everything the rendering sink consumes, handed over in one batch after
/// the run completes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunRecord {
    pub trail: DishTrail,

    /// Reagent name to cumulative µL drawn.
    pub total_aspirated: BTreeMap<String, f32>,

    /// Reagent name to cumulative µL dispensed.
    pub total_dispensed: BTreeMap<String, f32>,

    /// Tips consumed during the run.
    pub tip_count: u32,
}
