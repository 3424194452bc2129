//! Wells and the reagent registry backing aspiration sources.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::PipetteError;
use crate::geometry::{Location, LocationContext};

/// Reagent recorded for wells nobody configured.
pub const UNSET_REAGENT: &str = "purple";

/// A single well, constructed on each registry lookup.
///
/// The id is a row letter followed by a column number, e.g. `B3`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Well {
    id: String,
    reagent: String,
}

impl Well {
    pub fn new(id: impl Into<String>, reagent: impl Into<String>) -> Self {
        let reagent: String = reagent.into();
        Self {
            id: id.into(),
            reagent: if reagent.is_empty() {
                UNSET_REAGENT.to_string()
            } else {
                reagent
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The raw reagent or protein name held in this well.
    pub fn reagent(&self) -> &str {
        &self.reagent
    }

    /// `(row ordinal, column number)` parsed from the id, e.g. `B3` maps to
    /// `(66, 3)`.
    pub fn row_col(&self) -> Result<(u32, u32), PipetteError> {
        parse_well_id(&self.id)
    }

    /// A location at the top of the well, `z` mm above the rim.
    pub fn top(&self, z: f32) -> Location {
        Location::new(Vec3::new(0.0, 0.0, z), Some(LocationContext::Well))
    }
}

/// Splits a well id into an uppercased row ordinal and a column number.
pub(crate) fn parse_well_id(id: &str) -> Result<(u32, u32), PipetteError> {
    let mut chars = id.chars();
    let row = chars
        .next()
        .filter(|c| c.is_ascii_alphabetic())
        .ok_or_else(|| PipetteError::InvalidWellId { id: id.to_string() })?;
    let col: u32 = chars
        .as_str()
        .parse()
        .map_err(|_| PipetteError::InvalidWellId { id: id.to_string() })?;
    Ok((row.to_ascii_uppercase() as u32, col))
}

/// Owned well-id to reagent-name map, read-only for the length of a run.
///
/// Wells are built fresh on every lookup; nothing hands out references into
/// the map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReagentRegistry {
    wells: BTreeMap<String, String>,
}

impl ReagentRegistry {
    pub fn new(wells: BTreeMap<String, String>) -> Self {
        Self { wells }
    }

    /// Constructs the well for `id`, with the sentinel reagent when the well
    /// has no configured entry.
    pub fn well(&self, id: &str) -> Well {
        let reagent = self.wells.get(id).cloned().unwrap_or_default();
        Well::new(id, reagent)
    }

    /// Every configured well.
    pub fn wells(&self) -> impl Iterator<Item = Well> + '_ {
        self.wells.iter().map(|(id, reagent)| Well::new(id, reagent))
    }

    /// Whether some configured well matches `id`, ignoring case.
    pub fn contains_reagent_for(&self, id: &str) -> bool {
        self.wells.keys().any(|k| k.eq_ignore_ascii_case(id))
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    pub fn mapping(&self) -> &BTreeMap<String, String> {
        &self.wells
    }
}

/// Cumulative µL drawn per reagent during one protocol run.
pub type ReagentUsage = BTreeMap<String, f32>;

/// Pure refill bookkeeping, scoped per protocol run.
///
/// When drawing `added_volume` µL of `reagent` would overflow the well it is
/// currently mapped to, the mapping moves one row letter down (same column)
/// and the usage counter restarts with the new draw. Inputs are untouched;
/// the registry used by the pipette stays read-only during a run, so protocol
/// drivers apply the returned mapping between runs.
pub fn reassign_on_overflow(
    registry: &ReagentRegistry,
    usage: &ReagentUsage,
    reagent: &str,
    added_volume: f32,
    per_well_capacity: f32,
) -> (ReagentRegistry, ReagentUsage) {
    let mut wells = registry.wells.clone();
    let mut usage = usage.clone();
    let key = reagent.to_lowercase();

    let found = wells
        .iter()
        .find(|(_, mapped)| mapped.eq_ignore_ascii_case(reagent))
        .map(|(id, mapped)| (id.clone(), mapped.clone()));

    if let Some((well_id, mapped)) = found {
        let used = usage.get(&key).copied().unwrap_or(0.0);
        if used + added_volume > per_well_capacity {
            let next_id = parse_well_id(&well_id).ok().and_then(|(row, col)| {
                char::from_u32(row + 1)
                    .filter(char::is_ascii_uppercase)
                    .map(|next_row| format!("{next_row}{col}"))
            });
            if let Some(next_id) = next_id {
                wells.remove(&well_id);
                wells.insert(next_id, mapped);
                usage.insert(key, added_volume);
            }
        } else {
            usage.insert(key, used + added_volume);
        }
    }

    (ReagentRegistry { wells }, usage)
}
