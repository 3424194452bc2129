//! Dish-relative spatial model: locations, the same-place rule and the
//! drawable area of the plate.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Inner diameter in mm shared by the "90mm" and "100mm" Petri plates the
/// simulator draws on.
pub const PETRI_INNER_DIAMETER: f32 = 84.0;

/// Margin in mm kept clear of the dish wall for tip size, drop spread and
/// calibration slack.
pub const EDGE_SAFETY_MARGIN: f32 = 2.0;

/// Radius of the area dispenses may target.
pub const SAFE_DRAW_RADIUS: f32 = PETRI_INNER_DIAMETER / 2.0 - EDGE_SAFETY_MARGIN;

/// Calibration row of the well-to-canvas transform; row `D` lands on x = 0.
pub const REFERENCE_ROW: char = 'D';

/// Calibration column of the well-to-canvas transform; column 6 lands on y = 0.
pub const REFERENCE_COLUMN: u32 = 6;

/// What a [`Location`] was derived from.
///
/// Participates in same-place comparisons only; it carries no physical
/// units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationContext {
    /// Derived from a labware well.
    Well,
    /// The fixed tip pickup reference point.
    TipPickup,
    /// The fixed tip drop reference point.
    TipDrop,
}

/// A dish-relative position in mm plus the context it was derived from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub point: Vec3,
    pub context: Option<LocationContext>,
}

impl Location {
    pub const fn new(point: Vec3, context: Option<LocationContext>) -> Self {
        Self { point, context }
    }

    /// Returns a copy translated by `delta`, keeping the context.
    pub fn translate(&self, delta: Vec3) -> Self {
        Self {
            point: self.point + delta,
            context: self.context,
        }
    }
}

/// Compares two locations ignoring Z (only X, Y and context).
pub fn same_place_2d(a: &Location, b: &Location) -> bool {
    a.point.x == b.point.x && a.point.y == b.point.y && a.context == b.context
}

/// Whether an (x, y) target lies inside the safe draw radius.
pub fn within_safe_area(x: f32, y: f32) -> bool {
    x * x + y * y <= SAFE_DRAW_RADIUS * SAFE_DRAW_RADIUS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_place_ignores_z() {
        let a = Location::new(Vec3::new(1.0, 2.0, 0.0), Some(LocationContext::Well));
        let b = Location::new(Vec3::new(1.0, 2.0, 7.5), Some(LocationContext::Well));
        assert!(same_place_2d(&a, &b));
    }

    #[test]
    fn same_point_different_context_is_a_different_place() {
        let a = Location::new(Vec3::new(1.0, 2.0, 0.0), Some(LocationContext::Well));
        let b = Location::new(Vec3::new(1.0, 2.0, 0.0), None);
        assert!(!same_place_2d(&a, &b));
    }

    #[test]
    fn translate_keeps_context() {
        let a = Location::new(Vec3::ZERO, Some(LocationContext::TipPickup));
        let b = a.translate(Vec3::new(3.0, -1.0, 2.0));
        assert_eq!(b.point, Vec3::new(3.0, -1.0, 2.0));
        assert_eq!(b.context, Some(LocationContext::TipPickup));
    }

    #[test]
    fn safe_area_boundary() {
        assert!(within_safe_area(0.0, 0.0));
        assert!(within_safe_area(SAFE_DRAW_RADIUS, 0.0));
        assert!(!within_safe_area(SAFE_DRAW_RADIUS, 1.0));
    }
}
