// tests/smear_geometry.rs
//
// Smear synthesis: a dispense followed by any positional operation at a
// different 2-D place leaves a half-length streak from the dispense mark
// toward the next stop.

use std::collections::BTreeMap;

use glam::Vec3;
use petri_bioart::{
    AspirationSource, Location, Pipette, ReagentRegistry, SAFE_DRAW_RADIUS, Well,
    petri_location_of_well,
};

fn registry() -> ReagentRegistry {
    let mut wells = BTreeMap::new();
    wells.insert("A1".to_string(), "sfGFP".to_string());
    ReagentRegistry::new(wells)
}

fn loc(x: f32, y: f32, z: f32) -> Location {
    Location::new(Vec3::new(x, y, z), None)
}

fn loaded_pipette(registry: &ReagentRegistry) -> Pipette<'_> {
    let mut pipette = Pipette::new(registry);
    pipette.pick_up_tip().unwrap();
    pipette
        .aspirate(10.0, AspirationSource::Well(registry.well("A1")))
        .unwrap();
    pipette
}

#[test]
fn consecutive_dispenses_smear_to_the_midpoint() {
    let registry = registry();
    let mut pipette = loaded_pipette(&registry);

    // Dispense at the origin, then at (5, 5). The streak runs from the
    // first mark to halfway toward the second: (2.5, 2.5).
    pipette.dispense(3.0, loc(0.0, 0.0, 0.0)).unwrap();
    pipette.dispense(2.0, loc(5.0, 5.0, 0.0)).unwrap();

    let smears = &pipette.trail().smears;
    assert_eq!(smears.len(), 1);
    assert_eq!(smears[0].x, [0.0, 2.5]);
    assert_eq!(smears[0].y, [0.0, 2.5]);
    assert_eq!(smears[0].color, "lime");
}

#[test]
fn redispensing_at_the_same_place_leaves_no_smear() {
    let registry = registry();
    let mut pipette = loaded_pipette(&registry);

    pipette.dispense(3.0, loc(5.0, 5.0, 0.0)).unwrap();
    pipette.dispense(2.0, loc(5.0, 5.0, 0.0)).unwrap();
    assert!(pipette.trail().smears.is_empty());
}

#[test]
fn hovering_straight_up_leaves_no_smear() {
    let registry = registry();
    let mut pipette = loaded_pipette(&registry);

    // The jog pattern: dispense, then retract vertically before moving on.
    // Same x/y and context, so no streak despite the pending mark.
    pipette.dispense(2.0, loc(5.0, 5.0, 1.0)).unwrap();
    pipette.move_to(loc(5.0, 5.0, 6.0)).unwrap();
    pipette.dispense(2.0, loc(-5.0, -5.0, 1.0)).unwrap();
    assert!(pipette.trail().smears.is_empty());
}

#[test]
fn moving_after_a_dispense_smears_once() {
    let registry = registry();
    let mut pipette = loaded_pipette(&registry);

    pipette.dispense(2.0, loc(0.0, 0.0, 0.0)).unwrap();
    pipette.move_to(loc(6.0, 8.0, 0.0)).unwrap();

    let smears = &pipette.trail().smears;
    assert_eq!(smears.len(), 1);
    assert_eq!(smears[0].x, [0.0, 3.0]);
    assert_eq!(smears[0].y, [0.0, 4.0]);

    // The mark is cleared once resolved; further moves add nothing.
    pipette.move_to(loc(10.0, 10.0, 0.0)).unwrap();
    assert_eq!(pipette.trail().smears.len(), 1);
}

#[test]
fn aspirating_again_resolves_the_mark_against_the_well() {
    let registry = registry();
    let mut pipette = loaded_pipette(&registry);

    pipette.dispense(2.0, loc(0.0, 0.0, 0.0)).unwrap();
    pipette
        .aspirate(2.0, AspirationSource::Well(registry.well("A1")))
        .unwrap();

    // A1 maps onto the canvas at ((65-68)*R/4, (1-6)*R/6); the streak stops
    // halfway there from the origin.
    let a1 = petri_location_of_well(&Well::new("A1", "sfGFP")).unwrap();
    let smears = &pipette.trail().smears;
    assert_eq!(smears.len(), 1);
    assert_eq!(smears[0].x, [0.0, 0.5 * a1.point.x]);
    assert_eq!(smears[0].y, [0.0, 0.5 * a1.point.y]);
    assert_eq!(a1.point.x, -3.0 * SAFE_DRAW_RADIUS / 4.0);
}

#[test]
fn dropping_the_tip_resolves_the_mark_against_the_drop_point() {
    let registry = registry();
    let mut pipette = loaded_pipette(&registry);

    pipette.dispense(2.0, loc(0.0, 0.0, 0.0)).unwrap();
    pipette.drop_tip().unwrap();

    // Drop reference point is (R, R); the streak stops at (R/2, R/2).
    let smears = &pipette.trail().smears;
    assert_eq!(smears.len(), 1);
    assert_eq!(smears[0].x, [0.0, SAFE_DRAW_RADIUS / 2.0]);
    assert_eq!(smears[0].y, [0.0, SAFE_DRAW_RADIUS / 2.0]);
}

#[test]
fn smear_color_follows_the_loaded_reagent() {
    let registry = registry();
    let mut pipette = loaded_pipette(&registry);

    pipette.dispense(2.0, loc(0.0, 0.0, 0.0)).unwrap();
    pipette.move_to(loc(10.0, 0.0, 0.0)).unwrap();
    assert_eq!(pipette.trail().smears[0].color, "lime");
}

#[test]
fn failed_operations_still_commit_the_pending_smear() {
    let registry = registry();
    let mut pipette = loaded_pipette(&registry);

    pipette.dispense(2.0, loc(0.0, 0.0, 0.0)).unwrap();

    // The over-dispense fails, but the drag toward it already happened.
    assert!(pipette.dispense(50.0, loc(10.0, 0.0, 0.0)).is_err());
    assert_eq!(pipette.trail().smears.len(), 1);
    assert_eq!(pipette.trail().droplets.len(), 1);

    // The mark was cleared by the failed call.
    pipette.move_to(loc(20.0, 0.0, 0.0)).unwrap();
    assert_eq!(pipette.trail().smears.len(), 1);
}
