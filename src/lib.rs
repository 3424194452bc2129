//! # petri-bioart
//!
//! A hardware-free simulator for Opentrons-style liquid-handling protocols.
//!
//! Protocols run against a simulated p20 pipette that validates tip
//! lifecycle, volume bookkeeping and cross-contamination the way the real
//! instrument would, while recording every dispense as a droplet (and every
//! post-dispense drag as a smear) on a simulated Petri dish. The recorded
//! trail renders to an SVG image of the finished plate, alongside a text
//! summary of volumes moved and tips used.

pub mod colors;
pub mod error;
pub mod geometry;
pub mod labware;
pub mod pipette;
pub mod protocol;
pub mod render;
pub mod trail;

pub use colors::*;
pub use error::*;
pub use geometry::*;
pub use labware::*;
pub use pipette::*;
pub use protocol::*;
pub use render::*;
pub use trail::*;
