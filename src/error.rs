//! Error taxonomy for the simulator.

use thiserror::Error;

/// Errors raised by the pipette state machine.
///
/// Every variant is an immediate, non-retryable precondition violation. A
/// failed operation leaves the pipette unchanged, except that any pending
/// smear has already been resolved: the streak is a physical consequence of
/// the previous dispense, not of the failed call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipetteError {
    #[error("{op}() called without a tip")]
    NoTipMounted { op: &'static str },

    #[error("pick_up_tip() called while already holding a tip")]
    AlreadyHoldingTip,

    #[error("volume must be positive, got {volume}uL")]
    InvalidVolume { volume: f32 },

    #[error("aspirating {requested}uL + {held}uL already in pipette exceeds max {max}uL")]
    CapacityExceeded { requested: f32, held: f32, max: f32 },

    #[error("dispensing {requested}uL but only {held}uL in pipette")]
    InsufficientVolume { requested: f32, held: f32 },

    #[error("cross-contamination between {first} and {second}")]
    CrossContamination { first: String, second: String },

    #[error("well {well} has no configured reagent")]
    UnknownReagent { well: String },

    #[error("dispensing outside the safe area: ({x}, {y}) is more than {radius}mm from center")]
    OutOfBounds { x: f32, y: f32, radius: f32 },

    #[error("cannot go below the dish surface: z = {z}")]
    NegativeZ { z: f32 },

    #[error("malformed well id {id:?}, expected a row letter followed by a column number")]
    InvalidWellId { id: String },
}

/// Crate-level error covering protocol loading, configuration and I/O on
/// top of the state-machine taxonomy.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Pipette(#[from] PipetteError),

    #[error("protocol file not found: {0}")]
    ProtocolNotFound(String),

    #[error("unsupported pipette {0:?}, must be p20_single_gen2")]
    UnsupportedInstrument(String),

    #[error("unsupported mount {0:?}, must be \"right\"")]
    UnsupportedMount(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid protocol JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
