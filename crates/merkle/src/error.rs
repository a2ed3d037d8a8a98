use thiserror::Error;

/// Errors surfaced by the commitment engine. The engine never retries,
/// never logs and never swallows; the first error encountered is returned
/// and the caller decides what to do with it.
#[derive(Debug, Error)]
pub enum MerkleError {
    /// Empty leaf list handed to a tree constructor.
    #[error("invalid inputs")]
    InvalidInputs,

    #[error("index {index} out of range for {size} slots")]
    OutOfRange { index: usize, size: usize },

    #[error("already got hash for index {index}")]
    SlotFilled { index: usize },

    #[error("builder incomplete: {filled} of {size} slots filled")]
    Incomplete { filled: usize, size: usize },

    #[error("{0} not found in merkle tree")]
    NotFound(String),

    #[error("cannot retrieve level {level}, height is {height}")]
    LevelOutOfRange { level: usize, height: usize },

    #[error("invalid start leaf")]
    InvalidStartLeaf,

    #[error("cannot verify, calculated {left} and {right} but expected {expected}")]
    CannotVerify {
        left: String,
        right: String,
        expected: String,
    },

    #[error("root mismatch, got {got} want {want}")]
    RootMismatch { got: String, want: String },

    #[error("malformed proof: length {0} must be odd and non-zero")]
    MalformedProof(usize),

    /// A node record contradicts the construction invariants.
    #[error("invalid tree state: {0}")]
    InvalidTreeState(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
