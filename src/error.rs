use thiserror::Error;

/// Every way a public operation on this crate's graphs can fail.
///
/// Variant names mirror the conceptual error kinds of the engine's error
/// surface: each is raised by exactly the operations that document it, and
/// is fatal to the operation that raised it (the automaton's state
/// afterward is undefined unless the operation says otherwise).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NfaError {
    #[error("cannot link node {from} to node {to}: not owned by the same node list")]
    CrossListLink { from: usize, to: usize },

    #[error("edge label must not be empty")]
    EmptyLabel,

    #[error("no edge from node {from} to node {to}")]
    MissingEdge { from: usize, to: usize },

    #[error("alphabets do not agree: {left:#x} vs {right:#x}")]
    AlphabetMismatch { left: u32, right: u32 },

    #[error("invalid range [{min:#x}, {max:#x}] for alphabet bound {maximum:#x}")]
    InvalidRange { min: u32, max: u32, maximum: u32 },

    #[error("code point {0:#x} is not a valid integer in the alphabet")]
    InvalidCodepoint(u32),

    #[error("assertions are not supported by this engine")]
    UnsupportedConstruct,

    #[error("reachability pruning attempted to remove the initial node")]
    InitialRemoval,
}

pub type Result<T> = std::result::Result<T, NfaError>;
