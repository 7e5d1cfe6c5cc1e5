use thiserror::Error;

/// Error taxonomy shared across the VRS crates.
#[derive(Error, Debug)]
pub enum VrsError {
    /// Malformed external expression, bad coordinates, or constraint violation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Residues outside the declared reference alphabet.
    #[error("residue {residue:?} at offset {offset} is not in the {alphabet} alphabet")]
    InvalidAlphabet {
        residue: char,
        offset: usize,
        alphabet: &'static str,
    },

    /// Identifier not resolvable via the sequence repository or object store.
    #[error("unknown reference: {0}")]
    UnknownReference(String),

    /// The stated reference allele disagrees with the repository.
    #[error("reference mismatch at {accession}:{start}-{end}: expected {expected:?}, found {actual:?}")]
    ReferenceMismatch {
        accession: String,
        start: u64,
        end: u64,
        expected: String,
        actual: String,
    },

    /// The target grammar cannot express the given VRS object.
    #[error("cannot represent variation in target format: {0}")]
    Unrepresentable(String),

    /// Attempt to digest an incomplete or inconsistent object graph.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Transient collaborator failure; retries are the caller's responsibility.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VrsError>;
