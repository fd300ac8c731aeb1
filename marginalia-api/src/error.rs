#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("No factory registered for comment type {0:?}")]
    FactoryNotFound(String),

    #[error("A factory is already registered for comment type {0:?}")]
    DuplicateFactory(String),

    #[error("Factory {factory:?} cannot anchor a {region} region")]
    RegionMismatch {
        factory: String,
        region: &'static str,
    },

    #[error("Invalid operation: {0}")]
    InvalidOp(String),

    #[error("Invalid comment file: {0}")]
    InvalidFile(String),

    #[error("Unsupported comment file version {0}")]
    UnsupportedVersion(u32),

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),
}
