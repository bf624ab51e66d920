//! Error taxonomy shared by the bridge crates.

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    /// The active rendering backend does not expose a requested driver resource.
    #[error("unsupported backend: {0}")]
    UnsupportedBackend(String),

    /// None of the candidate driver libraries could be loaded.
    #[error("graphics driver library not found (tried: {})", .tried.join(", "))]
    DriverNotFound { tried: Vec<String> },

    #[error("driver symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("backend context creation failed: {0}")]
    ContextCreationFailed(String),

    #[error("render surface creation failed: {0}")]
    SurfaceCreationFailed(String),

    /// A surface was used after `dispose`. Always a programming error.
    #[error("render surface used after dispose")]
    UseAfterDispose,

    #[error("invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("host error: {0}")]
    Host(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BridgeError {
    pub fn unsupported_backend(msg: impl Into<String>) -> Self {
        Self::UnsupportedBackend(msg.into())
    }

    pub fn symbol_not_found(name: impl Into<String>) -> Self {
        Self::SymbolNotFound(name.into())
    }

    pub fn context_creation(msg: impl Into<String>) -> Self {
        Self::ContextCreationFailed(msg.into())
    }

    pub fn surface_creation(msg: impl Into<String>) -> Self {
        Self::SurfaceCreationFailed(msg.into())
    }

    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }

    /// Whether this failure should trigger the CPU fallback instead of
    /// propagating to the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedBackend(_)
                | Self::DriverNotFound { .. }
                | Self::SymbolNotFound(_)
                | Self::ContextCreationFailed(_)
                | Self::SurfaceCreationFailed(_)
        )
    }
}
