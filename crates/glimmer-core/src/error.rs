//! Error types for glimmer-core operations

/// Result type for glimmer-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or executing shader groups.
///
/// Boundary operations that the host contract defines as boolean-returning
/// (`attribute`, `shader`, `execute`, `shade_image`) report these through the
/// shading system's [`ErrorHandler`](crate::ErrorHandler) and then return
/// `false`; the `Display` text of the variant is the diagnostic the handler
/// receives.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Attribute name not recognized by the shading system
    #[error("attribute \"{0}\" not recognized")]
    UnknownAttribute(String),

    /// Attribute value type does not match the attribute
    #[error("attribute \"{name}\" expects {expected}")]
    AttributeTypeMismatch { name: String, expected: &'static str },

    /// Shader name not present in the shader registry
    #[error("shader \"{0}\" not found")]
    UnknownShader(String),

    /// Shader usage other than "surface"
    #[error("unsupported shader usage \"{0}\"")]
    UnsupportedUsage(String),

    /// Layer added to a group after ShaderGroupEnd
    #[error("shader group \"{0}\" is already finalized")]
    GroupFinalized(String),

    /// Group used before ShaderGroupEnd
    #[error("shader group \"{0}\" has not been finalized")]
    GroupNotFinalized(String),

    /// Named output symbol missing from the group
    #[error("output symbol \"{0}\" not found")]
    SymbolNotFound(String),

    /// Region of interest does not intersect the image
    #[error("region of interest is empty")]
    EmptyRoi,
}
