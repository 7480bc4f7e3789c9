//! Error types for map bootstrapping.

use crate::render::RendererError;

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while bootstrapping or driving a map instance.
///
/// Everything coming out of the map engine is propagated as-is; nothing is
/// recovered or retried here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The referenced display surface is not registered.
    #[error("display surface '{0}' is not registered")]
    MissingContainer(String),

    /// The access credential is empty.
    #[error("access credential must not be empty")]
    InvalidCredential,

    /// The environment variable holding the access credential is not set.
    #[error("credential variable '{0}' is not set in the environment")]
    MissingCredentialVar(String),

    /// No credential source is configured at all.
    #[error("no credential configured: set [auth] token_env or token")]
    CredentialNotConfigured,

    /// A configuration value is outside its allowed range.
    #[error("{field} out of range: {value} (expected {min}..={max})")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Lower bound of the allowed range.
        min: f64,
        /// Upper bound of the allowed range.
        max: f64,
    },

    /// The base style URI is not recognized or its template is malformed.
    #[error("unsupported base style '{0}'")]
    InvalidStyle(String),

    /// Error reported by the map engine.
    #[error("map engine error: {0}")]
    Sdk(#[from] galileo::error::GalileoError),

    /// Error from the offscreen presenter.
    #[error(transparent)]
    Renderer(#[from] RendererError),

    /// I/O error while reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Log subscriber could not be installed.
    #[error("logging init failed: {0}")]
    Logging(String),
}
