/// Error raised when an env var is missing or does not parse.
pub use envy::Error as ConfigError;

/// Loads service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize`; field names map to upper-case
/// env vars (`cycle_duration_secs` reads `CYCLE_DURATION_SECS`). Fields with
/// `#[serde(default = ...)]` fall back when the variable is unset.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn try_from_env() -> Result<Self, ConfigError> {
        envy::from_env()
    }

    /// Read from an explicit set of key/value pairs instead of the process env.
    fn from_pairs<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(pairs)
    }
}
