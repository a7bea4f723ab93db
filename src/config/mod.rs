mod settings;

use config::{Config, ConfigError, Environment, File};

use crate::broker::MAX_MAILBOX_CAPACITY;

pub use settings::{
    BrokerSettings, LogSettings, PartialSettings, ServerSettings, Settings,
};

/// Prefix for environment overrides, e.g. `LINECAST_SERVER_PORT=9100`.
pub const ENV_PREFIX: &str = "LINECAST";

/// Loads the configuration from `config/default` (if present) and
/// `LINECAST_*` environment variables, merged over the defaults.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config/default")
}

/// Same as [`load_config`] with an explicit config file stem.
pub fn load_config_from(file: &str) -> Result<Settings, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name(file).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("_")
                .try_parsing(true),
        )
        .build()?;

    let partial: PartialSettings = config.try_deserialize()?;
    let settings = Settings::merged(partial);
    validate(&settings)?;
    Ok(settings)
}

/// Reject values the relay cannot run with.
fn validate(settings: &Settings) -> Result<(), ConfigError> {
    let capacity = settings.broker.capacity;
    if capacity == 0 || capacity > MAX_MAILBOX_CAPACITY {
        return Err(ConfigError::Message(format!(
            "broker.capacity must be between 1 and {MAX_MAILBOX_CAPACITY}, got {capacity}"
        )));
    }
    Ok(())
}
