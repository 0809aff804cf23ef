pub mod loader;
pub mod schema;

pub use loader::{
    default_config_path, load_config, load_config_from_str, load_config_or_default,
    validate_config, LoadedConfig, CONFIG_ENV_VAR,
};
pub use schema::{Config, LogFormat, WorkerCommand, DEFAULT_BIND, DEFAULT_MAX_BODY_BYTES};
