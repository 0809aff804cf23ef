use std::path::PathBuf;

use clap::Parser;

use cinevision::config::CONFIG_ENV_VAR;
use cinevision::{load_config_or_default, ConfigError, LoadedConfig, LogFormat};

/// Screenplay analysis and storyboard server.
#[derive(Parser, Debug)]
#[command(name = "cinevision-server", version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON config file
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    pub config: Option<PathBuf>,

    /// Address to listen on (overrides the config file)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Log output format: pretty or json
    #[arg(long)]
    pub log_format: Option<LogFormat>,
}

impl Args {
    /// Loads the config file and applies command-line overrides.
    pub fn resolve_config(&self) -> Result<LoadedConfig, ConfigError> {
        let mut loaded = load_config_or_default(self.config.as_deref())?;
        if let Some(bind) = &self.bind {
            loaded.config.bind = bind.clone();
        }
        if let Some(format) = self.log_format {
            loaded.config.log_format = format;
        }
        Ok(loaded)
    }
}
