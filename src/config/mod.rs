mod loader;
mod settings;

pub use loader::{load_config, BatchpitConfig, BatchpitProfileConfig, LoadedConfig, CONFIG_FILE};
pub use settings::{RunSettings, SettingsBuilder, DEFAULT_INPUT, DEFAULT_OUTPUT};
