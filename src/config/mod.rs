pub mod settings;

pub use settings::{
    API_URL_ENV, APP_DIR, ApiConfig, ConsoleConfig, SessionConfig, StorageConfig,
    default_config_dir, default_config_file,
};
