pub mod app_config;
pub mod categories;
pub mod config;
pub mod products;

pub use app_config::AppConfig;
pub use categories::{load_categories, parse_categories, Category};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{Characteristic, Comment, ImageMapping, ProductRecord, RatingSummary};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read categories file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
