pub mod cli;
pub mod file_config;

pub use cli::CliConfig;
pub use file_config::{ApiConfig, AppConfig, ConverterConfig, ParserConfig};
