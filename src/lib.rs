pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::{AppConfig, CliConfig};
pub use crate::core::engine::{ConversionEngine, RunSummary};
pub use crate::core::{api_transformer::ApiTransformer, curl_generator::CurlGenerator};
pub use crate::core::{field_mapper::FieldMapper, json_converter::JsonConverter};
pub use crate::utils::error::{ConvertError, Result};
