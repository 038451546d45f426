pub mod csv;
pub mod excel;

use crate::config::file_config::ParserConfig;
use crate::domain::ports::RowSource;
use crate::utils::error::{ConvertError, Result};
use std::path::Path;

/// 依副檔名挑選 Row Source
pub fn row_source_for(path: &Path, config: ParserConfig) -> Result<Box<dyn RowSource>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => Ok(Box::new(csv::CsvSource::new(config))),
        Some("xlsx") | Some("xlsm") | Some("xls") => {
            Ok(Box::new(excel::ExcelSource::new(config)))
        }
        other => Err(ConvertError::InvalidConfigValueError {
            field: "excel".to_string(),
            value: path.display().to_string(),
            reason: format!(
                "Unsupported input format: {}",
                other.unwrap_or("<no extension>")
            ),
        }),
    }
}
