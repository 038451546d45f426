use crate::config::file_config::ParserConfig;
use crate::domain::model::{CellValue, FlatRecord, Sheet};
use crate::domain::ports::RowSource;
use crate::utils::error::{ConvertError, Result};
use std::path::Path;

/// CSV 檔案的 Row Source，輸出一張以檔名為名的工作表
#[derive(Debug, Clone, Default)]
pub struct CsvSource {
    config: ParserConfig,
}

impl CsvSource {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }
}

impl RowSource for CsvSource {
    fn parse(&self, path: &Path, sheet_name: Option<&str>) -> Result<Vec<Sheet>> {
        if !path.exists() {
            return Err(ConvertError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("CSV file not found: {}", path.display()),
            )));
        }

        tracing::info!("Reading CSV file: {}", path.display());
        let mut reader = csv::Reader::from_path(path)?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let missing: Vec<&String> = self
            .config
            .required_columns
            .iter()
            .filter(|col| !headers.contains(col))
            .collect();
        if !missing.is_empty() {
            tracing::warn!(
                "Missing required columns in CSV: {:?}; continuing with processing",
                missing
            );
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let row = result?;
            let cells: Vec<CellValue> = row.iter().map(infer_cell).collect();
            if cells.iter().all(CellValue::is_blank) {
                continue;
            }

            let mut record = FlatRecord::new();
            for (i, header) in headers.iter().enumerate() {
                if header.is_empty() {
                    continue;
                }
                record.insert(
                    header.clone(),
                    cells.get(i).cloned().unwrap_or(CellValue::Empty),
                );
            }
            rows.push(record);
        }

        let name = sheet_name
            .map(str::to_string)
            .or_else(|| self.config.sheet_name.clone())
            .or_else(|| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "data".to_string());

        tracing::info!("Parsed {} rows from CSV", rows.len());
        Ok(vec![Sheet { name, rows }])
    }
}

/// CSV 儲存格只有文字，型別在這裡推斷一次
fn infer_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return CellValue::Date(date);
    }
    if let Ok(number) = trimmed.parse::<f64>() {
        if number.is_finite() {
            return CellValue::Number(number);
        }
    }
    CellValue::Text(trimmed.to_string())
}
