use crate::config::file_config::ParserConfig;
use crate::domain::model::{CellValue, FlatRecord, Sheet};
use crate::domain::ports::RowSource;
use crate::utils::error::{ConvertError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// 以 calamine 讀取 Excel 活頁簿的 Row Source
#[derive(Debug, Clone, Default)]
pub struct ExcelSource {
    config: ParserConfig,
}

impl ExcelSource {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    fn read_sheet(&self, name: &str, range: &calamine::Range<Data>) -> Sheet {
        let mut rows_iter = range.rows();

        let header = match rows_iter.nth(self.config.header_row) {
            Some(header) => header,
            None => {
                tracing::warn!("Sheet '{}' is empty", name);
                return Sheet {
                    name: name.to_string(),
                    rows: Vec::new(),
                };
            }
        };

        let headers: Vec<String> = header
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        self.check_required_columns(name, &headers);

        let rows = rows_iter
            .filter_map(|row| build_record(&headers, row))
            .collect();

        Sheet {
            name: name.to_string(),
            rows,
        }
    }

    /// 缺少必要欄位只警告，照原樣繼續處理
    fn check_required_columns(&self, sheet_name: &str, headers: &[String]) {
        let missing: Vec<&String> = self
            .config
            .required_columns
            .iter()
            .filter(|col| !headers.contains(col))
            .collect();

        if !missing.is_empty() {
            tracing::warn!(
                "Missing required columns in sheet '{}': {:?}; continuing with processing",
                sheet_name,
                missing
            );
        }
    }
}

impl RowSource for ExcelSource {
    fn parse(&self, path: &Path, sheet_name: Option<&str>) -> Result<Vec<Sheet>> {
        if !path.exists() {
            return Err(ConvertError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Excel file not found: {}", path.display()),
            )));
        }

        tracing::info!("Reading Excel file: {}", path.display());
        let mut workbook = open_workbook_auto(path)?;

        let selected = sheet_name
            .map(str::to_string)
            .or_else(|| self.config.sheet_name.clone());

        let names: Vec<String> = match selected {
            Some(name) => vec![name],
            None => workbook.sheet_names(),
        };
        tracing::info!("Sheets to read: {:?}", names);

        let mut sheets = Vec::with_capacity(names.len());
        for name in &names {
            let range = workbook.worksheet_range(name)?;
            sheets.push(self.read_sheet(name, &range));
        }

        Ok(sheets)
    }
}

/// 整列皆空的資料列直接捨棄；空字串標題的欄位不收
fn build_record(headers: &[String], row: &[Data]) -> Option<FlatRecord> {
    let cells: Vec<CellValue> = row.iter().map(convert_cell).collect();
    if cells.iter().all(CellValue::is_blank) {
        return None;
    }

    let mut record = FlatRecord::new();
    for (i, header) in headers.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        let value = cells.get(i).cloned().unwrap_or(CellValue::Empty);
        record.insert(header.clone(), value);
    }
    Some(record)
}

/// 儲存格型別在這裡一次決定，下游不再做型別判斷
fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(trimmed.to_string())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|ndt| CellValue::Date(ndt.date()))
            .unwrap_or(CellValue::Empty),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|prefix| chrono::NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => {
            tracing::warn!("Cell contains an error value: {:?}", e);
            CellValue::Empty
        }
    }
}
