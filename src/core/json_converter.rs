use crate::config::file_config::ConverterConfig;
use crate::domain::model::{CellValue, FlatRecord, Sheet};
use crate::utils::error::Result;
use serde::Serialize;
use std::path::Path;

/// 把解析後的工作表輸出成 JSON 文字
#[derive(Debug, Clone)]
pub struct JsonConverter {
    indent: usize,
    date_format: String,
}

impl JsonConverter {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            indent: config.indent,
            date_format: config.date_format.clone(),
        }
    }

    /// 工作表 → {工作表名: [記錄]}，日期依設定格式化，空值輸出 null
    pub fn sheets_to_value(&self, sheets: &[Sheet]) -> serde_json::Value {
        let mut root = serde_json::Map::with_capacity(sheets.len());
        for sheet in sheets {
            let rows: Vec<serde_json::Value> = sheet
                .rows
                .iter()
                .map(|row| self.record_to_value(row))
                .collect();
            root.insert(sheet.name.clone(), serde_json::Value::Array(rows));
        }
        serde_json::Value::Object(root)
    }

    fn record_to_value(&self, record: &FlatRecord) -> serde_json::Value {
        let mut object = serde_json::Map::with_capacity(record.len());
        for (column, value) in record.iter() {
            object.insert(column.clone(), self.cell_to_value(value));
        }
        serde_json::Value::Object(object)
    }

    fn cell_to_value(&self, value: &CellValue) -> serde_json::Value {
        match value {
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
            CellValue::Bool(b) => serde_json::Value::Bool(*b),
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            CellValue::Date(d) => {
                serde_json::Value::String(d.format(&self.date_format).to_string())
            }
            CellValue::Empty => serde_json::Value::Null,
        }
    }

    /// 依設定縮排序列化；indent 0 產生緊湊輸出
    pub fn to_json_string<T: Serialize>(&self, data: &T) -> Result<String> {
        if self.indent == 0 {
            return Ok(serde_json::to_string(data)?);
        }

        let indent = vec![b' '; self.indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
        let mut buffer = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        data.serialize(&mut serializer)?;
        Ok(String::from_utf8(buffer).expect("serde_json emits valid UTF-8"))
    }

    /// 寫檔前先建立父目錄
    pub fn save<P: AsRef<Path>>(&self, json_data: &str, output_path: P) -> Result<()> {
        let output_path = output_path.as_ref();
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        tracing::info!("Saving JSON to: {}", output_path.display());
        std::fs::write(output_path, json_data)?;
        Ok(())
    }

    /// 轉成 JSON 並視需要存檔；內容先完整渲染再寫出
    pub fn process(&self, sheets: &[Sheet], output_path: Option<&Path>) -> Result<String> {
        let value = self.sheets_to_value(sheets);
        let json_data = self.to_json_string(&value)?;

        if let Some(path) = output_path {
            self.save(&json_data, path)?;
        }

        Ok(json_data)
    }
}
