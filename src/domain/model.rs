use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 儲存格的值，型別在 Row Source 邊界決定一次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
    Empty,
}

impl CellValue {
    /// 是否為空值（空儲存格或純空白字串）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 渲染為 API Values 陣列用的字串
    pub fn render(&self, date_format: &str) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                // 整數值不輸出小數點
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 9_007_199_254_740_992.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Bool(b) => b.to_string(),
            CellValue::Date(d) => d.format(date_format).to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

/// 一列試算表資料：欄名 → 值，保留來源欄位順序，鍵唯一
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    columns: Vec<(String, CellValue)>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入欄位；既有欄名會原地覆寫，保留首次出現的位置
    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        let column = column.into();
        if let Some(slot) = self.columns.iter_mut().find(|(name, _)| *name == column) {
            slot.1 = value;
        } else {
            self.columns.push((column, value));
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, CellValue)> {
        self.columns.iter()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for FlatRecord {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl FromIterator<(String, CellValue)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        let mut record = FlatRecord::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

/// 映射後的記錄：鍵已換成目標欄位名，允許重複鍵（合併欄位時由轉換器串接）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedRecord {
    fields: Vec<(String, CellValue)>,
}

impl MappedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, value: CellValue) {
        self.fields.push((field.into(), value));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, CellValue)> {
        self.fields.iter()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// 解析後的一張工作表
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<FlatRecord>,
}

/// 單一 Document 內的欄位項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    #[serde(rename = "Values")]
    pub values: Vec<String>,
}

/// 目標表單 API 的 Document 結構
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "applicationName")]
    pub application_name: String,
    #[serde(rename = "formName")]
    pub form_name: String,
    pub phase: String,
    pub locale: String,
    #[serde(rename = "Fields")]
    pub fields: Vec<FieldEntry>,
}

/// 單次 HTTP 呼叫送出的最上層包裝
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(rename = "Document")]
    pub documents: Vec<Document>,
}

/// Basic auth 憑證
#[derive(Debug, Clone, PartialEq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// 渲染完成、可直接執行的一次 HTTP 呼叫
#[derive(Debug, Clone, PartialEq)]
pub struct CallSpec {
    pub url: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// API 呼叫的批次模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchingMode {
    /// 所有 Document 放進同一個呼叫
    #[default]
    SingleBatch,
    /// 每個 Document 包成獨立的單元素 envelope
    PerDocument,
}

/// 未映射欄位的處理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmappedPolicy {
    /// 保留原欄名
    #[default]
    Pass,
    /// 丟棄
    Drop,
}
