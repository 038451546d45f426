use crate::domain::model::{FlatRecord, MappedRecord, UnmappedPolicy};
use crate::utils::error::{ConvertError, Result};
use std::collections::HashMap;
use std::path::Path;

/// 依映射表把來源欄名換成目標欄位名
#[derive(Debug, Clone, Default)]
pub struct FieldMapper {
    mapping: HashMap<String, String>,
    policy: UnmappedPolicy,
}

impl FieldMapper {
    pub fn new(mapping: HashMap<String, String>, policy: UnmappedPolicy) -> Self {
        Self { mapping, policy }
    }

    /// 沒有映射表的 mapper，所有欄位原樣通過
    pub fn empty(policy: UnmappedPolicy) -> Self {
        Self {
            mapping: HashMap::new(),
            policy,
        }
    }

    /// 從 JSON 檔案載入映射表（必須是 string → string 的扁平物件）
    pub fn from_file<P: AsRef<Path>>(path: P, policy: UnmappedPolicy) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Loading field mapping from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content, policy)
    }

    pub fn from_json_str(content: &str, policy: UnmappedPolicy) -> Result<Self> {
        let raw: serde_json::Value =
            serde_json::from_str(content).map_err(|e| ConvertError::MappingError {
                message: format!("mapping file is not valid JSON: {}", e),
            })?;

        let object = raw.as_object().ok_or_else(|| ConvertError::MappingError {
            message: "mapping file must contain a JSON object".to_string(),
        })?;

        let mut mapping = HashMap::with_capacity(object.len());
        for (source, target) in object {
            let target = target.as_str().ok_or_else(|| ConvertError::MappingError {
                message: format!(
                    "mapping for column '{}' must be a string, got: {}",
                    source, target
                ),
            })?;
            // 重複的來源欄名在 JSON 物件層就已合併，後者生效
            mapping.insert(source.clone(), target.to_string());
        }

        tracing::info!("Loaded {} field mappings", mapping.len());
        Ok(Self::new(mapping, policy))
    }

    pub fn mapping(&self) -> &HashMap<String, String> {
        &self.mapping
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// 套用映射；欄名比對為區分大小寫的完全相符
    pub fn apply(&self, records: &[FlatRecord]) -> Vec<MappedRecord> {
        if self.mapping.is_empty() {
            tracing::warn!("No mapping loaded, passing records through unchanged");
        }

        let mapped: Vec<MappedRecord> = records.iter().map(|r| self.apply_record(r)).collect();
        tracing::info!("Applied field mapping to {} records", mapped.len());
        mapped
    }

    fn apply_record(&self, record: &FlatRecord) -> MappedRecord {
        let mut mapped = MappedRecord::new();
        for (column, value) in record.iter() {
            match self.mapping.get(column) {
                Some(target) => mapped.push(target.clone(), value.clone()),
                None if self.mapping.is_empty() => mapped.push(column.clone(), value.clone()),
                None => match self.policy {
                    UnmappedPolicy::Pass => mapped.push(column.clone(), value.clone()),
                    UnmappedPolicy::Drop => {}
                },
            }
        }
        mapped
    }
}
