use crate::config::file_config::ApiConfig;
use crate::domain::model::{ApiEnvelope, Document, FieldEntry, MappedRecord};
use crate::utils::error::{ConvertError, Result};
use std::collections::HashMap;

/// 把映射後的記錄組成目標 API 的 Document envelope
#[derive(Debug, Clone)]
pub struct ApiTransformer {
    config: ApiConfig,
    date_format: String,
}

impl ApiTransformer {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            date_format: "%Y-%m-%d".to_string(),
        }
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    /// 每筆 MappedRecord 產生一個 Document；純轉換，無副作用
    pub fn transform(&self, records: &[MappedRecord]) -> Result<ApiEnvelope> {
        if self.config.application_name.trim().is_empty() {
            return Err(ConvertError::transform(
                "applicationName must not be empty",
            ));
        }
        if self.config.form_name.trim().is_empty() {
            return Err(ConvertError::transform("formName must not be empty"));
        }

        let documents: Vec<Document> = records.iter().map(|r| self.build_document(r)).collect();

        tracing::info!(
            "Transformed {} records into {} API documents",
            records.len(),
            documents.len()
        );

        Ok(ApiEnvelope { documents })
    }

    fn build_document(&self, record: &MappedRecord) -> Document {
        let mut fields: Vec<FieldEntry> = Vec::with_capacity(record.len());
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for (name, value) in record.iter() {
            let rendered = value.render(&self.date_format);
            match positions.get(name.as_str()) {
                // 合併欄位：同名目標欄位的值串接在首次出現的項目上
                Some(&index) => fields[index].values.push(rendered),
                None => {
                    positions.insert(name.as_str(), fields.len());
                    fields.push(FieldEntry {
                        field_name: name.clone(),
                        values: vec![rendered],
                    });
                }
            }
        }

        Document {
            application_name: self.config.application_name.clone(),
            form_name: self.config.form_name.clone(),
            phase: self.config.phase.clone(),
            locale: self.config.locale.clone(),
            fields,
        }
    }
}
