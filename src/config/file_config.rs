use crate::utils::error::{ConvertError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 設定檔（JSON），分成 parser / converter / api 三個區段，所有鍵皆有預設值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub parser: ParserConfig,
    pub converter: ConverterConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// 預設要處理的工作表；None 表示全部
    pub sheet_name: Option<String>,
    /// 標題列的列號（0 起算）
    pub header_row: usize,
    /// 必要欄位；缺少時只警告，不中斷
    pub required_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// JSON 輸出縮排空格數，0 為不縮排
    pub indent: usize,
    /// 日期值的輸出格式
    pub date_format: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub application_name: String,
    pub form_name: String,
    pub locale: String,
    pub phase: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            application_name: "ENGINE".to_string(),
            form_name: "ENGINE_FIELD_SETTINGS".to_string(),
            locale: "en".to_string(),
            phase: String::new(),
        }
    }
}

/// 各區段可辨識的鍵，未知鍵一律拒絕
const SECTIONS: &[(&str, &[&str])] = &[
    ("parser", &["sheet_name", "header_row", "required_columns"]),
    ("converter", &["indent", "date_format"]),
    ("api", &["application_name", "form_name", "locale", "phase"]),
];

impl AppConfig {
    /// 從 JSON 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ConvertError::IoError)?;
        Self::from_json_str(&content)
    }

    /// 從 JSON 字串解析設定
    pub fn from_json_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let raw: serde_json::Value =
            serde_json::from_str(&processed_content).map_err(|e| ConvertError::ConfigError {
                message: format!("config file is not valid JSON: {}", e),
            })?;

        Self::reject_unknown_keys(&raw)?;

        serde_json::from_value(raw).map_err(|e| ConvertError::ConfigError {
            message: format!("config file has an invalid structure: {}", e),
        })
    }

    /// 替換環境變數（例如 ${API_KEY}），未定義的變數原樣保留
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// 未知的區段或鍵會先逐一警告再拒絕整份設定
    fn reject_unknown_keys(raw: &serde_json::Value) -> Result<()> {
        let root = match raw.as_object() {
            Some(root) => root,
            None => {
                return Err(ConvertError::ConfigError {
                    message: "config file must contain a JSON object".to_string(),
                })
            }
        };

        let mut unknown = Vec::new();

        for (section_name, value) in root {
            match SECTIONS.iter().find(|(name, _)| name == section_name) {
                Some((_, recognized)) => {
                    if let Some(section) = value.as_object() {
                        for key in section.keys() {
                            if !recognized.contains(&key.as_str()) {
                                tracing::warn!(
                                    "Unrecognized key '{}' in config section '{}'",
                                    key,
                                    section_name
                                );
                                unknown.push(format!("{}.{}", section_name, key));
                            }
                        }
                    }
                }
                None => {
                    tracing::warn!("Unrecognized config section '{}'", section_name);
                    unknown.push(section_name.clone());
                }
            }
        }

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(ConvertError::ConfigError {
                message: format!("unrecognized config keys: {}", unknown.join(", ")),
            })
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("api.application_name", &self.api.application_name)?;
        validate_non_empty_string("api.form_name", &self.api.form_name)?;
        validate_non_empty_string("converter.date_format", &self.converter.date_format)?;
        Ok(())
    }
}
