use crate::domain::model::{ApiEnvelope, BasicAuth, BatchingMode, CallSpec};
use crate::utils::error::{ConvertError, Result};
use crate::utils::validation::validate_url;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::path::Path;

/// 把 ApiEnvelope 渲染成可直接執行的 curl 指令
#[derive(Debug, Clone)]
pub struct CurlGenerator {
    endpoint: String,
    auth: Option<BasicAuth>,
}

impl CurlGenerator {
    /// 端點必須是絕對的 http(s) URL，否則在產生任何 CallSpec 前就失敗
    pub fn new(endpoint: &str, auth: Option<BasicAuth>) -> Result<Self> {
        validate_url("api_endpoint", endpoint)
            .map_err(|e| ConvertError::generation(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            auth,
        })
    }

    /// 空 envelope 不是錯誤，回傳零個 CallSpec
    pub fn generate(
        &self,
        envelope: &ApiEnvelope,
        batching: BatchingMode,
    ) -> Result<Vec<CallSpec>> {
        if envelope.documents.is_empty() {
            tracing::warn!("No documents found in transformed data");
            return Ok(Vec::new());
        }

        let specs = match batching {
            BatchingMode::SingleBatch => vec![self.build_call(envelope)?],
            BatchingMode::PerDocument => envelope
                .documents
                .iter()
                .map(|document| {
                    self.build_call(&ApiEnvelope {
                        documents: vec![document.clone()],
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        };

        tracing::info!("Generated {} curl commands", specs.len());
        Ok(specs)
    }

    fn build_call(&self, envelope: &ApiEnvelope) -> Result<CallSpec> {
        let body = serde_json::to_string(envelope)?;

        let mut headers = vec![(
            "Content-Type".to_string(),
            "application/json".to_string(),
        )];
        if let Some(auth) = &self.auth {
            // 憑證每個 CallSpec 重新編碼一次
            let encoded = BASE64.encode(format!("{}:{}", auth.username, auth.password));
            headers.push(("Authorization".to_string(), format!("Basic {}", encoded)));
        }

        Ok(CallSpec {
            url: self.endpoint.clone(),
            method: "POST".to_string(),
            headers,
            body,
        })
    }

    /// 單行指令；JSON 本體以單引號包住並跳脫內含的單引號
    pub fn render_command(spec: &CallSpec) -> String {
        let mut parts = vec![format!("curl -X {} \"{}\"", spec.method, spec.url)];
        for (name, value) in &spec.headers {
            parts.push(format!("-H \"{}: {}\"", name, value));
        }
        parts.push(format!("-d '{}'", shell_escape_single_quoted(&spec.body)));
        parts.join(" ")
    }

    pub fn render_script(specs: &[CallSpec]) -> String {
        let mut script = String::from("#!/bin/bash\n# Generated API calls\n\n");
        for (i, spec) in specs.iter().enumerate() {
            script.push_str(&format!("# API Call {}\n", i + 1));
            script.push_str(&Self::render_command(spec));
            script.push_str("\n\n");
        }
        script
    }

    /// 存成可執行的 shell script；沒有指令時不建立檔案
    pub fn save_script<P: AsRef<Path>>(specs: &[CallSpec], output_path: P) -> Result<()> {
        if specs.is_empty() {
            tracing::warn!("No commands to save");
            return Ok(());
        }

        let output_path = output_path.as_ref();
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        tracing::info!("Saving curl commands to: {}", output_path.display());
        std::fs::write(output_path, Self::render_script(specs))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(output_path, std::fs::Permissions::from_mode(0o755))?;
        }

        tracing::info!(
            "Successfully saved {} curl commands to {}",
            specs.len(),
            output_path.display()
        );
        Ok(())
    }
}

fn shell_escape_single_quoted(s: &str) -> String {
    s.replace('\'', "'\\''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Document, FieldEntry};

    fn document(name: &str) -> Document {
        Document {
            application_name: "ENGINE".to_string(),
            form_name: "ENGINE_FIELD_SETTINGS".to_string(),
            phase: "".to_string(),
            locale: "en".to_string(),
            fields: vec![FieldEntry {
                field_name: "ENGINE_FIELD_NAME".to_string(),
                values: vec![name.to_string()],
            }],
        }
    }

    fn envelope(names: &[&str]) -> ApiEnvelope {
        ApiEnvelope {
            documents: names.iter().map(|n| document(n)).collect(),
        }
    }

    #[test]
    fn test_invalid_endpoint_fails_before_any_call_spec() {
        let err = CurlGenerator::new("api.example.com/endpoint", None).unwrap_err();
        assert!(matches!(err, ConvertError::GenerationError { .. }));
        assert!(CurlGenerator::new("ftp://example.com", None).is_err());
    }

    #[test]
    fn test_empty_envelope_yields_zero_commands() {
        let generator = CurlGenerator::new("https://api.example.com/endpoint", None).unwrap();
        let specs = generator
            .generate(&ApiEnvelope::default(), BatchingMode::PerDocument)
            .unwrap();
        assert!(specs.is_empty());

        let specs = generator
            .generate(&ApiEnvelope::default(), BatchingMode::SingleBatch)
            .unwrap();
        assert!(specs.is_empty());
    }

    #[test]
    fn test_single_batch_puts_all_documents_in_one_call() {
        let generator = CurlGenerator::new("https://api.example.com/endpoint", None).unwrap();
        let specs = generator
            .generate(&envelope(&["A", "B", "C"]), BatchingMode::SingleBatch)
            .unwrap();

        assert_eq!(specs.len(), 1);
        let body: ApiEnvelope = serde_json::from_str(&specs[0].body).unwrap();
        assert_eq!(body.documents.len(), 3);
    }

    #[test]
    fn test_batching_equivalence() {
        // perDocument 各呼叫的 Document 串起來必須重建 singleBatch 的內容，順序不變
        let generator = CurlGenerator::new("https://api.example.com/endpoint", None).unwrap();
        let input = envelope(&["A", "B", "C"]);

        let batch = generator
            .generate(&input, BatchingMode::SingleBatch)
            .unwrap();
        let per_doc = generator
            .generate(&input, BatchingMode::PerDocument)
            .unwrap();

        assert_eq!(per_doc.len(), 3);
        let batch_docs: ApiEnvelope = serde_json::from_str(&batch[0].body).unwrap();
        let mut reassembled = Vec::new();
        for spec in &per_doc {
            let envelope: ApiEnvelope = serde_json::from_str(&spec.body).unwrap();
            assert_eq!(envelope.documents.len(), 1);
            reassembled.extend(envelope.documents);
        }
        assert_eq!(reassembled, batch_docs.documents);
    }

    #[test]
    fn test_basic_auth_header_encoding() {
        let auth = BasicAuth {
            username: "admin".to_string(),
            password: "secret".to_string(),
        };
        let generator =
            CurlGenerator::new("https://api.example.com/endpoint", Some(auth)).unwrap();
        let specs = generator
            .generate(&envelope(&["A"]), BatchingMode::SingleBatch)
            .unwrap();

        let auth_header = specs[0]
            .headers
            .iter()
            .find(|(name, _)| name == "Authorization")
            .unwrap();
        assert_eq!(auth_header.1, "Basic YWRtaW46c2VjcmV0");
    }

    #[test]
    fn test_no_auth_header_without_credentials() {
        let generator = CurlGenerator::new("https://api.example.com/endpoint", None).unwrap();
        let specs = generator
            .generate(&envelope(&["A"]), BatchingMode::SingleBatch)
            .unwrap();
        assert!(specs[0].headers.iter().all(|(name, _)| name != "Authorization"));
    }

    #[test]
    fn test_render_command_is_single_line() {
        let generator = CurlGenerator::new("https://api.example.com/endpoint", None).unwrap();
        let specs = generator
            .generate(&envelope(&["A"]), BatchingMode::SingleBatch)
            .unwrap();

        let command = CurlGenerator::render_command(&specs[0]);
        assert!(!command.contains('\n'));
        assert!(command.starts_with("curl -X POST \"https://api.example.com/endpoint\""));
        assert!(command.contains("-H \"Content-Type: application/json\""));
        assert!(command.contains("-d '{"));
    }

    #[test]
    fn test_body_single_quotes_are_escaped() {
        let generator = CurlGenerator::new("https://api.example.com/endpoint", None).unwrap();
        let mut input = envelope(&["it's"]);
        input.documents[0].fields[0].values = vec!["O'Brien".to_string()];

        let specs = generator
            .generate(&input, BatchingMode::SingleBatch)
            .unwrap();
        let command = CurlGenerator::render_command(&specs[0]);
        assert!(command.contains("O'\\''Brien"));
    }

    #[test]
    fn test_render_script_header_and_numbering() {
        let generator = CurlGenerator::new("https://api.example.com/endpoint", None).unwrap();
        let specs = generator
            .generate(&envelope(&["A", "B"]), BatchingMode::PerDocument)
            .unwrap();

        let script = CurlGenerator::render_script(&specs);
        assert!(script.starts_with("#!/bin/bash\n# Generated API calls\n"));
        assert!(script.contains("# API Call 1\n"));
        assert!(script.contains("# API Call 2\n"));
    }

    #[test]
    fn test_save_script_writes_executable_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("calls").join("api_calls.sh");

        let generator = CurlGenerator::new("https://api.example.com/endpoint", None).unwrap();
        let specs = generator
            .generate(&envelope(&["A"]), BatchingMode::SingleBatch)
            .unwrap();
        CurlGenerator::save_script(&specs, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("#!/bin/bash"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn test_save_script_with_no_commands_creates_no_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("api_calls.sh");

        CurlGenerator::save_script(&[], &path).unwrap();
        assert!(!path.exists());
    }
}
