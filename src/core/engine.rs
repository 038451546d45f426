use crate::adapters::row_source_for;
use crate::config::{AppConfig, CliConfig};
use crate::core::api_transformer::ApiTransformer;
use crate::core::curl_generator::CurlGenerator;
use crate::core::field_mapper::FieldMapper;
use crate::core::json_converter::JsonConverter;
use crate::domain::model::{CallSpec, FlatRecord, MappedRecord, Sheet};
use crate::utils::error::{ConvertError, Result};
use std::path::Path;

/// 驅動 Row Source → Field Mapper → {JSON Converter, API Transformer → Call Generator}
pub struct ConversionEngine {
    cli: CliConfig,
    config: AppConfig,
}

/// 一次執行的結果摘要
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub records: usize,
    pub documents: usize,
    pub calls: usize,
    pub outputs: Vec<String>,
}

impl ConversionEngine {
    pub fn new(cli: CliConfig, config: AppConfig) -> Self {
        Self { cli, config }
    }

    pub fn run(&self) -> Result<RunSummary> {
        // Extract
        let excel = self
            .cli
            .excel
            .as_ref()
            .ok_or_else(|| ConvertError::MissingConfigError {
                field: "excel".to_string(),
            })?;
        let input_path = Path::new(excel);

        tracing::info!("Extracting rows from: {}", excel);
        let source = row_source_for(input_path, self.config.parser.clone())?;
        let sheets = source.parse(input_path, self.cli.sheet.as_deref())?;
        let record_count: usize = sheets.iter().map(|s| s.rows.len()).sum();
        tracing::info!(
            "Extracted {} records from {} sheets",
            record_count,
            sheets.len()
        );

        // Map
        let mapper = match &self.cli.mapping {
            Some(path) => FieldMapper::from_file(path, self.cli.unmapped_policy())?,
            None => FieldMapper::empty(self.cli.unmapped_policy()),
        };
        let mapped_sheets: Vec<(String, Vec<MappedRecord>)> = sheets
            .iter()
            .map(|sheet| (sheet.name.clone(), mapper.apply(&sheet.rows)))
            .collect();

        // 所有輸出文字先完整渲染，確定成功才寫檔
        let converter = JsonConverter::new(&self.config.converter);
        let flat_sheets = flatten_for_json(&mapped_sheets);
        let json_text = converter.to_json_string(&converter.sheets_to_value(&flat_sheets))?;

        let mut summary = RunSummary {
            records: record_count,
            ..RunSummary::default()
        };

        let specs = if self.cli.generate_api_calls {
            Some(self.generate_calls(&mapped_sheets, &mut summary)?)
        } else {
            None
        };

        // Load
        let output = self
            .cli
            .output
            .as_ref()
            .ok_or_else(|| ConvertError::MissingConfigError {
                field: "output".to_string(),
            })?;
        converter.save(&json_text, output)?;
        summary.outputs.push(output.clone());

        if let Some(specs) = specs {
            match &self.cli.output_curl {
                Some(curl_path) => {
                    CurlGenerator::save_script(&specs, curl_path)?;
                    if !specs.is_empty() {
                        summary.outputs.push(curl_path.clone());
                    }
                }
                None => {
                    // 沒有指定路徑就印到標準輸出
                    print!("{}", CurlGenerator::render_script(&specs));
                }
            }
        }

        Ok(summary)
    }

    fn generate_calls(
        &self,
        mapped_sheets: &[(String, Vec<MappedRecord>)],
        summary: &mut RunSummary,
    ) -> Result<Vec<CallSpec>> {
        // API 模式處理單一工作表：指定者優先，否則取第一張
        let records = mapped_sheets
            .first()
            .map(|(_, rows)| rows.as_slice())
            .unwrap_or(&[]);

        let transformer = ApiTransformer::new(self.config.api.clone())
            .with_date_format(&self.config.converter.date_format);
        let envelope = transformer.transform(records)?;
        summary.documents = envelope.documents.len();

        let endpoint =
            self.cli
                .api_endpoint
                .as_ref()
                .ok_or_else(|| ConvertError::MissingConfigError {
                    field: "api_endpoint".to_string(),
                })?;
        let generator = CurlGenerator::new(endpoint, self.cli.basic_auth())?;
        let specs = generator.generate(&envelope, self.cli.batching())?;
        summary.calls = specs.len();
        Ok(specs)
    }
}

/// JSON 輸出需要唯一鍵，映射出的重複鍵以最後一個值為準
fn flatten_for_json(mapped_sheets: &[(String, Vec<MappedRecord>)]) -> Vec<Sheet> {
    mapped_sheets
        .iter()
        .map(|(name, rows)| Sheet {
            name: name.clone(),
            rows: rows
                .iter()
                .map(|record| record.iter().cloned().collect::<FlatRecord>())
                .collect(),
        })
        .collect()
}
