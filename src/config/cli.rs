use crate::domain::model::{BasicAuth, BatchingMode, UnmappedPolicy};
use crate::utils::error::{ConvertError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_path, validate_required_field, validate_url, Validate,
};
use clap::Parser;

pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "csv"];

#[derive(Debug, Clone, Parser)]
#[command(name = "excel-to-api")]
#[command(about = "Convert Excel/CSV data to JSON and ready-to-run form API calls")]
pub struct CliConfig {
    /// Path to the Excel or CSV input file
    #[arg(long, short = 'e')]
    pub excel: Option<String>,

    /// Path to save the JSON output
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Name of the sheet to process (default: all sheets)
    #[arg(long, short = 's')]
    pub sheet: Option<String>,

    /// Path to the JSON configuration file
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Path to the field mapping file (flat JSON object)
    #[arg(long, short = 'm')]
    pub mapping: Option<String>,

    /// Target API endpoint for generated calls
    #[arg(long)]
    pub api_endpoint: Option<String>,

    /// Basic auth username
    #[arg(long)]
    pub username: Option<String>,

    /// Basic auth password
    #[arg(long)]
    pub password: Option<String>,

    /// Path to save the generated curl script (stdout when omitted)
    #[arg(long)]
    pub output_curl: Option<String>,

    /// Also generate an API call script from the converted data
    #[arg(long)]
    pub generate_api_calls: bool,

    /// Wrap each Document in its own API call instead of one batch
    #[arg(long)]
    pub per_document: bool,

    /// Drop columns without a mapping entry instead of passing them through
    #[arg(long)]
    pub drop_unmapped: bool,

    /// Prompt for missing values interactively
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl CliConfig {
    pub fn batching(&self) -> BatchingMode {
        if self.per_document {
            BatchingMode::PerDocument
        } else {
            BatchingMode::SingleBatch
        }
    }

    pub fn unmapped_policy(&self) -> UnmappedPolicy {
        if self.drop_unmapped {
            UnmappedPolicy::Drop
        } else {
            UnmappedPolicy::Pass
        }
    }

    pub fn basic_auth(&self) -> Option<BasicAuth> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(BasicAuth {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }

    /// 互動模式：補齊缺少的必要參數
    pub fn fill_interactive(&mut self) -> Result<()> {
        use dialoguer::{Input, Password};

        if self.excel.is_none() {
            let value: String = Input::new()
                .with_prompt("Path to the Excel/CSV file")
                .interact_text()
                .map_err(prompt_error)?;
            self.excel = Some(value);
        }

        if self.output.is_none() {
            let value: String = Input::new()
                .with_prompt("Path for the JSON output")
                .default("output.json".to_string())
                .interact_text()
                .map_err(prompt_error)?;
            self.output = Some(value);
        }

        if self.generate_api_calls {
            if self.api_endpoint.is_none() {
                let value: String = Input::new()
                    .with_prompt("API endpoint URL")
                    .interact_text()
                    .map_err(prompt_error)?;
                self.api_endpoint = Some(value);
            }

            // 空白使用者名稱表示不加認證標頭
            if self.username.is_none() {
                let username: String = Input::new()
                    .with_prompt("Basic auth username (leave empty for none)")
                    .allow_empty(true)
                    .interact_text()
                    .map_err(prompt_error)?;

                if !username.is_empty() {
                    let password = Password::new()
                        .with_prompt("Basic auth password")
                        .interact()
                        .map_err(prompt_error)?;
                    self.username = Some(username);
                    self.password = Some(password);
                }
            }
        }

        Ok(())
    }
}

fn prompt_error(e: dialoguer::Error) -> ConvertError {
    ConvertError::IoError(std::io::Error::new(
        std::io::ErrorKind::Other,
        e.to_string(),
    ))
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let excel = validate_required_field("excel", &self.excel)?;
        validate_path("excel", excel)?;
        validate_file_extension("excel", excel, SUPPORTED_INPUT_EXTENSIONS)?;

        let output = validate_required_field("output", &self.output)?;
        validate_path("output", output)?;

        if self.generate_api_calls {
            let endpoint = validate_required_field("api_endpoint", &self.api_endpoint)?;
            validate_url("api_endpoint", endpoint)?;

            if let Some(output_curl) = &self.output_curl {
                validate_path("output_curl", output_curl)?;
            }
        }

        if self.password.is_some() && self.username.is_none() {
            return Err(ConvertError::MissingConfigError {
                field: "username".to_string(),
            });
        }

        Ok(())
    }
}
