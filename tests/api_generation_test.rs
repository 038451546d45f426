use anyhow::Result;
use clap::Parser;
use excel_to_api::{AppConfig, CliConfig, ConversionEngine};
use tempfile::TempDir;

fn write_fields_csv(dir: &TempDir) -> Result<std::path::PathBuf> {
    let path = dir.path().join("fields.csv");
    std::fs::write(
        &path,
        "field_id,display_name,field_type,required\n\
         F001,Customer Name,text,true\n\
         F002,Order Total,number,false\n",
    )?;
    Ok(path)
}

fn write_mapping(dir: &TempDir) -> Result<std::path::PathBuf> {
    let path = dir.path().join("mapping.json");
    std::fs::write(
        &path,
        r#"{
            "field_id": "ENGINE_FIELD_ID",
            "display_name": "ENGINE_FIELD_NAME",
            "field_type": "ENGINE_FIELD_TYPE"
        }"#,
    )?;
    Ok(path)
}

fn run_engine(cli: CliConfig) -> excel_to_api::Result<excel_to_api::RunSummary> {
    ConversionEngine::new(cli, AppConfig::default()).run()
}

/// 完整流程：CSV → 映射 → Document envelope → curl script
#[test]
fn test_generate_api_calls_single_batch() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let csv_path = write_fields_csv(&temp_dir)?;
    let mapping_path = write_mapping(&temp_dir)?;
    let json_path = temp_dir.path().join("output.json");
    let script_path = temp_dir.path().join("api_calls.sh");

    let cli = CliConfig::parse_from([
        "excel-to-api",
        "-e",
        csv_path.to_str().unwrap(),
        "-o",
        json_path.to_str().unwrap(),
        "-m",
        mapping_path.to_str().unwrap(),
        "--generate-api-calls",
        "--api-endpoint",
        "https://api.example.com/upsert",
        "--username",
        "admin",
        "--password",
        "secret",
        "--output-curl",
        script_path.to_str().unwrap(),
    ]);

    let summary = run_engine(cli)?;
    assert_eq!(summary.records, 2);
    assert_eq!(summary.documents, 2);
    assert_eq!(summary.calls, 1);
    assert!(summary.outputs.contains(&script_path.to_str().unwrap().to_string()));

    let script = std::fs::read_to_string(&script_path)?;
    assert!(script.starts_with("#!/bin/bash\n# Generated API calls\n"));
    assert!(script.contains("# API Call 1\n"));
    assert!(!script.contains("# API Call 2"));

    // 指令佔一行，含認證標頭
    let command = script
        .lines()
        .find(|line| line.starts_with("curl "))
        .expect("script should contain a curl command");
    assert!(command.contains("-X POST \"https://api.example.com/upsert\""));
    assert!(command.contains("-H \"Content-Type: application/json\""));
    assert!(command.contains("-H \"Authorization: Basic YWRtaW46c2VjcmV0\""));

    // JSON 本體帶預設 envelope 與映射後的欄名
    let body_start = command.find("-d '").expect("command should carry a body") + 4;
    let body = &command[body_start..command.len() - 1];
    let envelope: serde_json::Value = serde_json::from_str(body)?;
    let documents = envelope["Document"].as_array().unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["applicationName"], "ENGINE");
    assert_eq!(documents[0]["formName"], "ENGINE_FIELD_SETTINGS");
    assert_eq!(documents[0]["locale"], "en");
    assert_eq!(documents[0]["phase"], "");

    let fields = documents[0]["Fields"].as_array().unwrap();
    // pass 政策：映射三欄 + 未映射的 required 原名通過
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[0]["fieldName"], "ENGINE_FIELD_ID");
    assert_eq!(fields[0]["Values"], serde_json::json!(["F001"]));
    assert_eq!(fields[3]["fieldName"], "required");
    assert_eq!(fields[3]["Values"], serde_json::json!(["true"]));

    Ok(())
}

/// perDocument 模式：每個 Document 一個 API Call
#[test]
fn test_generate_api_calls_per_document() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let csv_path = write_fields_csv(&temp_dir)?;
    let json_path = temp_dir.path().join("output.json");
    let script_path = temp_dir.path().join("api_calls.sh");

    let cli = CliConfig::parse_from([
        "excel-to-api",
        "-e",
        csv_path.to_str().unwrap(),
        "-o",
        json_path.to_str().unwrap(),
        "--generate-api-calls",
        "--api-endpoint",
        "https://api.example.com/upsert",
        "--per-document",
        "--output-curl",
        script_path.to_str().unwrap(),
    ]);

    let summary = run_engine(cli)?;
    assert_eq!(summary.documents, 2);
    assert_eq!(summary.calls, 2);

    let script = std::fs::read_to_string(&script_path)?;
    assert!(script.contains("# API Call 1\n"));
    assert!(script.contains("# API Call 2\n"));

    // 每個指令的 envelope 恰好一個 Document
    for line in script.lines().filter(|line| line.starts_with("curl ")) {
        let body_start = line.find("-d '").unwrap() + 4;
        let envelope: serde_json::Value =
            serde_json::from_str(&line[body_start..line.len() - 1])?;
        assert_eq!(envelope["Document"].as_array().unwrap().len(), 1);
    }

    Ok(())
}

/// drop 政策：未映射欄位不出現在 Fields
#[test]
fn test_drop_unmapped_excludes_columns() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let csv_path = write_fields_csv(&temp_dir)?;
    let mapping_path = write_mapping(&temp_dir)?;
    let json_path = temp_dir.path().join("output.json");
    let script_path = temp_dir.path().join("api_calls.sh");

    let cli = CliConfig::parse_from([
        "excel-to-api",
        "-e",
        csv_path.to_str().unwrap(),
        "-o",
        json_path.to_str().unwrap(),
        "-m",
        mapping_path.to_str().unwrap(),
        "--drop-unmapped",
        "--generate-api-calls",
        "--api-endpoint",
        "https://api.example.com/upsert",
        "--output-curl",
        script_path.to_str().unwrap(),
    ]);

    run_engine(cli)?;

    let script = std::fs::read_to_string(&script_path)?;
    assert!(script.contains("ENGINE_FIELD_ID"));
    assert!(!script.contains("\"fieldName\":\"required\""));

    Ok(())
}

/// 空白儲存格輸出 Values: [""]，每個 Document 的 Fields 數量一致
#[test]
fn test_blank_cells_keep_uniform_cardinality() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let csv_path = temp_dir.path().join("sparse.csv");
    std::fs::write(&csv_path, "field_id,note\nF001,hello\nF002,\n")?;
    let json_path = temp_dir.path().join("output.json");
    let script_path = temp_dir.path().join("api_calls.sh");

    let cli = CliConfig::parse_from([
        "excel-to-api",
        "-e",
        csv_path.to_str().unwrap(),
        "-o",
        json_path.to_str().unwrap(),
        "--generate-api-calls",
        "--api-endpoint",
        "https://api.example.com/upsert",
        "--output-curl",
        script_path.to_str().unwrap(),
    ]);

    run_engine(cli)?;

    let script = std::fs::read_to_string(&script_path)?;
    let command = script.lines().find(|l| l.starts_with("curl ")).unwrap();
    let body_start = command.find("-d '").unwrap() + 4;
    let envelope: serde_json::Value =
        serde_json::from_str(&command[body_start..command.len() - 1])?;

    let documents = envelope["Document"].as_array().unwrap();
    for document in documents {
        assert_eq!(document["Fields"].as_array().unwrap().len(), 2);
    }
    assert_eq!(documents[1]["Fields"][1]["Values"], serde_json::json!([""]));

    Ok(())
}

/// 設定檔覆寫 envelope 預設值
#[test]
fn test_api_config_overrides_defaults() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let csv_path = write_fields_csv(&temp_dir)?;
    let json_path = temp_dir.path().join("output.json");
    let script_path = temp_dir.path().join("api_calls.sh");
    let config_path = temp_dir.path().join("config.json");

    std::fs::write(
        &config_path,
        r#"{
            "api": {
                "application_name": "CRM",
                "form_name": "CONTACT_FORM",
                "locale": "zh-TW",
                "phase": "draft"
            }
        }"#,
    )?;
    let config = AppConfig::from_file(&config_path)?;

    let cli = CliConfig::parse_from([
        "excel-to-api",
        "-e",
        csv_path.to_str().unwrap(),
        "-o",
        json_path.to_str().unwrap(),
        "--generate-api-calls",
        "--api-endpoint",
        "https://api.example.com/upsert",
        "--output-curl",
        script_path.to_str().unwrap(),
    ]);

    ConversionEngine::new(cli, config).run()?;

    let script = std::fs::read_to_string(&script_path)?;
    let command = script.lines().find(|l| l.starts_with("curl ")).unwrap();
    let body_start = command.find("-d '").unwrap() + 4;
    let envelope: serde_json::Value =
        serde_json::from_str(&command[body_start..command.len() - 1])?;

    assert_eq!(envelope["Document"][0]["applicationName"], "CRM");
    assert_eq!(envelope["Document"][0]["formName"], "CONTACT_FORM");
    assert_eq!(envelope["Document"][0]["locale"], "zh-TW");
    assert_eq!(envelope["Document"][0]["phase"], "draft");

    Ok(())
}

/// 沒有資料列時不產生 script 檔案，JSON 輸出照常
#[test]
fn test_empty_input_writes_json_but_no_script() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let csv_path = temp_dir.path().join("empty.csv");
    std::fs::write(&csv_path, "field_id,display_name\n")?;
    let json_path = temp_dir.path().join("output.json");
    let script_path = temp_dir.path().join("api_calls.sh");

    let cli = CliConfig::parse_from([
        "excel-to-api",
        "-e",
        csv_path.to_str().unwrap(),
        "-o",
        json_path.to_str().unwrap(),
        "--generate-api-calls",
        "--api-endpoint",
        "https://api.example.com/upsert",
        "--output-curl",
        script_path.to_str().unwrap(),
    ]);

    let summary = run_engine(cli)?;
    assert_eq!(summary.records, 0);
    assert_eq!(summary.documents, 0);
    assert_eq!(summary.calls, 0);

    assert!(json_path.exists());
    assert!(!script_path.exists());

    Ok(())
}

/// 無效端點在寫出任何檔案前失敗
#[test]
fn test_invalid_endpoint_aborts_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let csv_path = write_fields_csv(&temp_dir)?;
    let json_path = temp_dir.path().join("output.json");

    let cli = CliConfig::parse_from([
        "excel-to-api",
        "-e",
        csv_path.to_str().unwrap(),
        "-o",
        json_path.to_str().unwrap(),
        "--generate-api-calls",
        "--api-endpoint",
        "not-a-url",
    ]);

    let result = run_engine(cli);
    assert!(result.is_err());
    assert!(!json_path.exists());

    Ok(())
}
