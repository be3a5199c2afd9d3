use std::path::PathBuf;
use std::process::{Command, Output};

fn schemacat() -> Command {
    Command::new(env!("CARGO_BIN_EXE_schemacat"))
}

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("testdata")
        .join(name)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_analyze_exports_markdown() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let out = dir.path().join("reports").join("catalog.md");

    let output = schemacat()
        .arg("analyze")
        .arg(testdata("pain001_sample.xsd"))
        .args(["--format", "md", "--detailed", "--output"])
        .arg(&out)
        .output()
        .expect("schemacat analyze should execute");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Total fields:"));
    assert!(text.contains("Sample mandatory fields"));
    assert!(text.contains("Results exported to:"));

    let written = std::fs::read_to_string(&out).expect("markdown catalog should exist");
    assert!(written.contains("Field Catalog"));
    assert!(written.contains("| MsgId |"));
}

#[test]
fn test_analyze_rejects_unknown_format() {
    let output = schemacat()
        .arg("analyze")
        .arg(testdata("pain001_sample.xsd"))
        .args(["--format", "xls"])
        .output()
        .expect("schemacat analyze should execute");

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Supported: csv, json, markdown"));
}

#[test]
fn test_compare_json_report() {
    let output = schemacat()
        .arg("compare")
        .arg(testdata("pain001_sample.xsd"))
        .arg(testdata("pain001_sample.avsc"))
        .arg("--json")
        .output()
        .expect("schemacat compare should execute");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("report should be JSON");
    assert_eq!(report["matched"], 15);
    assert_eq!(report["sourceOnlyCount"], 7);
    assert_eq!(report["targetOnlyCount"], 1);
    assert_eq!(report["semanticUsed"], false);
    assert_eq!(report["matches"].as_array().map(Vec::len), Some(15));
}

#[test]
fn test_convert_to_avro_with_namespace() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let out = dir.path().join("payment.avsc");

    let output = schemacat()
        .arg("convert")
        .arg(testdata("pain001_sample.xsd"))
        .args(["--to", "avro", "--namespace", "com.bank.payments", "--output"])
        .arg(&out)
        .output()
        .expect("schemacat convert should execute");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let written = std::fs::read_to_string(&out).expect("avro schema should exist");
    let schema: serde_json::Value = serde_json::from_str(&written).expect("schema should be JSON");
    let text = schema.to_string();
    assert!(text.contains("\"record\""));
    assert!(text.contains("com.bank.payments"));
}

#[test]
fn test_convert_to_json_schema_on_stdout() {
    let output = schemacat()
        .arg("convert")
        .arg(testdata("pain001_sample.xsd"))
        .args(["--to", "json"])
        .output()
        .expect("schemacat convert should execute");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let schema: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("schema should be JSON");
    assert!(schema.get("$schema").is_some());
}

#[test]
fn test_convert_rejects_record_schema() {
    let output = schemacat()
        .arg("convert")
        .arg(testdata("pain001_sample.avsc"))
        .args(["--to", "json"])
        .output()
        .expect("schemacat convert should execute");

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("is not an XML Schema"));
}

#[test]
fn test_validate_valid_message() {
    let output = schemacat()
        .arg("validate")
        .arg(testdata("pain001_valid.xml"))
        .arg("--schema")
        .arg(testdata("pain001_sample.xsd"))
        .output()
        .expect("schemacat validate should execute");

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Message is VALID"));
}

#[test]
fn test_validate_invalid_message() {
    let output = schemacat()
        .arg("validate")
        .arg(testdata("pain001_invalid.xml"))
        .arg("--schema")
        .arg(testdata("pain001_sample.xsd"))
        .output()
        .expect("schemacat validate should execute");

    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("Message is INVALID"));
    assert!(text.contains("Errors (4):"));
    assert!(text.contains("Missing mandatory field: @Ccy"));
}

#[test]
fn test_validate_missing_message_is_fatal() {
    let output = schemacat()
        .arg("validate")
        .arg(testdata("no_such_message.xml"))
        .arg("--schema")
        .arg(testdata("pain001_sample.xsd"))
        .output()
        .expect("schemacat validate should execute");

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).starts_with("Error:"));
}

#[test]
fn test_config_file_overrides_namespace() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let config = dir.path().join("schemacat.yaml");
    std::fs::write(&config, "avro_namespace: org.configured\n").expect("config should be written");

    let output = schemacat()
        .arg("--config")
        .arg(&config)
        .arg("convert")
        .arg(testdata("pain001_sample.xsd"))
        .args(["--to", "avro"])
        .output()
        .expect("schemacat convert should execute");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("org.configured"));
}
