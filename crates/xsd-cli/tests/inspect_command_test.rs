use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::NamedTempFile;

fn cargo_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_xsd"))
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn testdata_path(path: &str) -> PathBuf {
    repo_root().join("testdata").join("xsd").join(path)
}

fn run_xsd(args: &[&str]) -> Output {
    Command::new(cargo_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("xsd should execute")
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn assert_exit_code(output: &Output, expected: i32) {
    let actual = output.status.code().unwrap_or(-1);
    assert_eq!(
        actual,
        expected,
        "unexpected exit code; stdout: {}; stderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn inspect_prints_text_listing() {
    let input = path_arg(&testdata_path("library.xsd"));
    let output = run_xsd(&["inspect", &input]);

    assert_exit_code(&output, 0);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Types (8):"));
    assert!(stdout.contains("ComplexType {urn:example:library}Book : {urn:example:library}Publication"));
    assert!(stdout.contains("author: {urn:example:library}Person [1..unbounded]"));
    assert!(stdout.contains("chapter: {urn:example:library}Section [0..50]"));
    assert!(stdout.contains("ListType {urn:example:library}Tags"));
    assert!(stdout.contains("Root elements (3):"));
    assert!(stdout.contains("{urn:example:library}extra: {http://www.w3.org/2001/XMLSchema}anyType [1..1]"));
}

#[test]
fn inspect_prints_json_summary() {
    let input = path_arg(&testdata_path("library.xsd"));
    let output = run_xsd(&["inspect", &input, "--format", "json"]);

    assert_exit_code(&output, 0);

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(summary["types"].as_array().unwrap().len(), 8);
    assert_eq!(summary["root_elements"][1]["name"], "{urn:example:library}book");
    assert_eq!(summary["root_elements"][1]["type_name"], "{urn:example:library}Book");

    let compact = String::from_utf8_lossy(&output.stdout);
    assert_eq!(compact.trim_end().lines().count(), 1);
}

#[test]
fn inspect_pretty_json_spans_lines() {
    let input = path_arg(&testdata_path("library.xsd"));
    let output = run_xsd(&["inspect", &input, "--format", "json", "--pretty"]);

    assert_exit_code(&output, 0);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().count() > 1);
    assert!(stdout.contains("\"kind\": \"ComplexType\""));
}

#[test]
fn inspect_embedded_wsdl_schema() {
    let input = path_arg(&testdata_path("weather.wsdl"));
    let output = run_xsd(&["inspect", &input, "--embedded"]);

    assert_exit_code(&output, 0);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ComplexType {urn:example:weather}Forecast"));
    assert!(stdout.contains("day: {urn:example:weather}Day [1..7]"));
}

#[test]
fn inspect_with_config_disabling_validation() {
    let mut schema = NamedTempFile::new().expect("temporary schema should be created");
    schema
        .write_all(
            br#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:tmp">
  <xs:element name="item" type="xs:string" colour="red"/>
</xs:schema>"#,
        )
        .unwrap();
    let mut config = NamedTempFile::new().expect("temporary config should be created");
    writeln!(config, "validate_structure: false").unwrap();

    let input = path_arg(schema.path());
    let strict = run_xsd(&["inspect", &input]);
    assert_exit_code(&strict, 1);
    assert!(String::from_utf8_lossy(&strict.stderr).contains("Attribute 'colour' is not allowed"));

    let config_path = path_arg(config.path());
    let lenient = run_xsd(&["--config", &config_path, "inspect", &input]);
    assert_exit_code(&lenient, 0);
    assert!(String::from_utf8_lossy(&lenient.stdout).contains("{urn:tmp}item: {http://www.w3.org/2001/XMLSchema}string [1..1]"));

    let flag = run_xsd(&["inspect", &input, "--no-validate"]);
    assert_exit_code(&flag, 0);
}

#[test]
fn inspect_rejects_unknown_format() {
    let input = path_arg(&testdata_path("library.xsd"));
    let output = run_xsd(&["inspect", &input, "--format", "xml"]);

    assert_exit_code(&output, 2);
}
