//! Error handling tests

use carta_captable::error::CapTableError;
use std::path::PathBuf;

#[test]
fn test_missing_file_display() {
    let err = CapTableError::MissingFile(PathBuf::from("exports/carta.xlsx"));
    assert_eq!(err.to_string(), "File not found: exports/carta.xlsx");
    assert_eq!(err.kind(), "missing_file");
}

#[test]
fn test_sheet_not_found_display() {
    let err = CapTableError::SheetNotFound {
        sheet: "Detailed Cap".to_string(),
        path: PathBuf::from("export.xlsx"),
    };
    assert_eq!(err.to_string(), "Sheet 'Detailed Cap' not found in export.xlsx");
    assert_eq!(err.kind(), "sheet_not_found");
}

#[test]
fn test_format_and_write_display() {
    assert_eq!(
        CapTableError::Format("no header".to_string()).to_string(),
        "Format error: no header"
    );
    assert_eq!(
        CapTableError::Write("disk full".to_string()).to_string(),
        "Write error: disk full"
    );
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked");
    let err: CapTableError = io.into();
    assert!(matches!(err, CapTableError::Io(_)));
    assert_eq!(err.kind(), "io");
}

#[test]
fn test_yaml_error_conversion() {
    let yaml: Result<Vec<u32>, _> = serde_yaml::from_str("[1, two]");
    let err: CapTableError = yaml.unwrap_err().into();
    assert!(matches!(err, CapTableError::Config(_)));
    assert!(err.to_string().starts_with("Config error"));
}
