use dadokit_core::{Positioning, Quantity, Unit};
use dadokit_settings::{DimensionSetting, JobConfig, SettingsError};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_toml_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("job.toml");

    let mut config = JobConfig::default();
    config.joint.work_offset_x = DimensionSetting::new(35.0, "mm");
    config.save_to_file(&path).unwrap();

    let loaded = JobConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("job.json");

    let mut config = JobConfig::default();
    config.context.positioning = Positioning::Relative;
    config.save_to_file(&path).unwrap();

    let loaded = JobConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded.context.positioning, Positioning::Relative);
    assert_eq!(loaded, config);
}

#[test]
fn test_handwritten_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shelf.toml");
    fs::write(
        &path,
        r#"
[joint]
plate_thickness = { amount = 4.2, unit = "mm" }
retract_height = { amount = 5, unit = "mm" }
stock_thickness = { amount = 0.75, unit = "inch" }
cutter_diameter = { amount = 0.25, unit = "in" }
work_offset_x = { amount = 20, unit = "mm" }
pass_length = { amount = 11.25, unit = "inches" }
"#,
    )
    .unwrap();

    let config = JobConfig::load_from_file(&path).unwrap();
    assert_eq!(config.context.unit, Unit::Millimeter);

    let params = config.dado_parameters().unwrap();
    assert_eq!(params.cutter_diameter, Quantity::mm(0.25 * 25.4));
    assert_eq!(params.retract_height, Quantity::mm(5.0));
}

#[test]
fn test_load_rejects_unknown_unit() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(
        &path,
        r#"{
  "joint": {
    "plate_thickness": {"amount": 4.2, "unit": "mm"},
    "retract_height": {"amount": 5.0, "unit": "mm"},
    "stock_thickness": {"amount": 0.5, "unit": "in"},
    "cutter_diameter": {"amount": 0.125, "unit": "in"},
    "work_offset_x": {"amount": 20.0, "unit": "mm"},
    "pass_length": {"amount": 1.0, "unit": "furlong"}
  }
}"#,
    )
    .unwrap();

    let err = JobConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::Unit(_)));
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().unwrap();
    let err = JobConfig::load_from_file(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, SettingsError::IoError(_)));
}
