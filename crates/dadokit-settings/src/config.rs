//! Job configuration for DadoKit
//!
//! A job file describes one dado cut and the unit context it is generated
//! in. Supports JSON and TOML file formats, chosen by file extension.
//!
//! Configuration is organized into sections:
//! - Context settings (working unit, positioning mode)
//! - Joint settings (the six joint dimensions, each with its own unit)

use crate::error::{ConfigError, SettingsError, SettingsResult};
use dadokit_camtools::{DadoParameters, ParameterError};
use dadokit_core::{convert_named, Positioning, Quantity, Unit, UnitContext};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Working unit context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    /// Unit the joint dimensions are normalised to
    pub unit: Unit,
    /// Positioning mode in effect outside the cut
    pub positioning: Positioning,
}

/// A dimension as written in a job file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSetting {
    pub amount: f64,
    /// Unit name, e.g. "mm" or "in"
    pub unit: String,
}

impl DimensionSetting {
    pub fn new(amount: f64, unit: impl Into<String>) -> Self {
        Self {
            amount,
            unit: unit.into(),
        }
    }

    /// Resolve to a quantity in `working_unit`
    pub fn to_quantity(&self, working_unit: Unit) -> SettingsResult<Quantity> {
        let amount = convert_named(&self.unit, self.amount, working_unit)?;
        Ok(Quantity::new(working_unit, amount))
    }
}

impl From<Quantity> for DimensionSetting {
    fn from(q: Quantity) -> Self {
        Self::new(q.amount, q.unit.label())
    }
}

/// Joint dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointSettings {
    pub plate_thickness: DimensionSetting,
    pub retract_height: DimensionSetting,
    pub stock_thickness: DimensionSetting,
    pub cutter_diameter: DimensionSetting,
    pub work_offset_x: DimensionSetting,
    pub pass_length: DimensionSetting,
}

impl Default for JointSettings {
    fn default() -> Self {
        Self::from(DadoParameters::default())
    }
}

impl From<DadoParameters> for JointSettings {
    fn from(p: DadoParameters) -> Self {
        Self {
            plate_thickness: p.plate_thickness.into(),
            retract_height: p.retract_height.into(),
            stock_thickness: p.stock_thickness.into(),
            cutter_diameter: p.cutter_diameter.into(),
            work_offset_x: p.work_offset_x.into(),
            pass_length: p.pass_length.into(),
        }
    }
}

impl JointSettings {
    /// Resolve every dimension to `working_unit`
    pub fn to_parameters(&self, working_unit: Unit) -> SettingsResult<DadoParameters> {
        Ok(DadoParameters {
            plate_thickness: self.plate_thickness.to_quantity(working_unit)?,
            retract_height: self.retract_height.to_quantity(working_unit)?,
            stock_thickness: self.stock_thickness.to_quantity(working_unit)?,
            cutter_diameter: self.cutter_diameter.to_quantity(working_unit)?,
            work_offset_x: self.work_offset_x.to_quantity(working_unit)?,
            pass_length: self.pass_length.to_quantity(working_unit)?,
        })
    }
}

/// Complete job configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub context: ContextSettings,
    pub joint: JointSettings,
}

impl JobConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!(path = %path.display(), "loaded job config");
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content)?;
        debug!(path = %path.display(), "saved job config");
        Ok(())
    }

    /// Validate configuration
    ///
    /// Warns when the working unit is not millimeters: the cut is emitted
    /// inside a millimeter mode block while its numbers are in the working
    /// unit.
    pub fn validate(&self) -> SettingsResult<()> {
        if self.has_unit_mode_mismatch() {
            warn!(
                unit = %self.context.unit,
                "cut coordinates are written in the working unit inside a millimeter mode block"
            );
        }

        let params = self.dado_parameters()?;
        params.validate().map_err(|e| match e {
            ParameterError::InvalidValue { name, reason } => SettingsError::InvalidSetting {
                key: format!("joint.{}", name),
                reason,
            },
        })
    }

    /// True when the working unit differs from the millimeter mode the cut
    /// is emitted in
    pub fn has_unit_mode_mismatch(&self) -> bool {
        self.context.unit != Unit::Millimeter
    }

    /// Joint parameters normalised to the working unit
    pub fn dado_parameters(&self) -> SettingsResult<DadoParameters> {
        self.joint.to_parameters(self.context.unit)
    }

    /// Fresh unit context for generating this job
    pub fn unit_context(&self) -> UnitContext {
        UnitContext::new(self.context.unit, self.context.positioning)
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )
            .into()),
        }
    }
}

/// Default job file location (`<config dir>/dadokit/job.toml`)
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("dadokit").join("job.toml"))
        .ok_or_else(|| ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_reference_job() {
        let config = JobConfig::default();
        assert_eq!(config.context.unit, Unit::Millimeter);
        assert_eq!(config.joint.stock_thickness, DimensionSetting::new(0.5, "in"));

        let params = config.dado_parameters().unwrap();
        assert_eq!(params.stock_thickness, Quantity::mm(12.7));
        assert_eq!(params.plate_thickness, Quantity::mm(4.2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_unit_rejected() {
        let mut config = JobConfig::default();
        config.joint.pass_length = DimensionSetting::new(1.0, "furlong");

        match config.validate().unwrap_err() {
            SettingsError::Unit(err) => {
                assert_eq!(
                    err.to_string(),
                    "Unrecognized conversion of 1 furlong to mm"
                );
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_invalid_dimension_reports_key() {
        let mut config = JobConfig::default();
        config.joint.cutter_diameter = DimensionSetting::new(-3.0, "mm");

        match config.validate().unwrap_err() {
            SettingsError::InvalidSetting { key, .. } => {
                assert_eq!(key, "joint.cutter_diameter");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_inch_context() {
        let mut config = JobConfig::default();
        config.context.unit = Unit::Inch;
        let params = config.dado_parameters().unwrap();
        assert_eq!(params.stock_thickness, Quantity::inches(0.5));
        assert_eq!(config.unit_context().unit(), Unit::Inch);
    }

    #[test]
    fn test_inch_context_flagged_but_valid() {
        let mut config = JobConfig::default();
        assert!(!config.has_unit_mode_mismatch());

        config.context.unit = Unit::Inch;
        assert!(config.has_unit_mode_mismatch());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = JobConfig::default()
            .save_to_file(Path::new("job.yaml"))
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Config(ConfigError::UnsupportedFormat(_))
        ));
    }
}
