//! Catalog configuration module.
//!
//! Handles loading, validating, and merging the `qr-catalog.toml` file.
//! Stock defaults are serialized to a TOML table and the user file is merged
//! on top, so a config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [storage]
//! qr_dir = "qr-codes"       # Where generated PNGs are written
//! output_dir = "pdf-output" # Where the catalog PDF is written
//!
//! [qr]
//! width = 300               # Target raster width in pixels
//! margin = 2                # Quiet zone in modules
//!
//! [layout]
//! page_width = 595.28       # Physical page size in points (A4)
//! page_height = 841.89
//! margin = 30.0
//! item_size = 80.0
//! spacing = 10.0
//! caption_height = 16.0
//! title_height = 40.0
//!
//! [processing]
//! max_workers = 4           # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::layout::{self, PageGeometry};
use crate::qr::{self, QrPngEncoder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "qr-catalog.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Catalog configuration loaded from `qr-catalog.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Image and document directories.
    pub storage: StorageConfig,
    /// QR raster settings.
    pub qr: QrConfig,
    /// Catalog page geometry.
    pub layout: LayoutConfig,
    /// Parallel generation settings.
    pub processing: ProcessingConfig,
}

impl CatalogConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.qr_dir.is_empty() || self.storage.output_dir.is_empty() {
            return Err(ConfigError::Validation(
                "storage directories must not be empty".into(),
            ));
        }
        if self.qr.width == 0 {
            return Err(ConfigError::Validation("qr.width must be positive".into()));
        }
        if self.processing.max_workers == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_workers must be at least 1".into(),
            ));
        }
        layout::compute_grid(&self.layout.geometry())
            .map_err(|e| ConfigError::Validation(format!("layout: {e}")))?;
        Ok(())
    }
}

/// Storage locations, relative to the working directory unless absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub qr_dir: String,
    pub output_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            qr_dir: "qr-codes".to_string(),
            output_dir: "pdf-output".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QrConfig {
    /// Target raster width in pixels.
    pub width: u32,
    /// Quiet zone in modules on each side.
    pub margin: u32,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            width: qr::DEFAULT_WIDTH,
            margin: qr::DEFAULT_MARGIN,
        }
    }
}

impl QrConfig {
    pub fn encoder(&self) -> QrPngEncoder {
        QrPngEncoder::new(self.width, self.margin)
    }
}

/// Page geometry in points. `page_width`/`page_height` are the physical page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub item_size: f32,
    pub spacing: f32,
    pub caption_height: f32,
    pub title_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: layout::A4_WIDTH,
            page_height: layout::A4_HEIGHT,
            margin: layout::DEFAULT_MARGIN,
            item_size: layout::DEFAULT_ITEM_SIZE,
            spacing: layout::DEFAULT_SPACING,
            caption_height: layout::DEFAULT_CAPTION_HEIGHT,
            title_height: layout::DEFAULT_TITLE_HEIGHT,
        }
    }
}

impl LayoutConfig {
    /// Content-area geometry for the grid calculation.
    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::for_page(
            self.page_width,
            self.page_height,
            self.margin,
            self.item_size,
            self.spacing,
            self.caption_height,
            self.title_height,
        )
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel generation workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_workers: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_workers.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CatalogConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CatalogConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CatalogConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults if it is missing.
pub fn load_config(path: &Path) -> Result<CatalogConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `qr-catalog.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# QR Catalog Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
# Directory generated PNG files are written to and read from.
qr_dir = "qr-codes"

# Directory the catalog PDF is written to.
output_dir = "pdf-output"

# ---------------------------------------------------------------------------
# QR rendering
# ---------------------------------------------------------------------------
[qr]
# Target raster width in pixels. Modules are whole pixels, so the image
# may come out slightly smaller.
width = 300

# Quiet zone around the symbol, in modules.
margin = 2

# ---------------------------------------------------------------------------
# Catalog layout (PDF points, 72 per inch)
# ---------------------------------------------------------------------------
[layout]
# Physical page size. Defaults to A4.
page_width = 595.28
page_height = 841.89

# Margin on every side of the page.
margin = 30.0

# Side length of each QR image.
item_size = 80.0

# Gap between columns and after each caption band.
spacing = 10.0

# Height reserved under each image for the two caption lines.
caption_height = 16.0

# Height reserved for the title block.
title_height = 40.0

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel generation workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_workers = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_storage_dirs() {
        let config = CatalogConfig::default();
        assert_eq!(config.storage.qr_dir, "qr-codes");
        assert_eq!(config.storage.output_dir, "pdf-output");
    }

    #[test]
    fn default_config_has_qr_settings() {
        let config = CatalogConfig::default();
        assert_eq!(config.qr.width, 300);
        assert_eq!(config.qr.margin, 2);
        assert_eq!(config.qr.encoder(), QrPngEncoder::default());
    }

    #[test]
    fn default_layout_matches_a4_grid() {
        let geometry = CatalogConfig::default().layout.geometry();
        assert_eq!(geometry, PageGeometry::default());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[layout]
item_size = 60.0
"#;
        let config: CatalogConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.layout.item_size, 60.0);
        // Default values preserved
        assert_eq!(config.layout.margin, 30.0);
        assert_eq!(config.storage.qr_dir, "qr-codes");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
[qr]
colour = "red"
"#;
        let result: Result<CatalogConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn load_config_merges_user_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
[storage]
qr_dir = "codes"

[processing]
max_workers = 2
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.storage.qr_dir, "codes");
        assert_eq!(config.storage.output_dir, "pdf-output");
        assert_eq!(config.processing.max_workers, Some(2));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "this is not [valid toml").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn default_config_is_valid() {
        CatalogConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_qr_width_is_invalid() {
        let mut config = CatalogConfig::default();
        config.qr.width = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn zero_workers_is_invalid() {
        let mut config = CatalogConfig::default();
        config.processing.max_workers = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn item_wider_than_page_is_invalid() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str(
            r#"
[layout]
item_size = 600.0
"#,
        )
        .unwrap();
        let result = resolve_config(base, Some(overlay));
        match result {
            Err(ConfigError::Validation(msg)) => assert!(msg.starts_with("layout:"), "{msg}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_storage_dir_is_invalid() {
        let mut config = CatalogConfig::default();
        config.storage.output_dir.clear();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_overrides_leaf_and_keeps_siblings() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn merge_adds_new_keys() {
        let base: toml::Value = toml::from_str("[a]\nx = 1").unwrap();
        let overlay: toml::Value = toml::from_str("[b]\nz = 1").unwrap();
        let merged = merge_toml(base, overlay);
        assert!(merged.get("a").is_some());
        assert!(merged.get("b").is_some());
    }

    // =========================================================================
    // effective_threads tests
    // =========================================================================

    #[test]
    fn effective_threads_auto_uses_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let config = ProcessingConfig {
            max_workers: Some(100_000),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_constrains_down() {
        let config = ProcessingConfig {
            max_workers: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_toml() {
        let content = stock_config_toml();
        let _: toml::Value = toml::from_str(content).expect("stock config must be valid TOML");
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: CatalogConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        for section in ["storage", "qr", "layout", "processing"] {
            assert!(val.get(section).is_some(), "missing [{section}]");
        }
    }

    #[test]
    fn stock_defaults_value_resolves_to_defaults() {
        let config = resolve_config(stock_defaults_value(), None).unwrap();
        assert_eq!(config, CatalogConfig::default());
    }
}
