//! Unit catalog validation.
//!
//! Hard errors come from [`UnitCatalog::validate`]; a catalog that loads can
//! still draw warnings for rosters that are legal but unplayable or odd.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use siege_core::catalog::{UnitCatalog, ARMY_SIZE};
use siege_core::error::GameError;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why validation stopped.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A catalog failed to load or broke an invariant.
    #[error("{}: {source}", path.display())]
    Catalog {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: GameError,
    },

    /// The directory could not be listed.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Nothing to validate.
    #[error("No .ron catalogs found in {}", .0.display())]
    NoCatalogs(PathBuf),
}

/// Result of validating one catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogReport {
    /// File checked.
    pub path: PathBuf,
    /// Templates in the roster.
    pub units: usize,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

/// Validate one catalog file.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or fails validation.
pub fn validate_catalog_file(path: &Path) -> Result<CatalogReport, ValidationError> {
    let catalog = UnitCatalog::load(path).map_err(|source| ValidationError::Catalog {
        path: path.to_path_buf(),
        source,
    })?;
    let warnings = lint(&catalog);
    for warning in &warnings {
        warn!(path = %path.display(), "{warning}");
    }
    debug!(path = %path.display(), units = catalog.len(), "catalog ok");
    Ok(CatalogReport {
        path: path.to_path_buf(),
        units: catalog.len(),
        warnings,
    })
}

/// Validate a catalog file, or every `.ron` file in a directory.
///
/// # Errors
///
/// Returns the first failing file's error.
pub fn validate_path(path: &Path) -> Result<Vec<CatalogReport>, ValidationError> {
    if path.is_file() {
        return Ok(vec![validate_catalog_file(path)?]);
    }
    let io_error = |source| ValidationError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut files: Vec<PathBuf> = std::fs::read_dir(path)
        .map_err(io_error)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(ValidationError::NoCatalogs(path.to_path_buf()));
    }
    let reports = files
        .iter()
        .map(|file| validate_catalog_file(file))
        .collect::<Result<Vec<_>, _>>()?;
    info!(files = reports.len(), "all catalogs valid");
    Ok(reports)
}

/// Write the built-in roster to `path` as pretty RON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn export_standard(path: &Path) -> Result<(), ValidationError> {
    let text = UnitCatalog::standard()
        .to_ron_string()
        .map_err(|source| ValidationError::Catalog {
            path: path.to_path_buf(),
            source,
        })?;
    std::fs::write(path, text).map_err(|source| ValidationError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Findings that do not stop a catalog from loading.
#[must_use]
pub fn lint(catalog: &UnitCatalog) -> Vec<String> {
    let mut warnings = Vec::new();
    if catalog.len() < ARMY_SIZE {
        warnings.push(format!(
            "only {} units; an army needs {ARMY_SIZE}",
            catalog.len()
        ));
    }
    let mut names = HashSet::new();
    for unit in &catalog.units {
        if !names.insert(unit.name.as_str()) {
            warnings.push(format!("display name '{}' is used twice", unit.name));
        }
        if unit.stats.cost == 0 {
            warnings.push(format!("'{}' costs nothing", unit.id));
        }
        if unit.stats.speed == 0 {
            warnings.push(format!("'{}' cannot move", unit.id));
        }
        if unit.stats.damage == 0 && !unit.class.is_miner() {
            warnings.push(format!("'{}' deals no damage", unit.id));
        }
    }
    warnings
}
