//! Manifest extraction
//!
//! Reads package.json out of an in-memory archive and builds the
//! `Package` entity from it.

use chrono::Utc;
use flate2::read::GzDecoder;
use pkgreg_core::error::RegistryError;
use pkgreg_core::types::{Package, PackageId};
use std::collections::HashMap;
use std::io::Read;
use tar::Archive;
use tracing::debug;

use crate::StoreResult;

const MANIFEST_FILE: &str = "package.json";

/// Build a package from downloaded archive bytes
pub fn package_from_tarball(id: PackageId, bytes: Vec<u8>) -> StoreResult<Package> {
    let dependencies = extract_dependencies(&id, &bytes)?;
    debug!(package = %id, dependencies = dependencies.len(), "Read package manifest");
    Package::new(id, Utc::now(), bytes, Some(dependencies))
}

/// Read the dependency declaration (name -> range) from an archive
pub fn extract_dependencies(id: &PackageId, bytes: &[u8]) -> StoreResult<HashMap<String, String>> {
    let manifest = read_manifest(id, bytes)?;
    parse_dependencies(id, &manifest)
}

/// Return the content of the first archive entry ending in package.json
pub fn read_manifest(id: &PackageId, bytes: &[u8]) -> StoreResult<String> {
    let mut archive = Archive::new(GzDecoder::new(bytes));

    let entries = archive.entries().map_err(|e| {
        RegistryError::package_format(id, "Failed to read archive".to_string(), e)
    })?;

    for entry_result in entries {
        let mut entry = entry_result.map_err(|e| {
            RegistryError::package_format(id, "Failed to read archive entry".to_string(), e)
        })?;

        let is_manifest = entry
            .path()
            .map(|path| path.to_string_lossy().ends_with(MANIFEST_FILE))
            .unwrap_or(false);
        if !is_manifest {
            continue;
        }

        let mut content = String::new();
        entry.read_to_string(&mut content).map_err(|e| {
            RegistryError::package_format(id, format!("Failed to extract {}", MANIFEST_FILE), e)
        })?;
        return Ok(content);
    }

    Err(RegistryError::PackageFormat {
        id: id.clone(),
        message: format!("{} not found inside package", MANIFEST_FILE),
        source: None,
    })
}

fn parse_dependencies(id: &PackageId, manifest: &str) -> StoreResult<HashMap<String, String>> {
    let json: serde_json::Value = serde_json::from_str(manifest).map_err(|e| {
        RegistryError::package_format(id, format!("Failed to parse {}", MANIFEST_FILE), e)
    })?;

    match json.get("dependencies") {
        Some(deps @ serde_json::Value::Object(_)) => {
            serde_json::from_value(deps.clone()).map_err(|e| {
                RegistryError::package_format(id, "Failed to parse dependencies".to_string(), e)
            })
        },
        _ => Ok(HashMap::new()),
    }
}
