// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information
//! driver discovery and loading: JSON manifests name a shared library, the
//! library is dlopened once, and the loader-ICD interface version is
//! negotiated before any Vulkan call is made

use crate::api;
use crate::constants::LOADER_INTERFACE_VERSION;
use lazy_static::lazy_static;
use libloading::Library;
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::os::raw::c_char;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to load driver library: {0}")]
    Library(#[from] libloading::Error),
    #[error("driver manifest is malformed: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("failed to read driver manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("driver exposes neither vk_icdGetInstanceProcAddr nor vkGetInstanceProcAddr")]
    MissingEntryPoint,
    #[error("driver interface negotiation failed")]
    NegotiationFailed,
    #[error("driver vkCreateInstance failed with {0}")]
    InstanceCreationFailed(api::VkResult),
}

#[derive(Debug, Deserialize)]
pub struct IcdManifest {
    pub file_format_version: String,
    #[serde(rename = "ICD")]
    pub icd: IcdManifestData,
}

#[derive(Debug, Deserialize)]
pub struct IcdManifestData {
    pub library_path: PathBuf,
    pub api_version: String,
}

pub fn parse_manifest(json: &str) -> Result<IcdManifest, DriverError> {
    Ok(serde_json::from_str(json)?)
}

/// parses the manifest's `"major.minor.patch"` form
pub fn parse_api_version(s: &str) -> Option<u32> {
    let mut parts = s.split('.').map(|v| v.parse::<u32>().ok());
    let major = parts.next()??;
    let minor = parts.next()??;
    let patch = parts.next().unwrap_or(Some(0))?;
    if parts.next().is_some() {
        return None;
    }
    Some(api::make_api_version(major, minor, patch))
}

/// a loaded driver library; one per canonical library path regardless of how
/// many manifests name it
pub struct IcdLibrary {
    // the entry points below point into `_library`, which stays loaded for
    // the lifetime of this struct
    pub gipa: unsafe extern "system" fn(api::VkIcdInstance, *const c_char) -> api::PFN_vkVoidFunction,
    pub gpdpa: api::icd::PFN_GetPhysicalDeviceProcAddr,
    pub interface_version: u32,
    pub api_version: u32,
    pub path: PathBuf,
    _library: Library,
}

impl IcdLibrary {
    pub unsafe fn load(path: &Path, api_version: u32) -> Result<IcdLibrary, DriverError> {
        let library = Library::new(path)?;
        let interface_version = negotiate_interface_version(&library)?;
        let gipa = match library
            .get::<unsafe extern "system" fn(api::VkIcdInstance, *const c_char) -> api::PFN_vkVoidFunction>(
                b"vk_icdGetInstanceProcAddr\0",
            ) {
            Ok(sym) => *sym,
            // interface version 0 drivers predate the vk_icd prefix
            Err(_) => match library.get(b"vkGetInstanceProcAddr\0") {
                Ok(sym) => *sym,
                Err(_) => return Err(DriverError::MissingEntryPoint),
            },
        };
        let gpdpa = library
            .get::<unsafe extern "system" fn(api::VkIcdInstance, *const c_char) -> api::PFN_vkVoidFunction>(
                b"vk_icdGetPhysicalDeviceProcAddr\0",
            )
            .ok()
            .map(|sym| *sym);
        log::info!(
            "loaded driver {} (interface version {}, api version {}.{}.{})",
            path.display(),
            interface_version,
            api::api_version_major(api_version),
            api::api_version_minor(api_version),
            api::api_version_patch(api_version),
        );
        Ok(IcdLibrary {
            gipa,
            gpdpa,
            interface_version,
            api_version,
            path: path.to_owned(),
            _library: library,
        })
    }

    /// resolves a global command through the driver before any instance exists
    pub unsafe fn get_global_proc(&self, name: &[u8]) -> api::PFN_vkVoidFunction {
        debug_assert_eq!(name.last(), Some(&0));
        (self.gipa)(std::ptr::null_mut(), name.as_ptr() as *const c_char)
    }
}

unsafe fn negotiate_interface_version(library: &Library) -> Result<u32, DriverError> {
    let negotiate = match library
        .get::<unsafe extern "system" fn(*mut u32) -> api::VkResult>(
            b"vk_icdNegotiateLoaderICDInterfaceVersion\0",
        ) {
        Ok(sym) => *sym,
        // drivers without the negotiate entry point are interface version 1
        Err(_) => return Ok(1),
    };
    let mut version = LOADER_INTERFACE_VERSION;
    if negotiate(&mut version) != api::VK_SUCCESS {
        return Err(DriverError::NegotiationFailed);
    }
    if version == 0 || version > LOADER_INTERFACE_VERSION {
        return Err(DriverError::NegotiationFailed);
    }
    Ok(version)
}

/// stable identity for a driver library, for de-duplicating drivers that are
/// named by more than one manifest
pub fn driver_key(path: &Path) -> Uuid {
    let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_owned());
    Uuid::new_v5(
        &Uuid::NAMESPACE_URL,
        canonical.to_string_lossy().as_bytes(),
    )
}

lazy_static! {
    static ref LOADED_DRIVERS: Mutex<HashMap<Uuid, Weak<IcdLibrary>>> = Mutex::new(HashMap::new());
}

pub fn load_driver(path: &Path, api_version: u32) -> Result<Arc<IcdLibrary>, DriverError> {
    let key = driver_key(path);
    let mut drivers = LOADED_DRIVERS.lock();
    if let Some(existing) = drivers.get(&key).and_then(Weak::upgrade) {
        return Ok(existing);
    }
    let library = Arc::new(unsafe { IcdLibrary::load(path, api_version)? });
    drivers.insert(key, Arc::downgrade(&library));
    Ok(library)
}

pub fn split_path_list(value: &OsString) -> Vec<PathBuf> {
    env::split_paths(value).collect()
}

#[cfg(unix)]
const DEFAULT_MANIFEST_DIRS: &[&str] = &[
    "/usr/local/etc/vulkan/icd.d",
    "/usr/local/share/vulkan/icd.d",
    "/etc/vulkan/icd.d",
    "/usr/share/vulkan/icd.d",
];

#[cfg(not(unix))]
const DEFAULT_MANIFEST_DIRS: &[&str] = &[];

/// manifest files, either the explicit list from the environment or the
/// `.json` files in the conventional directories
pub fn discover_manifests() -> Vec<PathBuf> {
    for &var in &["VK_DRIVER_FILES", "VK_ICD_FILENAMES"] {
        if let Some(value) = env::var_os(var) {
            log::debug!("driver manifests overridden by {}", var);
            return split_path_list(&value);
        }
    }
    let mut manifests = Vec::new();
    for dir in DEFAULT_MANIFEST_DIRS {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                manifests.push(path);
            }
        }
    }
    manifests.sort();
    manifests
}

/// loads every discoverable driver; a broken manifest or library is logged
/// and skipped so one bad driver cannot take down the rest
pub fn load_drivers() -> Vec<Arc<IcdLibrary>> {
    let mut drivers: Vec<Arc<IcdLibrary>> = Vec::new();
    for manifest_path in discover_manifests() {
        match load_driver_from_manifest(&manifest_path) {
            Ok(library) => {
                if drivers.iter().any(|v| Arc::ptr_eq(v, &library)) {
                    log::debug!(
                        "driver {} listed more than once, ignoring duplicate",
                        library.path.display()
                    );
                } else {
                    drivers.push(library);
                }
            }
            Err(error) => {
                log::warn!(
                    "skipping driver manifest {}: {}",
                    manifest_path.display(),
                    error
                );
            }
        }
    }
    drivers
}

fn load_driver_from_manifest(manifest_path: &Path) -> Result<Arc<IcdLibrary>, DriverError> {
    let manifest = parse_manifest(&fs::read_to_string(manifest_path)?)?;
    let api_version = match parse_api_version(&manifest.icd.api_version) {
        Some(version) => version,
        None => {
            log::warn!(
                "manifest {} has unparseable api_version {:?}, assuming 1.0.0",
                manifest_path.display(),
                manifest.icd.api_version
            );
            api::VK_API_VERSION_1_0
        }
    };
    // a relative library_path is relative to the manifest's directory
    let library_path = if manifest.icd.library_path.is_absolute()
        || manifest.icd.library_path.components().count() == 1
    {
        manifest.icd.library_path.clone()
    } else {
        manifest_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&manifest.icd.library_path)
    };
    load_driver(&library_path, api_version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_parses() {
        let manifest = parse_manifest(
            r#"{
                "file_format_version": "1.0.0",
                "ICD": {
                    "library_path": "/usr/lib/libvulkan_radeon.so",
                    "api_version": "1.1.96"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.file_format_version, "1.0.0");
        assert_eq!(
            manifest.icd.library_path,
            PathBuf::from("/usr/lib/libvulkan_radeon.so")
        );
        assert_eq!(
            parse_api_version(&manifest.icd.api_version),
            Some(api::make_api_version(1, 1, 96))
        );
    }

    #[test]
    fn malformed_manifest_is_rejected() {
        assert!(parse_manifest("not json").is_err());
        assert!(parse_manifest(r#"{"file_format_version": "1.0.0"}"#).is_err());
    }

    #[test]
    fn api_version_forms() {
        assert_eq!(parse_api_version("1.0"), Some(api::VK_API_VERSION_1_0));
        assert_eq!(parse_api_version("1.1.0"), Some(api::VK_API_VERSION_1_1));
        assert_eq!(parse_api_version(""), None);
        assert_eq!(parse_api_version("1.x"), None);
        assert_eq!(parse_api_version("1.1.0.0"), None);
    }

    #[test]
    fn driver_keys_are_stable_and_distinct() {
        let a = driver_key(Path::new("/nonexistent/driver_a.so"));
        let b = driver_key(Path::new("/nonexistent/driver_b.so"));
        assert_eq!(a, driver_key(Path::new("/nonexistent/driver_a.so")));
        assert_ne!(a, b);
    }

    #[cfg(unix)]
    #[test]
    fn path_list_splits_on_separator() {
        let value = OsString::from("/a/one.json:/b/two.json");
        assert_eq!(
            split_path_list(&value),
            vec![PathBuf::from("/a/one.json"), PathBuf::from("/b/two.json")]
        );
    }

    #[test]
    fn missing_driver_library_fails_to_load() {
        let _ = env_logger::builder().is_test(true).try_init();
        let result = load_driver(Path::new("/nonexistent/driver.so"), api::VK_API_VERSION_1_0);
        assert!(matches!(result, Err(DriverError::Library(_))));
    }
}
