// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information
//! device-scope dispatch: the application holds the driver's own `VkDevice`,
//! so every non-intercepted device command is the driver's entry point with
//! no loader code in between; the registry exists so
//! `vkGetDeviceProcAddr` and `vkDestroyDevice` can find the loader state

use crate::api;
use crate::chain::DriverInstance;
use crate::extensions::{Extension, ExtensionScope, Extensions};
use crate::handle::{invalid_handle_abort, SharedHandle};
use crate::instance::missing_driver_command;
use crate::tables::DeviceTable;
use crate::util::to_slice;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr::null_mut;
use std::sync::Arc;

pub struct LoaderDevice {
    pub device: api::VkDevice,
    pub table: DeviceTable,
    pub enabled_extensions: Extensions,
    pub api_version: u32,
    pub driver: Arc<DriverInstance>,
}

unsafe impl Send for LoaderDevice {}
unsafe impl Sync for LoaderDevice {}

lazy_static! {
    static ref DEVICES: RwLock<HashMap<usize, Arc<LoaderDevice>>> = RwLock::new(HashMap::new());
}

pub fn register_device(device: Arc<LoaderDevice>) {
    DEVICES.write().insert(device.device as usize, device);
}

pub fn lookup_device(device: api::VkDevice) -> Option<Arc<LoaderDevice>> {
    DEVICES.read().get(&(device as usize)).cloned()
}

fn take_device(device: api::VkDevice) -> Option<Arc<LoaderDevice>> {
    DEVICES.write().remove(&(device as usize))
}

/// resolves the loader state for a device handle; an unknown handle means
/// the application passed a corrupt or foreign device, which is fatal
fn get_device(device: api::VkDevice) -> Arc<LoaderDevice> {
    match lookup_device(device) {
        Some(v) => v,
        None => invalid_handle_abort("VkDevice"),
    }
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkCreateDevice(
    physical_device: api::VkPhysicalDevice,
    create_info: *const api::VkDeviceCreateInfo,
    allocator: *const api::VkAllocationCallbacks,
    device: *mut api::VkDevice,
) -> api::VkResult {
    *device = null_mut();
    let physical_device = SharedHandle::from(physical_device);
    let instance = SharedHandle::from(physical_device.instance);
    assert!(!create_info.is_null());
    let create_info_ref = &*create_info;
    assert_eq!(
        create_info_ref.sType,
        api::VK_STRUCTURE_TYPE_DEVICE_CREATE_INFO
    );
    if create_info_ref.enabledLayerCount != 0 {
        return api::VK_ERROR_LAYER_NOT_PRESENT;
    }

    let driver_extensions = match instance
        .chain
        .enumerate_device_extension_properties(&physical_device)
    {
        Ok(properties) => properties,
        Err(error) => return error,
    };
    let mut driver_names = Vec::with_capacity(driver_extensions.len());
    for properties in &driver_extensions {
        if let Ok(name) = CStr::from_ptr(properties.extensionName.as_ptr()).to_str() {
            driver_names.push(name.to_owned());
        }
    }
    let driver_has = |name: &str| driver_names.iter().any(|v| v == name);

    let allowed = instance
        .enabled_extensions
        .get_allowed_extensions_from_instance_scope();
    let mut enabled_extensions = Extensions::create_empty();
    for &extension_name in to_slice(
        create_info_ref.ppEnabledExtensionNames,
        create_info_ref.enabledExtensionCount as usize,
    ) {
        let name = match CStr::from_ptr(extension_name).to_str() {
            Ok(name) => name,
            Err(_) => return api::VK_ERROR_EXTENSION_NOT_PRESENT,
        };
        match name.parse::<Extension>() {
            Ok(extension) => {
                if extension.get_scope() != ExtensionScope::Device || !allowed[extension] {
                    return api::VK_ERROR_EXTENSION_NOT_PRESENT;
                }
                if !driver_has(name) {
                    return api::VK_ERROR_EXTENSION_NOT_PRESENT;
                }
                enabled_extensions[extension] = true;
            }
            // extensions the loader does not dispatch pass through to the
            // driver untouched, as long as the driver knows them
            Err(_) => {
                if !driver_has(name) {
                    return api::VK_ERROR_EXTENSION_NOT_PRESENT;
                }
            }
        }
    }

    let raw_device = match instance
        .chain
        .create_device(&physical_device, create_info, allocator)
    {
        Ok(device) => device,
        Err(error) => return error,
    };

    let gdpa = match physical_device.driver.table.vkGetDeviceProcAddr {
        Some(v) => v,
        None => missing_driver_command("vkGetDeviceProcAddr"),
    };
    let table = DeviceTable::load(gdpa, raw_device);
    if table.vkDestroyDevice.is_none() {
        log::error!(
            "driver returned a device without vkDestroyDevice, abandoning it"
        );
        return api::VK_ERROR_INITIALIZATION_FAILED;
    }
    register_device(Arc::new(LoaderDevice {
        device: raw_device,
        table,
        enabled_extensions,
        api_version: instance
            .api_version
            .min(physical_device.driver.api_version),
        driver: physical_device.driver.clone(),
    }));
    *device = raw_device;
    api::VK_SUCCESS
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkDestroyDevice(
    device: api::VkDevice,
    allocator: *const api::VkAllocationCallbacks,
) {
    if device.is_null() {
        return;
    }
    let data = match take_device(device) {
        Some(data) => data,
        None => invalid_handle_abort("VkDevice"),
    };
    match data.table.vkDestroyDevice {
        Some(destroy) => destroy(device, allocator),
        None => missing_driver_command("vkDestroyDevice"),
    }
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkGetDeviceProcAddr(
    device: api::VkDevice,
    name: *const c_char,
) -> api::PFN_vkVoidFunction {
    let name = CStr::from_ptr(name).to_str().ok()?;
    if device.is_null() {
        invalid_handle_abort("VkDevice");
    }
    let data = get_device(device);
    crate::commands::resolve_device_command(&data, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::InstanceTable;
    use std::ffi::CString;

    unsafe extern "system" fn nop() {}

    unsafe extern "system" fn gipa_none(
        _instance: api::VkIcdInstance,
        _name: *const c_char,
    ) -> api::PFN_vkVoidFunction {
        None
    }

    unsafe extern "system" fn gdpa_all(
        _device: api::VkDevice,
        _name: *const c_char,
    ) -> api::PFN_vkVoidFunction {
        Some(nop)
    }

    fn stub_device(
        handle: api::VkDevice,
        enabled_extensions: Extensions,
        api_version: u32,
    ) -> Arc<LoaderDevice> {
        Arc::new(LoaderDevice {
            device: handle,
            table: unsafe { DeviceTable::load(gdpa_all, handle) },
            enabled_extensions,
            api_version,
            driver: Arc::new(DriverInstance {
                gipa: gipa_none,
                instance: null_mut(),
                table: unsafe { InstanceTable::load(gipa_none, null_mut()) },
                enabled_extensions: Extensions::create_empty(),
                api_version,
            }),
        })
    }

    #[test]
    fn registry_roundtrip() {
        let handle = 0x4000 as api::VkDevice;
        register_device(stub_device(
            handle,
            Extensions::create_empty(),
            api::VK_API_VERSION_1_0,
        ));
        assert!(lookup_device(handle).is_some());
        assert!(take_device(handle).is_some());
        assert!(lookup_device(handle).is_none());
    }

    #[test]
    fn gdpa_gates_by_version_and_extension() {
        let handle = 0x4100 as api::VkDevice;
        register_device(stub_device(
            handle,
            Extensions::create_empty(),
            api::VK_API_VERSION_1_0,
        ));
        let get = |name: &str| {
            let name = CString::new(name).unwrap();
            unsafe { vkGetDeviceProcAddr(handle, name.as_ptr()) }
        };
        // core 1.0 commands resolve straight to the driver's pointer
        assert!(get("vkQueueSubmit").is_some());
        // core 1.1 commands are hidden from a 1.0 device
        assert!(get("vkBindBufferMemory2").is_none());
        // extension commands are hidden until the extension is enabled
        assert!(get("vkCreateSwapchainKHR").is_none());
        // instance-scope commands never resolve through the device
        assert!(get("vkEnumeratePhysicalDevices").is_none());
        assert!(get("vkNotACommand").is_none());
        // intercepted commands resolve to loader entry points
        assert!(get("vkDestroyDevice").is_some());
        assert!(get("vkGetDeviceProcAddr").is_some());
        take_device(handle);
    }

    #[test]
    fn gdpa_respects_enablement_records() {
        let handle = 0x4200 as api::VkDevice;
        let mut extensions = Extensions::create_empty();
        extensions[Extension::VK_KHR_swapchain] = true;
        register_device(stub_device(handle, extensions, api::VK_API_VERSION_1_1));
        let get = |name: &str| {
            let name = CString::new(name).unwrap();
            unsafe { vkGetDeviceProcAddr(handle, name.as_ptr()) }
        };
        assert!(get("vkCreateSwapchainKHR").is_some());
        assert!(get("vkBindBufferMemory2").is_some());
        // a different extension's commands stay hidden
        assert!(get("vkTrimCommandPoolKHR").is_none());
        take_device(handle);
    }

    #[test]
    fn passthrough_resolution_is_the_drivers_pointer() {
        let handle = 0x4300 as api::VkDevice;
        let device = stub_device(
            handle,
            Extensions::create_empty(),
            api::VK_API_VERSION_1_0,
        );
        let expected = device.table.get("vkQueueSubmit");
        register_device(device);
        let name = CString::new("vkQueueSubmit").unwrap();
        let resolved = unsafe { vkGetDeviceProcAddr(handle, name.as_ptr()) };
        assert_eq!(
            resolved.map(|v| v as usize),
            expected.map(|v| v as usize)
        );
        take_device(handle);
    }
}
