// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information
//! a Vulkan loader dispatch layer: discovers and loads installable client
//! drivers, builds instance- and device-scope dispatch tables, resolves
//! commands by name with per-extension and per-version gating, and forwards
//! application calls through trampolines to the owning driver

#[macro_use]
extern crate enum_map;

pub mod api;
pub mod chain;
pub mod commands;
pub mod device;
pub mod extensions;
pub mod handle;
pub mod icd;
pub mod instance;
pub mod surface;
pub mod tables;
pub mod util;

use std::os::raw::c_char;

mod constants {
    use crate::api;

    /// the highest Vulkan version this loader dispatches
    pub const LOADER_API_VERSION: u32 = api::VK_API_VERSION_1_1;
    /// the loader-ICD interface version offered during negotiation
    pub const LOADER_INTERFACE_VERSION: u32 = 5;
}

// the exported ABI is the bootstrap set: everything else is resolved through
// vkGetInstanceProcAddr/vkGetDeviceProcAddr

#[no_mangle]
pub unsafe extern "system" fn vkGetInstanceProcAddr(
    instance: api::VkInstance,
    name: *const c_char,
) -> api::PFN_vkVoidFunction {
    commands::vkGetInstanceProcAddr(instance, name)
}

#[allow(dead_code)]
const ASSERT_TYPE_VK_GET_INSTANCE_PROC_ADDR: api::PFN_vkGetInstanceProcAddr =
    Some(vkGetInstanceProcAddr);

#[no_mangle]
pub unsafe extern "system" fn vkGetDeviceProcAddr(
    device: api::VkDevice,
    name: *const c_char,
) -> api::PFN_vkVoidFunction {
    device::vkGetDeviceProcAddr(device, name)
}

#[allow(dead_code)]
const ASSERT_TYPE_VK_GET_DEVICE_PROC_ADDR: api::PFN_vkGetDeviceProcAddr =
    Some(vkGetDeviceProcAddr);

#[no_mangle]
pub unsafe extern "system" fn vkCreateInstance(
    create_info: *const api::VkInstanceCreateInfo,
    allocator: *const api::VkAllocationCallbacks,
    instance: *mut api::VkInstance,
) -> api::VkResult {
    instance::vkCreateInstance(create_info, allocator, instance)
}

#[allow(dead_code)]
const ASSERT_TYPE_VK_CREATE_INSTANCE: api::PFN_vkCreateInstance = Some(vkCreateInstance);

#[no_mangle]
pub unsafe extern "system" fn vkEnumerateInstanceExtensionProperties(
    layer_name: *const c_char,
    property_count: *mut u32,
    properties: *mut api::VkExtensionProperties,
) -> api::VkResult {
    instance::vkEnumerateInstanceExtensionProperties(layer_name, property_count, properties)
}

#[allow(dead_code)]
const ASSERT_TYPE_VK_ENUMERATE_INSTANCE_EXTENSION_PROPERTIES:
    api::PFN_vkEnumerateInstanceExtensionProperties =
    Some(vkEnumerateInstanceExtensionProperties);

#[no_mangle]
pub unsafe extern "system" fn vkEnumerateInstanceLayerProperties(
    property_count: *mut u32,
    properties: *mut api::VkLayerProperties,
) -> api::VkResult {
    instance::vkEnumerateInstanceLayerProperties(property_count, properties)
}

#[allow(dead_code)]
const ASSERT_TYPE_VK_ENUMERATE_INSTANCE_LAYER_PROPERTIES:
    api::PFN_vkEnumerateInstanceLayerProperties = Some(vkEnumerateInstanceLayerProperties);

#[no_mangle]
pub unsafe extern "system" fn vkEnumerateInstanceVersion(api_version: *mut u32) -> api::VkResult {
    instance::vkEnumerateInstanceVersion(api_version)
}

#[allow(dead_code)]
const ASSERT_TYPE_VK_ENUMERATE_INSTANCE_VERSION: api::PFN_vkEnumerateInstanceVersion =
    Some(vkEnumerateInstanceVersion);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::Handle;
    use std::ffi::CString;

    #[test]
    fn bootstrap_resolution_with_a_null_instance() {
        let get = |name: &str| {
            let name = CString::new(name).unwrap();
            unsafe { vkGetInstanceProcAddr(Handle::null(), name.as_ptr()) }
        };
        assert!(get("vkCreateInstance").is_some());
        assert!(get("vkEnumerateInstanceExtensionProperties").is_some());
        assert!(get("vkEnumerateInstanceLayerProperties").is_some());
        assert!(get("vkEnumerateInstanceVersion").is_some());
        assert!(get("vkGetInstanceProcAddr").is_some());
        // nothing instance- or device-scoped resolves without an instance
        assert!(get("vkDestroyInstance").is_none());
        assert!(get("vkQueueSubmit").is_none());
        assert!(get("vkNoSuchCommand").is_none());
    }
}
