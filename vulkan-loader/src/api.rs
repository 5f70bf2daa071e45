// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information
//! the subset of the Vulkan C ABI the loader dispatches; structures the
//! loader only forwards by pointer are declared opaque
#![allow(dead_code)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]
#![allow(clippy::unreadable_literal)]

pub use crate::handle::{VkDebugUtilsMessengerEXT, VkInstance, VkPhysicalDevice, VkSurfaceKHR};
use std::os::raw::{c_char, c_void};

#[cfg(all(unix, feature = "xcb-surface"))]
pub use xcb::ffi::{xcb_connection_t, xcb_visualid_t, xcb_window_t};

#[cfg(all(windows, feature = "win32-surface"))]
pub use winapi::shared::{minwindef::HINSTANCE, windef::HWND};

pub type VkFlags = u32;
pub type VkBool32 = u32;
pub type VkResult = i32;
pub type VkStructureType = u32;
pub type VkFormat = i32;
pub type VkImageType = i32;
pub type VkImageTiling = i32;
pub type VkSampleCountFlagBits = u32;
pub type VkImageUsageFlags = VkFlags;
pub type VkImageCreateFlags = VkFlags;
pub type VkInstanceCreateFlags = VkFlags;
pub type VkDeviceCreateFlags = VkFlags;
pub type VkDeviceQueueCreateFlags = VkFlags;
pub type VkPresentModeKHR = i32;

pub const VK_TRUE: VkBool32 = 1;
pub const VK_FALSE: VkBool32 = 0;

pub const VK_SUCCESS: VkResult = 0;
pub const VK_INCOMPLETE: VkResult = 5;
pub const VK_ERROR_OUT_OF_HOST_MEMORY: VkResult = -1;
pub const VK_ERROR_INITIALIZATION_FAILED: VkResult = -3;
pub const VK_ERROR_LAYER_NOT_PRESENT: VkResult = -6;
pub const VK_ERROR_EXTENSION_NOT_PRESENT: VkResult = -7;
pub const VK_ERROR_INCOMPATIBLE_DRIVER: VkResult = -9;

pub const VK_STRUCTURE_TYPE_APPLICATION_INFO: VkStructureType = 0;
pub const VK_STRUCTURE_TYPE_INSTANCE_CREATE_INFO: VkStructureType = 1;
pub const VK_STRUCTURE_TYPE_DEVICE_QUEUE_CREATE_INFO: VkStructureType = 2;
pub const VK_STRUCTURE_TYPE_DEVICE_CREATE_INFO: VkStructureType = 3;
pub const VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_GROUP_PROPERTIES: VkStructureType = 1000070000;
pub const VK_STRUCTURE_TYPE_XLIB_SURFACE_CREATE_INFO_KHR: VkStructureType = 1000004000;
pub const VK_STRUCTURE_TYPE_XCB_SURFACE_CREATE_INFO_KHR: VkStructureType = 1000005000;
pub const VK_STRUCTURE_TYPE_WAYLAND_SURFACE_CREATE_INFO_KHR: VkStructureType = 1000006000;
pub const VK_STRUCTURE_TYPE_WIN32_SURFACE_CREATE_INFO_KHR: VkStructureType = 1000009000;
pub const VK_STRUCTURE_TYPE_DEBUG_UTILS_MESSENGER_CALLBACK_DATA_EXT: VkStructureType = 1000128003;
pub const VK_STRUCTURE_TYPE_DEBUG_UTILS_MESSENGER_CREATE_INFO_EXT: VkStructureType = 1000128004;

pub const VK_MAX_EXTENSION_NAME_SIZE: usize = 256;
pub const VK_MAX_DESCRIPTION_SIZE: usize = 256;
pub const VK_MAX_DEVICE_GROUP_SIZE: usize = 32;
pub const VK_HEADER_VERSION: u32 = 96;

pub const VK_KHR_SURFACE_SPEC_VERSION: u32 = 25;
pub const VK_KHR_SWAPCHAIN_SPEC_VERSION: u32 = 70;
pub const VK_KHR_XCB_SURFACE_SPEC_VERSION: u32 = 6;
pub const VK_KHR_XLIB_SURFACE_SPEC_VERSION: u32 = 6;
pub const VK_KHR_WAYLAND_SURFACE_SPEC_VERSION: u32 = 6;
pub const VK_KHR_WIN32_SURFACE_SPEC_VERSION: u32 = 6;
pub const VK_KHR_GET_PHYSICAL_DEVICE_PROPERTIES_2_SPEC_VERSION: u32 = 2;
pub const VK_KHR_DEVICE_GROUP_CREATION_SPEC_VERSION: u32 = 1;
pub const VK_KHR_DEVICE_GROUP_SPEC_VERSION: u32 = 4;
pub const VK_KHR_EXTERNAL_MEMORY_CAPABILITIES_SPEC_VERSION: u32 = 1;
pub const VK_KHR_EXTERNAL_FENCE_CAPABILITIES_SPEC_VERSION: u32 = 1;
pub const VK_KHR_EXTERNAL_SEMAPHORE_CAPABILITIES_SPEC_VERSION: u32 = 1;
pub const VK_EXT_DEBUG_UTILS_SPEC_VERSION: u32 = 2;
pub const VK_KHR_MAINTENANCE1_SPEC_VERSION: u32 = 2;
pub const VK_KHR_BIND_MEMORY_2_SPEC_VERSION: u32 = 1;
pub const VK_KHR_GET_MEMORY_REQUIREMENTS_2_SPEC_VERSION: u32 = 1;
pub const VK_KHR_DEDICATED_ALLOCATION_SPEC_VERSION: u32 = 3;

pub fn make_api_version(major: u32, minor: u32, patch: u32) -> u32 {
    assert!(major < (1 << 10));
    assert!(minor < (1 << 10));
    assert!(patch < (1 << 12));
    (major << 22) | (minor << 12) | patch
}

pub fn api_version_major(version: u32) -> u32 {
    version >> 22
}

pub fn api_version_minor(version: u32) -> u32 {
    (version >> 12) & 0x3ff
}

pub fn api_version_patch(version: u32) -> u32 {
    version & 0xfff
}

pub const VK_API_VERSION_1_0: u32 = 1 << 22;
pub const VK_API_VERSION_1_1: u32 = (1 << 22) | (1 << 12);

/// dispatchable handles owned by a driver; opaque to the loader
macro_rules! icd_dispatchable_handle {
    ($name:ident, $tag:ident) => {
        #[doc(hidden)]
        pub enum $tag {}
        pub type $name = *mut $tag;
    };
}

icd_dispatchable_handle!(VkIcdInstance, VkIcdInstance_T);
icd_dispatchable_handle!(VkIcdPhysicalDevice, VkIcdPhysicalDevice_T);

// device-scope handles pass through the loader unchanged, so there is only
// the driver's form
icd_dispatchable_handle!(VkDevice, VkDevice_T);
icd_dispatchable_handle!(VkQueue, VkQueue_T);
icd_dispatchable_handle!(VkCommandBuffer, VkCommandBuffer_T);

/// structures the loader forwards without reading
macro_rules! opaque_structs {
    ($($name:ident,)*) => {$(
        #[repr(C)]
        pub struct $name {
            _opaque: [u8; 0],
        }
    )*};
}

opaque_structs! {
    VkPhysicalDeviceFeatures,
    VkPhysicalDeviceProperties,
    VkFormatProperties,
    VkImageFormatProperties,
    VkQueueFamilyProperties,
    VkPhysicalDeviceMemoryProperties,
    VkSparseImageFormatProperties,
    VkPhysicalDeviceFeatures2,
    VkPhysicalDeviceProperties2,
    VkFormatProperties2,
    VkImageFormatProperties2,
    VkPhysicalDeviceImageFormatInfo2,
    VkQueueFamilyProperties2,
    VkPhysicalDeviceMemoryProperties2,
    VkSparseImageFormatProperties2,
    VkPhysicalDeviceSparseImageFormatInfo2,
    VkSurfaceCapabilitiesKHR,
    VkSurfaceFormatKHR,
    VkDebugUtilsLabelEXT,
    VkDebugUtilsObjectNameInfoEXT,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkBaseInStructure {
    pub sType: VkStructureType,
    pub pNext: *const VkBaseInStructure,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkBaseOutStructure {
    pub sType: VkStructureType,
    pub pNext: *mut VkBaseOutStructure,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkApplicationInfo {
    pub sType: VkStructureType,
    pub pNext: *const c_void,
    pub pApplicationName: *const c_char,
    pub applicationVersion: u32,
    pub pEngineName: *const c_char,
    pub engineVersion: u32,
    pub apiVersion: u32,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkInstanceCreateInfo {
    pub sType: VkStructureType,
    pub pNext: *const c_void,
    pub flags: VkInstanceCreateFlags,
    pub pApplicationInfo: *const VkApplicationInfo,
    pub enabledLayerCount: u32,
    pub ppEnabledLayerNames: *const *const c_char,
    pub enabledExtensionCount: u32,
    pub ppEnabledExtensionNames: *const *const c_char,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkDeviceQueueCreateInfo {
    pub sType: VkStructureType,
    pub pNext: *const c_void,
    pub flags: VkDeviceQueueCreateFlags,
    pub queueFamilyIndex: u32,
    pub queueCount: u32,
    pub pQueuePriorities: *const f32,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkDeviceCreateInfo {
    pub sType: VkStructureType,
    pub pNext: *const c_void,
    pub flags: VkDeviceCreateFlags,
    pub queueCreateInfoCount: u32,
    pub pQueueCreateInfos: *const VkDeviceQueueCreateInfo,
    pub enabledLayerCount: u32,
    pub ppEnabledLayerNames: *const *const c_char,
    pub enabledExtensionCount: u32,
    pub ppEnabledExtensionNames: *const *const c_char,
    pub pEnabledFeatures: *const VkPhysicalDeviceFeatures,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkExtensionProperties {
    pub extensionName: [c_char; VK_MAX_EXTENSION_NAME_SIZE],
    pub specVersion: u32,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkLayerProperties {
    pub layerName: [c_char; VK_MAX_EXTENSION_NAME_SIZE],
    pub specVersion: u32,
    pub implementationVersion: u32,
    pub description: [c_char; VK_MAX_DESCRIPTION_SIZE],
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkPhysicalDeviceGroupProperties {
    pub sType: VkStructureType,
    pub pNext: *mut c_void,
    pub physicalDeviceCount: u32,
    pub physicalDevices: [VkIcdPhysicalDevice; VK_MAX_DEVICE_GROUP_SIZE],
    pub subsetAllocation: VkBool32,
}

pub type VkSystemAllocationScope = i32;
pub type VkInternalAllocationType = i32;

pub type PFN_vkAllocationFunction = Option<
    unsafe extern "system" fn(*mut c_void, usize, usize, VkSystemAllocationScope) -> *mut c_void,
>;
pub type PFN_vkReallocationFunction = Option<
    unsafe extern "system" fn(
        *mut c_void,
        *mut c_void,
        usize,
        usize,
        VkSystemAllocationScope,
    ) -> *mut c_void,
>;
pub type PFN_vkFreeFunction = Option<unsafe extern "system" fn(*mut c_void, *mut c_void)>;
pub type PFN_vkInternalAllocationNotification =
    Option<unsafe extern "system" fn(*mut c_void, usize, VkInternalAllocationType, VkSystemAllocationScope)>;
pub type PFN_vkInternalFreeNotification =
    Option<unsafe extern "system" fn(*mut c_void, usize, VkInternalAllocationType, VkSystemAllocationScope)>;

#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkAllocationCallbacks {
    pub pUserData: *mut c_void,
    pub pfnAllocation: PFN_vkAllocationFunction,
    pub pfnReallocation: PFN_vkReallocationFunction,
    pub pfnFree: PFN_vkFreeFunction,
    pub pfnInternalAllocation: PFN_vkInternalAllocationNotification,
    pub pfnInternalFree: PFN_vkInternalFreeNotification,
}

pub type VkDebugUtilsMessengerCreateFlagsEXT = VkFlags;
pub type VkDebugUtilsMessageSeverityFlagsEXT = VkFlags;
pub type VkDebugUtilsMessageSeverityFlagBitsEXT = VkFlags;
pub type VkDebugUtilsMessageTypeFlagsEXT = VkFlags;

pub const VK_DEBUG_UTILS_MESSAGE_SEVERITY_VERBOSE_BIT_EXT: VkFlags = 0x0001;
pub const VK_DEBUG_UTILS_MESSAGE_SEVERITY_INFO_BIT_EXT: VkFlags = 0x0010;
pub const VK_DEBUG_UTILS_MESSAGE_SEVERITY_WARNING_BIT_EXT: VkFlags = 0x0100;
pub const VK_DEBUG_UTILS_MESSAGE_SEVERITY_ERROR_BIT_EXT: VkFlags = 0x1000;
pub const VK_DEBUG_UTILS_MESSAGE_TYPE_GENERAL_BIT_EXT: VkFlags = 0x1;
pub const VK_DEBUG_UTILS_MESSAGE_TYPE_VALIDATION_BIT_EXT: VkFlags = 0x2;
pub const VK_DEBUG_UTILS_MESSAGE_TYPE_PERFORMANCE_BIT_EXT: VkFlags = 0x4;

#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkDebugUtilsMessengerCallbackDataEXT {
    pub sType: VkStructureType,
    pub pNext: *const c_void,
    pub flags: VkFlags,
    pub pMessageIdName: *const c_char,
    pub messageIdNumber: i32,
    pub pMessage: *const c_char,
    pub queueLabelCount: u32,
    pub pQueueLabels: *const VkDebugUtilsLabelEXT,
    pub cmdBufLabelCount: u32,
    pub pCmdBufLabels: *const VkDebugUtilsLabelEXT,
    pub objectCount: u32,
    pub pObjects: *const VkDebugUtilsObjectNameInfoEXT,
}

pub type PFN_vkDebugUtilsMessengerCallbackEXT = Option<
    unsafe extern "system" fn(
        VkDebugUtilsMessageSeverityFlagBitsEXT,
        VkDebugUtilsMessageTypeFlagsEXT,
        *const VkDebugUtilsMessengerCallbackDataEXT,
        *mut c_void,
    ) -> VkBool32,
>;

#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkDebugUtilsMessengerCreateInfoEXT {
    pub sType: VkStructureType,
    pub pNext: *const c_void,
    pub flags: VkDebugUtilsMessengerCreateFlagsEXT,
    pub messageSeverity: VkDebugUtilsMessageSeverityFlagsEXT,
    pub messageType: VkDebugUtilsMessageTypeFlagsEXT,
    pub pfnUserCallback: PFN_vkDebugUtilsMessengerCallbackEXT,
    pub pUserData: *mut c_void,
}

// loader-ICD interface: the magic word every dispatchable wrapper carries and
// the platform tags of loader-allocated surface objects
pub const ICD_LOADER_MAGIC: u32 = 0x01CD_C0DE;

pub type VkIcdWsiPlatform = u32;
pub const VK_ICD_WSI_PLATFORM_WAYLAND: VkIcdWsiPlatform = 1;
pub const VK_ICD_WSI_PLATFORM_WIN32: VkIcdWsiPlatform = 2;
pub const VK_ICD_WSI_PLATFORM_XCB: VkIcdWsiPlatform = 3;
pub const VK_ICD_WSI_PLATFORM_XLIB: VkIcdWsiPlatform = 4;
pub const VK_ICD_WSI_PLATFORM_DISPLAY: VkIcdWsiPlatform = 8;

#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkIcdSurfaceBase {
    pub platform: VkIcdWsiPlatform,
}

#[cfg(all(unix, feature = "xcb-surface"))]
#[repr(C)]
pub struct VkIcdSurfaceXcb {
    pub base: VkIcdSurfaceBase,
    pub connection: *mut xcb_connection_t,
    pub window: xcb_window_t,
}

#[cfg(feature = "xlib-surface")]
pub type Display = c_void;
#[cfg(feature = "xlib-surface")]
pub type Window = std::os::raw::c_ulong;
#[cfg(feature = "xlib-surface")]
pub type VisualID = std::os::raw::c_ulong;

#[cfg(feature = "xlib-surface")]
#[repr(C)]
pub struct VkIcdSurfaceXlib {
    pub base: VkIcdSurfaceBase,
    pub dpy: *mut Display,
    pub window: Window,
}

#[cfg(feature = "wayland-surface")]
pub type wl_display = c_void;
#[cfg(feature = "wayland-surface")]
pub type wl_surface = c_void;

#[cfg(feature = "wayland-surface")]
#[repr(C)]
pub struct VkIcdSurfaceWayland {
    pub base: VkIcdSurfaceBase,
    pub display: *mut wl_display,
    pub surface: *mut wl_surface,
}

#[cfg(all(windows, feature = "win32-surface"))]
#[repr(C)]
pub struct VkIcdSurfaceWin32 {
    pub base: VkIcdSurfaceBase,
    pub hinstance: HINSTANCE,
    pub hwnd: HWND,
}

#[cfg(all(unix, feature = "xcb-surface"))]
#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkXcbSurfaceCreateInfoKHR {
    pub sType: VkStructureType,
    pub pNext: *const c_void,
    pub flags: VkFlags,
    pub connection: *mut xcb_connection_t,
    pub window: xcb_window_t,
}

#[cfg(feature = "xlib-surface")]
#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkXlibSurfaceCreateInfoKHR {
    pub sType: VkStructureType,
    pub pNext: *const c_void,
    pub flags: VkFlags,
    pub dpy: *mut Display,
    pub window: Window,
}

#[cfg(feature = "wayland-surface")]
#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkWaylandSurfaceCreateInfoKHR {
    pub sType: VkStructureType,
    pub pNext: *const c_void,
    pub flags: VkFlags,
    pub display: *mut wl_display,
    pub surface: *mut wl_surface,
}

#[cfg(all(windows, feature = "win32-surface"))]
#[repr(C)]
#[derive(Copy, Clone)]
pub struct VkWin32SurfaceCreateInfoKHR {
    pub sType: VkStructureType,
    pub pNext: *const c_void,
    pub flags: VkFlags,
    pub hinstance: HINSTANCE,
    pub hwnd: HWND,
}

pub type PFN_vkVoidFunction = Option<unsafe extern "system" fn()>;

// application-facing entry point types: dispatchable instance-scope handles
// are the loader's wrapped forms
pub type PFN_vkGetInstanceProcAddr =
    Option<unsafe extern "system" fn(VkInstance, *const c_char) -> PFN_vkVoidFunction>;
pub type PFN_vkGetDeviceProcAddr =
    Option<unsafe extern "system" fn(VkDevice, *const c_char) -> PFN_vkVoidFunction>;
pub type PFN_vkCreateInstance = Option<
    unsafe extern "system" fn(
        *const VkInstanceCreateInfo,
        *const VkAllocationCallbacks,
        *mut VkInstance,
    ) -> VkResult,
>;
pub type PFN_vkDestroyInstance =
    Option<unsafe extern "system" fn(VkInstance, *const VkAllocationCallbacks)>;
pub type PFN_vkEnumerateInstanceExtensionProperties = Option<
    unsafe extern "system" fn(*const c_char, *mut u32, *mut VkExtensionProperties) -> VkResult,
>;
pub type PFN_vkEnumerateInstanceLayerProperties =
    Option<unsafe extern "system" fn(*mut u32, *mut VkLayerProperties) -> VkResult>;
pub type PFN_vkEnumerateInstanceVersion = Option<unsafe extern "system" fn(*mut u32) -> VkResult>;
pub type PFN_vkEnumeratePhysicalDevices =
    Option<unsafe extern "system" fn(VkInstance, *mut u32, *mut VkPhysicalDevice) -> VkResult>;
pub type PFN_vkEnumeratePhysicalDeviceGroups = Option<
    unsafe extern "system" fn(VkInstance, *mut u32, *mut VkPhysicalDeviceGroupProperties)
        -> VkResult,
>;
pub type PFN_vkGetPhysicalDeviceFeatures =
    Option<unsafe extern "system" fn(VkPhysicalDevice, *mut VkPhysicalDeviceFeatures)>;
pub type PFN_vkGetPhysicalDeviceProperties =
    Option<unsafe extern "system" fn(VkPhysicalDevice, *mut VkPhysicalDeviceProperties)>;
pub type PFN_vkGetPhysicalDeviceFormatProperties =
    Option<unsafe extern "system" fn(VkPhysicalDevice, VkFormat, *mut VkFormatProperties)>;
pub type PFN_vkGetPhysicalDeviceImageFormatProperties = Option<
    unsafe extern "system" fn(
        VkPhysicalDevice,
        VkFormat,
        VkImageType,
        VkImageTiling,
        VkImageUsageFlags,
        VkImageCreateFlags,
        *mut VkImageFormatProperties,
    ) -> VkResult,
>;
pub type PFN_vkGetPhysicalDeviceQueueFamilyProperties =
    Option<unsafe extern "system" fn(VkPhysicalDevice, *mut u32, *mut VkQueueFamilyProperties)>;
pub type PFN_vkGetPhysicalDeviceMemoryProperties =
    Option<unsafe extern "system" fn(VkPhysicalDevice, *mut VkPhysicalDeviceMemoryProperties)>;
pub type PFN_vkGetPhysicalDeviceSparseImageFormatProperties = Option<
    unsafe extern "system" fn(
        VkPhysicalDevice,
        VkFormat,
        VkImageType,
        VkSampleCountFlagBits,
        VkImageUsageFlags,
        VkImageTiling,
        *mut u32,
        *mut VkSparseImageFormatProperties,
    ),
>;
pub type PFN_vkGetPhysicalDeviceFeatures2 =
    Option<unsafe extern "system" fn(VkPhysicalDevice, *mut VkPhysicalDeviceFeatures2)>;
pub type PFN_vkGetPhysicalDeviceProperties2 =
    Option<unsafe extern "system" fn(VkPhysicalDevice, *mut VkPhysicalDeviceProperties2)>;
pub type PFN_vkGetPhysicalDeviceFormatProperties2 =
    Option<unsafe extern "system" fn(VkPhysicalDevice, VkFormat, *mut VkFormatProperties2)>;
pub type PFN_vkGetPhysicalDeviceImageFormatProperties2 = Option<
    unsafe extern "system" fn(
        VkPhysicalDevice,
        *const VkPhysicalDeviceImageFormatInfo2,
        *mut VkImageFormatProperties2,
    ) -> VkResult,
>;
pub type PFN_vkGetPhysicalDeviceQueueFamilyProperties2 =
    Option<unsafe extern "system" fn(VkPhysicalDevice, *mut u32, *mut VkQueueFamilyProperties2)>;
pub type PFN_vkGetPhysicalDeviceMemoryProperties2 =
    Option<unsafe extern "system" fn(VkPhysicalDevice, *mut VkPhysicalDeviceMemoryProperties2)>;
pub type PFN_vkGetPhysicalDeviceSparseImageFormatProperties2 = Option<
    unsafe extern "system" fn(
        VkPhysicalDevice,
        *const VkPhysicalDeviceSparseImageFormatInfo2,
        *mut u32,
        *mut VkSparseImageFormatProperties2,
    ),
>;
pub type PFN_vkCreateDevice = Option<
    unsafe extern "system" fn(
        VkPhysicalDevice,
        *const VkDeviceCreateInfo,
        *const VkAllocationCallbacks,
        *mut VkDevice,
    ) -> VkResult,
>;
pub type PFN_vkDestroyDevice =
    Option<unsafe extern "system" fn(VkDevice, *const VkAllocationCallbacks)>;
pub type PFN_vkEnumerateDeviceExtensionProperties = Option<
    unsafe extern "system" fn(
        VkPhysicalDevice,
        *const c_char,
        *mut u32,
        *mut VkExtensionProperties,
    ) -> VkResult,
>;
pub type PFN_vkEnumerateDeviceLayerProperties = Option<
    unsafe extern "system" fn(VkPhysicalDevice, *mut u32, *mut VkLayerProperties) -> VkResult,
>;
pub type PFN_vkDestroySurfaceKHR =
    Option<unsafe extern "system" fn(VkInstance, VkSurfaceKHR, *const VkAllocationCallbacks)>;
pub type PFN_vkGetPhysicalDeviceSurfaceSupportKHR = Option<
    unsafe extern "system" fn(VkPhysicalDevice, u32, VkSurfaceKHR, *mut VkBool32) -> VkResult,
>;
pub type PFN_vkGetPhysicalDeviceSurfaceCapabilitiesKHR = Option<
    unsafe extern "system" fn(VkPhysicalDevice, VkSurfaceKHR, *mut VkSurfaceCapabilitiesKHR)
        -> VkResult,
>;
pub type PFN_vkGetPhysicalDeviceSurfaceFormatsKHR = Option<
    unsafe extern "system" fn(VkPhysicalDevice, VkSurfaceKHR, *mut u32, *mut VkSurfaceFormatKHR)
        -> VkResult,
>;
pub type PFN_vkGetPhysicalDeviceSurfacePresentModesKHR = Option<
    unsafe extern "system" fn(VkPhysicalDevice, VkSurfaceKHR, *mut u32, *mut VkPresentModeKHR)
        -> VkResult,
>;

#[cfg(all(unix, feature = "xcb-surface"))]
pub type PFN_vkCreateXcbSurfaceKHR = Option<
    unsafe extern "system" fn(
        VkInstance,
        *const VkXcbSurfaceCreateInfoKHR,
        *const VkAllocationCallbacks,
        *mut VkSurfaceKHR,
    ) -> VkResult,
>;
#[cfg(all(unix, feature = "xcb-surface"))]
pub type PFN_vkGetPhysicalDeviceXcbPresentationSupportKHR = Option<
    unsafe extern "system" fn(VkPhysicalDevice, u32, *mut xcb_connection_t, xcb_visualid_t)
        -> VkBool32,
>;

#[cfg(feature = "xlib-surface")]
pub type PFN_vkCreateXlibSurfaceKHR = Option<
    unsafe extern "system" fn(
        VkInstance,
        *const VkXlibSurfaceCreateInfoKHR,
        *const VkAllocationCallbacks,
        *mut VkSurfaceKHR,
    ) -> VkResult,
>;
#[cfg(feature = "xlib-surface")]
pub type PFN_vkGetPhysicalDeviceXlibPresentationSupportKHR = Option<
    unsafe extern "system" fn(VkPhysicalDevice, u32, *mut Display, VisualID) -> VkBool32,
>;

#[cfg(feature = "wayland-surface")]
pub type PFN_vkCreateWaylandSurfaceKHR = Option<
    unsafe extern "system" fn(
        VkInstance,
        *const VkWaylandSurfaceCreateInfoKHR,
        *const VkAllocationCallbacks,
        *mut VkSurfaceKHR,
    ) -> VkResult,
>;
#[cfg(feature = "wayland-surface")]
pub type PFN_vkGetPhysicalDeviceWaylandPresentationSupportKHR =
    Option<unsafe extern "system" fn(VkPhysicalDevice, u32, *mut wl_display) -> VkBool32>;

#[cfg(all(windows, feature = "win32-surface"))]
pub type PFN_vkCreateWin32SurfaceKHR = Option<
    unsafe extern "system" fn(
        VkInstance,
        *const VkWin32SurfaceCreateInfoKHR,
        *const VkAllocationCallbacks,
        *mut VkSurfaceKHR,
    ) -> VkResult,
>;
#[cfg(all(windows, feature = "win32-surface"))]
pub type PFN_vkGetPhysicalDeviceWin32PresentationSupportKHR =
    Option<unsafe extern "system" fn(VkPhysicalDevice, u32) -> VkBool32>;

pub type PFN_vkCreateDebugUtilsMessengerEXT = Option<
    unsafe extern "system" fn(
        VkInstance,
        *const VkDebugUtilsMessengerCreateInfoEXT,
        *const VkAllocationCallbacks,
        *mut VkDebugUtilsMessengerEXT,
    ) -> VkResult,
>;
pub type PFN_vkDestroyDebugUtilsMessengerEXT = Option<
    unsafe extern "system" fn(VkInstance, VkDebugUtilsMessengerEXT, *const VkAllocationCallbacks),
>;
pub type PFN_vkSubmitDebugUtilsMessageEXT = Option<
    unsafe extern "system" fn(
        VkInstance,
        VkDebugUtilsMessageSeverityFlagBitsEXT,
        VkDebugUtilsMessageTypeFlagsEXT,
        *const VkDebugUtilsMessengerCallbackDataEXT,
    ),
>;

/// driver-side entry point types: these take the driver's own handles, which
/// the terminators substitute for the loader's wrapped forms
pub mod icd {
    use super::*;

    pub type PFN_vkGetInstanceProcAddr =
        Option<unsafe extern "system" fn(VkIcdInstance, *const c_char) -> PFN_vkVoidFunction>;
    pub type PFN_GetPhysicalDeviceProcAddr =
        Option<unsafe extern "system" fn(VkIcdInstance, *const c_char) -> PFN_vkVoidFunction>;
    pub type PFN_vkNegotiateLoaderICDInterfaceVersion =
        Option<unsafe extern "system" fn(*mut u32) -> VkResult>;
    pub type PFN_vkGetDeviceProcAddr = super::PFN_vkGetDeviceProcAddr;

    pub type PFN_vkCreateInstance = Option<
        unsafe extern "system" fn(
            *const VkInstanceCreateInfo,
            *const VkAllocationCallbacks,
            *mut VkIcdInstance,
        ) -> VkResult,
    >;
    pub type PFN_vkDestroyInstance =
        Option<unsafe extern "system" fn(VkIcdInstance, *const VkAllocationCallbacks)>;
    pub type PFN_vkEnumerateInstanceExtensionProperties =
        super::PFN_vkEnumerateInstanceExtensionProperties;
    pub type PFN_vkEnumeratePhysicalDevices = Option<
        unsafe extern "system" fn(VkIcdInstance, *mut u32, *mut VkIcdPhysicalDevice) -> VkResult,
    >;
    pub type PFN_vkEnumeratePhysicalDeviceGroups = Option<
        unsafe extern "system" fn(VkIcdInstance, *mut u32, *mut VkPhysicalDeviceGroupProperties)
            -> VkResult,
    >;
    pub type PFN_vkGetPhysicalDeviceFeatures =
        Option<unsafe extern "system" fn(VkIcdPhysicalDevice, *mut VkPhysicalDeviceFeatures)>;
    pub type PFN_vkGetPhysicalDeviceProperties =
        Option<unsafe extern "system" fn(VkIcdPhysicalDevice, *mut VkPhysicalDeviceProperties)>;
    pub type PFN_vkGetPhysicalDeviceFormatProperties =
        Option<unsafe extern "system" fn(VkIcdPhysicalDevice, VkFormat, *mut VkFormatProperties)>;
    pub type PFN_vkGetPhysicalDeviceImageFormatProperties = Option<
        unsafe extern "system" fn(
            VkIcdPhysicalDevice,
            VkFormat,
            VkImageType,
            VkImageTiling,
            VkImageUsageFlags,
            VkImageCreateFlags,
            *mut VkImageFormatProperties,
        ) -> VkResult,
    >;
    pub type PFN_vkGetPhysicalDeviceQueueFamilyProperties = Option<
        unsafe extern "system" fn(VkIcdPhysicalDevice, *mut u32, *mut VkQueueFamilyProperties),
    >;
    pub type PFN_vkGetPhysicalDeviceMemoryProperties = Option<
        unsafe extern "system" fn(VkIcdPhysicalDevice, *mut VkPhysicalDeviceMemoryProperties),
    >;
    pub type PFN_vkGetPhysicalDeviceSparseImageFormatProperties = Option<
        unsafe extern "system" fn(
            VkIcdPhysicalDevice,
            VkFormat,
            VkImageType,
            VkSampleCountFlagBits,
            VkImageUsageFlags,
            VkImageTiling,
            *mut u32,
            *mut VkSparseImageFormatProperties,
        ),
    >;
    pub type PFN_vkGetPhysicalDeviceFeatures2 =
        Option<unsafe extern "system" fn(VkIcdPhysicalDevice, *mut VkPhysicalDeviceFeatures2)>;
    pub type PFN_vkGetPhysicalDeviceProperties2 =
        Option<unsafe extern "system" fn(VkIcdPhysicalDevice, *mut VkPhysicalDeviceProperties2)>;
    pub type PFN_vkGetPhysicalDeviceFormatProperties2 =
        Option<unsafe extern "system" fn(VkIcdPhysicalDevice, VkFormat, *mut VkFormatProperties2)>;
    pub type PFN_vkGetPhysicalDeviceImageFormatProperties2 = Option<
        unsafe extern "system" fn(
            VkIcdPhysicalDevice,
            *const VkPhysicalDeviceImageFormatInfo2,
            *mut VkImageFormatProperties2,
        ) -> VkResult,
    >;
    pub type PFN_vkGetPhysicalDeviceQueueFamilyProperties2 = Option<
        unsafe extern "system" fn(VkIcdPhysicalDevice, *mut u32, *mut VkQueueFamilyProperties2),
    >;
    pub type PFN_vkGetPhysicalDeviceMemoryProperties2 = Option<
        unsafe extern "system" fn(VkIcdPhysicalDevice, *mut VkPhysicalDeviceMemoryProperties2),
    >;
    pub type PFN_vkGetPhysicalDeviceSparseImageFormatProperties2 = Option<
        unsafe extern "system" fn(
            VkIcdPhysicalDevice,
            *const VkPhysicalDeviceSparseImageFormatInfo2,
            *mut u32,
            *mut VkSparseImageFormatProperties2,
        ),
    >;
    pub type PFN_vkCreateDevice = Option<
        unsafe extern "system" fn(
            VkIcdPhysicalDevice,
            *const VkDeviceCreateInfo,
            *const VkAllocationCallbacks,
            *mut VkDevice,
        ) -> VkResult,
    >;
    pub type PFN_vkDestroyDevice = super::PFN_vkDestroyDevice;
    pub type PFN_vkEnumerateDeviceExtensionProperties = Option<
        unsafe extern "system" fn(
            VkIcdPhysicalDevice,
            *const c_char,
            *mut u32,
            *mut VkExtensionProperties,
        ) -> VkResult,
    >;
    pub type PFN_vkGetPhysicalDeviceSurfaceSupportKHR = Option<
        unsafe extern "system" fn(VkIcdPhysicalDevice, u32, VkSurfaceKHR, *mut VkBool32)
            -> VkResult,
    >;
    pub type PFN_vkGetPhysicalDeviceSurfaceCapabilitiesKHR = Option<
        unsafe extern "system" fn(VkIcdPhysicalDevice, VkSurfaceKHR, *mut VkSurfaceCapabilitiesKHR)
            -> VkResult,
    >;
    pub type PFN_vkGetPhysicalDeviceSurfaceFormatsKHR = Option<
        unsafe extern "system" fn(
            VkIcdPhysicalDevice,
            VkSurfaceKHR,
            *mut u32,
            *mut VkSurfaceFormatKHR,
        ) -> VkResult,
    >;
    pub type PFN_vkGetPhysicalDeviceSurfacePresentModesKHR = Option<
        unsafe extern "system" fn(VkIcdPhysicalDevice, VkSurfaceKHR, *mut u32, *mut VkPresentModeKHR)
            -> VkResult,
    >;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_version_packing() {
        let version = make_api_version(1, 1, 96);
        assert_eq!(api_version_major(version), 1);
        assert_eq!(api_version_minor(version), 1);
        assert_eq!(api_version_patch(version), 96);
        assert_eq!(VK_API_VERSION_1_1, make_api_version(1, 1, 0));
        assert!(VK_API_VERSION_1_0 < VK_API_VERSION_1_1);
    }

    #[test]
    fn group_properties_holds_max_group() {
        assert_eq!(
            std::mem::size_of::<[VkIcdPhysicalDevice; VK_MAX_DEVICE_GROUP_SIZE]>(),
            VK_MAX_DEVICE_GROUP_SIZE * std::mem::size_of::<*mut ()>()
        );
    }
}
