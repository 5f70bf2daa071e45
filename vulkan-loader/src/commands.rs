// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information
//! the command registry: every name the loader resolves, with its scope and
//! the version or extension that gates it; kept sorted so resolution is a
//! binary search over a constant table

use crate::api;
use crate::constants::LOADER_API_VERSION;
use crate::device::LoaderDevice;
use crate::extensions::Extension;
use crate::handle::SharedHandle;
use crate::instance::Instance;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CommandScope {
    Global,
    /// includes physical-device commands
    Instance,
    Device,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CommandGate {
    /// minimum negotiated API version
    Core(u32),
    Extension(Extension),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CommandDispatch {
    /// the loader owns the entry point (a trampoline or a loader-local
    /// implementation)
    Loader,
    /// resolved straight through to the driver's entry point
    Driver,
}

pub struct CommandDef {
    pub name: &'static str,
    pub scope: CommandScope,
    pub gate: CommandGate,
    pub dispatch: CommandDispatch,
}

const CORE_1_0: CommandGate = CommandGate::Core(api::VK_API_VERSION_1_0);
const CORE_1_1: CommandGate = CommandGate::Core(api::VK_API_VERSION_1_1);

macro_rules! command {
    ($name:expr, $scope:ident, $gate:expr, $dispatch:ident) => {
        CommandDef {
            name: $name,
            scope: CommandScope::$scope,
            gate: $gate,
            dispatch: CommandDispatch::$dispatch,
        }
    };
}

#[cfg_attr(rustfmt, rustfmt_skip)]
pub static COMMANDS: &[CommandDef] = &[
    command!("vkAcquireNextImageKHR", Device, CommandGate::Extension(Extension::VK_KHR_swapchain), Driver),
    command!("vkAllocateCommandBuffers", Device, CORE_1_0, Driver),
    command!("vkAllocateMemory", Device, CORE_1_0, Driver),
    command!("vkBeginCommandBuffer", Device, CORE_1_0, Driver),
    command!("vkBindBufferMemory", Device, CORE_1_0, Driver),
    command!("vkBindBufferMemory2", Device, CORE_1_1, Driver),
    command!("vkBindBufferMemory2KHR", Device, CommandGate::Extension(Extension::VK_KHR_bind_memory2), Driver),
    command!("vkBindImageMemory", Device, CORE_1_0, Driver),
    command!("vkBindImageMemory2", Device, CORE_1_1, Driver),
    command!("vkBindImageMemory2KHR", Device, CommandGate::Extension(Extension::VK_KHR_bind_memory2), Driver),
    command!("vkCmdBindPipeline", Device, CORE_1_0, Driver),
    command!("vkCmdCopyBuffer", Device, CORE_1_0, Driver),
    command!("vkCmdDispatch", Device, CORE_1_0, Driver),
    command!("vkCmdDispatchBase", Device, CORE_1_1, Driver),
    command!("vkCmdDispatchBaseKHR", Device, CommandGate::Extension(Extension::VK_KHR_device_group), Driver),
    command!("vkCmdDraw", Device, CORE_1_0, Driver),
    command!("vkCmdPipelineBarrier", Device, CORE_1_0, Driver),
    command!("vkCmdSetDeviceMask", Device, CORE_1_1, Driver),
    command!("vkCmdSetDeviceMaskKHR", Device, CommandGate::Extension(Extension::VK_KHR_device_group), Driver),
    command!("vkCreateBuffer", Device, CORE_1_0, Driver),
    command!("vkCreateCommandPool", Device, CORE_1_0, Driver),
    command!("vkCreateComputePipelines", Device, CORE_1_0, Driver),
    command!("vkCreateDebugUtilsMessengerEXT", Instance, CommandGate::Extension(Extension::VK_EXT_debug_utils), Loader),
    command!("vkCreateDevice", Instance, CORE_1_0, Loader),
    command!("vkCreateFence", Device, CORE_1_0, Driver),
    command!("vkCreateGraphicsPipelines", Device, CORE_1_0, Driver),
    command!("vkCreateImage", Device, CORE_1_0, Driver),
    command!("vkCreateImageView", Device, CORE_1_0, Driver),
    command!("vkCreateInstance", Global, CORE_1_0, Loader),
    command!("vkCreatePipelineLayout", Device, CORE_1_0, Driver),
    command!("vkCreateSemaphore", Device, CORE_1_0, Driver),
    command!("vkCreateShaderModule", Device, CORE_1_0, Driver),
    command!("vkCreateSwapchainKHR", Device, CommandGate::Extension(Extension::VK_KHR_swapchain), Driver),
    #[cfg(feature = "wayland-surface")]
    command!("vkCreateWaylandSurfaceKHR", Instance, CommandGate::Extension(Extension::VK_KHR_wayland_surface), Loader),
    #[cfg(all(windows, feature = "win32-surface"))]
    command!("vkCreateWin32SurfaceKHR", Instance, CommandGate::Extension(Extension::VK_KHR_win32_surface), Loader),
    #[cfg(all(unix, feature = "xcb-surface"))]
    command!("vkCreateXcbSurfaceKHR", Instance, CommandGate::Extension(Extension::VK_KHR_xcb_surface), Loader),
    #[cfg(feature = "xlib-surface")]
    command!("vkCreateXlibSurfaceKHR", Instance, CommandGate::Extension(Extension::VK_KHR_xlib_surface), Loader),
    command!("vkDestroyBuffer", Device, CORE_1_0, Driver),
    command!("vkDestroyCommandPool", Device, CORE_1_0, Driver),
    command!("vkDestroyDebugUtilsMessengerEXT", Instance, CommandGate::Extension(Extension::VK_EXT_debug_utils), Loader),
    command!("vkDestroyDevice", Device, CORE_1_0, Loader),
    command!("vkDestroyFence", Device, CORE_1_0, Driver),
    command!("vkDestroyImage", Device, CORE_1_0, Driver),
    command!("vkDestroyImageView", Device, CORE_1_0, Driver),
    command!("vkDestroyInstance", Instance, CORE_1_0, Loader),
    command!("vkDestroyPipeline", Device, CORE_1_0, Driver),
    command!("vkDestroyPipelineLayout", Device, CORE_1_0, Driver),
    command!("vkDestroySemaphore", Device, CORE_1_0, Driver),
    command!("vkDestroyShaderModule", Device, CORE_1_0, Driver),
    command!("vkDestroySurfaceKHR", Instance, CommandGate::Extension(Extension::VK_KHR_surface), Loader),
    command!("vkDestroySwapchainKHR", Device, CommandGate::Extension(Extension::VK_KHR_swapchain), Driver),
    command!("vkDeviceWaitIdle", Device, CORE_1_0, Driver),
    command!("vkEndCommandBuffer", Device, CORE_1_0, Driver),
    command!("vkEnumerateDeviceExtensionProperties", Instance, CORE_1_0, Loader),
    command!("vkEnumerateDeviceLayerProperties", Instance, CORE_1_0, Loader),
    command!("vkEnumerateInstanceExtensionProperties", Global, CORE_1_0, Loader),
    command!("vkEnumerateInstanceLayerProperties", Global, CORE_1_0, Loader),
    command!("vkEnumerateInstanceVersion", Global, CORE_1_1, Loader),
    command!("vkEnumeratePhysicalDeviceGroups", Instance, CORE_1_1, Loader),
    command!("vkEnumeratePhysicalDeviceGroupsKHR", Instance, CommandGate::Extension(Extension::VK_KHR_device_group_creation), Loader),
    command!("vkEnumeratePhysicalDevices", Instance, CORE_1_0, Loader),
    command!("vkFlushMappedMemoryRanges", Device, CORE_1_0, Driver),
    command!("vkFreeCommandBuffers", Device, CORE_1_0, Driver),
    command!("vkFreeMemory", Device, CORE_1_0, Driver),
    command!("vkGetBufferMemoryRequirements", Device, CORE_1_0, Driver),
    command!("vkGetBufferMemoryRequirements2", Device, CORE_1_1, Driver),
    command!("vkGetBufferMemoryRequirements2KHR", Device, CommandGate::Extension(Extension::VK_KHR_get_memory_requirements2), Driver),
    command!("vkGetDeviceGroupPeerMemoryFeatures", Device, CORE_1_1, Driver),
    command!("vkGetDeviceGroupPeerMemoryFeaturesKHR", Device, CommandGate::Extension(Extension::VK_KHR_device_group), Driver),
    command!("vkGetDeviceProcAddr", Device, CORE_1_0, Loader),
    command!("vkGetDeviceQueue", Device, CORE_1_0, Driver),
    command!("vkGetDeviceQueue2", Device, CORE_1_1, Driver),
    command!("vkGetFenceStatus", Device, CORE_1_0, Driver),
    command!("vkGetImageMemoryRequirements", Device, CORE_1_0, Driver),
    command!("vkGetImageMemoryRequirements2", Device, CORE_1_1, Driver),
    command!("vkGetImageMemoryRequirements2KHR", Device, CommandGate::Extension(Extension::VK_KHR_get_memory_requirements2), Driver),
    command!("vkGetInstanceProcAddr", Instance, CORE_1_0, Loader),
    command!("vkGetPhysicalDeviceFeatures", Instance, CORE_1_0, Loader),
    command!("vkGetPhysicalDeviceFeatures2", Instance, CORE_1_1, Loader),
    command!("vkGetPhysicalDeviceFeatures2KHR", Instance, CommandGate::Extension(Extension::VK_KHR_get_physical_device_properties2), Loader),
    command!("vkGetPhysicalDeviceFormatProperties", Instance, CORE_1_0, Loader),
    command!("vkGetPhysicalDeviceFormatProperties2", Instance, CORE_1_1, Loader),
    command!("vkGetPhysicalDeviceFormatProperties2KHR", Instance, CommandGate::Extension(Extension::VK_KHR_get_physical_device_properties2), Loader),
    command!("vkGetPhysicalDeviceImageFormatProperties", Instance, CORE_1_0, Loader),
    command!("vkGetPhysicalDeviceImageFormatProperties2", Instance, CORE_1_1, Loader),
    command!("vkGetPhysicalDeviceImageFormatProperties2KHR", Instance, CommandGate::Extension(Extension::VK_KHR_get_physical_device_properties2), Loader),
    command!("vkGetPhysicalDeviceMemoryProperties", Instance, CORE_1_0, Loader),
    command!("vkGetPhysicalDeviceMemoryProperties2", Instance, CORE_1_1, Loader),
    command!("vkGetPhysicalDeviceMemoryProperties2KHR", Instance, CommandGate::Extension(Extension::VK_KHR_get_physical_device_properties2), Loader),
    command!("vkGetPhysicalDeviceProperties", Instance, CORE_1_0, Loader),
    command!("vkGetPhysicalDeviceProperties2", Instance, CORE_1_1, Loader),
    command!("vkGetPhysicalDeviceProperties2KHR", Instance, CommandGate::Extension(Extension::VK_KHR_get_physical_device_properties2), Loader),
    command!("vkGetPhysicalDeviceQueueFamilyProperties", Instance, CORE_1_0, Loader),
    command!("vkGetPhysicalDeviceQueueFamilyProperties2", Instance, CORE_1_1, Loader),
    command!("vkGetPhysicalDeviceQueueFamilyProperties2KHR", Instance, CommandGate::Extension(Extension::VK_KHR_get_physical_device_properties2), Loader),
    command!("vkGetPhysicalDeviceSparseImageFormatProperties", Instance, CORE_1_0, Loader),
    command!("vkGetPhysicalDeviceSparseImageFormatProperties2", Instance, CORE_1_1, Loader),
    command!("vkGetPhysicalDeviceSparseImageFormatProperties2KHR", Instance, CommandGate::Extension(Extension::VK_KHR_get_physical_device_properties2), Loader),
    command!("vkGetPhysicalDeviceSurfaceCapabilitiesKHR", Instance, CommandGate::Extension(Extension::VK_KHR_surface), Loader),
    command!("vkGetPhysicalDeviceSurfaceFormatsKHR", Instance, CommandGate::Extension(Extension::VK_KHR_surface), Loader),
    command!("vkGetPhysicalDeviceSurfacePresentModesKHR", Instance, CommandGate::Extension(Extension::VK_KHR_surface), Loader),
    command!("vkGetPhysicalDeviceSurfaceSupportKHR", Instance, CommandGate::Extension(Extension::VK_KHR_surface), Loader),
    #[cfg(feature = "wayland-surface")]
    command!("vkGetPhysicalDeviceWaylandPresentationSupportKHR", Instance, CommandGate::Extension(Extension::VK_KHR_wayland_surface), Loader),
    #[cfg(all(windows, feature = "win32-surface"))]
    command!("vkGetPhysicalDeviceWin32PresentationSupportKHR", Instance, CommandGate::Extension(Extension::VK_KHR_win32_surface), Loader),
    #[cfg(all(unix, feature = "xcb-surface"))]
    command!("vkGetPhysicalDeviceXcbPresentationSupportKHR", Instance, CommandGate::Extension(Extension::VK_KHR_xcb_surface), Loader),
    #[cfg(feature = "xlib-surface")]
    command!("vkGetPhysicalDeviceXlibPresentationSupportKHR", Instance, CommandGate::Extension(Extension::VK_KHR_xlib_surface), Loader),
    command!("vkGetSwapchainImagesKHR", Device, CommandGate::Extension(Extension::VK_KHR_swapchain), Driver),
    command!("vkInvalidateMappedMemoryRanges", Device, CORE_1_0, Driver),
    command!("vkMapMemory", Device, CORE_1_0, Driver),
    command!("vkQueuePresentKHR", Device, CommandGate::Extension(Extension::VK_KHR_swapchain), Driver),
    command!("vkQueueSubmit", Device, CORE_1_0, Driver),
    command!("vkQueueWaitIdle", Device, CORE_1_0, Driver),
    command!("vkResetCommandBuffer", Device, CORE_1_0, Driver),
    command!("vkResetCommandPool", Device, CORE_1_0, Driver),
    command!("vkResetFences", Device, CORE_1_0, Driver),
    command!("vkSubmitDebugUtilsMessageEXT", Instance, CommandGate::Extension(Extension::VK_EXT_debug_utils), Loader),
    command!("vkTrimCommandPool", Device, CORE_1_1, Driver),
    command!("vkTrimCommandPoolKHR", Device, CommandGate::Extension(Extension::VK_KHR_maintenance1), Driver),
    command!("vkUnmapMemory", Device, CORE_1_0, Driver),
    command!("vkWaitForFences", Device, CORE_1_0, Driver),
];

pub fn lookup(name: &str) -> Option<&'static CommandDef> {
    COMMANDS
        .binary_search_by(|v| v.name.cmp(name))
        .ok()
        .map(|i| &COMMANDS[i])
}

/// the loader's own entry point for a command, in `PFN_vkVoidFunction` form
fn loader_trampoline(name: &str) -> api::PFN_vkVoidFunction {
    use std::mem::transmute;
    macro_rules! proc_address {
        ($name:ident, $pfn_name:ty, $f:path) => {
            if stringify!($name) == name {
                let f: $pfn_name = Some($f);
                return unsafe { transmute(f) };
            }
        };
    }
    #[cfg_attr(rustfmt, rustfmt_skip)]
    {
        proc_address!(vkCreateDebugUtilsMessengerEXT, api::PFN_vkCreateDebugUtilsMessengerEXT, crate::instance::vkCreateDebugUtilsMessengerEXT);
        proc_address!(vkCreateDevice, api::PFN_vkCreateDevice, crate::device::vkCreateDevice);
        proc_address!(vkCreateInstance, api::PFN_vkCreateInstance, crate::instance::vkCreateInstance);
        #[cfg(feature = "wayland-surface")]
        proc_address!(vkCreateWaylandSurfaceKHR, api::PFN_vkCreateWaylandSurfaceKHR, crate::surface::vkCreateWaylandSurfaceKHR);
        #[cfg(all(windows, feature = "win32-surface"))]
        proc_address!(vkCreateWin32SurfaceKHR, api::PFN_vkCreateWin32SurfaceKHR, crate::surface::vkCreateWin32SurfaceKHR);
        #[cfg(all(unix, feature = "xcb-surface"))]
        proc_address!(vkCreateXcbSurfaceKHR, api::PFN_vkCreateXcbSurfaceKHR, crate::surface::vkCreateXcbSurfaceKHR);
        #[cfg(feature = "xlib-surface")]
        proc_address!(vkCreateXlibSurfaceKHR, api::PFN_vkCreateXlibSurfaceKHR, crate::surface::vkCreateXlibSurfaceKHR);
        proc_address!(vkDestroyDebugUtilsMessengerEXT, api::PFN_vkDestroyDebugUtilsMessengerEXT, crate::instance::vkDestroyDebugUtilsMessengerEXT);
        proc_address!(vkDestroyDevice, api::PFN_vkDestroyDevice, crate::device::vkDestroyDevice);
        proc_address!(vkDestroyInstance, api::PFN_vkDestroyInstance, crate::instance::vkDestroyInstance);
        proc_address!(vkDestroySurfaceKHR, api::PFN_vkDestroySurfaceKHR, crate::surface::vkDestroySurfaceKHR);
        proc_address!(vkEnumerateDeviceExtensionProperties, api::PFN_vkEnumerateDeviceExtensionProperties, crate::instance::vkEnumerateDeviceExtensionProperties);
        proc_address!(vkEnumerateDeviceLayerProperties, api::PFN_vkEnumerateDeviceLayerProperties, crate::instance::vkEnumerateDeviceLayerProperties);
        proc_address!(vkEnumerateInstanceExtensionProperties, api::PFN_vkEnumerateInstanceExtensionProperties, crate::instance::vkEnumerateInstanceExtensionProperties);
        proc_address!(vkEnumerateInstanceLayerProperties, api::PFN_vkEnumerateInstanceLayerProperties, crate::instance::vkEnumerateInstanceLayerProperties);
        proc_address!(vkEnumerateInstanceVersion, api::PFN_vkEnumerateInstanceVersion, crate::instance::vkEnumerateInstanceVersion);
        proc_address!(vkEnumeratePhysicalDeviceGroups, api::PFN_vkEnumeratePhysicalDeviceGroups, crate::instance::vkEnumeratePhysicalDeviceGroups);
        proc_address!(vkEnumeratePhysicalDeviceGroupsKHR, api::PFN_vkEnumeratePhysicalDeviceGroups, crate::instance::vkEnumeratePhysicalDeviceGroupsKHR);
        proc_address!(vkEnumeratePhysicalDevices, api::PFN_vkEnumeratePhysicalDevices, crate::instance::vkEnumeratePhysicalDevices);
        proc_address!(vkGetDeviceProcAddr, api::PFN_vkGetDeviceProcAddr, crate::device::vkGetDeviceProcAddr);
        proc_address!(vkGetInstanceProcAddr, api::PFN_vkGetInstanceProcAddr, vkGetInstanceProcAddr);
        proc_address!(vkGetPhysicalDeviceFeatures, api::PFN_vkGetPhysicalDeviceFeatures, crate::instance::vkGetPhysicalDeviceFeatures);
        proc_address!(vkGetPhysicalDeviceFeatures2, api::PFN_vkGetPhysicalDeviceFeatures2, crate::instance::vkGetPhysicalDeviceFeatures2);
        proc_address!(vkGetPhysicalDeviceFeatures2KHR, api::PFN_vkGetPhysicalDeviceFeatures2, crate::instance::vkGetPhysicalDeviceFeatures2KHR);
        proc_address!(vkGetPhysicalDeviceFormatProperties, api::PFN_vkGetPhysicalDeviceFormatProperties, crate::instance::vkGetPhysicalDeviceFormatProperties);
        proc_address!(vkGetPhysicalDeviceFormatProperties2, api::PFN_vkGetPhysicalDeviceFormatProperties2, crate::instance::vkGetPhysicalDeviceFormatProperties2);
        proc_address!(vkGetPhysicalDeviceFormatProperties2KHR, api::PFN_vkGetPhysicalDeviceFormatProperties2, crate::instance::vkGetPhysicalDeviceFormatProperties2KHR);
        proc_address!(vkGetPhysicalDeviceImageFormatProperties, api::PFN_vkGetPhysicalDeviceImageFormatProperties, crate::instance::vkGetPhysicalDeviceImageFormatProperties);
        proc_address!(vkGetPhysicalDeviceImageFormatProperties2, api::PFN_vkGetPhysicalDeviceImageFormatProperties2, crate::instance::vkGetPhysicalDeviceImageFormatProperties2);
        proc_address!(vkGetPhysicalDeviceImageFormatProperties2KHR, api::PFN_vkGetPhysicalDeviceImageFormatProperties2, crate::instance::vkGetPhysicalDeviceImageFormatProperties2KHR);
        proc_address!(vkGetPhysicalDeviceMemoryProperties, api::PFN_vkGetPhysicalDeviceMemoryProperties, crate::instance::vkGetPhysicalDeviceMemoryProperties);
        proc_address!(vkGetPhysicalDeviceMemoryProperties2, api::PFN_vkGetPhysicalDeviceMemoryProperties2, crate::instance::vkGetPhysicalDeviceMemoryProperties2);
        proc_address!(vkGetPhysicalDeviceMemoryProperties2KHR, api::PFN_vkGetPhysicalDeviceMemoryProperties2, crate::instance::vkGetPhysicalDeviceMemoryProperties2KHR);
        proc_address!(vkGetPhysicalDeviceProperties, api::PFN_vkGetPhysicalDeviceProperties, crate::instance::vkGetPhysicalDeviceProperties);
        proc_address!(vkGetPhysicalDeviceProperties2, api::PFN_vkGetPhysicalDeviceProperties2, crate::instance::vkGetPhysicalDeviceProperties2);
        proc_address!(vkGetPhysicalDeviceProperties2KHR, api::PFN_vkGetPhysicalDeviceProperties2, crate::instance::vkGetPhysicalDeviceProperties2KHR);
        proc_address!(vkGetPhysicalDeviceQueueFamilyProperties, api::PFN_vkGetPhysicalDeviceQueueFamilyProperties, crate::instance::vkGetPhysicalDeviceQueueFamilyProperties);
        proc_address!(vkGetPhysicalDeviceQueueFamilyProperties2, api::PFN_vkGetPhysicalDeviceQueueFamilyProperties2, crate::instance::vkGetPhysicalDeviceQueueFamilyProperties2);
        proc_address!(vkGetPhysicalDeviceQueueFamilyProperties2KHR, api::PFN_vkGetPhysicalDeviceQueueFamilyProperties2, crate::instance::vkGetPhysicalDeviceQueueFamilyProperties2KHR);
        proc_address!(vkGetPhysicalDeviceSparseImageFormatProperties, api::PFN_vkGetPhysicalDeviceSparseImageFormatProperties, crate::instance::vkGetPhysicalDeviceSparseImageFormatProperties);
        proc_address!(vkGetPhysicalDeviceSparseImageFormatProperties2, api::PFN_vkGetPhysicalDeviceSparseImageFormatProperties2, crate::instance::vkGetPhysicalDeviceSparseImageFormatProperties2);
        proc_address!(vkGetPhysicalDeviceSparseImageFormatProperties2KHR, api::PFN_vkGetPhysicalDeviceSparseImageFormatProperties2, crate::instance::vkGetPhysicalDeviceSparseImageFormatProperties2KHR);
        proc_address!(vkGetPhysicalDeviceSurfaceCapabilitiesKHR, api::PFN_vkGetPhysicalDeviceSurfaceCapabilitiesKHR, crate::surface::vkGetPhysicalDeviceSurfaceCapabilitiesKHR);
        proc_address!(vkGetPhysicalDeviceSurfaceFormatsKHR, api::PFN_vkGetPhysicalDeviceSurfaceFormatsKHR, crate::surface::vkGetPhysicalDeviceSurfaceFormatsKHR);
        proc_address!(vkGetPhysicalDeviceSurfacePresentModesKHR, api::PFN_vkGetPhysicalDeviceSurfacePresentModesKHR, crate::surface::vkGetPhysicalDeviceSurfacePresentModesKHR);
        proc_address!(vkGetPhysicalDeviceSurfaceSupportKHR, api::PFN_vkGetPhysicalDeviceSurfaceSupportKHR, crate::surface::vkGetPhysicalDeviceSurfaceSupportKHR);
        #[cfg(feature = "wayland-surface")]
        proc_address!(vkGetPhysicalDeviceWaylandPresentationSupportKHR, api::PFN_vkGetPhysicalDeviceWaylandPresentationSupportKHR, crate::surface::vkGetPhysicalDeviceWaylandPresentationSupportKHR);
        #[cfg(all(windows, feature = "win32-surface"))]
        proc_address!(vkGetPhysicalDeviceWin32PresentationSupportKHR, api::PFN_vkGetPhysicalDeviceWin32PresentationSupportKHR, crate::surface::vkGetPhysicalDeviceWin32PresentationSupportKHR);
        #[cfg(all(unix, feature = "xcb-surface"))]
        proc_address!(vkGetPhysicalDeviceXcbPresentationSupportKHR, api::PFN_vkGetPhysicalDeviceXcbPresentationSupportKHR, crate::surface::vkGetPhysicalDeviceXcbPresentationSupportKHR);
        #[cfg(feature = "xlib-surface")]
        proc_address!(vkGetPhysicalDeviceXlibPresentationSupportKHR, api::PFN_vkGetPhysicalDeviceXlibPresentationSupportKHR, crate::surface::vkGetPhysicalDeviceXlibPresentationSupportKHR);
        proc_address!(vkSubmitDebugUtilsMessageEXT, api::PFN_vkSubmitDebugUtilsMessageEXT, crate::instance::vkSubmitDebugUtilsMessageEXT);
    }
    None
}

fn resolve_global_command(name: &str) -> api::PFN_vkVoidFunction {
    // resolvable with a null instance since Vulkan 1.2
    if name == "vkGetInstanceProcAddr" {
        return loader_trampoline(name);
    }
    let def = lookup(name)?;
    if def.scope != CommandScope::Global {
        return None;
    }
    match def.gate {
        CommandGate::Core(version) if version <= LOADER_API_VERSION => loader_trampoline(name),
        _ => None,
    }
}

pub(crate) fn resolve_instance_command(
    instance: &Instance,
    name: &str,
) -> api::PFN_vkVoidFunction {
    let def = lookup(name)?;
    match def.scope {
        CommandScope::Global => match def.gate {
            CommandGate::Core(version) if version <= LOADER_API_VERSION => {
                loader_trampoline(name)
            }
            _ => None,
        },
        CommandScope::Instance => {
            match def.gate {
                CommandGate::Core(version) => {
                    if version > instance.api_version {
                        return None;
                    }
                }
                CommandGate::Extension(extension) => {
                    if !instance.enabled_extensions[extension] {
                        return None;
                    }
                }
            }
            loader_trampoline(name)
        }
        CommandScope::Device => {
            if let CommandGate::Core(version) = def.gate {
                if version > instance.api_version {
                    return None;
                }
            }
            match def.dispatch {
                CommandDispatch::Loader => loader_trampoline(name),
                // a raw driver pointer cannot branch per driver, so
                // device-scope queries through the instance only work when
                // exactly one driver backs it; vkGetDeviceProcAddr always
                // works
                CommandDispatch::Driver => {
                    if instance.terminator.drivers.len() == 1 {
                        let driver = &instance.terminator.drivers[0];
                        let name = CString::new(name).unwrap();
                        unsafe { (driver.gipa)(driver.instance, name.as_ptr()) }
                    } else {
                        log::debug!(
                            "device command {} queried through vkGetInstanceProcAddr on a \
                             multi-driver instance",
                            name
                        );
                        None
                    }
                }
            }
        }
    }
}

pub(crate) fn resolve_device_command(device: &LoaderDevice, name: &str) -> api::PFN_vkVoidFunction {
    let def = lookup(name)?;
    if def.scope != CommandScope::Device {
        return None;
    }
    match def.gate {
        CommandGate::Core(version) => {
            if version > device.api_version {
                return None;
            }
        }
        CommandGate::Extension(extension) => {
            if !device.enabled_extensions[extension] {
                return None;
            }
        }
    }
    match def.dispatch {
        CommandDispatch::Loader => loader_trampoline(name),
        CommandDispatch::Driver => device.table.get(name),
    }
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkGetInstanceProcAddr(
    instance: api::VkInstance,
    name: *const c_char,
) -> api::PFN_vkVoidFunction {
    let name = CStr::from_ptr(name).to_str().ok()?;
    match SharedHandle::try_from(instance) {
        Some(instance) => resolve_instance_command(&instance, name),
        None => resolve_global_command(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::DeviceTable;

    #[test]
    fn registry_is_sorted_and_unique() {
        for pair in COMMANDS.windows(2) {
            assert!(
                pair[0].name < pair[1].name,
                "{} is not sorted before {}",
                pair[0].name,
                pair[1].name
            );
        }
    }

    #[test]
    fn lookup_finds_known_commands() {
        assert_eq!(lookup("vkCreateInstance").unwrap().scope, CommandScope::Global);
        assert_eq!(lookup("vkQueueSubmit").unwrap().scope, CommandScope::Device);
        assert!(lookup("vkNotACommand").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn every_loader_command_has_a_trampoline() {
        for def in COMMANDS {
            match def.dispatch {
                CommandDispatch::Loader => assert!(
                    loader_trampoline(def.name).is_some(),
                    "{} has no loader entry point",
                    def.name
                ),
                CommandDispatch::Driver => assert!(
                    loader_trampoline(def.name).is_none(),
                    "{} is driver-dispatched but has a loader entry point",
                    def.name
                ),
            }
        }
    }

    #[test]
    fn driver_device_commands_have_table_slots() {
        for def in COMMANDS {
            if def.scope == CommandScope::Device {
                match def.dispatch {
                    CommandDispatch::Driver => assert!(
                        DeviceTable::PASSTHROUGH_COMMAND_NAMES.contains(&def.name),
                        "{} has no device table slot",
                        def.name
                    ),
                    CommandDispatch::Loader => assert!(
                        !DeviceTable::PASSTHROUGH_COMMAND_NAMES.contains(&def.name),
                        "{} is intercepted but also in the device table",
                        def.name
                    ),
                }
            }
        }
    }

    #[test]
    fn global_resolution_without_an_instance() {
        assert!(resolve_global_command("vkCreateInstance").is_some());
        assert!(resolve_global_command("vkEnumerateInstanceExtensionProperties").is_some());
        assert!(resolve_global_command("vkEnumerateInstanceVersion").is_some());
        assert!(resolve_global_command("vkGetInstanceProcAddr").is_some());
        // instance- and device-scope commands need an instance
        assert!(resolve_global_command("vkEnumeratePhysicalDevices").is_none());
        assert!(resolve_global_command("vkQueueSubmit").is_none());
        assert!(resolve_global_command("vkNotACommand").is_none());
    }

    #[test]
    fn extension_gates_are_scoped_to_the_registry() {
        // every extension-gated command names an extension of the matching
        // scope, or a device extension reachable from the instance
        use crate::extensions::ExtensionScope;
        for def in COMMANDS {
            if let CommandGate::Extension(extension) = def.gate {
                match def.scope {
                    CommandScope::Instance => {
                        assert_eq!(
                            extension.get_scope(),
                            ExtensionScope::Instance,
                            "{} gated on a device extension",
                            def.name
                        );
                    }
                    CommandScope::Device => {
                        assert_eq!(
                            extension.get_scope(),
                            ExtensionScope::Device,
                            "{} gated on an instance extension",
                            def.name
                        );
                    }
                    CommandScope::Global => {
                        panic!("{} is global but extension-gated", def.name);
                    }
                }
            }
        }
    }
}
