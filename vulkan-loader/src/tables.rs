// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information
//! per-driver dispatch tables, loaded once through the driver's
//! `GetInstanceProcAddr`/`GetDeviceProcAddr`

use crate::api;
use std::mem::transmute;
use std::os::raw::c_char;

macro_rules! instance_table {
    { $($name:ident: $pfn:ty,)* } => {
        /// function pointers for the instance-scope commands the loader
        /// calls into a driver; extension slots stay null when the driver
        /// does not expose the command
        #[allow(non_snake_case)]
        pub struct InstanceTable {
            $(pub $name: $pfn,)*
        }

        impl InstanceTable {
            pub unsafe fn load(
                gipa: unsafe extern "system" fn(
                    api::VkIcdInstance,
                    *const c_char,
                ) -> api::PFN_vkVoidFunction,
                instance: api::VkIcdInstance,
            ) -> InstanceTable {
                InstanceTable {
                    $($name: transmute(gipa(
                        instance,
                        concat!(stringify!($name), "\0").as_ptr() as *const c_char,
                    )),)*
                }
            }
        }
    };
}

instance_table! {
    vkDestroyInstance: api::icd::PFN_vkDestroyInstance,
    vkEnumeratePhysicalDevices: api::icd::PFN_vkEnumeratePhysicalDevices,
    vkEnumeratePhysicalDeviceGroups: api::icd::PFN_vkEnumeratePhysicalDeviceGroups,
    vkEnumeratePhysicalDeviceGroupsKHR: api::icd::PFN_vkEnumeratePhysicalDeviceGroups,
    vkGetPhysicalDeviceFeatures: api::icd::PFN_vkGetPhysicalDeviceFeatures,
    vkGetPhysicalDeviceProperties: api::icd::PFN_vkGetPhysicalDeviceProperties,
    vkGetPhysicalDeviceFormatProperties: api::icd::PFN_vkGetPhysicalDeviceFormatProperties,
    vkGetPhysicalDeviceImageFormatProperties: api::icd::PFN_vkGetPhysicalDeviceImageFormatProperties,
    vkGetPhysicalDeviceQueueFamilyProperties: api::icd::PFN_vkGetPhysicalDeviceQueueFamilyProperties,
    vkGetPhysicalDeviceMemoryProperties: api::icd::PFN_vkGetPhysicalDeviceMemoryProperties,
    vkGetPhysicalDeviceSparseImageFormatProperties: api::icd::PFN_vkGetPhysicalDeviceSparseImageFormatProperties,
    vkGetPhysicalDeviceFeatures2: api::icd::PFN_vkGetPhysicalDeviceFeatures2,
    vkGetPhysicalDeviceFeatures2KHR: api::icd::PFN_vkGetPhysicalDeviceFeatures2,
    vkGetPhysicalDeviceProperties2: api::icd::PFN_vkGetPhysicalDeviceProperties2,
    vkGetPhysicalDeviceProperties2KHR: api::icd::PFN_vkGetPhysicalDeviceProperties2,
    vkGetPhysicalDeviceFormatProperties2: api::icd::PFN_vkGetPhysicalDeviceFormatProperties2,
    vkGetPhysicalDeviceFormatProperties2KHR: api::icd::PFN_vkGetPhysicalDeviceFormatProperties2,
    vkGetPhysicalDeviceImageFormatProperties2: api::icd::PFN_vkGetPhysicalDeviceImageFormatProperties2,
    vkGetPhysicalDeviceImageFormatProperties2KHR: api::icd::PFN_vkGetPhysicalDeviceImageFormatProperties2,
    vkGetPhysicalDeviceQueueFamilyProperties2: api::icd::PFN_vkGetPhysicalDeviceQueueFamilyProperties2,
    vkGetPhysicalDeviceQueueFamilyProperties2KHR: api::icd::PFN_vkGetPhysicalDeviceQueueFamilyProperties2,
    vkGetPhysicalDeviceMemoryProperties2: api::icd::PFN_vkGetPhysicalDeviceMemoryProperties2,
    vkGetPhysicalDeviceMemoryProperties2KHR: api::icd::PFN_vkGetPhysicalDeviceMemoryProperties2,
    vkGetPhysicalDeviceSparseImageFormatProperties2: api::icd::PFN_vkGetPhysicalDeviceSparseImageFormatProperties2,
    vkGetPhysicalDeviceSparseImageFormatProperties2KHR: api::icd::PFN_vkGetPhysicalDeviceSparseImageFormatProperties2,
    vkCreateDevice: api::icd::PFN_vkCreateDevice,
    vkEnumerateDeviceExtensionProperties: api::icd::PFN_vkEnumerateDeviceExtensionProperties,
    vkGetDeviceProcAddr: api::icd::PFN_vkGetDeviceProcAddr,
    vkGetPhysicalDeviceSurfaceSupportKHR: api::icd::PFN_vkGetPhysicalDeviceSurfaceSupportKHR,
    vkGetPhysicalDeviceSurfaceCapabilitiesKHR: api::icd::PFN_vkGetPhysicalDeviceSurfaceCapabilitiesKHR,
    vkGetPhysicalDeviceSurfaceFormatsKHR: api::icd::PFN_vkGetPhysicalDeviceSurfaceFormatsKHR,
    vkGetPhysicalDeviceSurfacePresentModesKHR: api::icd::PFN_vkGetPhysicalDeviceSurfacePresentModesKHR,
}

impl InstanceTable {
    /// the core 1.0 slots the loader cannot work without; the trampolines
    /// treat a null core slot as fatal, so reject such drivers up front
    pub fn has_required_commands(&self) -> bool {
        self.vkDestroyInstance.is_some()
            && self.vkEnumeratePhysicalDevices.is_some()
            && self.vkGetPhysicalDeviceFeatures.is_some()
            && self.vkGetPhysicalDeviceProperties.is_some()
            && self.vkGetPhysicalDeviceFormatProperties.is_some()
            && self.vkGetPhysicalDeviceImageFormatProperties.is_some()
            && self.vkGetPhysicalDeviceQueueFamilyProperties.is_some()
            && self.vkGetPhysicalDeviceMemoryProperties.is_some()
            && self.vkGetPhysicalDeviceSparseImageFormatProperties.is_some()
            && self.vkCreateDevice.is_some()
            && self.vkEnumerateDeviceExtensionProperties.is_some()
            && self.vkGetDeviceProcAddr.is_some()
    }
}

macro_rules! device_table {
    {
        typed {
            $($typed_name:ident: $pfn:ty,)*
        }
        passthrough {
            $($name:ident,)*
        }
    } => {
        /// device-scope command slots; everything but the intercepted
        /// commands is handed to the application untouched
        #[allow(non_snake_case)]
        pub struct DeviceTable {
            $(pub $typed_name: $pfn,)*
            $(pub $name: api::PFN_vkVoidFunction,)*
        }

        impl DeviceTable {
            pub unsafe fn load(
                gdpa: unsafe extern "system" fn(
                    api::VkDevice,
                    *const c_char,
                ) -> api::PFN_vkVoidFunction,
                device: api::VkDevice,
            ) -> DeviceTable {
                DeviceTable {
                    $($typed_name: transmute(gdpa(
                        device,
                        concat!(stringify!($typed_name), "\0").as_ptr() as *const c_char,
                    )),)*
                    $($name: gdpa(
                        device,
                        concat!(stringify!($name), "\0").as_ptr() as *const c_char,
                    ),)*
                }
            }

            pub fn get(&self, name: &str) -> api::PFN_vkVoidFunction {
                $(if name == stringify!($name) {
                    return self.$name;
                })*
                None
            }

            pub const PASSTHROUGH_COMMAND_NAMES: &'static [&'static str] =
                &[$(stringify!($name)),*];
        }
    };
}

device_table! {
    typed {
        vkDestroyDevice: api::icd::PFN_vkDestroyDevice,
    }
    passthrough {
        vkGetDeviceQueue,
        vkQueueSubmit,
        vkQueueWaitIdle,
        vkDeviceWaitIdle,
        vkAllocateMemory,
        vkFreeMemory,
        vkMapMemory,
        vkUnmapMemory,
        vkFlushMappedMemoryRanges,
        vkInvalidateMappedMemoryRanges,
        vkBindBufferMemory,
        vkBindImageMemory,
        vkGetBufferMemoryRequirements,
        vkGetImageMemoryRequirements,
        vkCreateFence,
        vkDestroyFence,
        vkResetFences,
        vkGetFenceStatus,
        vkWaitForFences,
        vkCreateSemaphore,
        vkDestroySemaphore,
        vkCreateBuffer,
        vkDestroyBuffer,
        vkCreateImage,
        vkDestroyImage,
        vkCreateImageView,
        vkDestroyImageView,
        vkCreateShaderModule,
        vkDestroyShaderModule,
        vkCreateGraphicsPipelines,
        vkCreateComputePipelines,
        vkDestroyPipeline,
        vkCreatePipelineLayout,
        vkDestroyPipelineLayout,
        vkCreateCommandPool,
        vkDestroyCommandPool,
        vkResetCommandPool,
        vkAllocateCommandBuffers,
        vkFreeCommandBuffers,
        vkBeginCommandBuffer,
        vkEndCommandBuffer,
        vkResetCommandBuffer,
        vkCmdBindPipeline,
        vkCmdDraw,
        vkCmdDispatch,
        vkCmdDispatchBase,
        vkCmdDispatchBaseKHR,
        vkCmdSetDeviceMask,
        vkCmdSetDeviceMaskKHR,
        vkCmdCopyBuffer,
        vkCmdPipelineBarrier,
        vkBindBufferMemory2,
        vkBindBufferMemory2KHR,
        vkBindImageMemory2,
        vkBindImageMemory2KHR,
        vkGetBufferMemoryRequirements2,
        vkGetBufferMemoryRequirements2KHR,
        vkGetImageMemoryRequirements2,
        vkGetImageMemoryRequirements2KHR,
        vkGetDeviceGroupPeerMemoryFeatures,
        vkGetDeviceGroupPeerMemoryFeaturesKHR,
        vkTrimCommandPool,
        vkTrimCommandPoolKHR,
        vkGetDeviceQueue2,
        vkCreateSwapchainKHR,
        vkDestroySwapchainKHR,
        vkGetSwapchainImagesKHR,
        vkAcquireNextImageKHR,
        vkQueuePresentKHR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::ptr::null_mut;

    unsafe extern "system" fn nop() {}

    unsafe extern "system" fn gipa_all(
        _instance: api::VkIcdInstance,
        _name: *const c_char,
    ) -> api::PFN_vkVoidFunction {
        Some(nop)
    }

    unsafe extern "system" fn gipa_none(
        _instance: api::VkIcdInstance,
        _name: *const c_char,
    ) -> api::PFN_vkVoidFunction {
        None
    }

    unsafe extern "system" fn gdpa_core_only(
        _device: api::VkDevice,
        name: *const c_char,
    ) -> api::PFN_vkVoidFunction {
        let name = CStr::from_ptr(name).to_str().unwrap();
        if name.ends_with("KHR") {
            None
        } else {
            Some(nop)
        }
    }

    #[test]
    fn instance_table_loads_every_slot() {
        let table = unsafe { InstanceTable::load(gipa_all, null_mut()) };
        assert!(table.has_required_commands());
        assert!(table.vkGetPhysicalDeviceFeatures2KHR.is_some());
    }

    #[test]
    fn missing_core_commands_are_detected() {
        let table = unsafe { InstanceTable::load(gipa_none, null_mut()) };
        assert!(!table.has_required_commands());
    }

    #[test]
    fn device_table_lookup_by_name() {
        let table = unsafe { DeviceTable::load(gdpa_core_only, null_mut()) };
        assert!(table.get("vkQueueSubmit").is_some());
        assert!(table.get("vkCreateSwapchainKHR").is_none());
        assert!(table.get("vkNotACommand").is_none());
        assert!(table.vkDestroyDevice.is_some());
    }

    #[test]
    fn passthrough_names_match_fields() {
        assert!(DeviceTable::PASSTHROUGH_COMMAND_NAMES.contains(&"vkGetDeviceQueue"));
        assert!(!DeviceTable::PASSTHROUGH_COMMAND_NAMES.contains(&"vkDestroyDevice"));
    }
}
