// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

use crate::api;
use crate::util::copy_str_to_char_array;
use enum_map::EnumMap;
use std::iter::FromIterator;
use std::ops::{BitAnd, BitOr, BitXor, Deref, DerefMut, Not};
use std::str::FromStr;

/// the extensions the loader itself understands and gates commands on;
/// drivers may expose more, which pass through untouched
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Enum)]
#[allow(non_camel_case_types)]
pub enum Extension {
    VK_KHR_surface,
    #[cfg(all(unix, feature = "xcb-surface"))]
    VK_KHR_xcb_surface,
    #[cfg(feature = "xlib-surface")]
    VK_KHR_xlib_surface,
    #[cfg(feature = "wayland-surface")]
    VK_KHR_wayland_surface,
    #[cfg(all(windows, feature = "win32-surface"))]
    VK_KHR_win32_surface,
    VK_KHR_get_physical_device_properties2,
    VK_KHR_device_group_creation,
    VK_KHR_external_memory_capabilities,
    VK_KHR_external_fence_capabilities,
    VK_KHR_external_semaphore_capabilities,
    VK_EXT_debug_utils,
    VK_KHR_swapchain,
    VK_KHR_maintenance1,
    VK_KHR_bind_memory2,
    VK_KHR_get_memory_requirements2,
    VK_KHR_dedicated_allocation,
    VK_KHR_device_group,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExtensionScope {
    Device,
    Instance,
}

macro_rules! extensions {
    [$($extension:expr),*] => {
        {
            let extensions: Extensions = [$($extension),*].iter().map(|v|*v).collect();
            extensions
        }
    };
}

impl Extension {
    pub fn get_required_extensions(self) -> Extensions {
        match self {
            Extension::VK_KHR_surface
            | Extension::VK_KHR_get_physical_device_properties2
            | Extension::VK_KHR_device_group_creation
            | Extension::VK_EXT_debug_utils
            | Extension::VK_KHR_maintenance1
            | Extension::VK_KHR_bind_memory2
            | Extension::VK_KHR_get_memory_requirements2 => extensions![],
            #[cfg(all(unix, feature = "xcb-surface"))]
            Extension::VK_KHR_xcb_surface => extensions![Extension::VK_KHR_surface],
            #[cfg(feature = "xlib-surface")]
            Extension::VK_KHR_xlib_surface => extensions![Extension::VK_KHR_surface],
            #[cfg(feature = "wayland-surface")]
            Extension::VK_KHR_wayland_surface => extensions![Extension::VK_KHR_surface],
            #[cfg(all(windows, feature = "win32-surface"))]
            Extension::VK_KHR_win32_surface => extensions![Extension::VK_KHR_surface],
            Extension::VK_KHR_external_memory_capabilities
            | Extension::VK_KHR_external_fence_capabilities
            | Extension::VK_KHR_external_semaphore_capabilities => {
                extensions![Extension::VK_KHR_get_physical_device_properties2]
            }
            Extension::VK_KHR_swapchain => extensions![Extension::VK_KHR_surface],
            Extension::VK_KHR_dedicated_allocation => {
                extensions![Extension::VK_KHR_get_memory_requirements2]
            }
            Extension::VK_KHR_device_group => extensions![Extension::VK_KHR_device_group_creation],
        }
    }
    pub fn get_recursively_required_extensions(self) -> Extensions {
        let mut retval = self.get_required_extensions();
        let mut worklist: EnumMap<Extension, Extension> = enum_map! {_ => self};
        let worklist = worklist.as_mut_slice();
        let mut worklist_size = 1;
        while worklist_size > 0 {
            worklist_size -= 1;
            let extension = worklist[worklist_size];
            retval[extension] = true;
            for (extension, &v) in extension.get_required_extensions().iter() {
                if v && !retval[extension] {
                    worklist[worklist_size] = extension;
                    worklist_size += 1;
                }
            }
        }
        retval
    }
    pub fn get_name(self) -> &'static str {
        match self {
            Extension::VK_KHR_surface => "VK_KHR_surface",
            #[cfg(all(unix, feature = "xcb-surface"))]
            Extension::VK_KHR_xcb_surface => "VK_KHR_xcb_surface",
            #[cfg(feature = "xlib-surface")]
            Extension::VK_KHR_xlib_surface => "VK_KHR_xlib_surface",
            #[cfg(feature = "wayland-surface")]
            Extension::VK_KHR_wayland_surface => "VK_KHR_wayland_surface",
            #[cfg(all(windows, feature = "win32-surface"))]
            Extension::VK_KHR_win32_surface => "VK_KHR_win32_surface",
            Extension::VK_KHR_get_physical_device_properties2 => {
                "VK_KHR_get_physical_device_properties2"
            }
            Extension::VK_KHR_device_group_creation => "VK_KHR_device_group_creation",
            Extension::VK_KHR_external_memory_capabilities => "VK_KHR_external_memory_capabilities",
            Extension::VK_KHR_external_fence_capabilities => "VK_KHR_external_fence_capabilities",
            Extension::VK_KHR_external_semaphore_capabilities => {
                "VK_KHR_external_semaphore_capabilities"
            }
            Extension::VK_EXT_debug_utils => "VK_EXT_debug_utils",
            Extension::VK_KHR_swapchain => "VK_KHR_swapchain",
            Extension::VK_KHR_maintenance1 => "VK_KHR_maintenance1",
            Extension::VK_KHR_bind_memory2 => "VK_KHR_bind_memory2",
            Extension::VK_KHR_get_memory_requirements2 => "VK_KHR_get_memory_requirements2",
            Extension::VK_KHR_dedicated_allocation => "VK_KHR_dedicated_allocation",
            Extension::VK_KHR_device_group => "VK_KHR_device_group",
        }
    }
    pub fn get_spec_version(self) -> u32 {
        match self {
            Extension::VK_KHR_surface => api::VK_KHR_SURFACE_SPEC_VERSION,
            #[cfg(all(unix, feature = "xcb-surface"))]
            Extension::VK_KHR_xcb_surface => api::VK_KHR_XCB_SURFACE_SPEC_VERSION,
            #[cfg(feature = "xlib-surface")]
            Extension::VK_KHR_xlib_surface => api::VK_KHR_XLIB_SURFACE_SPEC_VERSION,
            #[cfg(feature = "wayland-surface")]
            Extension::VK_KHR_wayland_surface => api::VK_KHR_WAYLAND_SURFACE_SPEC_VERSION,
            #[cfg(all(windows, feature = "win32-surface"))]
            Extension::VK_KHR_win32_surface => api::VK_KHR_WIN32_SURFACE_SPEC_VERSION,
            Extension::VK_KHR_get_physical_device_properties2 => {
                api::VK_KHR_GET_PHYSICAL_DEVICE_PROPERTIES_2_SPEC_VERSION
            }
            Extension::VK_KHR_device_group_creation => {
                api::VK_KHR_DEVICE_GROUP_CREATION_SPEC_VERSION
            }
            Extension::VK_KHR_external_memory_capabilities => {
                api::VK_KHR_EXTERNAL_MEMORY_CAPABILITIES_SPEC_VERSION
            }
            Extension::VK_KHR_external_fence_capabilities => {
                api::VK_KHR_EXTERNAL_FENCE_CAPABILITIES_SPEC_VERSION
            }
            Extension::VK_KHR_external_semaphore_capabilities => {
                api::VK_KHR_EXTERNAL_SEMAPHORE_CAPABILITIES_SPEC_VERSION
            }
            Extension::VK_EXT_debug_utils => api::VK_EXT_DEBUG_UTILS_SPEC_VERSION,
            Extension::VK_KHR_swapchain => api::VK_KHR_SWAPCHAIN_SPEC_VERSION,
            Extension::VK_KHR_maintenance1 => api::VK_KHR_MAINTENANCE1_SPEC_VERSION,
            Extension::VK_KHR_bind_memory2 => api::VK_KHR_BIND_MEMORY_2_SPEC_VERSION,
            Extension::VK_KHR_get_memory_requirements2 => {
                api::VK_KHR_GET_MEMORY_REQUIREMENTS_2_SPEC_VERSION
            }
            Extension::VK_KHR_dedicated_allocation => api::VK_KHR_DEDICATED_ALLOCATION_SPEC_VERSION,
            Extension::VK_KHR_device_group => api::VK_KHR_DEVICE_GROUP_SPEC_VERSION,
        }
    }
    pub fn get_properties(self) -> api::VkExtensionProperties {
        let mut retval = api::VkExtensionProperties {
            extensionName: [0; api::VK_MAX_EXTENSION_NAME_SIZE],
            specVersion: self.get_spec_version(),
        };
        copy_str_to_char_array(&mut retval.extensionName, self.get_name());
        retval
    }
    pub fn get_scope(self) -> ExtensionScope {
        match self {
            Extension::VK_KHR_surface
            | Extension::VK_KHR_get_physical_device_properties2
            | Extension::VK_KHR_device_group_creation
            | Extension::VK_KHR_external_memory_capabilities
            | Extension::VK_KHR_external_fence_capabilities
            | Extension::VK_KHR_external_semaphore_capabilities
            | Extension::VK_EXT_debug_utils => ExtensionScope::Instance,
            #[cfg(all(unix, feature = "xcb-surface"))]
            Extension::VK_KHR_xcb_surface => ExtensionScope::Instance,
            #[cfg(feature = "xlib-surface")]
            Extension::VK_KHR_xlib_surface => ExtensionScope::Instance,
            #[cfg(feature = "wayland-surface")]
            Extension::VK_KHR_wayland_surface => ExtensionScope::Instance,
            #[cfg(all(windows, feature = "win32-surface"))]
            Extension::VK_KHR_win32_surface => ExtensionScope::Instance,
            Extension::VK_KHR_swapchain
            | Extension::VK_KHR_maintenance1
            | Extension::VK_KHR_bind_memory2
            | Extension::VK_KHR_get_memory_requirements2
            | Extension::VK_KHR_dedicated_allocation
            | Extension::VK_KHR_device_group => ExtensionScope::Device,
        }
    }
}

impl FromStr for Extension {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for (i, _) in Extensions::default().iter() {
            if s == i.get_name() {
                return Ok(i);
            }
        }
        Err(())
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Extensions(EnumMap<Extension, bool>);

impl Extensions {
    pub fn create_empty() -> Self {
        Extensions(enum_map! {_ => false})
    }
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, &v)| !v)
    }
    /// the device-scope extensions whose instance-scope prerequisites are
    /// all contained in `self`
    pub fn get_allowed_extensions_from_instance_scope(&self) -> Self {
        let mut retval = Extensions::default();
        let instance_extensions = Self::instance_extensions();
        for (extension, value) in retval.iter_mut() {
            if extension.get_scope() == ExtensionScope::Instance {
                *value = self[extension];
                continue;
            }
            let required_extensions =
                instance_extensions & extension.get_recursively_required_extensions();
            *value = (!*self & required_extensions).is_empty();
        }
        retval
    }
    pub fn instance_extensions() -> Self {
        Extensions(
            (|extension: Extension| extension.get_scope() == ExtensionScope::Instance).into(),
        )
    }
    pub fn device_extensions() -> Self {
        !Self::instance_extensions()
    }
}

impl FromIterator<Extension> for Extensions {
    fn from_iter<T: IntoIterator<Item = Extension>>(v: T) -> Extensions {
        let mut retval = Extensions::create_empty();
        for extension in v {
            retval[extension] = true;
        }
        retval
    }
}

impl Default for Extensions {
    fn default() -> Self {
        Self::create_empty()
    }
}

impl Deref for Extensions {
    type Target = EnumMap<Extension, bool>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Extensions {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl BitAnd for Extensions {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        let mut retval = Self::default();
        for (index, retval) in retval.iter_mut() {
            *retval = self[index] & rhs[index];
        }
        retval
    }
}

impl BitOr for Extensions {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        let mut retval = Self::default();
        for (index, retval) in retval.iter_mut() {
            *retval = self[index] | rhs[index];
        }
        retval
    }
}

impl BitXor for Extensions {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self {
        let mut retval = Self::default();
        for (index, retval) in retval.iter_mut() {
            *retval = self[index] ^ rhs[index];
        }
        retval
    }
}

impl Not for Extensions {
    type Output = Self;
    fn not(mut self) -> Self {
        for v in self.values_mut() {
            *v = !*v;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn names_roundtrip_through_from_str() {
        for (extension, _) in Extensions::default().iter() {
            assert_eq!(extension.get_name().parse::<Extension>(), Ok(extension));
        }
        assert!("VK_KHR_nonexistent".parse::<Extension>().is_err());
    }

    #[test]
    fn scopes_partition_the_extension_set() {
        let instance = Extensions::instance_extensions();
        let device = Extensions::device_extensions();
        assert!((instance & device).is_empty());
        assert!((instance | device).iter().all(|(_, &v)| v));
    }

    #[test]
    fn swapchain_requires_surface() {
        let required = Extension::VK_KHR_swapchain.get_recursively_required_extensions();
        assert!(required[Extension::VK_KHR_surface]);
        assert!(required[Extension::VK_KHR_swapchain]);
    }

    #[test]
    fn dedicated_allocation_closure() {
        let required = Extension::VK_KHR_dedicated_allocation.get_recursively_required_extensions();
        assert!(required[Extension::VK_KHR_get_memory_requirements2]);
        assert!(!required[Extension::VK_KHR_surface]);
    }

    #[test]
    fn allowed_device_extensions_follow_instance_enablement() {
        let with_surface = extensions![Extension::VK_KHR_surface]
            .get_allowed_extensions_from_instance_scope();
        assert!(with_surface[Extension::VK_KHR_swapchain]);
        let without_surface =
            Extensions::create_empty().get_allowed_extensions_from_instance_scope();
        assert!(!without_surface[Extension::VK_KHR_swapchain]);
        // device extensions with no instance prerequisites are always allowed
        assert!(without_surface[Extension::VK_KHR_maintenance1]);
    }

    #[test]
    fn properties_name_is_nul_terminated() {
        for (extension, _) in Extensions::default().iter() {
            let properties = extension.get_properties();
            let name = unsafe { CStr::from_ptr(properties.extensionName.as_ptr()) };
            assert_eq!(name.to_str().unwrap(), extension.get_name());
            assert_eq!(properties.specVersion, extension.get_spec_version());
        }
    }

    #[test]
    fn bit_operators() {
        let a = extensions![Extension::VK_KHR_surface, Extension::VK_KHR_swapchain];
        let b = extensions![Extension::VK_KHR_swapchain];
        assert_eq!(a & b, b);
        assert_eq!(a | b, a);
        assert_eq!(a ^ b, extensions![Extension::VK_KHR_surface]);
        assert!(!(!a)[Extension::VK_KHR_surface]);
    }
}
