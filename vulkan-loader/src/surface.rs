// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information
//! surfaces are loader-owned: a `VkSurfaceKHR` is a pointer to a
//! loader-allocated platform struct that every driver reads directly

use crate::api;
use crate::handle::{invalid_handle_abort, Handle, NondispatchableHandle, SharedHandle};
use crate::instance::missing_driver_command;
use std::error::Error;
use std::fmt;
use std::ptr::NonNull;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[allow(non_camel_case_types)]
pub enum SurfacePlatform {
    VK_ICD_WSI_PLATFORM_WAYLAND,
    VK_ICD_WSI_PLATFORM_WIN32,
    VK_ICD_WSI_PLATFORM_XCB,
    VK_ICD_WSI_PLATFORM_XLIB,
    VK_ICD_WSI_PLATFORM_DISPLAY,
}

#[derive(Debug)]
pub struct UnknownSurfacePlatform(pub api::VkIcdWsiPlatform);

impl fmt::Display for UnknownSurfacePlatform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown surface platform {:?}", self.0)
    }
}

impl Error for UnknownSurfacePlatform {}

impl SurfacePlatform {
    pub fn from(platform: api::VkIcdWsiPlatform) -> Result<Self, UnknownSurfacePlatform> {
        match platform {
            api::VK_ICD_WSI_PLATFORM_WAYLAND => Ok(SurfacePlatform::VK_ICD_WSI_PLATFORM_WAYLAND),
            api::VK_ICD_WSI_PLATFORM_WIN32 => Ok(SurfacePlatform::VK_ICD_WSI_PLATFORM_WIN32),
            api::VK_ICD_WSI_PLATFORM_XCB => Ok(SurfacePlatform::VK_ICD_WSI_PLATFORM_XCB),
            api::VK_ICD_WSI_PLATFORM_XLIB => Ok(SurfacePlatform::VK_ICD_WSI_PLATFORM_XLIB),
            api::VK_ICD_WSI_PLATFORM_DISPLAY => Ok(SurfacePlatform::VK_ICD_WSI_PLATFORM_DISPLAY),
            platform => Err(UnknownSurfacePlatform(platform)),
        }
    }
}

impl From<SurfacePlatform> for api::VkIcdWsiPlatform {
    fn from(platform: SurfacePlatform) -> api::VkIcdWsiPlatform {
        match platform {
            SurfacePlatform::VK_ICD_WSI_PLATFORM_WAYLAND => api::VK_ICD_WSI_PLATFORM_WAYLAND,
            SurfacePlatform::VK_ICD_WSI_PLATFORM_WIN32 => api::VK_ICD_WSI_PLATFORM_WIN32,
            SurfacePlatform::VK_ICD_WSI_PLATFORM_XCB => api::VK_ICD_WSI_PLATFORM_XCB,
            SurfacePlatform::VK_ICD_WSI_PLATFORM_XLIB => api::VK_ICD_WSI_PLATFORM_XLIB,
            SurfacePlatform::VK_ICD_WSI_PLATFORM_DISPLAY => api::VK_ICD_WSI_PLATFORM_DISPLAY,
        }
    }
}

/// leaks a platform surface struct into the nondispatchable handle form
fn surface_handle<T>(surface: Box<T>) -> api::VkSurfaceKHR {
    NondispatchableHandle::new(NonNull::new(
        Box::into_raw(surface) as *mut api::VkIcdSurfaceBase
    ))
}

#[cfg(all(unix, feature = "xcb-surface"))]
#[allow(non_snake_case)]
pub unsafe extern "system" fn vkCreateXcbSurfaceKHR(
    instance: api::VkInstance,
    create_info: *const api::VkXcbSurfaceCreateInfoKHR,
    _allocator: *const api::VkAllocationCallbacks,
    surface: *mut api::VkSurfaceKHR,
) -> api::VkResult {
    let _instance = SharedHandle::from(instance);
    assert!(!create_info.is_null());
    let create_info = &*create_info;
    assert_eq!(
        create_info.sType,
        api::VK_STRUCTURE_TYPE_XCB_SURFACE_CREATE_INFO_KHR
    );
    *surface = surface_handle(Box::new(api::VkIcdSurfaceXcb {
        base: api::VkIcdSurfaceBase {
            platform: api::VK_ICD_WSI_PLATFORM_XCB,
        },
        connection: create_info.connection,
        window: create_info.window,
    }));
    api::VK_SUCCESS
}

#[cfg(feature = "xlib-surface")]
#[allow(non_snake_case)]
pub unsafe extern "system" fn vkCreateXlibSurfaceKHR(
    instance: api::VkInstance,
    create_info: *const api::VkXlibSurfaceCreateInfoKHR,
    _allocator: *const api::VkAllocationCallbacks,
    surface: *mut api::VkSurfaceKHR,
) -> api::VkResult {
    let _instance = SharedHandle::from(instance);
    assert!(!create_info.is_null());
    let create_info = &*create_info;
    assert_eq!(
        create_info.sType,
        api::VK_STRUCTURE_TYPE_XLIB_SURFACE_CREATE_INFO_KHR
    );
    *surface = surface_handle(Box::new(api::VkIcdSurfaceXlib {
        base: api::VkIcdSurfaceBase {
            platform: api::VK_ICD_WSI_PLATFORM_XLIB,
        },
        dpy: create_info.dpy,
        window: create_info.window,
    }));
    api::VK_SUCCESS
}

#[cfg(feature = "wayland-surface")]
#[allow(non_snake_case)]
pub unsafe extern "system" fn vkCreateWaylandSurfaceKHR(
    instance: api::VkInstance,
    create_info: *const api::VkWaylandSurfaceCreateInfoKHR,
    _allocator: *const api::VkAllocationCallbacks,
    surface: *mut api::VkSurfaceKHR,
) -> api::VkResult {
    let _instance = SharedHandle::from(instance);
    assert!(!create_info.is_null());
    let create_info = &*create_info;
    assert_eq!(
        create_info.sType,
        api::VK_STRUCTURE_TYPE_WAYLAND_SURFACE_CREATE_INFO_KHR
    );
    *surface = surface_handle(Box::new(api::VkIcdSurfaceWayland {
        base: api::VkIcdSurfaceBase {
            platform: api::VK_ICD_WSI_PLATFORM_WAYLAND,
        },
        display: create_info.display,
        surface: create_info.surface,
    }));
    api::VK_SUCCESS
}

#[cfg(all(windows, feature = "win32-surface"))]
#[allow(non_snake_case)]
pub unsafe extern "system" fn vkCreateWin32SurfaceKHR(
    instance: api::VkInstance,
    create_info: *const api::VkWin32SurfaceCreateInfoKHR,
    _allocator: *const api::VkAllocationCallbacks,
    surface: *mut api::VkSurfaceKHR,
) -> api::VkResult {
    let _instance = SharedHandle::from(instance);
    assert!(!create_info.is_null());
    let create_info = &*create_info;
    assert_eq!(
        create_info.sType,
        api::VK_STRUCTURE_TYPE_WIN32_SURFACE_CREATE_INFO_KHR
    );
    *surface = surface_handle(Box::new(api::VkIcdSurfaceWin32 {
        base: api::VkIcdSurfaceBase {
            platform: api::VK_ICD_WSI_PLATFORM_WIN32,
        },
        hinstance: create_info.hinstance,
        hwnd: create_info.hwnd,
    }));
    api::VK_SUCCESS
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkDestroySurfaceKHR(
    instance: api::VkInstance,
    surface: api::VkSurfaceKHR,
    _allocator: *const api::VkAllocationCallbacks,
) {
    let _instance = SharedHandle::from(instance);
    let base = match surface.get() {
        Some(base) => base,
        None => return,
    };
    let platform = match SurfacePlatform::from(base.as_ref().platform) {
        Ok(platform) => platform,
        Err(_) => invalid_handle_abort("VkSurfaceKHR"),
    };
    match platform {
        #[cfg(all(unix, feature = "xcb-surface"))]
        SurfacePlatform::VK_ICD_WSI_PLATFORM_XCB => {
            drop(Box::from_raw(base.as_ptr() as *mut api::VkIcdSurfaceXcb));
        }
        #[cfg(feature = "xlib-surface")]
        SurfacePlatform::VK_ICD_WSI_PLATFORM_XLIB => {
            drop(Box::from_raw(base.as_ptr() as *mut api::VkIcdSurfaceXlib));
        }
        #[cfg(feature = "wayland-surface")]
        SurfacePlatform::VK_ICD_WSI_PLATFORM_WAYLAND => {
            drop(Box::from_raw(base.as_ptr() as *mut api::VkIcdSurfaceWayland));
        }
        #[cfg(all(windows, feature = "win32-surface"))]
        SurfacePlatform::VK_ICD_WSI_PLATFORM_WIN32 => {
            drop(Box::from_raw(base.as_ptr() as *mut api::VkIcdSurfaceWin32));
        }
        // a platform this build never creates surfaces for
        _ => invalid_handle_abort("VkSurfaceKHR"),
    }
}

/// surface queries go to the driver owning the physical device; a driver
/// that never advertised `VK_KHR_surface` reports the extension missing
/// instead of tripping the fail-fast path
macro_rules! surface_query_trampoline {
    (
        fn $name:ident(physical_device $(, $arg:ident: $arg_ty:ty)*) -> api::VkResult,
        slot = $slot:ident
    ) => {
        #[allow(non_snake_case)]
        pub unsafe extern "system" fn $name(
            physical_device: api::VkPhysicalDevice
            $(, $arg: $arg_ty)*
        ) -> api::VkResult {
            let physical_device = SharedHandle::from(physical_device);
            match physical_device.driver.table.$slot {
                Some(f) => f(physical_device.handle $(, $arg)*),
                None => {
                    log::warn!(
                        "driver does not implement {} for the queried physical device",
                        stringify!($name)
                    );
                    api::VK_ERROR_EXTENSION_NOT_PRESENT
                }
            }
        }
    };
}

surface_query_trampoline! {
    fn vkGetPhysicalDeviceSurfaceSupportKHR(
        physical_device,
        queue_family_index: u32,
        surface: api::VkSurfaceKHR,
        supported: *mut api::VkBool32
    ) -> api::VkResult,
    slot = vkGetPhysicalDeviceSurfaceSupportKHR
}
surface_query_trampoline! {
    fn vkGetPhysicalDeviceSurfaceCapabilitiesKHR(
        physical_device,
        surface: api::VkSurfaceKHR,
        capabilities: *mut api::VkSurfaceCapabilitiesKHR
    ) -> api::VkResult,
    slot = vkGetPhysicalDeviceSurfaceCapabilitiesKHR
}
surface_query_trampoline! {
    fn vkGetPhysicalDeviceSurfaceFormatsKHR(
        physical_device,
        surface: api::VkSurfaceKHR,
        count: *mut u32,
        formats: *mut api::VkSurfaceFormatKHR
    ) -> api::VkResult,
    slot = vkGetPhysicalDeviceSurfaceFormatsKHR
}
surface_query_trampoline! {
    fn vkGetPhysicalDeviceSurfacePresentModesKHR(
        physical_device,
        surface: api::VkSurfaceKHR,
        count: *mut u32,
        present_modes: *mut api::VkPresentModeKHR
    ) -> api::VkResult,
    slot = vkGetPhysicalDeviceSurfacePresentModesKHR
}

/// presentation-support queries are rare enough to resolve through the
/// driver on each call rather than carrying table slots per platform
macro_rules! presentation_support_trampoline {
    (
        $(#[$attr:meta])*
        fn $name:ident(physical_device $(, $arg:ident: $arg_ty:ty)*),
        icd_pfn = $icd_pfn:ty
    ) => {
        $(#[$attr])*
        #[allow(non_snake_case)]
        pub unsafe extern "system" fn $name(
            physical_device: api::VkPhysicalDevice
            $(, $arg: $arg_ty)*
        ) -> api::VkBool32 {
            let physical_device = SharedHandle::from(physical_device);
            let driver = &physical_device.driver;
            let f: $icd_pfn = std::mem::transmute((driver.gipa)(
                driver.instance,
                concat!(stringify!($name), "\0").as_ptr() as *const std::os::raw::c_char,
            ));
            match f {
                Some(f) => f(physical_device.handle $(, $arg)*),
                None => missing_driver_command(stringify!($name)),
            }
        }
    };
}

presentation_support_trampoline! {
    #[cfg(all(unix, feature = "xcb-surface"))]
    fn vkGetPhysicalDeviceXcbPresentationSupportKHR(
        physical_device,
        queue_family_index: u32,
        connection: *mut api::xcb_connection_t,
        visual_id: api::xcb_visualid_t
    ),
    icd_pfn = Option<
        unsafe extern "system" fn(
            api::VkIcdPhysicalDevice,
            u32,
            *mut api::xcb_connection_t,
            api::xcb_visualid_t,
        ) -> api::VkBool32,
    >
}
presentation_support_trampoline! {
    #[cfg(feature = "xlib-surface")]
    fn vkGetPhysicalDeviceXlibPresentationSupportKHR(
        physical_device,
        queue_family_index: u32,
        dpy: *mut api::Display,
        visual_id: api::VisualID
    ),
    icd_pfn = Option<
        unsafe extern "system" fn(
            api::VkIcdPhysicalDevice,
            u32,
            *mut api::Display,
            api::VisualID,
        ) -> api::VkBool32,
    >
}
presentation_support_trampoline! {
    #[cfg(feature = "wayland-surface")]
    fn vkGetPhysicalDeviceWaylandPresentationSupportKHR(
        physical_device,
        queue_family_index: u32,
        display: *mut api::wl_display
    ),
    icd_pfn = Option<
        unsafe extern "system" fn(
            api::VkIcdPhysicalDevice,
            u32,
            *mut api::wl_display,
        ) -> api::VkBool32,
    >
}
presentation_support_trampoline! {
    #[cfg(all(windows, feature = "win32-surface"))]
    fn vkGetPhysicalDeviceWin32PresentationSupportKHR(
        physical_device,
        queue_family_index: u32
    ),
    icd_pfn = Option<
        unsafe extern "system" fn(api::VkIcdPhysicalDevice, u32) -> api::VkBool32,
    >
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_tags_roundtrip() {
        for &platform in &[
            SurfacePlatform::VK_ICD_WSI_PLATFORM_WAYLAND,
            SurfacePlatform::VK_ICD_WSI_PLATFORM_WIN32,
            SurfacePlatform::VK_ICD_WSI_PLATFORM_XCB,
            SurfacePlatform::VK_ICD_WSI_PLATFORM_XLIB,
            SurfacePlatform::VK_ICD_WSI_PLATFORM_DISPLAY,
        ] {
            let raw: api::VkIcdWsiPlatform = platform.into();
            assert_eq!(SurfacePlatform::from(raw).unwrap(), platform);
        }
        assert!(SurfacePlatform::from(0xdead).is_err());
    }

    #[cfg(all(unix, feature = "xcb-surface"))]
    #[test]
    fn xcb_surface_carries_the_platform_tag() {
        let surface = surface_handle(Box::new(api::VkIcdSurfaceXcb {
            base: api::VkIcdSurfaceBase {
                platform: api::VK_ICD_WSI_PLATFORM_XCB,
            },
            connection: 0x1234 as *mut api::xcb_connection_t,
            window: 7,
        }));
        let base = surface.get().unwrap();
        unsafe {
            assert_eq!(base.as_ref().platform, api::VK_ICD_WSI_PLATFORM_XCB);
            let xcb = &*(base.as_ptr() as *const api::VkIcdSurfaceXcb);
            assert_eq!(xcb.window, 7);
            drop(Box::from_raw(base.as_ptr() as *mut api::VkIcdSurfaceXcb));
        }
    }

    #[cfg(feature = "wayland-surface")]
    #[test]
    fn wayland_surface_carries_the_platform_tag() {
        let surface = surface_handle(Box::new(api::VkIcdSurfaceWayland {
            base: api::VkIcdSurfaceBase {
                platform: api::VK_ICD_WSI_PLATFORM_WAYLAND,
            },
            display: std::ptr::null_mut(),
            surface: std::ptr::null_mut(),
        }));
        let base = surface.get().unwrap();
        unsafe {
            assert_eq!(base.as_ref().platform, api::VK_ICD_WSI_PLATFORM_WAYLAND);
            drop(Box::from_raw(base.as_ptr() as *mut api::VkIcdSurfaceWayland));
        }
    }
}
