// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

use crate::api;
use crate::chain::{DebugMessengerLayer, DriverInstance, DriverTerminator, InstanceDispatch};
use crate::constants::LOADER_API_VERSION;
use crate::extensions::{Extension, ExtensionScope, Extensions};
use crate::handle::{invalid_handle_abort, Handle, NondispatchableHandle, OwnedHandle, SharedHandle};
use crate::icd::{self, IcdLibrary};
use crate::tables::InstanceTable;
use crate::util::{enumerate_helper, find_in_next_chain, to_slice, CStringArray};
use parking_lot::Mutex;
use std::ffi::{CStr, CString};
use std::mem::transmute;
use std::os::raw::{c_char, c_void};
use std::ptr::{null, null_mut, NonNull};
use std::sync::Arc;

/// a driver's physical device together with the driver that owns it; this is
/// what an application-facing `VkPhysicalDevice` wraps
pub struct PhysicalDevice {
    pub instance: api::VkInstance,
    pub driver: Arc<DriverInstance>,
    pub handle: api::VkIcdPhysicalDevice,
}

unsafe impl Send for PhysicalDevice {}
unsafe impl Sync for PhysicalDevice {}

/// a loader-local debug-utils messenger
pub struct DebugUtilsMessenger {
    pub message_severity: api::VkDebugUtilsMessageSeverityFlagsEXT,
    pub message_type: api::VkDebugUtilsMessageTypeFlagsEXT,
    pub callback: api::PFN_vkDebugUtilsMessengerCallbackEXT,
    pub user_data: *mut c_void,
}

pub struct MessengerRegistry {
    messengers: Mutex<Vec<NonNull<DebugUtilsMessenger>>>,
}

unsafe impl Send for MessengerRegistry {}
unsafe impl Sync for MessengerRegistry {}

impl MessengerRegistry {
    pub fn new() -> Self {
        MessengerRegistry {
            messengers: Mutex::new(Vec::new()),
        }
    }

    pub fn create(
        &self,
        create_info: &api::VkDebugUtilsMessengerCreateInfoEXT,
    ) -> api::VkDebugUtilsMessengerEXT {
        let messenger = NonNull::new(Box::into_raw(Box::new(DebugUtilsMessenger {
            message_severity: create_info.messageSeverity,
            message_type: create_info.messageType,
            callback: create_info.pfnUserCallback,
            user_data: create_info.pUserData,
        })))
        .unwrap();
        self.messengers.lock().push(messenger);
        NondispatchableHandle::new(Some(messenger))
    }

    /// false when the handle was never created by this registry
    pub fn destroy(&self, handle: api::VkDebugUtilsMessengerEXT) -> bool {
        let ptr = match handle.get() {
            Some(ptr) => ptr,
            None => return true,
        };
        let mut messengers = self.messengers.lock();
        match messengers.iter().position(|v| *v == ptr) {
            Some(index) => {
                messengers.swap_remove(index);
                unsafe {
                    drop(Box::from_raw(ptr.as_ptr()));
                }
                true
            }
            None => false,
        }
    }

    /// builds the callback data for a loader-originated message
    pub fn submit(
        &self,
        severity: api::VkDebugUtilsMessageSeverityFlagBitsEXT,
        message_type: api::VkDebugUtilsMessageTypeFlagsEXT,
        message: &str,
    ) {
        let message = CString::new(message).unwrap();
        let data = api::VkDebugUtilsMessengerCallbackDataEXT {
            sType: api::VK_STRUCTURE_TYPE_DEBUG_UTILS_MESSENGER_CALLBACK_DATA_EXT,
            pNext: null(),
            flags: 0,
            pMessageIdName: null(),
            messageIdNumber: 0,
            pMessage: message.as_ptr(),
            queueLabelCount: 0,
            pQueueLabels: null(),
            cmdBufLabelCount: 0,
            pCmdBufLabels: null(),
            objectCount: 0,
            pObjects: null(),
        };
        unsafe { self.submit_raw(severity, message_type, &data) }
    }

    pub unsafe fn submit_raw(
        &self,
        severity: api::VkDebugUtilsMessageSeverityFlagBitsEXT,
        message_type: api::VkDebugUtilsMessageTypeFlagsEXT,
        data: *const api::VkDebugUtilsMessengerCallbackDataEXT,
    ) {
        for messenger in self.messengers.lock().iter() {
            let messenger = messenger.as_ref();
            if messenger.message_severity & severity == 0 {
                continue;
            }
            if messenger.message_type & message_type == 0 {
                continue;
            }
            if let Some(callback) = messenger.callback {
                callback(severity, message_type, data, messenger.user_data);
            }
        }
    }
}

impl Drop for MessengerRegistry {
    fn drop(&mut self) {
        for messenger in self.messengers.get_mut().drain(..) {
            unsafe {
                drop(Box::from_raw(messenger.as_ptr()));
            }
        }
    }
}

pub struct Instance {
    pub api_version: u32,
    pub enabled_extensions: Extensions,
    pub chain: Arc<dyn InstanceDispatch>,
    pub terminator: Arc<DriverTerminator>,
    pub messengers: Arc<MessengerRegistry>,
    pub libraries: Vec<Arc<IcdLibrary>>,
}

impl Instance {
    pub unsafe fn new(
        create_info: *const api::VkInstanceCreateInfo,
    ) -> Result<api::VkInstance, api::VkResult> {
        assert!(!create_info.is_null());
        let create_info = &*create_info;
        assert_eq!(create_info.sType, api::VK_STRUCTURE_TYPE_INSTANCE_CREATE_INFO);
        if create_info.enabledLayerCount != 0 {
            return Err(api::VK_ERROR_LAYER_NOT_PRESENT);
        }
        let mut enabled_extensions = Extensions::create_empty();
        for &extension_name in to_slice(
            create_info.ppEnabledExtensionNames,
            create_info.enabledExtensionCount as usize,
        ) {
            let extension: Extension = CStr::from_ptr(extension_name)
                .to_str()
                .map_err(|_| api::VK_ERROR_EXTENSION_NOT_PRESENT)?
                .parse()
                .map_err(|_| api::VK_ERROR_EXTENSION_NOT_PRESENT)?;
            if extension.get_scope() != ExtensionScope::Instance {
                return Err(api::VK_ERROR_EXTENSION_NOT_PRESENT);
            }
            enabled_extensions[extension] = true;
        }
        for extension in enabled_extensions
            .iter()
            .filter_map(|(extension, &enabled)| if enabled { Some(extension) } else { None })
        {
            let missing_extensions = extension.get_required_extensions() & !enabled_extensions;
            for missing_extension in missing_extensions
                .iter()
                .filter_map(|(extension, &enabled)| if enabled { Some(extension) } else { None })
            {
                panic!(
                    "extension {} enabled but required extension {} is not enabled",
                    extension.get_name(),
                    missing_extension.get_name()
                );
            }
        }
        let requested_version = match create_info.pApplicationInfo.as_ref() {
            Some(app_info) => {
                assert_eq!(app_info.sType, api::VK_STRUCTURE_TYPE_APPLICATION_INFO);
                if app_info.apiVersion == 0 {
                    api::VK_API_VERSION_1_0
                } else {
                    app_info.apiVersion
                }
            }
            None => api::VK_API_VERSION_1_0,
        };
        let api_version = requested_version.min(LOADER_API_VERSION);

        let libraries = icd::load_drivers();
        if libraries.is_empty() {
            log::warn!("no Vulkan drivers found");
            return Err(api::VK_ERROR_INCOMPATIBLE_DRIVER);
        }
        let mut drivers = Vec::new();
        for library in &libraries {
            match create_driver_instance(library, create_info, enabled_extensions, api_version) {
                Ok(driver) => drivers.push(Arc::new(driver)),
                Err(error) => {
                    log::warn!(
                        "driver {} failed instance creation: {}",
                        library.path.display(),
                        error
                    );
                }
            }
        }
        if drivers.is_empty() {
            return Err(api::VK_ERROR_INCOMPATIBLE_DRIVER);
        }

        let messengers = Arc::new(MessengerRegistry::new());
        // a messenger chained off VkInstanceCreateInfo::pNext covers the
        // lifetime of the instance itself
        if enabled_extensions[Extension::VK_EXT_debug_utils] {
            let chained = find_in_next_chain(
                create_info.pNext as *const api::VkBaseInStructure,
                api::VK_STRUCTURE_TYPE_DEBUG_UTILS_MESSENGER_CREATE_INFO_EXT,
            ) as *const api::VkDebugUtilsMessengerCreateInfoEXT;
            if let Some(chained) = chained.as_ref() {
                messengers.create(chained);
            }
        }

        let terminator = Arc::new(DriverTerminator::new(drivers));
        let chain: Arc<dyn InstanceDispatch> =
            if enabled_extensions[Extension::VK_EXT_debug_utils] {
                Arc::new(DebugMessengerLayer {
                    next: terminator.clone(),
                    messengers: messengers.clone(),
                })
            } else {
                terminator.clone()
            };

        let retval = OwnedHandle::<api::VkInstance>::new(Instance {
            api_version,
            enabled_extensions,
            chain,
            terminator,
            messengers,
            libraries,
        });
        Ok(retval.take())
    }
}

/// the extensions a driver advertises at global scope, restricted to the
/// ones the loader knows how to dispatch
unsafe fn driver_instance_extensions(library: &IcdLibrary) -> Extensions {
    let enumerate: api::icd::PFN_vkEnumerateInstanceExtensionProperties =
        transmute(library.get_global_proc(b"vkEnumerateInstanceExtensionProperties\0"));
    let enumerate = match enumerate {
        Some(v) => v,
        None => return Extensions::create_empty(),
    };
    let mut count = 0;
    if enumerate(null(), &mut count, null_mut()) != api::VK_SUCCESS {
        return Extensions::create_empty();
    }
    let mut properties = vec![
        api::VkExtensionProperties {
            extensionName: [0; api::VK_MAX_EXTENSION_NAME_SIZE],
            specVersion: 0,
        };
        count as usize
    ];
    let result = enumerate(null(), &mut count, properties.as_mut_ptr());
    if result != api::VK_SUCCESS && result != api::VK_INCOMPLETE {
        return Extensions::create_empty();
    }
    properties.truncate(count as usize);
    let mut retval = Extensions::create_empty();
    for properties in &properties {
        if let Ok(extension) = CStr::from_ptr(properties.extensionName.as_ptr())
            .to_str()
            .unwrap_or("")
            .parse::<Extension>()
        {
            retval[extension] = true;
        }
    }
    retval
}

unsafe fn create_driver_instance(
    library: &Arc<IcdLibrary>,
    create_info: &api::VkInstanceCreateInfo,
    enabled_extensions: Extensions,
    api_version: u32,
) -> Result<DriverInstance, icd::DriverError> {
    let create: api::icd::PFN_vkCreateInstance =
        transmute(library.get_global_proc(b"vkCreateInstance\0"));
    let create = create.ok_or(icd::DriverError::MissingEntryPoint)?;
    // hand the driver only what it advertises; VK_EXT_debug_utils is
    // loader-local and never forwarded
    let mut forwarded = enabled_extensions & driver_instance_extensions(library);
    forwarded[Extension::VK_EXT_debug_utils] = false;
    let extension_names = CStringArray::new(
        forwarded
            .iter()
            .filter_map(|(extension, &enabled)| {
                if enabled {
                    Some(extension.get_name())
                } else {
                    None
                }
            }),
    );
    let driver_create_info = api::VkInstanceCreateInfo {
        enabledExtensionCount: extension_names.len(),
        ppEnabledExtensionNames: extension_names.as_ptr(),
        enabledLayerCount: 0,
        ppEnabledLayerNames: null(),
        ..*create_info
    };
    let mut driver_instance = null_mut();
    let result = create(&driver_create_info, null(), &mut driver_instance);
    if result != api::VK_SUCCESS {
        return Err(icd::DriverError::InstanceCreationFailed(result));
    }
    let table = InstanceTable::load(library.gipa, driver_instance);
    if !table.has_required_commands() {
        if let Some(destroy) = table.vkDestroyInstance {
            destroy(driver_instance, null());
        }
        log::warn!(
            "driver {} is missing required core commands",
            library.path.display()
        );
        return Err(icd::DriverError::MissingEntryPoint);
    }
    Ok(DriverInstance {
        gipa: library.gipa,
        instance: driver_instance,
        table,
        enabled_extensions: forwarded,
        api_version: library.api_version.min(api_version),
    })
}

/// a valid dispatch table was found but the driver never filled the slot;
/// the fail-fast contract treats this like a corrupt handle
pub(crate) fn missing_driver_command(name: &str) -> ! {
    log::error!("driver provides no implementation of {}", name);
    std::process::abort()
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkCreateInstance(
    create_info: *const api::VkInstanceCreateInfo,
    _allocator: *const api::VkAllocationCallbacks,
    instance: *mut api::VkInstance,
) -> api::VkResult {
    *instance = Handle::null();
    match Instance::new(create_info) {
        Ok(v) => {
            *instance = v;
            api::VK_SUCCESS
        }
        Err(error) => error,
    }
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkDestroyInstance(
    instance: api::VkInstance,
    allocator: *const api::VkAllocationCallbacks,
) {
    if instance.is_null() {
        return;
    }
    let instance = OwnedHandle::from(instance);
    instance.chain.destroy_instance(allocator);
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkEnumeratePhysicalDevices(
    instance: api::VkInstance,
    physical_device_count: *mut u32,
    physical_devices: *mut api::VkPhysicalDevice,
) -> api::VkResult {
    let instance = SharedHandle::from(instance);
    match instance
        .chain
        .enumerate_physical_devices(instance.get_handle())
    {
        Ok(devices) => enumerate_helper(
            physical_device_count,
            physical_devices,
            devices,
            |l, r| *l = r,
        ),
        Err(error) => error,
    }
}

unsafe fn enumerate_physical_device_groups_impl(
    instance: api::VkInstance,
    group_count: *mut u32,
    groups: *mut api::VkPhysicalDeviceGroupProperties,
) -> api::VkResult {
    let instance = SharedHandle::from(instance);
    match instance
        .chain
        .enumerate_physical_device_groups(instance.get_handle())
    {
        Ok(values) => enumerate_helper(group_count, groups, values, |l, r| {
            // the caller's sType/pNext are preserved per the two-call contract
            let (stype, pnext) = (l.sType, l.pNext);
            *l = r;
            l.sType = stype;
            l.pNext = pnext;
        }),
        Err(error) => error,
    }
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkEnumeratePhysicalDeviceGroups(
    instance: api::VkInstance,
    group_count: *mut u32,
    groups: *mut api::VkPhysicalDeviceGroupProperties,
) -> api::VkResult {
    enumerate_physical_device_groups_impl(instance, group_count, groups)
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkEnumeratePhysicalDeviceGroupsKHR(
    instance: api::VkInstance,
    group_count: *mut u32,
    groups: *mut api::VkPhysicalDeviceGroupProperties,
) -> api::VkResult {
    enumerate_physical_device_groups_impl(instance, group_count, groups)
}

macro_rules! physical_device_trampoline {
    (
        fn $name:ident(physical_device $(, $arg:ident: $arg_ty:ty)*) $(-> $ret:ty)?,
        slot = $slot:ident $(, fallback = $fallback:ident)?
    ) => {
        #[allow(non_snake_case)]
        pub unsafe extern "system" fn $name(
            physical_device: api::VkPhysicalDevice
            $(, $arg: $arg_ty)*
        ) $(-> $ret)? {
            let physical_device = SharedHandle::from(physical_device);
            let table = &physical_device.driver.table;
            let slot = table.$slot$(.or(table.$fallback))?;
            match slot {
                Some(f) => f(physical_device.handle $(, $arg)*),
                None => missing_driver_command(stringify!($name)),
            }
        }
    };
}

physical_device_trampoline! {
    fn vkGetPhysicalDeviceFeatures(physical_device, features: *mut api::VkPhysicalDeviceFeatures),
    slot = vkGetPhysicalDeviceFeatures
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceProperties(physical_device, properties: *mut api::VkPhysicalDeviceProperties),
    slot = vkGetPhysicalDeviceProperties
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceFormatProperties(physical_device, format: api::VkFormat, properties: *mut api::VkFormatProperties),
    slot = vkGetPhysicalDeviceFormatProperties
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceImageFormatProperties(
        physical_device,
        format: api::VkFormat,
        image_type: api::VkImageType,
        tiling: api::VkImageTiling,
        usage: api::VkImageUsageFlags,
        flags: api::VkImageCreateFlags,
        properties: *mut api::VkImageFormatProperties
    ) -> api::VkResult,
    slot = vkGetPhysicalDeviceImageFormatProperties
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceQueueFamilyProperties(physical_device, count: *mut u32, properties: *mut api::VkQueueFamilyProperties),
    slot = vkGetPhysicalDeviceQueueFamilyProperties
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceMemoryProperties(physical_device, properties: *mut api::VkPhysicalDeviceMemoryProperties),
    slot = vkGetPhysicalDeviceMemoryProperties
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceSparseImageFormatProperties(
        physical_device,
        format: api::VkFormat,
        image_type: api::VkImageType,
        samples: api::VkSampleCountFlagBits,
        usage: api::VkImageUsageFlags,
        tiling: api::VkImageTiling,
        count: *mut u32,
        properties: *mut api::VkSparseImageFormatProperties
    ),
    slot = vkGetPhysicalDeviceSparseImageFormatProperties
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceFeatures2(physical_device, features: *mut api::VkPhysicalDeviceFeatures2),
    slot = vkGetPhysicalDeviceFeatures2, fallback = vkGetPhysicalDeviceFeatures2KHR
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceFeatures2KHR(physical_device, features: *mut api::VkPhysicalDeviceFeatures2),
    slot = vkGetPhysicalDeviceFeatures2KHR, fallback = vkGetPhysicalDeviceFeatures2
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceProperties2(physical_device, properties: *mut api::VkPhysicalDeviceProperties2),
    slot = vkGetPhysicalDeviceProperties2, fallback = vkGetPhysicalDeviceProperties2KHR
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceProperties2KHR(physical_device, properties: *mut api::VkPhysicalDeviceProperties2),
    slot = vkGetPhysicalDeviceProperties2KHR, fallback = vkGetPhysicalDeviceProperties2
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceFormatProperties2(physical_device, format: api::VkFormat, properties: *mut api::VkFormatProperties2),
    slot = vkGetPhysicalDeviceFormatProperties2, fallback = vkGetPhysicalDeviceFormatProperties2KHR
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceFormatProperties2KHR(physical_device, format: api::VkFormat, properties: *mut api::VkFormatProperties2),
    slot = vkGetPhysicalDeviceFormatProperties2KHR, fallback = vkGetPhysicalDeviceFormatProperties2
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceImageFormatProperties2(
        physical_device,
        format_info: *const api::VkPhysicalDeviceImageFormatInfo2,
        properties: *mut api::VkImageFormatProperties2
    ) -> api::VkResult,
    slot = vkGetPhysicalDeviceImageFormatProperties2, fallback = vkGetPhysicalDeviceImageFormatProperties2KHR
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceImageFormatProperties2KHR(
        physical_device,
        format_info: *const api::VkPhysicalDeviceImageFormatInfo2,
        properties: *mut api::VkImageFormatProperties2
    ) -> api::VkResult,
    slot = vkGetPhysicalDeviceImageFormatProperties2KHR, fallback = vkGetPhysicalDeviceImageFormatProperties2
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceQueueFamilyProperties2(physical_device, count: *mut u32, properties: *mut api::VkQueueFamilyProperties2),
    slot = vkGetPhysicalDeviceQueueFamilyProperties2, fallback = vkGetPhysicalDeviceQueueFamilyProperties2KHR
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceQueueFamilyProperties2KHR(physical_device, count: *mut u32, properties: *mut api::VkQueueFamilyProperties2),
    slot = vkGetPhysicalDeviceQueueFamilyProperties2KHR, fallback = vkGetPhysicalDeviceQueueFamilyProperties2
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceMemoryProperties2(physical_device, properties: *mut api::VkPhysicalDeviceMemoryProperties2),
    slot = vkGetPhysicalDeviceMemoryProperties2, fallback = vkGetPhysicalDeviceMemoryProperties2KHR
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceMemoryProperties2KHR(physical_device, properties: *mut api::VkPhysicalDeviceMemoryProperties2),
    slot = vkGetPhysicalDeviceMemoryProperties2KHR, fallback = vkGetPhysicalDeviceMemoryProperties2
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceSparseImageFormatProperties2(
        physical_device,
        format_info: *const api::VkPhysicalDeviceSparseImageFormatInfo2,
        count: *mut u32,
        properties: *mut api::VkSparseImageFormatProperties2
    ),
    slot = vkGetPhysicalDeviceSparseImageFormatProperties2, fallback = vkGetPhysicalDeviceSparseImageFormatProperties2KHR
}
physical_device_trampoline! {
    fn vkGetPhysicalDeviceSparseImageFormatProperties2KHR(
        physical_device,
        format_info: *const api::VkPhysicalDeviceSparseImageFormatInfo2,
        count: *mut u32,
        properties: *mut api::VkSparseImageFormatProperties2
    ),
    slot = vkGetPhysicalDeviceSparseImageFormatProperties2KHR, fallback = vkGetPhysicalDeviceSparseImageFormatProperties2
}

unsafe fn enumerate_extension_properties(
    layer_name: *const c_char,
    property_count: *mut u32,
    properties: *mut api::VkExtensionProperties,
    extension_scope: ExtensionScope,
) -> api::VkResult {
    if !layer_name.is_null() {
        return api::VK_ERROR_LAYER_NOT_PRESENT;
    }
    enumerate_helper(
        property_count,
        properties,
        Extensions::default().iter().filter_map(
            |(extension, _): (Extension, _)| -> Option<api::VkExtensionProperties> {
                if extension.get_scope() == extension_scope {
                    Some(extension.get_properties())
                } else {
                    None
                }
            },
        ),
        |l, r| *l = r,
    )
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkEnumerateInstanceExtensionProperties(
    layer_name: *const c_char,
    property_count: *mut u32,
    properties: *mut api::VkExtensionProperties,
) -> api::VkResult {
    enumerate_extension_properties(
        layer_name,
        property_count,
        properties,
        ExtensionScope::Instance,
    )
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkEnumerateInstanceLayerProperties(
    property_count: *mut u32,
    properties: *mut api::VkLayerProperties,
) -> api::VkResult {
    enumerate_helper(property_count, properties, &[], |l, r| *l = *r)
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkEnumerateInstanceVersion(api_version: *mut u32) -> api::VkResult {
    *api_version = api::make_api_version(1, 1, api::VK_HEADER_VERSION);
    api::VK_SUCCESS
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkEnumerateDeviceExtensionProperties(
    physical_device: api::VkPhysicalDevice,
    layer_name: *const c_char,
    property_count: *mut u32,
    properties: *mut api::VkExtensionProperties,
) -> api::VkResult {
    if !layer_name.is_null() {
        return api::VK_ERROR_LAYER_NOT_PRESENT;
    }
    let physical_device = SharedHandle::from(physical_device);
    let instance = SharedHandle::from(physical_device.instance);
    match instance
        .chain
        .enumerate_device_extension_properties(&physical_device)
    {
        Ok(values) => enumerate_helper(property_count, properties, values, |l, r| *l = r),
        Err(error) => error,
    }
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkEnumerateDeviceLayerProperties(
    _physical_device: api::VkPhysicalDevice,
    property_count: *mut u32,
    properties: *mut api::VkLayerProperties,
) -> api::VkResult {
    enumerate_helper(property_count, properties, &[], |l, r| *l = *r)
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkCreateDebugUtilsMessengerEXT(
    instance: api::VkInstance,
    create_info: *const api::VkDebugUtilsMessengerCreateInfoEXT,
    _allocator: *const api::VkAllocationCallbacks,
    messenger: *mut api::VkDebugUtilsMessengerEXT,
) -> api::VkResult {
    let instance = SharedHandle::from(instance);
    assert!(!create_info.is_null());
    let create_info = &*create_info;
    assert_eq!(
        create_info.sType,
        api::VK_STRUCTURE_TYPE_DEBUG_UTILS_MESSENGER_CREATE_INFO_EXT
    );
    *messenger = instance.messengers.create(create_info);
    api::VK_SUCCESS
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkDestroyDebugUtilsMessengerEXT(
    instance: api::VkInstance,
    messenger: api::VkDebugUtilsMessengerEXT,
    _allocator: *const api::VkAllocationCallbacks,
) {
    let instance = SharedHandle::from(instance);
    if !instance.messengers.destroy(messenger) {
        invalid_handle_abort("VkDebugUtilsMessengerEXT");
    }
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkSubmitDebugUtilsMessageEXT(
    instance: api::VkInstance,
    severity: api::VkDebugUtilsMessageSeverityFlagBitsEXT,
    message_type: api::VkDebugUtilsMessageTypeFlagsEXT,
    data: *const api::VkDebugUtilsMessengerCallbackDataEXT,
) {
    let instance = SharedHandle::from(instance);
    instance.messengers.submit_raw(severity, message_type, data);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static CALLBACK_HITS: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "system" fn counting_callback(
        _severity: api::VkDebugUtilsMessageSeverityFlagBitsEXT,
        _types: api::VkDebugUtilsMessageTypeFlagsEXT,
        data: *const api::VkDebugUtilsMessengerCallbackDataEXT,
        user_data: *mut c_void,
    ) -> api::VkBool32 {
        assert!(!data.is_null());
        assert!(!(*data).pMessage.is_null());
        if !user_data.is_null() {
            *(user_data as *mut u32) += 1;
        }
        CALLBACK_HITS.fetch_add(1, Ordering::SeqCst);
        api::VK_FALSE
    }

    fn messenger_create_info(
        severity: api::VkDebugUtilsMessageSeverityFlagsEXT,
        user_data: *mut c_void,
    ) -> api::VkDebugUtilsMessengerCreateInfoEXT {
        api::VkDebugUtilsMessengerCreateInfoEXT {
            sType: api::VK_STRUCTURE_TYPE_DEBUG_UTILS_MESSENGER_CREATE_INFO_EXT,
            pNext: null(),
            flags: 0,
            messageSeverity: severity,
            messageType: api::VK_DEBUG_UTILS_MESSAGE_TYPE_GENERAL_BIT_EXT,
            pfnUserCallback: Some(counting_callback),
            pUserData: user_data,
        }
    }

    #[test]
    fn messengers_filter_by_severity() {
        CALLBACK_HITS.store(0, Ordering::SeqCst);
        let registry = MessengerRegistry::new();
        let handle = registry.create(&messenger_create_info(
            api::VK_DEBUG_UTILS_MESSAGE_SEVERITY_ERROR_BIT_EXT,
            null_mut(),
        ));
        registry.submit(
            api::VK_DEBUG_UTILS_MESSAGE_SEVERITY_INFO_BIT_EXT,
            api::VK_DEBUG_UTILS_MESSAGE_TYPE_GENERAL_BIT_EXT,
            "filtered out",
        );
        assert_eq!(CALLBACK_HITS.load(Ordering::SeqCst), 0);
        registry.submit(
            api::VK_DEBUG_UTILS_MESSAGE_SEVERITY_ERROR_BIT_EXT,
            api::VK_DEBUG_UTILS_MESSAGE_TYPE_GENERAL_BIT_EXT,
            "delivered",
        );
        assert_eq!(CALLBACK_HITS.load(Ordering::SeqCst), 1);
        assert!(registry.destroy(handle));
        registry.submit(
            api::VK_DEBUG_UTILS_MESSAGE_SEVERITY_ERROR_BIT_EXT,
            api::VK_DEBUG_UTILS_MESSAGE_TYPE_GENERAL_BIT_EXT,
            "after destroy",
        );
        assert_eq!(CALLBACK_HITS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn user_data_is_passed_through() {
        let registry = MessengerRegistry::new();
        let mut hits: u32 = 0;
        registry.create(&messenger_create_info(
            api::VK_DEBUG_UTILS_MESSAGE_SEVERITY_ERROR_BIT_EXT,
            &mut hits as *mut u32 as *mut c_void,
        ));
        registry.submit(
            api::VK_DEBUG_UTILS_MESSAGE_SEVERITY_ERROR_BIT_EXT,
            api::VK_DEBUG_UTILS_MESSAGE_TYPE_GENERAL_BIT_EXT,
            "message",
        );
        assert_eq!(hits, 1);
    }

    #[test]
    fn destroying_null_messenger_is_a_no_op() {
        let registry = MessengerRegistry::new();
        assert!(registry.destroy(Handle::null()));
    }

    #[test]
    fn foreign_messenger_is_rejected() {
        let a = MessengerRegistry::new();
        let b = MessengerRegistry::new();
        let handle = a.create(&messenger_create_info(
            api::VK_DEBUG_UTILS_MESSAGE_SEVERITY_ERROR_BIT_EXT,
            null_mut(),
        ));
        assert!(!b.destroy(handle));
        assert!(a.destroy(handle));
    }

    #[test]
    fn loader_instance_extension_list_is_instance_scope_only() {
        let mut count = 0;
        let result = unsafe {
            vkEnumerateInstanceExtensionProperties(null(), &mut count, null_mut())
        };
        assert_eq!(result, api::VK_SUCCESS);
        let mut properties = vec![
            api::VkExtensionProperties {
                extensionName: [0; api::VK_MAX_EXTENSION_NAME_SIZE],
                specVersion: 0,
            };
            count as usize
        ];
        let result = unsafe {
            vkEnumerateInstanceExtensionProperties(null(), &mut count, properties.as_mut_ptr())
        };
        assert_eq!(result, api::VK_SUCCESS);
        for properties in &properties {
            let name = unsafe { CStr::from_ptr(properties.extensionName.as_ptr()) };
            let extension: Extension = name.to_str().unwrap().parse().unwrap();
            assert_eq!(extension.get_scope(), ExtensionScope::Instance);
        }
    }

    #[test]
    fn layer_enumeration_is_empty() {
        let mut count = !0u32;
        let result =
            unsafe { vkEnumerateInstanceLayerProperties(&mut count, null_mut()) };
        assert_eq!(result, api::VK_SUCCESS);
        assert_eq!(count, 0);
    }

    #[test]
    fn instance_version_reports_1_1() {
        let mut version = 0;
        assert_eq!(
            unsafe { vkEnumerateInstanceVersion(&mut version) },
            api::VK_SUCCESS
        );
        assert_eq!(api::api_version_major(version), 1);
        assert_eq!(api::api_version_minor(version), 1);
    }

    #[test]
    fn create_instance_rejects_unknown_extension() {
        let name = std::ffi::CString::new("VK_KHR_not_an_extension").unwrap();
        let names = [name.as_ptr()];
        let create_info = api::VkInstanceCreateInfo {
            sType: api::VK_STRUCTURE_TYPE_INSTANCE_CREATE_INFO,
            pNext: null(),
            flags: 0,
            pApplicationInfo: null(),
            enabledLayerCount: 0,
            ppEnabledLayerNames: null(),
            enabledExtensionCount: 1,
            ppEnabledExtensionNames: names.as_ptr(),
        };
        let mut instance: api::VkInstance = Handle::null();
        let result = unsafe { vkCreateInstance(&create_info, null(), &mut instance) };
        assert_eq!(result, api::VK_ERROR_EXTENSION_NOT_PRESENT);
        assert!(instance.is_null());
    }

    #[test]
    fn create_instance_rejects_layers() {
        let name = std::ffi::CString::new("VK_LAYER_KHRONOS_validation").unwrap();
        let names = [name.as_ptr()];
        let create_info = api::VkInstanceCreateInfo {
            sType: api::VK_STRUCTURE_TYPE_INSTANCE_CREATE_INFO,
            pNext: null(),
            flags: 0,
            pApplicationInfo: null(),
            enabledLayerCount: 1,
            ppEnabledLayerNames: names.as_ptr(),
            enabledExtensionCount: 0,
            ppEnabledExtensionNames: null(),
        };
        let mut instance: api::VkInstance = Handle::null();
        let result = unsafe { vkCreateInstance(&create_info, null(), &mut instance) };
        assert_eq!(result, api::VK_ERROR_LAYER_NOT_PRESENT);
    }

    #[test]
    fn create_instance_rejects_device_scope_extension() {
        let name = std::ffi::CString::new("VK_KHR_swapchain").unwrap();
        let names = [name.as_ptr()];
        let create_info = api::VkInstanceCreateInfo {
            sType: api::VK_STRUCTURE_TYPE_INSTANCE_CREATE_INFO,
            pNext: null(),
            flags: 0,
            pApplicationInfo: null(),
            enabledLayerCount: 0,
            ppEnabledLayerNames: null(),
            enabledExtensionCount: 1,
            ppEnabledExtensionNames: names.as_ptr(),
        };
        let mut instance: api::VkInstance = Handle::null();
        let result = unsafe { vkCreateInstance(&create_info, null(), &mut instance) };
        assert_eq!(result, api::VK_ERROR_EXTENSION_NOT_PRESENT);
    }
}
