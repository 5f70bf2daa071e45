// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information
//! the instance dispatch chain: every link implements the same structural
//! command interface and forwards to the next, ending in the driver
//! terminator, which substitutes driver handles for loader handles

use crate::api;
use crate::extensions::Extensions;
use crate::handle::{Handle, OwnedHandle};
use crate::instance::{MessengerRegistry, PhysicalDevice};
use crate::tables::InstanceTable;
use parking_lot::Mutex;
use std::os::raw::c_char;
use std::ptr::null_mut;
use std::sync::Arc;

/// one driver's share of a loader instance
pub struct DriverInstance {
    pub gipa:
        unsafe extern "system" fn(api::VkIcdInstance, *const c_char) -> api::PFN_vkVoidFunction,
    pub instance: api::VkIcdInstance,
    pub table: InstanceTable,
    pub enabled_extensions: Extensions,
    pub api_version: u32,
}

unsafe impl Send for DriverInstance {}
unsafe impl Sync for DriverInstance {}

pub trait InstanceDispatch: Send + Sync {
    unsafe fn enumerate_physical_devices(
        &self,
        instance: api::VkInstance,
    ) -> Result<Vec<api::VkPhysicalDevice>, api::VkResult>;
    unsafe fn enumerate_physical_device_groups(
        &self,
        instance: api::VkInstance,
    ) -> Result<Vec<api::VkPhysicalDeviceGroupProperties>, api::VkResult>;
    unsafe fn create_device(
        &self,
        physical_device: &PhysicalDevice,
        create_info: *const api::VkDeviceCreateInfo,
        allocator: *const api::VkAllocationCallbacks,
    ) -> Result<api::VkDevice, api::VkResult>;
    unsafe fn enumerate_device_extension_properties(
        &self,
        physical_device: &PhysicalDevice,
    ) -> Result<Vec<api::VkExtensionProperties>, api::VkResult>;
    unsafe fn destroy_instance(&self, allocator: *const api::VkAllocationCallbacks);
}

pub fn empty_group_properties() -> api::VkPhysicalDeviceGroupProperties {
    api::VkPhysicalDeviceGroupProperties {
        sType: api::VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_GROUP_PROPERTIES,
        pNext: null_mut(),
        physicalDeviceCount: 0,
        physicalDevices: [null_mut(); api::VK_MAX_DEVICE_GROUP_SIZE],
        subsetAllocation: api::VK_FALSE,
    }
}

/// the last link before the drivers; owns the wrapped physical devices so
/// the same wrapper is handed out on every enumeration
pub struct DriverTerminator {
    pub drivers: Vec<Arc<DriverInstance>>,
    physical_devices: Mutex<Option<Vec<OwnedHandle<api::VkPhysicalDevice>>>>,
}

impl DriverTerminator {
    pub fn new(drivers: Vec<Arc<DriverInstance>>) -> Self {
        DriverTerminator {
            drivers,
            physical_devices: Mutex::new(None),
        }
    }

    unsafe fn fill_physical_device_cache(
        &self,
        instance: api::VkInstance,
    ) -> Result<(), api::VkResult> {
        let mut cache = self.physical_devices.lock();
        if cache.is_some() {
            return Ok(());
        }
        let mut wrappers = Vec::new();
        for driver in &self.drivers {
            let enumerate = match driver.table.vkEnumeratePhysicalDevices {
                Some(v) => v,
                None => return Err(api::VK_ERROR_INITIALIZATION_FAILED),
            };
            let mut count = 0;
            let result = enumerate(driver.instance, &mut count, null_mut());
            if result != api::VK_SUCCESS {
                return Err(result);
            }
            let mut devices = vec![null_mut(); count as usize];
            let result = enumerate(driver.instance, &mut count, devices.as_mut_ptr());
            if result != api::VK_SUCCESS && result != api::VK_INCOMPLETE {
                return Err(result);
            }
            devices.truncate(count as usize);
            for handle in devices {
                wrappers.push(OwnedHandle::new(PhysicalDevice {
                    instance,
                    driver: driver.clone(),
                    handle,
                }));
            }
        }
        log::debug!(
            "enumerated {} physical devices across {} drivers",
            wrappers.len(),
            self.drivers.len()
        );
        *cache = Some(wrappers);
        Ok(())
    }

    fn wrapped_handle_for(
        wrappers: &[OwnedHandle<api::VkPhysicalDevice>],
        driver: &Arc<DriverInstance>,
        raw: api::VkIcdPhysicalDevice,
    ) -> Option<api::VkPhysicalDevice> {
        wrappers
            .iter()
            .find(|v| Arc::ptr_eq(&v.driver, driver) && v.handle == raw)
            .map(|v| v.get_handle())
    }
}

impl InstanceDispatch for DriverTerminator {
    unsafe fn enumerate_physical_devices(
        &self,
        instance: api::VkInstance,
    ) -> Result<Vec<api::VkPhysicalDevice>, api::VkResult> {
        self.fill_physical_device_cache(instance)?;
        let cache = self.physical_devices.lock();
        Ok(cache
            .as_ref()
            .unwrap()
            .iter()
            .map(|v| v.get_handle())
            .collect())
    }

    unsafe fn enumerate_physical_device_groups(
        &self,
        instance: api::VkInstance,
    ) -> Result<Vec<api::VkPhysicalDeviceGroupProperties>, api::VkResult> {
        self.fill_physical_device_cache(instance)?;
        let cache = self.physical_devices.lock();
        let wrappers = cache.as_ref().unwrap();
        let mut groups = Vec::new();
        for driver in &self.drivers {
            let enumerate = driver
                .table
                .vkEnumeratePhysicalDeviceGroups
                .or(driver.table.vkEnumeratePhysicalDeviceGroupsKHR);
            match enumerate {
                Some(enumerate) => {
                    let mut count = 0;
                    let result = enumerate(driver.instance, &mut count, null_mut());
                    if result != api::VK_SUCCESS {
                        return Err(result);
                    }
                    let mut driver_groups = vec![empty_group_properties(); count as usize];
                    let result = enumerate(driver.instance, &mut count, driver_groups.as_mut_ptr());
                    if result != api::VK_SUCCESS && result != api::VK_INCOMPLETE {
                        return Err(result);
                    }
                    driver_groups.truncate(count as usize);
                    for group in &mut driver_groups {
                        for i in 0..group.physicalDeviceCount as usize {
                            let raw = group.physicalDevices[i];
                            let wrapped = match Self::wrapped_handle_for(wrappers, driver, raw) {
                                Some(v) => v,
                                None => {
                                    log::warn!(
                                        "driver {:?} reported a grouped physical device it never \
                                         enumerated",
                                        driver.instance
                                    );
                                    return Err(api::VK_ERROR_INITIALIZATION_FAILED);
                                }
                            };
                            group.physicalDevices[i] = wrapped
                                .get()
                                .map_or(null_mut(), |v| v.as_ptr())
                                as api::VkIcdPhysicalDevice;
                        }
                    }
                    groups.extend(driver_groups);
                }
                // drivers that predate device groups get one group per device
                None => {
                    for wrapper in wrappers.iter().filter(|v| Arc::ptr_eq(&v.driver, driver)) {
                        let mut group = empty_group_properties();
                        group.physicalDeviceCount = 1;
                        group.physicalDevices[0] = wrapper
                            .get_handle()
                            .get()
                            .map_or(null_mut(), |v| v.as_ptr())
                            as api::VkIcdPhysicalDevice;
                        groups.push(group);
                    }
                }
            }
        }
        Ok(groups)
    }

    unsafe fn create_device(
        &self,
        physical_device: &PhysicalDevice,
        create_info: *const api::VkDeviceCreateInfo,
        allocator: *const api::VkAllocationCallbacks,
    ) -> Result<api::VkDevice, api::VkResult> {
        let create = match physical_device.driver.table.vkCreateDevice {
            Some(v) => v,
            None => return Err(api::VK_ERROR_INITIALIZATION_FAILED),
        };
        let mut device = null_mut();
        let result = create(physical_device.handle, create_info, allocator, &mut device);
        if result != api::VK_SUCCESS {
            return Err(result);
        }
        Ok(device)
    }

    unsafe fn enumerate_device_extension_properties(
        &self,
        physical_device: &PhysicalDevice,
    ) -> Result<Vec<api::VkExtensionProperties>, api::VkResult> {
        let enumerate = match physical_device
            .driver
            .table
            .vkEnumerateDeviceExtensionProperties
        {
            Some(v) => v,
            None => return Err(api::VK_ERROR_INITIALIZATION_FAILED),
        };
        let mut count = 0;
        let result = enumerate(
            physical_device.handle,
            std::ptr::null(),
            &mut count,
            null_mut(),
        );
        if result != api::VK_SUCCESS {
            return Err(result);
        }
        let mut properties = vec![
            api::VkExtensionProperties {
                extensionName: [0; api::VK_MAX_EXTENSION_NAME_SIZE],
                specVersion: 0,
            };
            count as usize
        ];
        let result = enumerate(
            physical_device.handle,
            std::ptr::null(),
            &mut count,
            properties.as_mut_ptr(),
        );
        if result != api::VK_SUCCESS && result != api::VK_INCOMPLETE {
            return Err(result);
        }
        properties.truncate(count as usize);
        Ok(properties)
    }

    unsafe fn destroy_instance(&self, allocator: *const api::VkAllocationCallbacks) {
        // wrappers go first so no physical device outlives its driver instance
        *self.physical_devices.lock() = None;
        for driver in &self.drivers {
            if let Some(destroy) = driver.table.vkDestroyInstance {
                destroy(driver.instance, allocator);
            }
        }
    }
}

/// interposed when `VK_EXT_debug_utils` is enabled: failures in the
/// structural commands are reported to the application's messengers before
/// the error is propagated
pub struct DebugMessengerLayer {
    pub next: Arc<dyn InstanceDispatch>,
    pub messengers: Arc<MessengerRegistry>,
}

impl DebugMessengerLayer {
    unsafe fn report<T>(
        &self,
        command: &str,
        result: Result<T, api::VkResult>,
    ) -> Result<T, api::VkResult> {
        if let Err(error) = &result {
            self.messengers.submit(
                api::VK_DEBUG_UTILS_MESSAGE_SEVERITY_ERROR_BIT_EXT,
                api::VK_DEBUG_UTILS_MESSAGE_TYPE_GENERAL_BIT_EXT,
                &format!("{} failed with {}", command, error),
            );
        }
        result
    }
}

impl InstanceDispatch for DebugMessengerLayer {
    unsafe fn enumerate_physical_devices(
        &self,
        instance: api::VkInstance,
    ) -> Result<Vec<api::VkPhysicalDevice>, api::VkResult> {
        let result = self.next.enumerate_physical_devices(instance);
        self.report("vkEnumeratePhysicalDevices", result)
    }

    unsafe fn enumerate_physical_device_groups(
        &self,
        instance: api::VkInstance,
    ) -> Result<Vec<api::VkPhysicalDeviceGroupProperties>, api::VkResult> {
        let result = self.next.enumerate_physical_device_groups(instance);
        self.report("vkEnumeratePhysicalDeviceGroups", result)
    }

    unsafe fn create_device(
        &self,
        physical_device: &PhysicalDevice,
        create_info: *const api::VkDeviceCreateInfo,
        allocator: *const api::VkAllocationCallbacks,
    ) -> Result<api::VkDevice, api::VkResult> {
        let result = self
            .next
            .create_device(physical_device, create_info, allocator);
        self.report("vkCreateDevice", result)
    }

    unsafe fn enumerate_device_extension_properties(
        &self,
        physical_device: &PhysicalDevice,
    ) -> Result<Vec<api::VkExtensionProperties>, api::VkResult> {
        self.next
            .enumerate_device_extension_properties(physical_device)
    }

    unsafe fn destroy_instance(&self, allocator: *const api::VkAllocationCallbacks) {
        self.next.destroy_instance(allocator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::InstanceTable;
    use std::ffi::CStr;
    use std::mem::transmute;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DESTROYED: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "system" fn stub_destroy_instance(
        _instance: api::VkIcdInstance,
        _allocator: *const api::VkAllocationCallbacks,
    ) {
        DESTROYED.fetch_add(1, Ordering::SeqCst);
    }

    unsafe extern "system" fn stub_enumerate_physical_devices(
        _instance: api::VkIcdInstance,
        count: *mut u32,
        devices: *mut api::VkIcdPhysicalDevice,
    ) -> api::VkResult {
        if devices.is_null() {
            *count = 2;
        } else {
            assert!(*count >= 2);
            *count = 2;
            *devices = 0x10 as api::VkIcdPhysicalDevice;
            *devices.offset(1) = 0x20 as api::VkIcdPhysicalDevice;
        }
        api::VK_SUCCESS
    }

    unsafe extern "system" fn stub_create_device(
        _physical_device: api::VkIcdPhysicalDevice,
        _create_info: *const api::VkDeviceCreateInfo,
        _allocator: *const api::VkAllocationCallbacks,
        device: *mut api::VkDevice,
    ) -> api::VkResult {
        *device = 0x30 as api::VkDevice;
        api::VK_SUCCESS
    }

    unsafe extern "system" fn stub_gipa(
        _instance: api::VkIcdInstance,
        name: *const c_char,
    ) -> api::PFN_vkVoidFunction {
        match CStr::from_ptr(name).to_str().unwrap() {
            "vkDestroyInstance" => {
                let f: api::icd::PFN_vkDestroyInstance = Some(stub_destroy_instance);
                transmute(f)
            }
            "vkEnumeratePhysicalDevices" => {
                let f: api::icd::PFN_vkEnumeratePhysicalDevices =
                    Some(stub_enumerate_physical_devices);
                transmute(f)
            }
            "vkCreateDevice" => {
                let f: api::icd::PFN_vkCreateDevice = Some(stub_create_device);
                transmute(f)
            }
            _ => None,
        }
    }

    fn stub_driver() -> Arc<DriverInstance> {
        Arc::new(DriverInstance {
            gipa: stub_gipa,
            instance: 0x1 as api::VkIcdInstance,
            table: unsafe { InstanceTable::load(stub_gipa, 0x1 as api::VkIcdInstance) },
            enabled_extensions: Extensions::create_empty(),
            api_version: api::VK_API_VERSION_1_0,
        })
    }

    #[test]
    fn terminator_wraps_and_caches_physical_devices() {
        let terminator = DriverTerminator::new(vec![stub_driver()]);
        let instance: api::VkInstance = Handle::null();
        let first = unsafe { terminator.enumerate_physical_devices(instance) }.unwrap();
        let second = unsafe { terminator.enumerate_physical_devices(instance) }.unwrap();
        assert_eq!(first.len(), 2);
        // the same wrapper is handed out on re-enumeration
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.get(), b.get());
        }
        let wrapped = unsafe { crate::handle::SharedHandle::from(first[0]) };
        assert_eq!(wrapped.handle, 0x10 as api::VkIcdPhysicalDevice);
    }

    #[test]
    fn terminator_synthesizes_groups_for_old_drivers() {
        let terminator = DriverTerminator::new(vec![stub_driver()]);
        let instance: api::VkInstance = Handle::null();
        let groups = unsafe { terminator.enumerate_physical_device_groups(instance) }.unwrap();
        assert_eq!(groups.len(), 2);
        for group in &groups {
            assert_eq!(group.physicalDeviceCount, 1);
            assert!(!group.physicalDevices[0].is_null());
        }
        // the group members are the wrapped handles, not the driver's
        let devices = unsafe { terminator.enumerate_physical_devices(instance) }.unwrap();
        let raw = devices[0].get().unwrap().as_ptr() as api::VkIcdPhysicalDevice;
        assert_eq!(groups[0].physicalDevices[0], raw);
    }

    #[test]
    fn terminator_creates_device_through_driver() {
        let driver = stub_driver();
        let terminator = DriverTerminator::new(vec![driver.clone()]);
        let physical_device = PhysicalDevice {
            instance: Handle::null(),
            driver,
            handle: 0x10 as api::VkIcdPhysicalDevice,
        };
        let create_info = api::VkDeviceCreateInfo {
            sType: api::VK_STRUCTURE_TYPE_DEVICE_CREATE_INFO,
            pNext: std::ptr::null(),
            flags: 0,
            queueCreateInfoCount: 0,
            pQueueCreateInfos: std::ptr::null(),
            enabledLayerCount: 0,
            ppEnabledLayerNames: std::ptr::null(),
            enabledExtensionCount: 0,
            ppEnabledExtensionNames: std::ptr::null(),
            pEnabledFeatures: std::ptr::null(),
        };
        let device = unsafe {
            terminator.create_device(&physical_device, &create_info, std::ptr::null())
        }
        .unwrap();
        assert_eq!(device, 0x30 as api::VkDevice);
    }

    #[test]
    fn terminator_destroys_every_driver_instance() {
        DESTROYED.store(0, Ordering::SeqCst);
        let terminator = DriverTerminator::new(vec![stub_driver(), stub_driver()]);
        unsafe { terminator.destroy_instance(std::ptr::null()) };
        assert_eq!(DESTROYED.load(Ordering::SeqCst), 2);
    }

    struct FailingDispatch;

    impl InstanceDispatch for FailingDispatch {
        unsafe fn enumerate_physical_devices(
            &self,
            _instance: api::VkInstance,
        ) -> Result<Vec<api::VkPhysicalDevice>, api::VkResult> {
            Err(api::VK_ERROR_INITIALIZATION_FAILED)
        }
        unsafe fn enumerate_physical_device_groups(
            &self,
            _instance: api::VkInstance,
        ) -> Result<Vec<api::VkPhysicalDeviceGroupProperties>, api::VkResult> {
            Err(api::VK_ERROR_INITIALIZATION_FAILED)
        }
        unsafe fn create_device(
            &self,
            _physical_device: &PhysicalDevice,
            _create_info: *const api::VkDeviceCreateInfo,
            _allocator: *const api::VkAllocationCallbacks,
        ) -> Result<api::VkDevice, api::VkResult> {
            Err(api::VK_ERROR_INITIALIZATION_FAILED)
        }
        unsafe fn enumerate_device_extension_properties(
            &self,
            _physical_device: &PhysicalDevice,
        ) -> Result<Vec<api::VkExtensionProperties>, api::VkResult> {
            Err(api::VK_ERROR_INITIALIZATION_FAILED)
        }
        unsafe fn destroy_instance(&self, _allocator: *const api::VkAllocationCallbacks) {}
    }

    static MESSAGES: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "system" fn counting_callback(
        _severity: api::VkDebugUtilsMessageSeverityFlagBitsEXT,
        _types: api::VkDebugUtilsMessageTypeFlagsEXT,
        _data: *const api::VkDebugUtilsMessengerCallbackDataEXT,
        _user_data: *mut std::os::raw::c_void,
    ) -> api::VkBool32 {
        MESSAGES.fetch_add(1, Ordering::SeqCst);
        api::VK_FALSE
    }

    #[test]
    fn debug_layer_reports_failures_to_messengers() {
        let _ = env_logger::builder().is_test(true).try_init();
        MESSAGES.store(0, Ordering::SeqCst);
        let messengers = Arc::new(MessengerRegistry::new());
        let create_info = api::VkDebugUtilsMessengerCreateInfoEXT {
            sType: api::VK_STRUCTURE_TYPE_DEBUG_UTILS_MESSENGER_CREATE_INFO_EXT,
            pNext: std::ptr::null(),
            flags: 0,
            messageSeverity: api::VK_DEBUG_UTILS_MESSAGE_SEVERITY_ERROR_BIT_EXT,
            messageType: api::VK_DEBUG_UTILS_MESSAGE_TYPE_GENERAL_BIT_EXT,
            pfnUserCallback: Some(counting_callback),
            pUserData: std::ptr::null_mut(),
        };
        messengers.create(&create_info);
        let layer = DebugMessengerLayer {
            next: Arc::new(FailingDispatch),
            messengers,
        };
        let result = unsafe { layer.enumerate_physical_devices(Handle::null()) };
        assert_eq!(result.unwrap_err(), api::VK_ERROR_INITIALIZATION_FAILED);
        assert_eq!(MESSAGES.load(Ordering::SeqCst), 1);
    }
}
