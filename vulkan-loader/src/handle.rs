// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

use crate::api;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{null_mut, NonNull};

/// a wrapped handle is invalid: wrong, corrupted, or never created by this
/// loader; the upstream API contract assumes handle validity, so this is an
/// unrecoverable usage error, not an error-code condition
pub fn invalid_handle_abort(kind: &str) -> ! {
    log::error!(
        "invalid {} handle passed to the loader: dispatch table missing or corrupt",
        kind
    );
    std::process::abort()
}

#[repr(C)]
pub struct DispatchableType<T> {
    loader_dispatch_ptr: usize,
    value: T,
}

impl<T> From<T> for DispatchableType<T> {
    fn from(v: T) -> Self {
        Self {
            loader_dispatch_ptr: api::ICD_LOADER_MAGIC as usize,
            value: v,
        }
    }
}

impl<T> Deref for DispatchableType<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for DispatchableType<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

/// implemented by wrapper payloads that carry the loader magic word
pub trait DispatchCheck {
    fn check_dispatch(&self);
}

impl<T> DispatchCheck for DispatchableType<T> {
    fn check_dispatch(&self) {
        if self.loader_dispatch_ptr != api::ICD_LOADER_MAGIC as usize {
            invalid_handle_abort(std::any::type_name::<T>());
        }
    }
}

pub trait Handle: Copy {
    type Value;
    fn get(&self) -> Option<NonNull<Self::Value>>;
    fn new(v: Option<NonNull<Self::Value>>) -> Self;
    fn null() -> Self {
        Self::new(None)
    }
    fn is_null(&self) -> bool {
        self.get().is_none()
    }
}

#[repr(transparent)]
pub struct DispatchableHandle<T>(Option<NonNull<DispatchableType<T>>>);

impl<T> Clone for DispatchableHandle<T> {
    fn clone(&self) -> Self {
        DispatchableHandle(self.0)
    }
}

impl<T> Copy for DispatchableHandle<T> {}

impl<T> fmt::Debug for DispatchableHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DispatchableHandle").field(&self.0).finish()
    }
}

impl<T> Handle for DispatchableHandle<T> {
    type Value = DispatchableType<T>;
    fn get(&self) -> Option<NonNull<DispatchableType<T>>> {
        self.0
    }
    fn new(v: Option<NonNull<DispatchableType<T>>>) -> Self {
        DispatchableHandle(v)
    }
}

#[repr(transparent)]
pub struct NondispatchableHandle<T>(u64, PhantomData<Option<NonNull<T>>>);

impl<T> Clone for NondispatchableHandle<T> {
    fn clone(&self) -> Self {
        NondispatchableHandle(self.0, PhantomData)
    }
}

impl<T> Copy for NondispatchableHandle<T> {}

impl<T> Handle for NondispatchableHandle<T> {
    type Value = T;
    fn get(&self) -> Option<NonNull<T>> {
        NonNull::new(self.0 as *mut T)
    }
    fn new(v: Option<NonNull<T>>) -> Self {
        NondispatchableHandle(
            v.map(|v| v.as_ptr()).unwrap_or(null_mut()) as u64,
            PhantomData,
        )
    }
}

/// owning wrapper around a loader-allocated object, keyed by its handle type
pub struct OwnedHandle<H: Handle>(NonNull<H::Value>);

impl<H: Handle> OwnedHandle<H> {
    pub fn new<V: Into<H::Value>>(v: V) -> Self {
        OwnedHandle(NonNull::new(Box::into_raw(Box::new(v.into()))).unwrap())
    }
    pub fn get_handle(&self) -> H {
        H::new(Some(self.0))
    }
    /// leaks the object into the application-facing handle
    pub fn take(self) -> H {
        let retval = H::new(Some(self.0));
        mem::forget(self);
        retval
    }
}

impl<H: Handle> OwnedHandle<H>
where
    H::Value: DispatchCheck,
{
    /// retakes ownership from a handle previously produced by `take`
    pub unsafe fn from(handle: H) -> Self {
        let ptr = match handle.get() {
            Some(ptr) => ptr,
            None => invalid_handle_abort(std::any::type_name::<H::Value>()),
        };
        ptr.as_ref().check_dispatch();
        OwnedHandle(ptr)
    }
}

impl<H: Handle> Deref for OwnedHandle<H> {
    type Target = H::Value;
    fn deref(&self) -> &H::Value {
        unsafe { self.0.as_ref() }
    }
}

impl<H: Handle> DerefMut for OwnedHandle<H> {
    fn deref_mut(&mut self) -> &mut H::Value {
        unsafe { self.0.as_mut() }
    }
}

impl<H: Handle> Drop for OwnedHandle<H> {
    fn drop(&mut self) {
        unsafe {
            drop(Box::from_raw(self.0.as_ptr()));
        }
    }
}

unsafe impl<H: Handle> Send for OwnedHandle<H> where H::Value: Send {}
unsafe impl<H: Handle> Sync for OwnedHandle<H> where H::Value: Sync {}

/// borrowing wrapper; resolving a null or corrupt handle aborts
pub struct SharedHandle<H: Handle>(NonNull<H::Value>);

impl<H: Handle> Clone for SharedHandle<H> {
    fn clone(&self) -> Self {
        SharedHandle(self.0)
    }
}

impl<H: Handle> Copy for SharedHandle<H> {}

impl<H: Handle> SharedHandle<H>
where
    H::Value: DispatchCheck,
{
    pub unsafe fn from(handle: H) -> Self {
        match Self::try_from(handle) {
            Some(v) => v,
            None => invalid_handle_abort(std::any::type_name::<H::Value>()),
        }
    }
    /// null maps to `None`; a non-null handle still has its magic verified
    pub unsafe fn try_from(handle: H) -> Option<Self> {
        let ptr = handle.get()?;
        ptr.as_ref().check_dispatch();
        Some(SharedHandle(ptr))
    }
}

impl<H: Handle> SharedHandle<H> {
    pub fn get_handle(&self) -> H {
        H::new(Some(self.0))
    }
}

impl<H: Handle> Deref for SharedHandle<H> {
    type Target = H::Value;
    fn deref(&self) -> &H::Value {
        unsafe { self.0.as_ref() }
    }
}

pub type VkInstance = DispatchableHandle<crate::instance::Instance>;
pub type VkPhysicalDevice = DispatchableHandle<crate::instance::PhysicalDevice>;
pub type VkSurfaceKHR = NondispatchableHandle<crate::api::VkIcdSurfaceBase>;
pub type VkDebugUtilsMessengerEXT = NondispatchableHandle<crate::instance::DebugUtilsMessenger>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_handle_roundtrip() {
        let owned = OwnedHandle::<DispatchableHandle<u32>>::new(42u32);
        let handle = owned.take();
        let shared = unsafe { SharedHandle::try_from(handle) }.unwrap();
        assert_eq!(**shared, 42);
        drop(unsafe { OwnedHandle::from(handle) });
    }

    #[test]
    fn null_handle_is_none() {
        let handle: DispatchableHandle<u32> = Handle::null();
        assert!(handle.is_null());
        assert!(unsafe { SharedHandle::try_from(handle) }.is_none());
    }

    #[test]
    fn get_handle_points_at_the_same_object() {
        let owned = OwnedHandle::<DispatchableHandle<u32>>::new(7u32);
        let a = owned.get_handle();
        let b = owned.get_handle();
        assert_eq!(a.get(), b.get());
    }

    #[test]
    fn nondispatchable_null_roundtrip() {
        let handle: NondispatchableHandle<u32> = Handle::null();
        assert!(handle.get().is_none());
        let mut value = 7u32;
        let handle = NondispatchableHandle::new(NonNull::new(&mut value));
        assert_eq!(unsafe { *handle.get().unwrap().as_ref() }, 7);
    }

    #[test]
    fn handles_have_ffi_sizes() {
        assert_eq!(
            std::mem::size_of::<DispatchableHandle<u32>>(),
            std::mem::size_of::<*mut ()>()
        );
        assert_eq!(
            std::mem::size_of::<NondispatchableHandle<u32>>(),
            std::mem::size_of::<u64>()
        );
    }
}
