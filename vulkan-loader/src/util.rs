// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

use crate::api;
use std::ffi::CString;
use std::os::raw::c_char;
use std::slice;

/// like `slice::from_raw_parts` except that the pointer can be null when the length is zero
pub unsafe fn to_slice<'a, T>(p: *const T, len: usize) -> &'a [T] {
    if len == 0 {
        &[]
    } else {
        assert!(!p.is_null());
        slice::from_raw_parts(p, len)
    }
}

pub fn copy_str_to_char_array(dest: &mut [c_char], src: &str) {
    #![allow(clippy::int_plus_one)]
    assert!(dest.len() >= src.len() + 1);
    let src = src.as_bytes();
    for i in 0..src.len() {
        dest[i] = src[i] as c_char;
    }
    for v in dest.iter_mut().skip(src.len()) {
        *v = 0;
    }
}

/// two-call enumeration: count query when `api_values` is null, filling
/// otherwise, `VK_INCOMPLETE` when the provided capacity is too small
pub unsafe fn enumerate_helper<T, Item, I: IntoIterator<Item = Item>, AF: FnMut(&mut T, Item)>(
    api_value_count: *mut u32,
    api_values: *mut T,
    values: I,
    mut assign_function: AF,
) -> api::VkResult {
    let mut retval = api::VK_SUCCESS;
    let mut api_values = if api_values.is_null() {
        None
    } else {
        Some(slice::from_raw_parts_mut(
            api_values,
            *api_value_count as usize,
        ))
    };
    let mut final_count = 0;
    for value in values {
        if let Some(api_values) = &mut api_values {
            if final_count >= api_values.len() {
                retval = api::VK_INCOMPLETE;
                break;
            } else {
                assign_function(&mut api_values[final_count], value);
                final_count += 1;
            }
        } else {
            final_count += 1;
        }
    }
    assert_eq!(final_count as u32 as usize, final_count);
    *api_value_count = final_count as u32;
    retval
}

/// finds the first structure of the given type in a `pNext` chain; unknown
/// structures are skipped, not rejected, since the chain is forwarded to the
/// drivers as-is
pub unsafe fn find_in_next_chain(
    root: *const api::VkBaseInStructure,
    struct_type: api::VkStructureType,
) -> *const api::VkBaseInStructure {
    let mut child = root;
    while !child.is_null() {
        let child_ref = &*child;
        if child_ref.sType == struct_type {
            return child;
        }
        child = child_ref.pNext as *const api::VkBaseInStructure;
    }
    std::ptr::null()
}

/// owns the storage behind a `*const *const c_char` name list handed to a driver
pub struct CStringArray {
    strings: Vec<CString>,
    pointers: Vec<*const c_char>,
}

impl CStringArray {
    pub fn new<'a, I: IntoIterator<Item = &'a str>>(names: I) -> Self {
        let strings: Vec<CString> = names
            .into_iter()
            .map(|v| CString::new(v).unwrap())
            .collect();
        let pointers = strings.iter().map(|v| v.as_ptr()).collect();
        CStringArray { strings, pointers }
    }
    pub fn len(&self) -> u32 {
        self.strings.len() as u32
    }
    pub fn as_ptr(&self) -> *const *const c_char {
        if self.pointers.is_empty() {
            std::ptr::null()
        } else {
            self.pointers.as_ptr()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr::null_mut;

    #[test]
    fn enumerate_helper_counts_without_writing() {
        let mut count = 0;
        let result =
            unsafe { enumerate_helper(&mut count, null_mut::<u32>(), [1, 2, 3], |l, r| *l = r) };
        assert_eq!(result, api::VK_SUCCESS);
        assert_eq!(count, 3);
    }

    #[test]
    fn enumerate_helper_truncates_with_incomplete() {
        let mut count = 2;
        let mut values = [0u32; 2];
        let result =
            unsafe { enumerate_helper(&mut count, values.as_mut_ptr(), [1, 2, 3], |l, r| *l = r) };
        assert_eq!(result, api::VK_INCOMPLETE);
        assert_eq!(count, 2);
        assert_eq!(values, [1, 2]);
    }

    #[test]
    fn enumerate_helper_fills_exactly() {
        let mut count = 5;
        let mut values = [0u32; 5];
        let result =
            unsafe { enumerate_helper(&mut count, values.as_mut_ptr(), [7, 8], |l, r| *l = r) };
        assert_eq!(result, api::VK_SUCCESS);
        assert_eq!(count, 2);
        assert_eq!(&values[..2], &[7, 8]);
    }

    #[test]
    fn copy_str_pads_with_nul() {
        let mut dest = [0x7f as c_char; 8];
        copy_str_to_char_array(&mut dest, "abc");
        assert_eq!(dest[..3], [b'a' as c_char, b'b' as c_char, b'c' as c_char]);
        assert!(dest[3..].iter().all(|&v| v == 0));
    }

    #[test]
    fn cstring_array_roundtrip() {
        let array = CStringArray::new(vec!["VK_KHR_surface", "VK_KHR_swapchain"]);
        assert_eq!(array.len(), 2);
        let pointers = unsafe { to_slice(array.as_ptr(), array.len() as usize) };
        let first = unsafe { std::ffi::CStr::from_ptr(pointers[0]) };
        assert_eq!(first.to_str().unwrap(), "VK_KHR_surface");
    }

    #[test]
    fn empty_cstring_array_has_null_pointer() {
        let array = CStringArray::new(Vec::<&str>::new());
        assert_eq!(array.len(), 0);
        assert!(array.as_ptr().is_null());
    }
}
