use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Borrow a nullable C string argument as `&str`.
///
/// Returns `None` for a null pointer or invalid UTF-8.
///
/// # Safety
/// `ptr`, when non-null, must point to a NUL-terminated string that stays
/// valid for the duration of the call.
pub unsafe fn cstr_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Export an owned string across the boundary.
///
/// Interior NUL bytes are replaced so the conversion cannot fail; the
/// caller frees the result with `lb_free_string`. Never returns null.
pub fn export_string(s: String) -> *mut c_char {
    let sanitized = if s.as_bytes().contains(&0) {
        s.replace('\0', "\u{fffd}")
    } else {
        s
    };
    match CString::new(sanitized) {
        Ok(c) => c.into_raw(),
        // Unreachable after sanitizing, but never hand out null.
        Err(_) => CString::default().into_raw(),
    }
}
