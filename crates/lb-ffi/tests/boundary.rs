//! End-to-end tests of the C boundary against the stub engine.
//!
//! The runtime can only be installed once per process, so every test
//! shares the same stub (script: "42").

use std::ffi::{CStr, CString};
use std::io::Write;
use std::os::raw::c_char;
use std::sync::Once;

use lb_engine::stub::StubLoader;
use lb_ffi::{install_runtime, lb_destroy, lb_free_string, lb_generate, lb_load_model, lb_model_info};

static INSTALL: Once = Once::new();

fn setup() {
    INSTALL.call_once(|| {
        install_runtime(Box::new(StubLoader::new().with_text_script("42")));
    });
}

fn model_file() -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(b"stub weights").unwrap();
    f
}

fn load(path: &str) -> i64 {
    let c = CString::new(path).unwrap();
    unsafe { lb_load_model(c.as_ptr(), 2048, -1) }
}

/// Take ownership of a boundary string and free the native side.
fn take_string(ptr: *mut c_char) -> String {
    assert!(!ptr.is_null(), "boundary strings must never be null");
    let s = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
    unsafe { lb_free_string(ptr) };
    s
}

fn generate(handle: i64, prompt: &str) -> String {
    let c = CString::new(prompt).unwrap();
    // Temperature 0: greedy, deterministic.
    take_string(unsafe { lb_generate(handle, c.as_ptr(), 64, 0.0, 0.9, 40) })
}

#[test]
fn test_load_invalid_paths_return_sentinel() {
    setup();
    assert_eq!(unsafe { lb_load_model(std::ptr::null(), 2048, -1) }, 0);
    assert_eq!(load(""), 0);
    assert_eq!(load("/no/such/model.gguf"), 0);
}

#[test]
fn test_load_returns_increasing_handles() {
    setup();
    let f = model_file();
    let a = load(f.path().to_str().unwrap());
    let b = load(f.path().to_str().unwrap());
    assert!(a > 0);
    assert!(b > a);
    lb_destroy(a);
    let c = load(f.path().to_str().unwrap());
    assert!(c > b, "handles are never reused");
    lb_destroy(b);
    lb_destroy(c);
}

#[test]
fn test_generate_round_trip() {
    setup();
    let f = model_file();
    let h = load(f.path().to_str().unwrap());
    assert!(h > 0);
    assert_eq!(generate(h, "hello"), "42");
    // Repeat on the same handle: context reset gives the same answer.
    assert_eq!(generate(h, "hello"), "42");
    lb_destroy(h);
}

#[test]
fn test_generate_invalid_handle_reports_error() {
    setup();
    assert_eq!(generate(0, "hello"), "Error: Invalid handle");
    assert_eq!(generate(987654, "hello"), "Error: Invalid handle");
}

#[test]
fn test_generate_null_prompt_reports_error() {
    setup();
    let f = model_file();
    let h = load(f.path().to_str().unwrap());
    let out = take_string(unsafe { lb_generate(h, std::ptr::null(), 64, 0.0, 0.9, 40) });
    assert_eq!(out, "Error: Invalid parameters");
    lb_destroy(h);
}

#[test]
fn test_generate_blank_prompt_reports_error() {
    setup();
    let f = model_file();
    let h = load(f.path().to_str().unwrap());
    assert_eq!(generate(h, "   \n\t "), "Error: Empty prompt");
    lb_destroy(h);
}

#[test]
fn test_generate_after_destroy_reports_error() {
    setup();
    let f = model_file();
    let h = load(f.path().to_str().unwrap());
    lb_destroy(h);
    let out = generate(h, "hello");
    assert!(out.starts_with("Error: "), "got: {out}");
}

#[test]
fn test_destroy_is_silent_for_any_handle() {
    setup();
    lb_destroy(0);
    lb_destroy(-1);
    lb_destroy(424242);
    let f = model_file();
    let h = load(f.path().to_str().unwrap());
    lb_destroy(h);
    lb_destroy(h);
}

#[test]
fn test_model_info_reports_metadata() {
    setup();
    let f = model_file();
    let h = load(f.path().to_str().unwrap());
    let info = take_string(lb_model_info(h));
    assert!(info.starts_with("Model Information:"), "got: {info}");
    assert!(info.contains(&format!("Handle: {h}")));
    assert!(info.contains("Vocabulary size: "));
    assert!(info.contains("Context size: 2048"));
    assert!(info.contains("Status: Loaded and ready"));
    lb_destroy(h);

    let err = take_string(lb_model_info(h));
    assert!(err.starts_with("Error: "), "got: {err}");
}

#[test]
fn test_free_string_null_is_noop() {
    setup();
    unsafe { lb_free_string(std::ptr::null_mut()) };
}
