//! C boundary for llm-bridge.
//!
//! Failures never cross this boundary as unwinds or nulls: the load path
//! reports the sentinel handle 0, the text-returning paths report a
//! non-null string starting with `"Error: "`, and destroy is always a
//! silent success. Panics are caught and converted the same way.
//!
//! The embedding shim binds a concrete engine by calling
//! [`install_runtime`] once at startup (e.g. from its library-init hook)
//! before any boundary call; calls made earlier fail softly with the
//! sentinel/error forms above.

mod marshal;

use std::os::raw::c_char;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::OnceLock;

use lb_engine::{LoadOptions, RuntimeLoader};
use lb_session::{GenerateParams, ModelService, INVALID_HANDLE};

use marshal::{cstr_arg, export_string};

static SERVICE: OnceLock<ModelService> = OnceLock::new();

/// Bind the inference engine that all boundary calls go through.
///
/// Returns `false` if a runtime was already installed (the first one
/// stays in effect for the life of the process).
pub fn install_runtime(loader: Box<dyn RuntimeLoader>) -> bool {
    SERVICE.set(ModelService::new(loader)).is_ok()
}

/// Run a boundary body, converting a panic into the fallback value.
fn catch_boundary<T>(fallback: impl FnOnce() -> T, body: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(v) => v,
        Err(_) => {
            tracing::error!("panic caught at FFI boundary");
            fallback()
        }
    }
}

/// Load a model and return its session handle.
///
/// `context_size <= 0` defaults to 2048. `threads == -1` auto-detects
/// hardware concurrency; other non-positive values default to 4.
/// Returns 0 on any failure (bad path, backend init failure, load
/// failure, no runtime installed).
///
/// # Safety
/// `path` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn lb_load_model(
    path: *const c_char,
    context_size: i32,
    threads: i32,
) -> i64 {
    catch_boundary(
        || INVALID_HANDLE,
        || {
            let Some(service) = SERVICE.get() else {
                tracing::warn!("load called before a runtime was installed");
                return INVALID_HANDLE;
            };
            let Some(path) = cstr_arg(path) else {
                return INVALID_HANDLE;
            };
            match service.load(Path::new(path), LoadOptions::new(context_size, threads)) {
                Ok(handle) => handle,
                Err(e) => {
                    tracing::warn!(error = %e, "model load failed");
                    INVALID_HANDLE
                }
            }
        },
    )
}

/// Generate text for a prompt against a loaded session.
///
/// Non-positive or out-of-range parameters fall back to the defaults
/// (256 tokens, temperature 0.8, top-p 0.9, top-k 40); a temperature of
/// exactly 0 selects greedy decoding. Never returns null: failures come
/// back as a string starting with `"Error: "`. Free the result with
/// `lb_free_string`.
///
/// # Safety
/// `prompt` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn lb_generate(
    handle: i64,
    prompt: *const c_char,
    max_tokens: i32,
    temperature: f32,
    top_p: f32,
    top_k: i32,
) -> *mut c_char {
    catch_boundary(
        || export_string("Error: Internal panic during text generation".to_string()),
        || {
            let Some(service) = SERVICE.get() else {
                return export_string("Error: No inference runtime installed".to_string());
            };
            let Some(prompt) = cstr_arg(prompt) else {
                return export_string("Error: Invalid parameters".to_string());
            };
            let params = GenerateParams {
                max_tokens,
                temperature,
                top_p,
                top_k,
            };
            match service.generate(handle, prompt, &params) {
                Ok(text) => export_string(text),
                Err(e) => export_string(format!("Error: {}", e)),
            }
        },
    )
}

/// Human-readable metadata for a loaded session (vocabulary size, context
/// size, embedding size, architecture). Never returns null; failures come
/// back as `"Error: ..."`. Free the result with `lb_free_string`.
#[no_mangle]
pub extern "C" fn lb_model_info(handle: i64) -> *mut c_char {
    catch_boundary(
        || export_string("Error: Internal panic getting model info".to_string()),
        || {
            let Some(service) = SERVICE.get() else {
                return export_string("Error: No inference runtime installed".to_string());
            };
            match service.info(handle) {
                Ok(info) => export_string(info.to_string()),
                Err(e) => export_string(format!("Error: {}", e)),
            }
        },
    )
}

/// Destroy a session, releasing its model and decode context.
///
/// Unknown, already-destroyed, or sentinel handles are a silent no-op;
/// this call never fails outwardly.
#[no_mangle]
pub extern "C" fn lb_destroy(handle: i64) {
    catch_boundary(
        || (),
        || {
            if let Some(service) = SERVICE.get() {
                service.destroy(handle);
            }
        },
    )
}

/// Free a string returned by `lb_generate` or `lb_model_info`.
/// Passing null is a no-op.
///
/// # Safety
/// `s` must be null or a pointer previously returned by this library and
/// not yet freed.
#[no_mangle]
pub unsafe extern "C" fn lb_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(std::ffi::CString::from_raw(s));
    }
}
