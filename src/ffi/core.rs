// ============================================================================
// Core FFI functions for library initialization and memory management
// ============================================================================

use crate::config::CoreConfig;
use crate::ffi::{block_on_async, handle_status_result, parse_payload, error::FFIError, FFIResult};
use std::ffi::{c_char, CString};
use std::os::raw::c_int;

/// Initialize the library.
///
/// `config_json` is a JSON object with any of the `CoreConfig` fields, or
/// null to read the configuration from the environment.
/// Returns 0 on success, non-zero on error.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn initialize_library(config_json: *const c_char) -> c_int {
    let result = std::panic::catch_unwind(|| -> FFIResult<()> {
        let config = if config_json.is_null() {
            CoreConfig::from_env()?
        } else {
            parse_payload::<CoreConfig>(config_json)?
        };
        block_on_async(crate::initialize(config))
    });

    match result {
        Ok(ffi_result) => handle_status_result(|| ffi_result),
        Err(panic_payload) => {
            let panic_msg = if let Some(s) = panic_payload.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_payload.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Panicked during FFI call, but panic message is not a string".to_string()
            };
            handle_status_result(|| Err(FFIError::internal(format!("Panic during initialization: {}", panic_msg))))
        }
    }
}

/// Frees a string that was allocated by Rust and handed over the FFI
/// boundary. Every `result` string produced by this library must be released
/// exactly once through this function.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aid_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        let _ = CString::from_raw(ptr);
    }
}

/// Get library version
/// Returns allocated string that must be freed with aid_free_string()
#[unsafe(no_mangle)]
pub unsafe extern "C" fn get_library_version() -> *mut c_char {
    match CString::new(env!("CARGO_PKG_VERSION")) {
        Ok(c_string) => c_string.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}
