use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::runtime::Runtime;

use crate::ffi::error::{ErrorCode, FFIError};

/// Ensure pointer is not null
macro_rules! ensure_ptr {
    ($ptr:expr) => {
        if $ptr.is_null() {
            return Err(crate::ffi::error::FFIError::null_pointer(stringify!($ptr)));
        }
    };
}

pub mod beneficiary;
pub mod core;
pub mod distribution;
pub mod error;

/// Error handling helper for FFI boundaries (returns error code)
pub fn handle_status_result<F>(func: F) -> c_int
where
    F: FnOnce() -> FFIResult<()>,
{
    match func() {
        Ok(_) => ErrorCode::Success as c_int,
        Err(e) => {
            log::error!(
                "[FFI] code: {:?}, message: {}, details: {}",
                e.code,
                e.message,
                e.details.as_deref().unwrap_or("None")
            );
            e.code as c_int
        }
    }
}

/// Run an async future to completion on a freshly-spun Tokio runtime.
pub(crate) fn block_on_async<F, T, E>(future: F) -> FFIResult<T>
where
    F: std::future::Future<Output = Result<T, E>>,
    E: Into<FFIError>,
{
    let rt = Runtime::new().map_err(|e| FFIError::internal(format!("failed to create tokio runtime: {e}")))?;
    rt.block_on(future).map_err(Into::into)
}

/// Decode a JSON payload handed over by the host app.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn parse_payload<T: DeserializeOwned>(ptr: *const c_char) -> FFIResult<T> {
    ensure_ptr!(ptr);
    let json = CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| FFIError::new(ErrorCode::InvalidUtf8, "payload is not valid UTF-8"))?;
    serde_json::from_str(json).map_err(|e| FFIError::invalid_argument(&format!("json {e}")))
}

/// Serialize `value` and hand ownership of the string to the caller, who
/// releases it with `aid_free_string`.
///
/// # Safety
/// `result` must be null or a valid location for one pointer.
pub(crate) unsafe fn write_json<T: Serialize>(value: &T, result: *mut *mut c_char) -> FFIResult<()> {
    ensure_ptr!(result);
    let json = serde_json::to_string(value).map_err(|e| FFIError::internal(format!("ser {e}")))?;
    *result = CString::new(json)?.into_raw();
    Ok(())
}

pub use error::FFIResult;
