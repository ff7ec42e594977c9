// Public modules
pub mod config;
pub mod domains;
pub mod errors;
pub mod ffi;
pub mod globals;
pub mod types;
pub mod validation;

pub use config::CoreConfig;

// Entry point for initialization
/// Initialize the library with the given configuration.
/// This function must be called before any other function in the library.
pub async fn initialize(config: CoreConfig) -> ffi::FFIResult<()> {
    globals::initialize(config).await
}

/// Whether `initialize` has completed successfully
pub fn is_initialized() -> bool {
    globals::is_initialized()
}
