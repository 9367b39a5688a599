//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system.
///
/// Safe to call more than once; later calls are ignored so tests and
/// embedding applications can both initialize freely.
pub fn init() {
    let _ = env_logger::builder().try_init();
}
