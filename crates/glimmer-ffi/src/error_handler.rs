//! Error-handler bridge
//!
//! Implements the core [`ErrorHandler`] trait over a single caller-supplied
//! function pointer, so a foreign embedder receives every diagnostic the
//! shading system emits as a plain `(severity, message)` pair. The message
//! pointer handed to the callback is valid only for the duration of the
//! call.

use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use glimmer_core::{verbosity, ErrorHandler};

use crate::handles::ErrorHandlerPtr;

/// Caller-supplied diagnostic sink. Must not be null; a null callback is
/// undefined behavior by contract. May be invoked from any thread the
/// shading system executes on.
pub type ErrorHandlerFn = extern "C" fn(errcode: c_int, message: *const c_char);

/// Bridge object behind [`ErrorHandlerPtr`] handles.
pub struct ErrorHandlerBridge {
    callback: ErrorHandlerFn,
    verbosity: AtomicI32,
}

impl ErrorHandlerBridge {
    fn new(callback: ErrorHandlerFn) -> ErrorHandlerBridge {
        ErrorHandlerBridge {
            callback,
            verbosity: AtomicI32::new(verbosity::NORMAL),
        }
    }
}

impl ErrorHandler for ErrorHandlerBridge {
    fn handle(&self, errcode: i32, message: &str) {
        // Interior nuls cannot survive a C string; strip them rather than
        // drop the diagnostic.
        let c_message = match CString::new(message) {
            Ok(s) => s,
            Err(_) => CString::new(message.replace('\0', ""))
                .unwrap_or_else(|_| CString::new("").unwrap()),
        };
        (self.callback)(errcode, c_message.as_ptr());
    }

    fn verbosity(&self) -> i32 {
        self.verbosity.load(Ordering::Relaxed)
    }

    fn set_verbosity(&self, verbosity: i32) {
        self.verbosity.store(verbosity, Ordering::Relaxed);
    }
}

/// Create an error handler forwarding to `callback`.
#[no_mangle]
pub extern "C" fn glim_error_handler_create(callback: ErrorHandlerFn) -> ErrorHandlerPtr {
    tracing::debug!("creating error-handler bridge");
    Arc::into_raw(Arc::new(ErrorHandlerBridge::new(callback)))
}

/// Release the caller's reference. Any shading system created over this
/// handler keeps its own reference; the bridge is freed when the last one
/// drops.
///
/// # Safety
///
/// `eh` must be a live handle from [`glim_error_handler_create`], released
/// exactly once.
#[no_mangle]
pub unsafe extern "C" fn glim_error_handler_destroy(eh: ErrorHandlerPtr) {
    drop(Arc::from_raw(eh));
}

/// # Safety
///
/// `eh` must be a live handle from [`glim_error_handler_create`].
#[no_mangle]
pub unsafe extern "C" fn glim_error_handler_set_verbosity(eh: ErrorHandlerPtr, verbosity: c_int) {
    (*eh).set_verbosity(verbosity);
}

/// # Safety
///
/// `eh` must be a live handle from [`glim_error_handler_create`].
#[no_mangle]
pub unsafe extern "C" fn glim_error_handler_get_verbosity(eh: ErrorHandlerPtr) -> c_int {
    (*eh).verbosity()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::ffi::CStr;
    use std::sync::Mutex;

    static CAPTURED: Mutex<Vec<(i32, String)>> = Mutex::new(Vec::new());

    extern "C" fn capture(errcode: c_int, message: *const c_char) {
        let message = unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned();
        CAPTURED.lock().unwrap().push((errcode, message));
    }

    #[test]
    #[serial]
    fn forwards_severity_and_bytes() {
        CAPTURED.lock().unwrap().clear();
        let eh = glim_error_handler_create(capture);
        unsafe {
            (*eh).handle(glimmer_core::errcode::WARNING, "heap too small");
            (*eh).handle(glimmer_core::errcode::ERROR, "bad attribute");
        }
        let captured = CAPTURED.lock().unwrap().clone();
        assert_eq!(
            captured,
            vec![
                (glimmer_core::errcode::WARNING, "heap too small".to_string()),
                (glimmer_core::errcode::ERROR, "bad attribute".to_string()),
            ]
        );
        unsafe { glim_error_handler_destroy(eh) };
    }

    #[test]
    #[serial]
    fn interior_nul_is_stripped_not_dropped() {
        CAPTURED.lock().unwrap().clear();
        let eh = glim_error_handler_create(capture);
        unsafe { (*eh).handle(glimmer_core::errcode::INFO, "a\0b") };
        let captured = CAPTURED.lock().unwrap().clone();
        assert_eq!(captured, vec![(glimmer_core::errcode::INFO, "ab".to_string())]);
        unsafe { glim_error_handler_destroy(eh) };
    }

    #[test]
    #[serial]
    fn verbosity_round_trip() {
        let eh = glim_error_handler_create(capture);
        for v in [0, 1, 2, 3] {
            unsafe {
                glim_error_handler_set_verbosity(eh, v);
                assert_eq!(glim_error_handler_get_verbosity(eh), v);
            }
        }
        unsafe { glim_error_handler_destroy(eh) };
    }
}
