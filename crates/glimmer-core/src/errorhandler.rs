//! Diagnostic sink for the shading system
//!
//! Every diagnostic the library produces flows through one
//! [`ErrorHandler`]: a severity code plus a formatted message. Embedders
//! install their own handler to collect, translate, or escalate messages;
//! the [`DefaultErrorHandler`] routes everything to `tracing`.

use std::sync::atomic::{AtomicI32, Ordering};

/// Severity codes carried alongside each diagnostic message.
///
/// The values occupy the high half-word so embedders can pack auxiliary data
/// into the low bits without colliding.
pub mod errcode {
    pub const MESSAGE: i32 = 0 << 16;
    pub const INFO: i32 = 1 << 16;
    pub const WARNING: i32 = 2 << 16;
    pub const ERROR: i32 = 3 << 16;
    pub const SEVERE: i32 = 4 << 16;
    pub const DEBUG: i32 = 5 << 16;
}

/// Verbosity levels understood by [`ErrorHandler::set_verbosity`].
pub mod verbosity {
    pub const QUIET: i32 = 0;
    pub const NORMAL: i32 = 1;
    pub const VERBOSE: i32 = 2;
}

/// Sink for diagnostics with a severity code.
///
/// Implementations must be callable from any thread the shading system
/// executes on.
pub trait ErrorHandler: Send + Sync {
    /// Deliver one diagnostic. `errcode` is one of the [`errcode`] values.
    fn handle(&self, errcode: i32, message: &str);

    fn verbosity(&self) -> i32 {
        verbosity::NORMAL
    }

    fn set_verbosity(&self, _verbosity: i32) {}

    fn message(&self, msg: &str) {
        self.handle(errcode::MESSAGE, msg);
    }

    fn info(&self, msg: &str) {
        self.handle(errcode::INFO, msg);
    }

    fn warning(&self, msg: &str) {
        self.handle(errcode::WARNING, msg);
    }

    fn error(&self, msg: &str) {
        self.handle(errcode::ERROR, msg);
    }

    fn severe(&self, msg: &str) {
        self.handle(errcode::SEVERE, msg);
    }

    fn debug(&self, msg: &str) {
        self.handle(errcode::DEBUG, msg);
    }
}

/// Handler used when the embedder installs none: diagnostics go to `tracing`
/// at the matching level, filtered by the configured verbosity.
pub struct DefaultErrorHandler {
    verbosity: AtomicI32,
}

impl DefaultErrorHandler {
    pub fn new() -> DefaultErrorHandler {
        DefaultErrorHandler {
            verbosity: AtomicI32::new(verbosity::NORMAL),
        }
    }
}

impl Default for DefaultErrorHandler {
    fn default() -> Self {
        DefaultErrorHandler::new()
    }
}

impl ErrorHandler for DefaultErrorHandler {
    fn handle(&self, errcode: i32, message: &str) {
        let v = self.verbosity.load(Ordering::Relaxed);
        match errcode {
            errcode::DEBUG => {
                if v >= verbosity::VERBOSE {
                    tracing::debug!(message = %message, "shading system debug");
                }
            }
            errcode::INFO | errcode::MESSAGE => {
                if v >= verbosity::NORMAL {
                    tracing::info!(message = %message, "shading system info");
                }
            }
            errcode::WARNING => {
                if v >= verbosity::NORMAL {
                    tracing::warn!(message = %message, "shading system warning");
                }
            }
            _ => {
                tracing::error!(errcode = errcode, message = %message, "shading system error");
            }
        }
    }

    fn verbosity(&self) -> i32 {
        self.verbosity.load(Ordering::Relaxed)
    }

    fn set_verbosity(&self, verbosity: i32) {
        self.verbosity.store(verbosity, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Capture {
        events: Mutex<Vec<(i32, String)>>,
    }

    impl ErrorHandler for Capture {
        fn handle(&self, errcode: i32, message: &str) {
            self.events.lock().push((errcode, message.to_string()));
        }
    }

    #[test]
    fn verbosity_round_trip() {
        let eh = DefaultErrorHandler::new();
        for v in [0, 1, 2, 3] {
            eh.set_verbosity(v);
            assert_eq!(eh.verbosity(), v);
        }
    }

    #[test]
    fn convenience_emitters_carry_severity() {
        let eh = Capture {
            events: Mutex::new(Vec::new()),
        };
        eh.info("a");
        eh.warning("b");
        eh.error("c");
        let events = eh.events.lock();
        assert_eq!(
            *events,
            vec![
                (errcode::INFO, "a".to_string()),
                (errcode::WARNING, "b".to_string()),
                (errcode::ERROR, "c".to_string()),
            ]
        );
    }
}
