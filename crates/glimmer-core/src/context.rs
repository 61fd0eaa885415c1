//! Per-thread info and shading contexts
//!
//! Each renderer thread owns one [`PerThreadInfo`] and obtains
//! [`ShadingContext`]s from it through the shading system. A context is
//! reusable execution scratch space: executing a group binds the context to
//! that group's heap layout, and symbol addresses resolved against the
//! context stay valid until the next execution rebinds it.
//!
//! Neither type is shared between threads; the shading system itself is the
//! only shared object.

use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::group::{ShaderGroup, ShaderSymbol};

/// Issue/release tallies shared between a thread info and the contexts it
/// handed out. `release_context` takes only the context, so the context
/// carries its way back to the counters.
pub(crate) struct ContextCounters {
    issued: AtomicUsize,
    released: AtomicUsize,
}

/// Opaque per-thread state. Tracks how many contexts this thread has taken
/// and returned so imbalance shows up in statistics.
pub struct PerThreadInfo {
    counters: Arc<ContextCounters>,
}

impl PerThreadInfo {
    pub(crate) fn new() -> PerThreadInfo {
        PerThreadInfo {
            counters: Arc::new(ContextCounters {
                issued: AtomicUsize::new(0),
                released: AtomicUsize::new(0),
            }),
        }
    }

    pub(crate) fn issue(&self) -> Arc<ContextCounters> {
        self.counters.issued.fetch_add(1, Ordering::Relaxed);
        self.counters.clone()
    }

    /// Contexts taken minus contexts returned.
    pub fn outstanding(&self) -> usize {
        self.counters
            .issued
            .load(Ordering::Relaxed)
            .saturating_sub(self.counters.released.load(Ordering::Relaxed))
    }
}

/// Reusable execution scratch space. One execution runs in one context.
pub struct ShadingContext {
    heap: Vec<u8>,
    group: Option<Arc<ShaderGroup>>,
    counters: Option<Arc<ContextCounters>>,
}

impl ShadingContext {
    pub(crate) fn new(counters: Option<Arc<ContextCounters>>) -> ShadingContext {
        ShadingContext {
            heap: Vec::new(),
            group: None,
            counters,
        }
    }

    /// Bind this context to a group's layout, zeroing the heap.
    pub(crate) fn bind(&mut self, group: Arc<ShaderGroup>, heap_size: usize) {
        self.heap.clear();
        self.heap.resize(heap_size, 0);
        self.group = Some(group);
    }

    /// Group bound by the most recent execution.
    pub fn bound_group(&self) -> Option<&Arc<ShaderGroup>> {
        self.group.as_ref()
    }

    /// Write float values at a heap offset. Silently clamps to the
    /// destination size; shaders cannot overrun the heap.
    pub(crate) fn write_floats(&mut self, offset: usize, size: usize, values: &[f32]) {
        let end = (offset + size).min(self.heap.len());
        let mut at = offset;
        for v in values {
            if at + 4 > end {
                break;
            }
            self.heap[at..at + 4].copy_from_slice(&v.to_ne_bytes());
            at += 4;
        }
    }

    /// Address of a symbol's value within this context's heap, valid only
    /// while the context still holds the execution that produced it.
    pub fn symbol_address(&self, symbol: &ShaderSymbol) -> Option<NonNull<u8>> {
        self.group.as_ref()?;
        let offset = symbol.heap_offset();
        if symbol.size() == 0 || offset + symbol.size() > self.heap.len() {
            return None;
        }
        NonNull::new(self.heap[offset..].as_ptr() as *mut u8)
    }

    /// Read a symbol's floats back out, mostly for tests and image output.
    pub fn read_floats(&self, symbol: &ShaderSymbol, out: &mut [f32]) -> bool {
        let Some(addr) = self.symbol_address(symbol) else {
            return false;
        };
        let n = out.len().min(symbol.size() / 4);
        let base = addr.as_ptr() as *const u8;
        for (i, slot) in out.iter_mut().take(n).enumerate() {
            let mut bytes = [0u8; 4];
            unsafe {
                std::ptr::copy_nonoverlapping(base.add(i * 4), bytes.as_mut_ptr(), 4);
            }
            *slot = f32::from_ne_bytes(bytes);
        }
        true
    }
}

impl Drop for ShadingContext {
    fn drop(&mut self) {
        if let Some(counters) = &self.counters {
            counters.released.fetch_add(1, Ordering::Relaxed);
        }
    }
}
