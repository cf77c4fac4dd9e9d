// Copyright 2002 Andrea Mazzoleni (AdvanceMAME)
// Copyright 2020 Evgeniy Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Per-use context: the scratch arena, the wide-store capability flag, and
//! the lazily-filled kernel tables, all owned by the caller instead of living
//! as process-wide globals.

use std::cell::{Ref, RefCell};

use crate::arena::{ScratchArena, ScratchHandle};
use crate::error::BlitError;

/// A table that's filled at most once, on first use, and read-only after.
///
/// Mirrors the original's "has this been initialized yet" static tables
/// (mean, triad, scandouble, max-rgb) without resorting to a process-wide
/// `static mut`.
pub struct TableSlot<T> {
    inner: RefCell<Option<T>>,
}

impl<T> TableSlot<T> {
    pub fn new() -> Self {
        TableSlot { inner: RefCell::new(None) }
    }

    /// Returns the table, filling it with `f` the first time this is called.
    pub fn get_or_init(&self, f: impl FnOnce() -> T) -> Ref<'_, T> {
        if self.inner.borrow().is_none() {
            let value = f();
            *self.inner.borrow_mut() = Some(value);
        }
        Ref::map(self.inner.borrow(), |slot| slot.as_ref().expect("just filled"))
    }

    /// Whether the table has already been filled.
    pub fn is_init(&self) -> bool {
        self.inner.borrow().is_some()
    }
}

impl<T> Default for TableSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Every lazily-filled kernel table, one slot per family named in §5 of
/// SPEC_FULL.md. Exact contents are filled in by the owning kernel module
/// (`kernels::triad`, `kernels::reduce`, ...) the first time that decoration
/// or combine mode is used.
#[derive(Default)]
pub struct KernelTables {
    pub mean: TableSlot<Vec<u8>>,
    pub triad3: TableSlot<Vec<u8>>,
    pub triad6: TableSlot<Vec<u8>>,
    pub triad16: TableSlot<Vec<u8>>,
    pub triad3_strong: TableSlot<Vec<u8>>,
    pub triad6_strong: TableSlot<Vec<u8>>,
    pub triad16_strong: TableSlot<Vec<u8>>,
    pub scandouble_horz: TableSlot<Vec<u8>>,
    pub scantriple_horz: TableSlot<Vec<u8>>,
    pub scandouble_vert: TableSlot<Vec<u8>>,
    pub scantriple_vert: TableSlot<Vec<u8>>,
    pub max_rgb: TableSlot<Vec<u8>>,
}

/// Owns everything a blit needs that isn't the source/destination pixels
/// themselves: the scratch arena, the capability flag, the `mask8_set_all`
/// table and the kernel tables.
///
/// Exactly one `BlitContext` is meant to be live per thread of use; blits
/// against the same context don't run concurrently (the caller serializes),
/// so plain `&mut` access to the arena is enough and no locking is needed.
pub struct BlitContext {
    arena: ScratchArena,
    /// `mask8_set_all[i] = i | i<<8 | i<<16 | i<<24`, used by the palette and
    /// reduce kernels to broadcast a byte across a 32-bit word.
    pub mask8_set_all: [u32; 256],
    /// Whether the wide-store ("fast-write") capability is available. Stands
    /// in for the original's MMX-presence probe; this crate performs no real
    /// CPU feature detection, so callers set this explicitly.
    capability: bool,
    pub tables: KernelTables,
    teardown_hook: Option<Box<dyn FnMut()>>,
}

impl BlitContext {
    /// Builds a context with the given wide-store capability flag.
    pub fn new(capability: bool) -> Result<Self, BlitError> {
        let mut mask8_set_all = [0u32; 256];
        for (i, slot) in mask8_set_all.iter_mut().enumerate() {
            let i = i as u32;
            *slot = i | (i << 8) | (i << 16) | (i << 24);
        }

        Ok(BlitContext {
            arena: ScratchArena::new(),
            mask8_set_all,
            capability,
            tables: KernelTables::default(),
            teardown_hook: None,
        })
    }

    pub fn capability(&self) -> bool {
        self.capability
    }

    /// Installs (or clears, with `None`) the teardown hook run once after
    /// every vertical `put`.
    pub fn set_teardown_hook(&mut self, hook: Option<Box<dyn FnMut()>>) {
        self.teardown_hook = hook;
    }

    /// Runs the teardown hook, if one is installed. A frame consists of
    /// exactly one vertical `put`, so the driver calls this exactly once.
    pub fn run_teardown(&mut self) {
        if let Some(hook) = self.teardown_hook.as_mut() {
            hook();
        }
    }

    pub fn alloc(&mut self, size: usize) -> Result<(ScratchHandle, &mut [u8]), BlitError> {
        self.arena.alloc(size)
    }

    pub fn free(&mut self, handle: ScratchHandle) {
        self.arena.free(handle)
    }

    /// Verifies the arena stack is empty and releases the context. Panics in
    /// debug builds if a pipeline leaked an allocation.
    pub fn shutdown(self) {
        debug_assert_eq!(self.arena.depth(), 0, "BlitContext::shutdown with a non-empty scratch arena");
    }
}

impl Drop for BlitContext {
    fn drop(&mut self) {
        debug_assert_eq!(self.arena.depth(), 0, "BlitContext dropped with a non-empty scratch arena");
    }
}
