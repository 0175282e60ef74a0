//! Memory Access Types.
//!
//! This module defines how a request reaching a cache is described. It provides:
//! 1. **Access Kind:** Instruction fetch, data read, or data write.
//! 2. **Requester Context:** Which hardware thread issued the request, from which PC, and
//!    whether that thread is a helper (prefetching) thread or the main thread.
//! 3. **Tags:** The line-aligned address type every cache and tracker is keyed on.

/// Line-aligned address identifying a cache line.
pub type Tag = u64;

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AccessType {
    /// Instruction fetch access.
    Fetch,

    /// Data read access (load).
    #[default]
    Read,

    /// Data write access (store).
    Write,
}

/// Requester side of a cache access.
///
/// Replacement policies use the thread id and PC to index their predictors; the helper-thread
/// flag separates prefetching helper threads from the main thread they assist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct AccessContext {
    /// Hardware thread (core) that issued the request.
    pub thread_id: usize,
    /// Virtual PC of the instruction that issued the request.
    pub pc: u64,
    /// True when the requester is a helper thread.
    pub helper_thread: bool,
    /// Kind of memory operation.
    pub access_type: AccessType,
}

impl AccessContext {
    /// Creates a main-thread read context.
    pub const fn main_thread(thread_id: usize, pc: u64) -> Self {
        Self {
            thread_id,
            pc,
            helper_thread: false,
            access_type: AccessType::Read,
        }
    }

    /// Creates a helper-thread read context.
    pub const fn helper_thread(thread_id: usize, pc: u64) -> Self {
        Self {
            thread_id,
            pc,
            helper_thread: true,
            access_type: AccessType::Read,
        }
    }

    /// Returns the same context with a different access type.
    #[must_use]
    pub const fn with_access_type(mut self, access_type: AccessType) -> Self {
        self.access_type = access_type;
        self
    }

    /// True for data reads.
    #[inline]
    pub const fn is_load(&self) -> bool {
        matches!(self.access_type, AccessType::Read)
    }
}
