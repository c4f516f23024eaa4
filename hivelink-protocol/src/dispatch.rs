//! Fixed-capacity intent → handler table.
//!
//! A flat array scanned linearly. Unregistered entries become tombstones
//! (id 0, no handler) that later registrations reuse; the array is never
//! compacted, so ids do not stay in insertion order.

use heapless::Vec;

/// Id marking an empty slot
pub const EMPTY_ID: u16 = 0;

/// Default number of handler slots
pub const DEFAULT_HANDLER_CAPACITY: usize = 16;

/// Errors from registering a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// Every slot is live
    TableFull,
    /// Id 0 marks empty slots and cannot be registered
    ReservedId,
}

#[derive(Debug, Clone, Copy)]
struct Entry<H> {
    id: u16,
    handler: Option<H>,
}

/// Dispatch table with `N` slots
#[derive(Debug, Clone)]
pub struct DispatchTable<H, const N: usize = DEFAULT_HANDLER_CAPACITY> {
    entries: Vec<Entry<H>, N>,
}

impl<H: Copy, const N: usize> Default for DispatchTable<H, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Copy, const N: usize> DispatchTable<H, N> {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, id: u16) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Register `handler` for `id`, replacing any existing handler
    ///
    /// New ids go into the next unused slot, then into the first tombstone.
    pub fn register(&mut self, id: u16, handler: H) -> Result<(), DispatchError> {
        if id == EMPTY_ID {
            return Err(DispatchError::ReservedId);
        }

        if let Some(index) = self.position(id) {
            self.entries[index].handler = Some(handler);
            return Ok(());
        }

        let entry = Entry {
            id,
            handler: Some(handler),
        };
        match self.entries.push(entry) {
            Ok(()) => Ok(()),
            Err(entry) => {
                let index = self.position(EMPTY_ID).ok_or(DispatchError::TableFull)?;
                self.entries[index] = entry;
                Ok(())
            }
        }
    }

    /// Remove the handler for `id`, leaving its slot free for reuse
    ///
    /// Returns the removed handler, if any.
    pub fn unregister(&mut self, id: u16) -> Option<H> {
        if id == EMPTY_ID {
            return None;
        }
        let index = self.position(id)?;
        let entry = &mut self.entries[index];
        entry.id = EMPTY_ID;
        entry.handler.take()
    }

    /// Handler registered for `id`
    pub fn lookup(&self, id: u16) -> Option<H> {
        if id == EMPTY_ID {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.handler)
    }

    /// Number of live registrations
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.id != EMPTY_ID).count()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total slots
    pub const fn capacity(&self) -> usize {
        N
    }
}
