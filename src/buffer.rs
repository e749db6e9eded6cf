//! Fixed-capacity ring buffer of formatted log lines
//!
//! Lines are stored in a preallocated slot table addressed by an atomically
//! advancing index taken modulo the table length. Once the index passes the
//! table length, each write overwrites whatever sits at `index % len`. This is
//! plain modular addressing, not least-recently-written eviction.
//!
//! Writers never block each other: each one claims a distinct index with a
//! single `fetch_add` and then stores into its own slot. Two writers exactly
//! one table length apart can land on the same slot; the last store wins.

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use crate::error::BufferError;
use crate::INTERNAL_TARGET;

/// Capacity used when none is configured
pub const DEFAULT_CAPACITY: usize = 1000;

/// Extra slots allocated beyond the configured capacity by default
pub const DEFAULT_SLACK: usize = 0;

/// Upper bound on the backing table length, capacity plus slack
pub const MAX_BACKING_LEN: usize = 1 << 20;

type Slot = Mutex<Option<String>>;

/// Slot storage plus the capacity it was sized for
struct SlotTable {
    slots: Box<[Slot]>,
    capacity: usize,
}

impl SlotTable {
    /// `capacity + slack` must already be checked against [`MAX_BACKING_LEN`]
    fn new(capacity: usize, slack: usize) -> Self {
        Self {
            slots: empty_slots(capacity.saturating_add(slack)),
            capacity,
        }
    }

    /// Position of the oldest line given the current write index
    fn oldest_position(&self, next_index: usize) -> usize {
        let len = self.slots.len();
        if next_index <= len {
            0
        } else {
            next_index % len
        }
    }
}

/// Backing length for `capacity + slack`, if it fits under [`MAX_BACKING_LEN`]
fn check_backing_len(capacity: usize, slack: usize) -> Result<usize, BufferError> {
    capacity
        .checked_add(slack)
        .filter(|&len| len <= MAX_BACKING_LEN)
        .ok_or(BufferError::TooLarge {
            capacity,
            slack,
            max: MAX_BACKING_LEN,
        })
}

fn empty_slots(len: usize) -> Box<[Slot]> {
    (0..len).map(|_| Mutex::new(None)).collect()
}

/// Thread-safe circular store of the most recent log lines
pub struct RingBuffer {
    /// Slot table; writers share it, resizing takes it exclusively
    table: RwLock<SlotTable>,
    /// Slots allocated on top of the capacity
    slack: usize,
    /// Index handed to the next writer
    next_index: AtomicUsize,
}

impl RingBuffer {
    /// Create a buffer holding `capacity` lines
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self::with_slack(capacity, DEFAULT_SLACK)
    }

    /// Create a buffer with `slack` extra slots beyond `capacity`
    ///
    /// A capacity of zero is raised to one. Capacity is then clamped to
    /// [`MAX_BACKING_LEN`] and slack to whatever room is left.
    pub fn with_slack(capacity: usize, slack: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_BACKING_LEN);
        let slack = slack.min(MAX_BACKING_LEN - capacity);
        Self {
            table: RwLock::new(SlotTable::new(capacity, slack)),
            slack,
            next_index: AtomicUsize::new(0),
        }
    }

    /// Like [`RingBuffer::with_slack`] but rejects sizes instead of clamping
    pub fn try_with_slack(capacity: usize, slack: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        check_backing_len(capacity, slack)?;
        Ok(Self::with_slack(capacity, slack))
    }

    /// Configured capacity, not counting slack
    pub fn capacity(&self) -> usize {
        self.read_table().capacity
    }

    /// Extra slots allocated on top of the capacity
    pub fn slack(&self) -> usize {
        self.slack
    }

    /// Number of slots in the backing table
    pub fn backing_len(&self) -> usize {
        self.read_table().slots.len()
    }

    /// Number of lines written since creation, the last resize or clear
    pub fn write_count(&self) -> usize {
        self.next_index.load(Ordering::Acquire)
    }

    /// Change the capacity for future writes
    ///
    /// Growing reallocates the slot table. The lines currently held are kept
    /// and re-seated at the start of the new table in the order they were
    /// written, and writing continues right after them. Shrinking is refused.
    pub fn configure_capacity(&self, capacity: usize) -> Result<(), BufferError> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }

        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let current = table.capacity;
        if capacity < current {
            return Err(BufferError::Shrink {
                current,
                requested: capacity,
            });
        }
        if capacity == current {
            return Ok(());
        }
        let backing_len = check_backing_len(capacity, self.slack)?;

        let next_index = self.next_index.load(Ordering::Acquire);
        let len = table.slots.len();
        let start = table.oldest_position(next_index);

        let mut slots: Vec<Slot> = Vec::with_capacity(backing_len);
        for offset in 0..len {
            let slot = &mut table.slots[(start + offset) % len];
            let line = slot.get_mut().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(line) = line {
                slots.push(Mutex::new(Some(line)));
            }
        }
        let retained = slots.len();
        slots.resize_with(backing_len, || Mutex::new(None));

        table.slots = slots.into_boxed_slice();
        table.capacity = capacity;
        self.next_index.store(retained, Ordering::Release);
        drop(table);

        tracing::debug!(
            target: INTERNAL_TARGET,
            from = current,
            to = capacity,
            retained,
            "ring buffer resized"
        );
        Ok(())
    }

    /// Store a line in the next slot
    pub fn write(&self, line: impl Into<String>) {
        let line = line.into();
        let table = self.read_table();
        let index = self.next_index.fetch_add(1, Ordering::AcqRel) % table.slots.len();
        let mut slot = table.slots[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(line);
    }

    /// Write every stored line to `sink`, in slot order
    ///
    /// Empty slots are skipped and the buffer is left untouched, so draining
    /// twice without intervening writes produces the same output. Returns the
    /// number of lines written.
    pub fn drain<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<usize> {
        let table = self.read_table();
        let mut written = 0;
        for slot in table.slots.iter() {
            let line = slot.lock().unwrap_or_else(PoisonError::into_inner).clone();
            if let Some(line) = line {
                writeln!(sink, "{}", line)?;
                written += 1;
            }
        }
        sink.flush()?;
        Ok(written)
    }

    /// Number of populated slots
    pub fn len(&self) -> usize {
        self.read_table()
            .slots
            .iter()
            .filter(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
            .count()
    }

    /// Check if nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every slot, in slot order
    pub fn snapshot(&self) -> Vec<Option<String>> {
        self.read_table()
            .slots
            .iter()
            .map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
            .collect()
    }

    /// Stored lines in the order they were written, oldest first
    pub fn recent(&self) -> Vec<String> {
        let table = self.read_table();
        let len = table.slots.len();
        let start = table.oldest_position(self.next_index.load(Ordering::Acquire));
        (0..len)
            .filter_map(|offset| {
                table.slots[(start + offset) % len]
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
            })
            .collect()
    }

    /// Drop every stored line and restart addressing at slot zero
    pub fn clear(&self) {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        for slot in table.slots.iter_mut() {
            *slot.get_mut().unwrap_or_else(PoisonError::into_inner) = None;
        }
        self.next_index.store(0, Ordering::Release);
    }

    fn read_table(&self) -> std::sync::RwLockReadGuard<'_, SlotTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("slack", &self.slack)
            .field("write_count", &self.write_count())
            .finish()
    }
}
