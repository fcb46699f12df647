/*
 * sio - composed, resumable stream I/O operations with cancellation support
 * This is free and unencumbered software released into the public domain.
 */
use std::num::NonZeroUsize;
use std::slice::from_raw_parts_mut;

use crate::SioError;

/// A growable byte store with a *committed* region and a *spare* window,
/// bounded by an optional maximum size
///
/// The committed region holds the bytes that have been received so far and is
/// exposed read-only via [`data()`](DynamicBuffer::data()). New bytes enter
/// through the one legal write path: [`prepare()`](DynamicBuffer::prepare())
/// hands out a writable window of *uncommitted* storage, and
/// [`commit()`](DynamicBuffer::commit()) appends the bytes that were actually
/// transferred into that window to the committed region. Bytes leave through
/// [`consume()`](DynamicBuffer::consume()), which discards from the front.
///
/// A `DynamicBuffer` is owned by exactly *one* in-flight operation and is
/// **not** thread-safe. Views returned by `data()` and `prepare()` are
/// invalidated by any subsequent call that mutates the buffer; the borrow
/// checker enforces this at compile time.
#[derive(Debug)]
pub struct DynamicBuffer {
    buffer: Vec<u8>,
    limit: usize,
    prepared: usize,
}

impl DynamicBuffer {
    /// Creates an empty buffer with an effectively unbounded maximum size.
    pub fn new() -> Self {
        Self::with_max_size(None)
    }

    /// Creates an empty buffer whose committed size may never exceed `limit`.
    pub fn with_max_size(limit: Option<NonZeroUsize>) -> Self {
        Self::from_vec(Vec::new(), limit)
    }

    /// Wraps caller-owned storage. Any bytes already in `buffer` count as
    /// committed data.
    pub fn from_vec(buffer: Vec<u8>, limit: Option<NonZeroUsize>) -> Self {
        Self {
            buffer,
            limit: limit.map_or(usize::MAX, NonZeroUsize::get),
            prepared: 0,
        }
    }

    /// The number of committed, readable bytes.
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// The number of bytes the buffer can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// The hard ceiling on the committed size.
    pub fn max_size(&self) -> usize {
        self.limit
    }

    /// The committed byte range, in order, oldest first.
    pub fn data(&self) -> &[u8] {
        &self.buffer[..]
    }

    /// Reserves and returns a writable window of exactly `length` uncommitted
    /// bytes, growing the underlying storage if needed.
    ///
    /// Fails with [`SioError::TooBig`](crate::SioError::TooBig) if satisfying
    /// the request would take the committed size past the maximum; callers
    /// that must not fail check `max_size() - size()` first.
    pub fn prepare(&mut self, length: usize) -> Result<&mut [u8], SioError> {
        let new_length = self.buffer.len().checked_add(length).expect("Numerical overflow!");
        if new_length > self.limit {
            return Err(SioError::TooBig);
        }
        self.buffer.reserve(length);
        self.prepared = length;
        let spare = self.buffer.spare_capacity_mut();
        Ok(unsafe {
            from_raw_parts_mut(spare.as_mut_ptr() as *mut u8, length)
        })
    }

    /// Appends `additional` bytes from the last prepared window to the
    /// committed region. Amounts beyond the prepared window are ignored.
    pub fn commit(&mut self, additional: usize) {
        let additional = additional.min(self.prepared);
        self.prepared = 0;
        if additional > 0 {
            let new_length = self.buffer.len().checked_add(additional).expect("Numerical overflow!");
            assert!(new_length <= self.buffer.capacity());
            unsafe {
                self.buffer.set_len(new_length)
            }
        }
    }

    /// Discards up to `length` bytes from the front of the committed region.
    pub fn consume(&mut self, length: usize) {
        if length >= self.buffer.len() {
            self.buffer.clear();
        } else {
            self.buffer.drain(..length);
        }
    }

    /// Unwraps the committed bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.buffer
    }
}

impl Default for DynamicBuffer {
    fn default() -> Self {
        Self::new()
    }
}
