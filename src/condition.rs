/*
 * sio - composed, resumable stream I/O operations with cancellation support
 * This is free and unencumbered software released into the public domain.
 */
use crate::SioError;

/// The largest number of bytes a completion condition hands to one
/// single-shot transfer.
pub const DEFAULT_MAX_TRANSFER: usize = 65536;

/// A predicate deciding how many more bytes a write loop should attempt
///
/// Consulted before every single-shot transfer with the error recorded so
/// far (if any) and the running total of bytes transferred; returning `0`
/// stops the loop. The canonical conditions are
/// [`transfer_all()`](transfer_all()),
/// [`transfer_at_least()`](transfer_at_least()) and
/// [`transfer_exactly()`](transfer_exactly()).
pub trait CompletionCondition {
    fn more(&mut self, error: Option<&SioError>, total: usize) -> usize;
}

/// Keep transferring until the source is exhausted or an error occurs.
pub fn transfer_all() -> TransferAll {
    TransferAll { }
}

/// Keep transferring until at least `minimum` bytes have been moved, then
/// stop; stop immediately on error.
pub fn transfer_at_least(minimum: usize) -> TransferAtLeast {
    TransferAtLeast {
        minimum,
    }
}

/// Transfer exactly `length` bytes, never handing a single-shot transfer
/// more than the remainder; stop immediately on error.
pub fn transfer_exactly(length: usize) -> TransferExactly {
    TransferExactly {
        length,
    }
}

#[derive(Debug)]
pub struct TransferAll { }

impl CompletionCondition for TransferAll {
    fn more(&mut self, error: Option<&SioError>, _total: usize) -> usize {
        match error {
            Some(_) => 0,
            None => DEFAULT_MAX_TRANSFER,
        }
    }
}

#[derive(Debug)]
pub struct TransferAtLeast {
    minimum: usize,
}

impl CompletionCondition for TransferAtLeast {
    fn more(&mut self, error: Option<&SioError>, total: usize) -> usize {
        match error.is_none() && (total < self.minimum) {
            true => DEFAULT_MAX_TRANSFER,
            false => 0,
        }
    }
}

#[derive(Debug)]
pub struct TransferExactly {
    length: usize,
}

impl CompletionCondition for TransferExactly {
    fn more(&mut self, error: Option<&SioError>, total: usize) -> usize {
        match error.is_none() && (total < self.length) {
            true => (self.length - total).min(DEFAULT_MAX_TRANSFER),
            false => 0,
        }
    }
}
