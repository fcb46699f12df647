/*
 * sio - composed, resumable stream I/O operations with cancellation support
 * This is free and unencumbered software released into the public domain.
 */

//! **sio** provides *composed* stream I/O operations – "read until a
//! condition is met" and "write until a completion condition is satisfied" –
//! that run either ***blocking*** or ***suspend/resume*** from the *same*
//! specification of the algorithm, together with a cross-thread ***wake
//! channel*** that lets a blocked event demultiplexer be interrupted safely
//! from another thread or from within a handler.
//!
//! A composed operation is built from *single-shot* primitives: one attempt
//! to read or write whatever bytes are immediately available, never looping
//! internally. **sio** does not implement those primitives, nor the
//! demultiplexer that drives the non-blocking forms – any
//! [`std::io::Read`](std::io::Read)/[`std::io::Write`](std::io::Write)
//! implementation serves the blocking forms, and any event loop (for
//! example one built on [**`mio`**](mio)) can drive the suspend/resume
//! forms through their explicit state machines.
//!
//! # Usage
//!
//! The blocking convenience functions [`read_until()`](read_until()),
//! [`write()`](write()), [`write_all()`](write_all()) and
//! [`write_buffer()`](write_buffer()) drive a whole operation in one call.
//! [`read_until()`](read_until()) fills a [`DynamicBuffer`](DynamicBuffer)
//! until a [`MatchCondition`](MatchCondition) – a delimiter byte, a byte
//! sequence, or a caller [`predicate()`](predicate()) – reports a full
//! match; [`write()`](write()) drains a scatter/gather sequence until a
//! [`CompletionCondition`](CompletionCondition) such as
//! [`transfer_all()`](transfer_all()) is satisfied.
//!
//! The suspend/resume forms, [`ReadUntil`](ReadUntil) and
//! [`WriteOp`](WriteOp), expose the same algorithms one suspension point at
//! a time: `next_action()` either hands out the next single-shot request or
//! the final result, and `complete_fill()`/`complete_flush()` resume the
//! operation with the request's outcome. Ownership of all operation state
//! stays with the operation across the suspension, so a resumption is never
//! concurrent with itself.
//!
//! Cancellation is the owning demultiplexer's responsibility: it fails the
//! pending single-shot primitive with
//! [`SioError::Cancelled`](SioError::Cancelled), which the operation
//! surfaces like any other error. The [`Interrupter`](Interrupter) provides
//! the wake-up half of that arrangement.

mod buffer;
mod condition;
mod cursor;
mod error;
#[cfg(unix)]
mod interrupter;
mod matcher;
mod read_until;
mod utilities;
mod write;

pub use buffer::DynamicBuffer;
pub use condition::{CompletionCondition, TransferAll, TransferAtLeast, TransferExactly, DEFAULT_MAX_TRANSFER, transfer_all, transfer_at_least, transfer_exactly};
pub use cursor::ConsumingBuffers;
pub use error::SioError;
#[cfg(unix)]
pub use interrupter::Interrupter;
pub use matcher::{MatchCondition, MatchResult, Predicate, predicate};
pub use read_until::{ReadAction, ReadUntil, READ_SIZE_FLOOR, READ_SIZE_CEILING, read_until};
pub use write::{WriteAction, WriteOp, write, write_all, write_buffer};
