/*
 * sio - composed, resumable stream I/O operations with cancellation support
 * This is free and unencumbered software released into the public domain.
 */
use std::io::{Write as IoWrite, ErrorKind, Result as IoResult};

use crate::{CompletionCondition, ConsumingBuffers, DynamicBuffer, SioError, transfer_all};

/// What the caller of a [`WriteOp`](WriteOp) operation must do next
pub enum WriteAction<'a> {
    /// Issue exactly *one* single-shot write of this chunk, then report the
    /// outcome via [`complete_flush()`](WriteOp::complete_flush()).
    Flush(&'a [u8]),
    /// The operation has completed; on success the value is the total number
    /// of bytes written.
    Done(Result<usize, SioError>),
}

#[derive(Debug)]
enum State {
    Ask,
    Pending,
    Done(Result<usize, SioError>),
}

/// A composed "write until the completion condition is satisfied" operation
///
/// Repeatedly drains a [`ConsumingBuffers`](crate::ConsumingBuffers) view via
/// single-shot writes. Before every write the
/// [`CompletionCondition`](crate::CompletionCondition) is asked how many more
/// bytes to attempt; the loop stops when the condition says `0`, the view is
/// fully consumed, a write makes zero progress, or an error occurs. Like
/// [`ReadUntil`](crate::ReadUntil) it is an explicit state machine with one
/// suspension point per iteration, drivable blocking (see
/// [`write()`](write())) or from a demultiplexer's completion callbacks.
///
/// [`total()`](WriteOp::total()) reports the running byte count even when
/// the operation ends in an error, so partial progress is never lost.
#[derive(Debug)]
pub struct WriteOp<'a, C> {
    buffers: ConsumingBuffers<'a>,
    condition: C,
    total: usize,
    state: State,
}

impl<'a, C: CompletionCondition> WriteOp<'a, C> {
    pub fn new(buffers: &'a [&'a [u8]], condition: C) -> Self {
        Self {
            buffers: ConsumingBuffers::new(buffers),
            condition,
            total: 0,
            state: State::Ask,
        }
    }

    /// Advances the operation to its next suspension point or completion.
    ///
    /// Must not be called while a [`Flush`](WriteAction::Flush) is
    /// outstanding. Once completed, every further call returns the same
    /// [`Done`](WriteAction::Done) result.
    pub fn next_action(&mut self) -> WriteAction<'a> {
        match &self.state {
            State::Done(result) => return WriteAction::Done(result.clone()),
            State::Pending => panic!("next_action() called while a flush is outstanding!"),
            State::Ask => (),
        }

        let attempt = self.condition.more(None, self.total);
        if attempt == 0 {
            return WriteAction::Done(self.finish(Ok(self.total)));
        }
        match self.buffers.next_chunk(attempt) {
            Some(chunk) => {
                self.state = State::Pending;
                WriteAction::Flush(chunk)
            },
            None => WriteAction::Done(self.finish(Ok(self.total))),
        }
    }

    /// Reports the outcome of the single-shot write requested by the last
    /// [`Flush`](WriteAction::Flush): progress advances the consuming view,
    /// zero bytes with no error ends the operation with the total so far,
    /// and an error ends it with that error.
    pub fn complete_flush(&mut self, result: IoResult<usize>) {
        match self.state {
            State::Pending => (),
            _ => panic!("complete_flush() called without an outstanding flush!"),
        }
        match result {
            Ok(0) => {
                self.state = State::Done(Ok(self.total));
            },
            Ok(count) => {
                self.total += count;
                self.buffers.consume(count);
                self.state = State::Ask;
            },
            Err(error) => {
                self.state = State::Done(Err(error.into()));
            },
        }
    }

    /// The number of bytes transferred so far.
    pub fn total(&self) -> usize {
        self.total
    }

    fn finish(&mut self, result: Result<usize, SioError>) -> Result<usize, SioError> {
        self.state = State::Done(result.clone());
        result
    }
}

/// Writes `buffers` to `stream` until `condition` is satisfied, blocking the
/// calling thread
///
/// Returns the total number of bytes written. A single-shot write that makes
/// zero progress stops the loop with the total so far; callers that require
/// the full sequence use [`write_all()`](write_all()).
pub fn write<S, C>(stream: &mut S, buffers: &[&[u8]], condition: C) -> Result<usize, SioError>
where
    S: IoWrite,
    C: CompletionCondition,
{
    let mut operation = WriteOp::new(buffers, condition);
    loop {
        match operation.next_action() {
            WriteAction::Flush(chunk) => {
                let outcome = write_some(stream, chunk);
                operation.complete_flush(outcome);
            },
            WriteAction::Done(result) => return result,
        }
    }
}

/// Writes the whole of `buffer` to `stream`, blocking the calling thread
///
/// Fails with [`SioError::Incomplete`](crate::SioError::Incomplete) if the
/// stream stops accepting bytes before the buffer is drained.
pub fn write_all<S: IoWrite>(stream: &mut S, buffer: &[u8]) -> Result<usize, SioError> {
    let buffers = [buffer];
    match write(stream, &buffers, transfer_all()) {
        Ok(count) if count < buffer.len() => Err(SioError::Incomplete),
        other => other,
    }
}

/// Writes the committed data of a [`DynamicBuffer`](crate::DynamicBuffer) to
/// `stream` and consumes exactly the bytes that were written, even when the
/// operation ends in an error.
pub fn write_buffer<S, C>(stream: &mut S, buffer: &mut DynamicBuffer, condition: C) -> Result<usize, SioError>
where
    S: IoWrite,
    C: CompletionCondition,
{
    let (transferred, result) = {
        let data = [buffer.data()];
        let mut operation = WriteOp::new(&data, condition);
        let result = loop {
            match operation.next_action() {
                WriteAction::Flush(chunk) => {
                    let outcome = write_some(stream, chunk);
                    operation.complete_flush(outcome);
                },
                WriteAction::Done(result) => break result,
            }
        };
        (operation.total(), result)
    };
    buffer.consume(transferred);
    result
}

fn write_some<S: IoWrite>(stream: &mut S, chunk: &[u8]) -> IoResult<usize> {
    loop {
        match stream.write(chunk) {
            Ok(count) => return Ok(count),
            Err(error) => match error.kind() {
                ErrorKind::Interrupted => (),
                _ => return Err(error),
            },
        }
    }
}
