/*
 * sio - composed, resumable stream I/O operations with cancellation support
 * This is free and unencumbered software released into the public domain.
 */
use std::io::{Read, ErrorKind, Result as IoResult};
use std::mem;

use crate::{DynamicBuffer, MatchCondition, MatchResult, SioError};

/// Smallest number of bytes one single-shot read is asked for, so that a
/// nearly-full allocation does not degenerate into byte-sized reads.
pub const READ_SIZE_FLOOR: usize = 512;

/// Largest number of bytes one single-shot read is asked for.
pub const READ_SIZE_CEILING: usize = 65536;

// Favors doubling-like growth while the allocation has headroom, capped so
// the request never exceeds the ceiling or the buffer's remaining headroom.
fn read_size(buffer: &DynamicBuffer) -> usize {
    READ_SIZE_FLOOR.max(buffer.capacity() - buffer.size())
        .min(READ_SIZE_CEILING.min(buffer.max_size() - buffer.size()))
}

/// What the caller of a [`ReadUntil`](ReadUntil) operation must do next
pub enum ReadAction<'a> {
    /// Issue exactly *one* single-shot read into this window, then report
    /// the outcome via [`complete_fill()`](ReadUntil::complete_fill()).
    Fill(&'a mut [u8]),
    /// The operation has completed; on success the value is the number of
    /// bytes up to and including the match.
    Done(Result<usize, SioError>),
}

#[derive(Debug)]
enum State {
    Scan,
    Pending,
    Done(Result<usize, SioError>),
}

/// A composed "read until a condition is met" operation
///
/// The operation repeatedly fills its [`DynamicBuffer`](crate::DynamicBuffer)
/// via single-shot reads and scans the not-yet-searched suffix with its
/// [`MatchCondition`](crate::MatchCondition) until a full match, buffer
/// exhaustion, or an error. It is expressed as an explicit state machine so
/// that the *same* procedure runs blocking or suspend/resume: the blocking
/// convenience [`read_until()`](read_until()) drives it in a plain loop,
/// while an external demultiplexer drives it by alternating
/// [`next_action()`](ReadUntil::next_action()) and
/// [`complete_fill()`](ReadUntil::complete_fill()) from its completion
/// callbacks. There is exactly one suspension point per iteration – the
/// single-shot read – and the operation owns all of its state across it.
///
/// On success the buffer still contains the match *and* everything received
/// after it; the caller decides what to [`consume()`](crate::DynamicBuffer::consume()).
///
/// Cancellation is not handled inside the operation: the owning collaborator
/// fails the pending single-shot read with
/// [`SioError::Cancelled`](crate::SioError::Cancelled), which is surfaced
/// like any other error.
#[derive(Debug)]
pub struct ReadUntil<M> {
    buffer: DynamicBuffer,
    matcher: M,
    search_position: usize,
    state: State,
}

impl<M: MatchCondition> ReadUntil<M> {
    pub fn new(buffer: DynamicBuffer, matcher: M) -> Self {
        Self {
            buffer,
            matcher,
            search_position: 0,
            state: State::Scan,
        }
    }

    /// Advances the operation to its next suspension point or completion.
    ///
    /// Must not be called while a [`Fill`](ReadAction::Fill) is outstanding.
    /// Once completed, every further call returns the same
    /// [`Done`](ReadAction::Done) result.
    pub fn next_action(&mut self) -> ReadAction<'_> {
        match &self.state {
            State::Done(result) => return ReadAction::Done(result.clone()),
            State::Pending => panic!("next_action() called while a fill is outstanding!"),
            State::Scan => (),
        }

        match self.matcher.check(&self.buffer.data()[self.search_position..]) {
            MatchResult::Full(offset) => {
                return ReadAction::Done(self.finish(Ok(self.search_position + offset)));
            },
            MatchResult::Partial(offset) => self.search_position += offset,
            MatchResult::NoMatch => self.search_position = self.buffer.size(),
        }

        if self.buffer.size() >= self.buffer.max_size() {
            return ReadAction::Done(self.finish(Err(SioError::NotFound)));
        }

        let length = read_size(&self.buffer);
        self.state = State::Pending;
        match self.buffer.prepare(length) {
            Ok(window) => ReadAction::Fill(window),
            Err(error) => {
                self.state = State::Done(Err(error.clone()));
                ReadAction::Done(Err(error))
            },
        }
    }

    /// Reports the outcome of the single-shot read requested by the last
    /// [`Fill`](ReadAction::Fill): the bytes actually transferred are
    /// committed, zero bytes with no error (peer closed) ends the operation
    /// with [`SioError::NotFound`](crate::SioError::NotFound), and an error
    /// ends it with that error.
    pub fn complete_fill(&mut self, result: IoResult<usize>) {
        match self.state {
            State::Pending => (),
            _ => panic!("complete_fill() called without an outstanding fill!"),
        }
        match result {
            Ok(0) => {
                self.buffer.commit(0);
                self.state = State::Done(Err(SioError::NotFound));
            },
            Ok(count) => {
                self.buffer.commit(count);
                self.state = State::Scan;
            },
            Err(error) => {
                self.buffer.commit(0);
                self.state = State::Done(Err(error.into()));
            },
        }
    }

    /// The buffered data received so far.
    pub fn buffer(&self) -> &DynamicBuffer {
        &self.buffer
    }

    /// The offset from which the next scan resumes. Non-decreasing across
    /// the lifetime of the operation.
    pub fn search_position(&self) -> usize {
        self.search_position
    }

    /// Returns the buffer, with the match and everything after it still
    /// committed.
    pub fn into_buffer(self) -> DynamicBuffer {
        self.buffer
    }

    fn finish(&mut self, result: Result<usize, SioError>) -> Result<usize, SioError> {
        self.state = State::Done(result.clone());
        result
    }
}

/// Reads from `stream` until `matcher` reports a full match, blocking the
/// calling thread
///
/// Returns the number of bytes up to and including the match; the buffer
/// keeps the match and everything received after it. Fails with
/// [`SioError::NotFound`](crate::SioError::NotFound) when the buffer's
/// maximum size is reached, or the peer closes the stream, before a match.
pub fn read_until<S, M>(stream: &mut S, buffer: &mut DynamicBuffer, matcher: M) -> Result<usize, SioError>
where
    S: Read,
    M: MatchCondition,
{
    let mut operation = ReadUntil::new(mem::take(buffer), matcher);
    let result = loop {
        match operation.next_action() {
            ReadAction::Fill(window) => {
                let outcome = read_some(stream, window);
                operation.complete_fill(outcome);
            },
            ReadAction::Done(result) => break result,
        }
    };
    *buffer = operation.into_buffer();
    result
}

fn read_some<S: Read>(stream: &mut S, window: &mut [u8]) -> IoResult<usize> {
    loop {
        match stream.read(window) {
            Ok(count) => return Ok(count),
            Err(error) => match error.kind() {
                ErrorKind::Interrupted => (),
                _ => return Err(error),
            },
        }
    }
}
