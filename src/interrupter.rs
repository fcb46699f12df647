/*
 * sio - composed, resumable stream I/O operations with cancellation support
 * This is free and unencumbered software released into the public domain.
 */
use std::io::{Read, Write, ErrorKind, Result as IoResult};
use std::os::unix::io::{AsRawFd, RawFd};

use mio::{Registry, Token, Interest};
use mio::unix::pipe::{self, Receiver, Sender};

use log::{warn, debug};

use crate::utilities::Flag;

// A single fixed non-zero value; its content is never inspected, only its
// arrival matters.
const PAYLOAD: [u8; 8] = 1u64.to_ne_bytes();

/// A cross-thread wake-up channel for a blocked event demultiplexer
///
/// The channel is a descriptor pair: [`interrupt()`](Interrupter::interrupt())
/// writes a fixed non-zero payload to the write end, making the read end
/// readable and thereby forcing a blocked wait to return. It is safe to call
/// from *any* thread, including from inside a handler running on the
/// event-processing thread, and is *coalescing*: multiple `interrupt()` calls
/// before a [`reset()`](Interrupter::reset()) collapse into a single pending
/// wake-up, so "how many interrupts happened" is never observable – only "at
/// least one happened since the last reset".
///
/// The demultiplexer registers the read end (via
/// [`register()`](Interrupter::register()) or the raw
/// [`read_descriptor()`](Interrupter::read_descriptor())) and must treat
/// "readable" as "call `reset()`, then proceed" – it never reads the payload
/// itself.
#[derive(Debug)]
pub struct Interrupter {
    sender: Sender,
    receiver: Receiver,
    armed: Flag,
}

impl Interrupter {
    pub fn new() -> IoResult<Self> {
        let (sender, receiver) = pipe::new()?;
        Ok(Self {
            sender,
            receiver,
            armed: Flag::new(),
        })
    }

    /// Wakes up the demultiplexer. Returns whether *this* call armed the
    /// channel; `false` means an earlier interrupt was still unconsumed and
    /// the wake-up coalesces into it.
    pub fn interrupt(&self) -> IoResult<bool> {
        if !self.armed.raise() {
            return Ok(false);
        }
        loop {
            match (&self.sender).write(&PAYLOAD) {
                Ok(_count) => return Ok(true),
                Err(error) => match error.kind() {
                    ErrorKind::Interrupted => (),
                    // The pipe still holds an undrained payload, which keeps
                    // the read end readable; the wake-up is already assured.
                    ErrorKind::WouldBlock => return Ok(true),
                    _ => {
                        self.armed.clear();
                        return Err(error);
                    },
                },
            }
        }
    }

    /// Drains any pending payload from the read end. Returns whether an
    /// interrupt had been pending; after this call the read end is no longer
    /// readable until the next [`interrupt()`](Interrupter::interrupt()).
    pub fn reset(&self) -> IoResult<bool> {
        let mut scratch = [0u8; 64];
        let mut drained = 0usize;
        loop {
            match (&self.receiver).read(&mut scratch) {
                Ok(0) => break,
                Ok(count) => drained += count,
                Err(error) => match error.kind() {
                    ErrorKind::Interrupted => (),
                    ErrorKind::WouldBlock => break,
                    _ => return Err(error),
                },
            }
        }
        let armed = self.armed.clear();
        Ok(armed || (drained > 0))
    }

    /// Closes and reopens both descriptors, used after the owning process
    /// has forked: the inherited descriptors may now be shared with a child
    /// process in a way that breaks the coalescing invariant. The read end
    /// must be registered with the demultiplexer anew afterwards.
    pub fn recreate(&mut self) -> IoResult<()> {
        let (sender, receiver) = pipe::new()?;
        debug!("Interrupter descriptors recreated: {} -> {}", self.receiver.as_raw_fd(), receiver.as_raw_fd());
        self.sender = sender;
        self.receiver = receiver;
        self.armed.clear();
        Ok(())
    }

    /// The raw read descriptor, for demultiplexers that manage their fd set
    /// directly. Invalidated by [`recreate()`](Interrupter::recreate()).
    pub fn read_descriptor(&self) -> RawFd {
        self.receiver.as_raw_fd()
    }

    /// Registers the read end with a [`mio`](mio) registry for readability.
    pub fn register(&mut self, registry: &Registry, token: Token) -> IoResult<()> {
        registry.register(&mut self.receiver, token, Interest::READABLE)
    }

    /// De-registers the read end from the registry.
    pub fn deregister(&mut self, registry: &Registry) {
        if let Err(error) = registry.deregister(&mut self.receiver) {
            warn!("Failed to de-register: {:?}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Interrupter;
    use mio::{Events, Poll, Token, Interest};
    use std::thread;
    use std::time::Duration;

    const WAKE: Token = Token(0);

    fn poll_once(poll: &mut Poll, events: &mut Events, timeout: Option<Duration>) -> usize {
        poll.poll(events, timeout).expect("Failed to poll!");
        events.iter().filter(|event| event.token() == WAKE).count()
    }

    #[test]
    fn concurrent_interrupts_coalesce_into_one_pending_wake() {
        let mut interrupter = Interrupter::new().expect("Failed to create interrupter!");
        let mut poll = Poll::new().expect("Failed to create poll!");
        let mut events = Events::with_capacity(8);
        interrupter.register(poll.registry(), WAKE).expect("Failed to register!");

        let (start_tx, start_rx) = crossbeam_channel::bounded::<()>(0);
        let armed = thread::scope(|scope| {
            let mut workers = Vec::new();
            for _n in 0..8 {
                let start_rx = start_rx.clone();
                let interrupter = &interrupter;
                workers.push(scope.spawn(move || {
                    start_rx.recv().expect("Failed to receive start signal!");
                    interrupter.interrupt().expect("Failed to interrupt!")
                }));
            }
            for _n in 0..8 {
                start_tx.send(()).expect("Failed to send start signal!");
            }
            workers.into_iter().map(|worker| worker.join().expect("Failed to join!")).filter(|armed| *armed).count()
        });

        // Exactly one of the racing calls armed the channel.
        assert_eq!(armed, 1);
        assert!(poll_once(&mut poll, &mut events, None) > 0);
        assert!(interrupter.reset().expect("Failed to reset!"));
        assert!(!interrupter.reset().expect("Failed to reset!"));
        assert_eq!(poll_once(&mut poll, &mut events, Some(Duration::from_millis(50))), 0);
    }

    #[test]
    fn interrupt_is_idempotent_while_unconsumed() {
        let interrupter = Interrupter::new().expect("Failed to create interrupter!");
        assert!(interrupter.interrupt().expect("Failed to interrupt!"));
        assert!(!interrupter.interrupt().expect("Failed to interrupt!"));
        assert!(interrupter.reset().expect("Failed to reset!"));
        assert!(interrupter.interrupt().expect("Failed to interrupt!"));
    }

    #[test]
    fn recreate_behaves_like_a_fresh_channel() {
        let mut interrupter = Interrupter::new().expect("Failed to create interrupter!");
        assert!(interrupter.interrupt().expect("Failed to interrupt!"));

        interrupter.recreate().expect("Failed to recreate!");

        // Pending state does not survive recreation.
        assert!(!interrupter.reset().expect("Failed to reset!"));
        assert!(interrupter.interrupt().expect("Failed to interrupt!"));
        assert!(interrupter.reset().expect("Failed to reset!"));
        assert!(!interrupter.reset().expect("Failed to reset!"));
    }
}
