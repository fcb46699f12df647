/*
 * sio - composed, resumable stream I/O operations with cancellation support
 * This is free and unencumbered software released into the public domain.
 */
use std::net::{TcpListener, TcpStream, Shutdown};
use std::thread;
use std::time::Duration;

use regex::bytes::Regex;

use sio_rs::{DynamicBuffer, MatchResult, predicate, read_until, transfer_all, write_all, write_buffer};

const REQUEST: &[u8] = b"GET /index.html HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n";
const RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nOK";

#[test]
fn request_and_response_round_trip_over_loopback() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener!");
    let address = listener.local_addr().expect("Failed to get local address!");
    let (done_tx, done_rx) = crossbeam_channel::bounded::<Vec<u8>>(1);

    let server = thread::spawn(move || {
        let (mut stream, _addr) = listener.accept().expect("Failed to accept connection!");

        let mut buffer = DynamicBuffer::new();
        let length = read_until(&mut stream, &mut buffer, "\r\n\r\n").expect("Failed to read request!");
        done_tx.send(buffer.data()[..length].to_vec()).expect("Failed to send request!");

        let mut response = DynamicBuffer::from_vec(RESPONSE.to_vec(), None);
        write_buffer(&mut stream, &mut response, transfer_all()).expect("Failed to write response!");
        assert_eq!(response.size(), 0);
        stream.shutdown(Shutdown::Write).expect("Failed to shut down stream!");
    });

    let mut stream = TcpStream::connect(address).expect("Failed to connect!");

    // Send the request in two pieces, so the server's read-until loop has to
    // assemble it across multiple single-shot reads.
    let (head, tail) = REQUEST.split_at(10);
    write_all(&mut stream, head).expect("Failed to write request head!");
    thread::sleep(Duration::from_millis(10));
    write_all(&mut stream, tail).expect("Failed to write request tail!");

    // A regex is just one more caller-supplied predicate: pin the scan
    // window with Partial(0) and let the expression find the header end.
    let header_end = Regex::new(r"\r\n\r\n").expect("Failed to compile regex!");
    let condition = predicate(|data: &[u8]| {
        match header_end.find(data) {
            Some(found) => MatchResult::Full(found.end()),
            None => MatchResult::Partial(0),
        }
    });

    let mut buffer = DynamicBuffer::new();
    let length = read_until(&mut stream, &mut buffer, condition).expect("Failed to read response!");
    assert_eq!(&buffer.data()[..length], b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\n");
    buffer.consume(length);

    server.join().expect("Failed to join server thread!");
    assert_eq!(done_rx.recv().expect("Failed to receive request!"), REQUEST);
}

#[cfg(unix)]
#[test]
fn interrupter_wakes_a_blocked_demultiplexer_thread() {
    use mio::{Events, Poll, Token};
    use sio_rs::Interrupter;

    const WAKE: Token = Token(0);

    let mut interrupter = Interrupter::new().expect("Failed to create interrupter!");
    let mut poll = Poll::new().expect("Failed to create poll!");
    interrupter.register(poll.registry(), WAKE).expect("Failed to register!");

    let (ready_tx, ready_rx) = crossbeam_channel::bounded::<()>(1);
    let (woken_tx, woken_rx) = crossbeam_channel::bounded::<bool>(1);

    thread::scope(|scope| {
        let interrupter = &interrupter;
        scope.spawn(move || {
            let mut events = Events::with_capacity(8);
            ready_tx.send(()).expect("Failed to signal readiness!");
            poll.poll(&mut events, None).expect("Failed to poll!");
            assert!(events.iter().any(|event| event.token() == WAKE));
            let pending = interrupter.reset().expect("Failed to reset!");
            woken_tx.send(pending).expect("Failed to send wake result!");
        });

        ready_rx.recv().expect("Failed to await readiness!");
        thread::sleep(Duration::from_millis(50));
        interrupter.interrupt().expect("Failed to interrupt!");

        assert!(woken_rx.recv_timeout(Duration::from_secs(10)).expect("Demultiplexer was not woken!"));
    });
}
