//! Deadline-bounded drain against live loopback peers.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::time::Duration;

use hostcap_core::clock;
use hostcap_core::socket::{SocketMode, SocketProtocol, SocketTable};
use hostcap_harness::drain::{Termination, drain_with_budget};

fn chunked_server(chunks: Vec<Vec<u8>>) -> (std::thread::JoinHandle<()>, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut scratch = [0u8; 256];
        let _ = stream.read(&mut scratch);
        for chunk in chunks {
            stream.write_all(&chunk).unwrap();
            stream.flush().unwrap();
            std::thread::sleep(Duration::from_millis(3));
        }
        // Dropping the stream closes the source.
    });
    (handle, port)
}

#[test]
fn drain_accumulates_four_byte_chunks_until_source_closes() {
    let chunks: Vec<Vec<u8>> = (0..5u8).map(|i| vec![i; 4]).collect();
    let total: usize = chunks.iter().map(Vec::len).sum();
    let (server, port) = chunked_server(chunks);

    let sockets = SocketTable::new();
    let id = sockets.create(SocketMode::Client, SocketProtocol::Tcp, "127.0.0.1", port);
    assert!(sockets.open(id).unwrap());
    sockets.send(id, b"probe\r\n\r\n").unwrap();

    let started = clock::now();
    let summary = drain_with_budget(
        |chunk_size, remaining| sockets.receive(id, chunk_size, remaining),
        4,
        1.0,
    )
    .unwrap();
    let elapsed = clock::elapsed(started);

    assert_eq!(summary.termination, Termination::SourceClosed);
    assert_eq!(summary.buffer.len(), total);
    assert_eq!(summary.buffer.len() % 4, 0);
    assert!(elapsed <= 1.5, "drain overran its budget: {elapsed}s");

    let stats = sockets.stats(id).unwrap();
    assert_eq!(stats.bytes_received as usize, total);
    assert!(stats.reads_attempted >= stats.reads_completed);

    sockets.close(id).unwrap();
    sockets.free(id).unwrap();
    server.join().unwrap();
}

#[test]
fn drain_of_a_silent_peer_spends_the_budget_on_one_timed_out_attempt() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        // Hold the connection open, sending nothing.
        std::thread::sleep(Duration::from_millis(400));
        drop(stream);
    });

    let sockets = SocketTable::new();
    let id = sockets.create(SocketMode::Client, SocketProtocol::Tcp, "127.0.0.1", port);
    assert!(sockets.open(id).unwrap());

    let started = clock::now();
    let summary = drain_with_budget(
        |chunk_size, remaining| sockets.receive(id, chunk_size, remaining),
        4,
        0.2,
    )
    .unwrap();
    let elapsed = clock::elapsed(started);

    // The single attempt blocks for the whole remaining budget, then
    // reports no-more-data; the drain ends on that rather than looping.
    assert_eq!(summary.termination, Termination::SourceClosed);
    assert_eq!(summary.calls, 1);
    assert!(summary.buffer.is_empty());
    assert!(elapsed >= 0.2, "returned before the budget: {elapsed}s");
    assert!(elapsed <= 0.6, "overran the budget: {elapsed}s");

    sockets.close(id).unwrap();
    sockets.free(id).unwrap();
    server.join().unwrap();
}
