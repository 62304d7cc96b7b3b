use std::io::{ErrorKind, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rosc::decoder;

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::slip::SlipDecoder;

const READ_TIMEOUT: Duration = Duration::from_millis(200);

// Buffered bytes allowed before a connection with no complete packet is
// considered broken (a garbage length prefix or a never-terminated SLIP
// frame would otherwise grow the buffer without bound).
const MAX_PENDING: usize = 1 << 20;

/// How OSC packets are delimited on the TCP byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpFraming {
    /// OSC 1.0: each packet preceded by its length, 4-byte big-endian.
    PacketLength,
    /// OSC 1.1: packets wrapped in SLIP frames.
    Slip,
}

/// TCP transport: a polling accept loop, one worker thread per client.
pub struct TcpServer {
    listener: TcpListener,
    framing: TcpFraming,
}

impl TcpServer {
    /// Bind the listening socket. Port 0 lets the OS pick (used by tests).
    pub fn bind(addr: &str, framing: TcpFraming) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        // Non-blocking accept so the loop can poll the shutdown flag
        listener.set_nonblocking(true)?;
        Ok(Self { listener, framing })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept clients until `shutdown` is set. Each connection reads and
    /// dispatches on its own thread; workers poll the same flag and are
    /// joined before this returns.
    pub fn serve(&self, dispatcher: Arc<Dispatcher>, shutdown: Arc<AtomicBool>) {
        let mut workers: Vec<thread::JoinHandle<()>> = Vec::new();

        loop {
            if shutdown.load(Ordering::SeqCst) {
                break;
            }

            match self.listener.accept() {
                Ok((stream, peer)) => {
                    // The accepted socket can inherit non-blocking mode from
                    // the listener; workers want timeout-based reads instead.
                    if let Err(err) = stream.set_nonblocking(false) {
                        eprintln!("[TCP] could not configure socket for {}: {}", peer, err);
                        continue;
                    }
                    let framing = self.framing;
                    let dispatcher = Arc::clone(&dispatcher);
                    let worker_shutdown = Arc::clone(&shutdown);
                    workers.push(thread::spawn(move || {
                        handle_connection(stream, peer, framing, dispatcher, worker_shutdown);
                    }));
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(50));
                }
                Err(err) => {
                    eprintln!("[TCP] accept error: {}", err);
                    thread::sleep(Duration::from_millis(200));
                }
            }

            workers.retain(|w| !w.is_finished());
        }

        for worker in workers {
            let _ = worker.join();
        }
        if crate::is_debug_enabled() {
            println!("[TCP] listener exiting");
        }
    }
}

fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    framing: TcpFraming,
    dispatcher: Arc<Dispatcher>,
    shutdown: Arc<AtomicBool>,
) {
    if let Err(err) = stream.set_read_timeout(Some(READ_TIMEOUT)) {
        eprintln!("[TCP] could not set read timeout for {}: {}", peer, err);
        return;
    }
    if crate::is_debug_enabled() {
        println!("[TCP] client {} connected", peer);
    }

    let mut buf = [0u8; 4096];
    let mut pending: Vec<u8> = Vec::new();
    let mut slip = SlipDecoder::new();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        match stream.read(&mut buf) {
            Ok(0) => {
                if crate::is_debug_enabled() {
                    println!("[TCP] client {} disconnected", peer);
                }
                break;
            }
            Ok(n) => match framing {
                TcpFraming::PacketLength => {
                    pending.extend_from_slice(&buf[..n]);
                    if !drain_packet_length(&mut pending, peer, &dispatcher) {
                        break;
                    }
                }
                TcpFraming::Slip => {
                    for frame in slip.push(&buf[..n]) {
                        match decoder::decode_udp(&frame) {
                            Ok((_, packet)) => dispatcher.dispatch(peer, packet),
                            Err(err) => eprintln!("[TCP] decode error from {}: {}", peer, err),
                        }
                    }
                    if slip.buffered() > MAX_PENDING {
                        eprintln!(
                            "[TCP] {} buffered {} bytes without a frame end, closing",
                            peer,
                            slip.buffered()
                        );
                        break;
                    }
                }
            },
            Err(ref e)
                if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut =>
            {
                // Timeout, continue loop to check the shutdown flag
                continue;
            }
            Err(err) => {
                eprintln!("[TCP] read error from {}: {}", peer, err);
                break;
            }
        }
    }
}

/// Dispatch every complete length-prefixed packet in `pending`, leaving any
/// trailing partial packet buffered. The length prefix is parsed here, not
/// by `rosc::decoder::decode_tcp`, which reports a short buffer as a decode
/// error rather than an incomplete read. Returns false when a packet claims
/// more than the buffer cap and the connection should close.
fn drain_packet_length(pending: &mut Vec<u8>, peer: SocketAddr, dispatcher: &Dispatcher) -> bool {
    while pending.len() >= 4 {
        let declared =
            u32::from_be_bytes([pending[0], pending[1], pending[2], pending[3]]) as usize;
        if declared > MAX_PENDING {
            eprintln!(
                "[TCP] {} claims a {} byte packet, over the {} byte cap, closing",
                peer, declared, MAX_PENDING
            );
            return false;
        }
        if pending.len() < 4 + declared {
            break;
        }

        let frame: Vec<u8> = pending.drain(..4 + declared).collect();
        match decoder::decode_udp(&frame[4..]) {
            Ok((_, packet)) => dispatcher.dispatch(peer, packet),
            // The prefix keeps the stream aligned, so skip the bad payload
            Err(err) => eprintln!("[TCP] decode error from {}: {}", peer, err),
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosc::{encoder, OscMessage, OscPacket, OscType};
    use std::sync::Mutex;

    fn encoded(addr: &str, value: f32) -> Vec<u8> {
        encoder::encode(&OscPacket::Message(OscMessage {
            addr: addr.to_string(),
            args: vec![OscType::Float(value)],
        }))
        .unwrap()
    }

    fn length_framed(payload: &[u8]) -> Vec<u8> {
        let mut framed = (payload.len() as u32).to_be_bytes().to_vec();
        framed.extend_from_slice(payload);
        framed
    }

    fn recording_dispatcher() -> (Dispatcher, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();
        let sink = seen.clone();
        dispatcher.set_default_handler(move |_, msg| {
            sink.lock().unwrap().push(msg.addr.clone());
        });
        (dispatcher, seen)
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    #[test]
    fn test_drain_handles_multiple_packets_per_read() {
        let (dispatcher, seen) = recording_dispatcher();
        let mut pending = Vec::new();
        pending.extend_from_slice(&length_framed(&encoded("/first", 1.0)));
        pending.extend_from_slice(&length_framed(&encoded("/second", 0.0)));

        assert!(drain_packet_length(&mut pending, peer(), &dispatcher));
        assert!(pending.is_empty());
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["/first".to_string(), "/second".to_string()]
        );
    }

    #[test]
    fn test_drain_holds_incomplete_packet() {
        let (dispatcher, seen) = recording_dispatcher();
        let framed = length_framed(&encoded("/later", 1.0));
        let (head, tail) = framed.split_at(6);

        let mut pending = head.to_vec();
        assert!(drain_packet_length(&mut pending, peer(), &dispatcher));
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(pending, head);

        pending.extend_from_slice(tail);
        assert!(drain_packet_length(&mut pending, peer(), &dispatcher));
        assert!(pending.is_empty());
        assert_eq!(*seen.lock().unwrap(), vec!["/later".to_string()]);
    }

    #[test]
    fn test_drain_rejects_oversized_packet() {
        let (dispatcher, seen) = recording_dispatcher();
        // Claims a packet far larger than the buffer cap
        let mut pending = (64u32 * 1024 * 1024).to_be_bytes().to_vec();
        pending.resize(MAX_PENDING + 8, 0);

        assert!(!drain_packet_length(&mut pending, peer(), &dispatcher));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_drain_keeps_the_connection_after_a_full_drain() {
        let (dispatcher, seen) = recording_dispatcher();
        let mut pending = length_framed(&encoded("/press", 1.0));

        assert!(drain_packet_length(&mut pending, peer(), &dispatcher));
        assert!(pending.is_empty());

        // A later read on the same connection starts from an empty buffer
        // and must drain just the same
        assert!(drain_packet_length(&mut pending, peer(), &dispatcher));
        pending.extend_from_slice(&length_framed(&encoded("/release", 0.0)));
        assert!(drain_packet_length(&mut pending, peer(), &dispatcher));
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["/press".to_string(), "/release".to_string()]
        );
    }

    #[test]
    fn test_drain_holds_a_partial_length_prefix() {
        let (dispatcher, seen) = recording_dispatcher();
        let framed = length_framed(&encoded("/later", 1.0));

        // Cut inside the prefix, then one byte short of a full payload
        for cut in [2, framed.len() - 1] {
            let mut pending = framed[..cut].to_vec();
            assert!(drain_packet_length(&mut pending, peer(), &dispatcher));
            assert!(seen.lock().unwrap().is_empty());
            assert_eq!(pending.len(), cut);
        }
    }

    #[test]
    fn test_drain_skips_an_undecodable_payload() {
        let (dispatcher, seen) = recording_dispatcher();
        let mut pending = length_framed(b"not an osc packet");
        pending.extend_from_slice(&length_framed(&encoded("/after", 1.0)));

        assert!(drain_packet_length(&mut pending, peer(), &dispatcher));
        assert!(pending.is_empty());
        assert_eq!(*seen.lock().unwrap(), vec!["/after".to_string()]);
    }
}
