use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rosc::decoder;

use crate::dispatch::Dispatcher;
use crate::error::Result;

/// UDP transport: one socket; each decoded datagram goes straight to the
/// dispatcher on the listening thread.
pub struct UdpServer {
    socket: UdpSocket,
}

impl UdpServer {
    /// Bind the listening socket. Port 0 lets the OS pick (used by tests).
    pub fn bind(addr: &str) -> Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        // Short timeout so the loop can poll the shutdown flag
        socket.set_read_timeout(Some(Duration::from_millis(200)))?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Receive and dispatch datagrams until `shutdown` is set.
    pub fn serve(&self, dispatcher: &Dispatcher, shutdown: &AtomicBool) {
        let mut buf = [0u8; decoder::MTU];
        loop {
            if shutdown.load(Ordering::SeqCst) {
                break;
            }

            match self.socket.recv_from(&mut buf) {
                Ok((size, peer)) => {
                    if crate::is_debug_enabled() {
                        println!("[UDP] {} bytes from {}", size, peer);
                    }
                    match decoder::decode_udp(&buf[..size]) {
                        Ok((_, packet)) => dispatcher.dispatch(peer, packet),
                        Err(err) => eprintln!("[UDP] decode error from {}: {}", peer, err),
                    }
                }
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    // Timeout, continue loop to check the shutdown flag
                    continue;
                }
                Err(err) => eprintln!("[UDP] recv error: {}", err),
            }
        }

        if crate::is_debug_enabled() {
            println!("[UDP] listener exiting");
        }
    }
}
