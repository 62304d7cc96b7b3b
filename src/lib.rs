//! OSC keypress server: listens for `/keypress/<key>` messages over UDP or
//! TCP and turns them into simulated keyboard input. A value of 1.0 presses
//! the named key, any other value releases it; whatever is still held when
//! the server stops is released on the way out.
//!
//! The binary does the wiring; this library exposes the transports, the
//! dispatcher and the keypress handler so the demo clients and the tests
//! can drive them directly.

use std::sync::atomic::{AtomicBool, Ordering};

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod inject;
pub mod keymap;
pub mod slip;
pub mod stdin_handler;
pub mod tcp_server;
pub mod udp_server;

pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use handlers::{log_unmatched, KeypressHandler, KEYPRESS_PREFIX};
pub use inject::{KeyAction, KeyInjector, NullInjector, RdevInjector, RecordingInjector};
pub use tcp_server::{TcpFraming, TcpServer};
pub use udp_server::UdpServer;

// Global debug switch, toggled from the console at runtime
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

pub fn set_debug_enabled(enabled: bool) {
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}
