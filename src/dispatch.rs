use std::net::SocketAddr;

use rosc::address::{Matcher, OscAddress};
use rosc::{OscMessage, OscPacket};

use crate::error::{Error, Result};

/// Callback invoked with the sender's address and the decoded message.
pub type Handler = Box<dyn Fn(SocketAddr, &OscMessage) + Send + Sync>;

struct Route {
    matcher: Matcher,
    handler: Handler,
}

/// Maps OSC address patterns to handlers. Built once at startup, read on
/// every incoming packet. Messages no route matches go to the default
/// handler.
pub struct Dispatcher {
    routes: Vec<Route>,
    default_handler: Option<Handler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            default_handler: None,
        }
    }

    /// Register `handler` for every message matching `pattern`
    /// (OSC pattern syntax, e.g. "/keypress/*").
    pub fn map<F>(&mut self, pattern: &str, handler: F) -> Result<()>
    where
        F: Fn(SocketAddr, &OscMessage) + Send + Sync + 'static,
    {
        let matcher = Matcher::new(pattern)
            .map_err(|err| Error::Pattern(format!("{}: {}", pattern, err)))?;
        self.routes.push(Route {
            matcher,
            handler: Box::new(handler),
        });
        Ok(())
    }

    /// Register the fallback for messages no route matches.
    pub fn set_default_handler<F>(&mut self, handler: F)
    where
        F: Fn(SocketAddr, &OscMessage) + Send + Sync + 'static,
    {
        self.default_handler = Some(Box::new(handler));
    }

    /// Route one decoded packet. Bundles are unpacked recursively and every
    /// contained message dispatched on its own.
    pub fn dispatch(&self, peer: SocketAddr, packet: OscPacket) {
        match packet {
            OscPacket::Message(msg) => self.dispatch_message(peer, &msg),
            OscPacket::Bundle(bundle) => {
                // Timetags are ignored; bundle content runs immediately
                for pkt in bundle.content {
                    self.dispatch(peer, pkt);
                }
            }
        }
    }

    fn dispatch_message(&self, peer: SocketAddr, msg: &OscMessage) {
        // An address the pattern library rejects can never match a route
        let address = OscAddress::new(msg.addr.clone()).ok();
        let mut matched = false;
        if let Some(address) = address {
            for route in &self.routes {
                if route.matcher.match_address(&address) {
                    (route.handler)(peer, msg);
                    matched = true;
                }
            }
        }
        if !matched {
            if let Some(default) = &self.default_handler {
                default(peer, msg);
            } else if crate::is_debug_enabled() {
                println!("[OSC] no handler for {} from {}", msg.addr, peer);
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
