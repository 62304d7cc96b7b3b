use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Mutex, MutexGuard};

use rosc::{OscMessage, OscType};

use crate::inject::KeyInjector;
use crate::keymap;

/// Address prefix the keypress route strips from incoming messages.
pub const KEYPRESS_PREFIX: &str = "/keypress/";

/// The one latched key that is tapped instead of held.
const TOGGLE_KEY: &str = "CapsLock";

/// Handles `/keypress/<key>` messages: value 1.0 presses the key, any other
/// value releases it. Keeps the set of currently held keys so shutdown can
/// release whatever is still down.
pub struct KeypressHandler {
    injector: Box<dyn KeyInjector>,
    pressed: Mutex<HashSet<String>>,
}

impl KeypressHandler {
    pub fn new(injector: Box<dyn KeyInjector>) -> Self {
        Self {
            injector,
            pressed: Mutex::new(HashSet::new()),
        }
    }

    /// Process one decoded keypress message from `peer`.
    pub fn handle(&self, peer: SocketAddr, msg: &OscMessage) {
        let name = match msg.addr.strip_prefix(KEYPRESS_PREFIX) {
            Some(name) => name,
            None => {
                // Routing only sends /keypress/ addresses here
                eprintln!("[KEY] unexpected address {} from {}", msg.addr, peer);
                return;
            }
        };
        if name.is_empty() {
            println!("[KEY] ignoring {} from {}: empty key name", msg.addr, peer);
            return;
        }

        let key = keymap::normalize_key_name(name);

        let value = match msg.args.first().and_then(osc_arg_as_f64) {
            Some(v) => v,
            None => {
                eprintln!(
                    "[KEY] {} requires a numeric value (got {:?})",
                    msg.addr, msg.args
                );
                return;
            }
        };

        if value == 1.0 {
            self.press(&key);
        } else {
            self.release(&key);
        }
    }

    fn press(&self, key: &str) {
        if is_toggle_key(key) {
            println!("Key toggle: {}", key);
            if let Err(err) = self.injector.toggle(key) {
                eprintln!("[KEY] toggle failed for '{}': {}", key, err);
            }
            return;
        }
        self.lock_pressed().insert(key.to_string());
        println!("Key down: {}", key);
        if let Err(err) = self.injector.key_down(key) {
            eprintln!("[KEY] key down failed for '{}': {}", key, err);
        }
    }

    fn release(&self, key: &str) {
        if is_toggle_key(key) {
            if crate::is_debug_enabled() {
                println!("[KEY] release of toggle key {} skipped", key);
            }
            return;
        }
        // Removing a key that was never pressed is fine; the up event is
        // still forwarded either way.
        self.lock_pressed().remove(key);
        println!("Key up: {}", key);
        if let Err(err) = self.injector.key_up(key) {
            eprintln!("[KEY] key up failed for '{}': {}", key, err);
        }
    }

    /// Release every key still marked held and empty the set. Called once
    /// after the serve loop exits. Returns how many keys were released.
    pub fn release_all(&self) -> usize {
        let held: Vec<String> = self.lock_pressed().drain().collect();
        for key in &held {
            println!("Key up: {} (shutdown)", key);
            if let Err(err) = self.injector.key_up(key) {
                eprintln!("[KEY] key up failed for '{}': {}", key, err);
            }
        }
        held.len()
    }

    /// Names of the keys currently held, sorted for stable output.
    pub fn held_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock_pressed().iter().cloned().collect();
        keys.sort();
        keys
    }

    // Cleanup must still drain the set after a handler thread panicked
    // while holding the lock, so recover the guard instead of propagating.
    fn lock_pressed(&self) -> MutexGuard<'_, HashSet<String>> {
        self.pressed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn is_toggle_key(key: &str) -> bool {
    key.eq_ignore_ascii_case(TOGGLE_KEY)
}

/// Coerce a numeric OSC argument to f64. Bools count as 1/0; anything else
/// is not a value.
fn osc_arg_as_f64(arg: &OscType) -> Option<f64> {
    match arg {
        OscType::Int(v) => Some(f64::from(*v)),
        OscType::Long(v) => Some(*v as f64),
        OscType::Float(v) => Some(f64::from(*v)),
        OscType::Double(v) => Some(*v),
        OscType::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Default handler: print any message no route matched, with its full
/// argument list preserved.
pub fn log_unmatched(peer: SocketAddr, msg: &OscMessage) {
    println!("[{} {}] ~ {:?}", peer, msg.addr, msg.args);
}
