use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rdev::{simulate, EventType};

use crate::error::{Error, Result};
use crate::keymap;

/// A single simulated keyboard action, as recorded by `RecordingInjector`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Down(String),
    Up(String),
    Toggle(String),
}

/// Capability interface for simulated keyboard input. The keypress handler
/// only talks to this trait, so the real OS backend can be swapped for an
/// inert or a recording implementation.
pub trait KeyInjector: Send + Sync {
    /// Short backend name for log output.
    fn name(&self) -> &str;

    fn key_down(&self, key: &str) -> Result<()>;

    fn key_up(&self, key: &str) -> Result<()>;

    /// Tap a latched key (press then release) to flip its state.
    fn toggle(&self, key: &str) -> Result<()> {
        self.key_down(key)?;
        self.key_up(key)
    }
}

/// Sends real key events through `rdev`.
pub struct RdevInjector;

impl RdevInjector {
    fn resolve(key: &str) -> Result<rdev::Key> {
        keymap::lookup_key(key).ok_or_else(|| Error::UnknownKey(key.to_string()))
    }

    fn send(event: &EventType, key: &str) -> Result<()> {
        simulate(event)
            .map_err(|_| Error::Inject(format!("could not simulate event for '{}'", key)))
    }
}

impl KeyInjector for RdevInjector {
    fn name(&self) -> &str {
        "rdev"
    }

    fn key_down(&self, key: &str) -> Result<()> {
        let k = Self::resolve(key)?;
        Self::send(&EventType::KeyPress(k), key)
    }

    fn key_up(&self, key: &str) -> Result<()> {
        let k = Self::resolve(key)?;
        Self::send(&EventType::KeyRelease(k), key)
    }

    fn toggle(&self, key: &str) -> Result<()> {
        let k = Self::resolve(key)?;
        Self::send(&EventType::KeyPress(k), key)?;
        // Some platforms drop a release arriving in the same instant as the press
        thread::sleep(Duration::from_millis(20));
        Self::send(&EventType::KeyRelease(k), key)
    }
}

/// Does nothing. Wired in when automation is disabled so every code path
/// still runs without touching the OS.
pub struct NullInjector;

impl KeyInjector for NullInjector {
    fn name(&self) -> &str {
        "disabled"
    }

    fn key_down(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    fn key_up(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    fn toggle(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

/// Records every action into a shared vector so tests can observe exactly
/// which events the handler issued.
#[derive(Default)]
pub struct RecordingInjector {
    actions: Arc<Mutex<Vec<KeyAction>>>,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the recorded actions; clone it out before boxing the
    /// injector away.
    pub fn actions(&self) -> Arc<Mutex<Vec<KeyAction>>> {
        Arc::clone(&self.actions)
    }

    fn record(&self, action: KeyAction) {
        self.actions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(action);
    }
}

impl KeyInjector for RecordingInjector {
    fn name(&self) -> &str {
        "recording"
    }

    fn key_down(&self, key: &str) -> Result<()> {
        self.record(KeyAction::Down(key.to_string()));
        Ok(())
    }

    fn key_up(&self, key: &str) -> Result<()> {
        self.record(KeyAction::Up(key.to_string()));
        Ok(())
    }

    fn toggle(&self, key: &str) -> Result<()> {
        self.record(KeyAction::Toggle(key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_injector_keeps_order() {
        let injector = RecordingInjector::new();
        let actions = injector.actions();
        injector.key_down("h").unwrap();
        injector.key_up("h").unwrap();
        injector.toggle("CapsLock").unwrap();
        assert_eq!(
            *actions.lock().unwrap(),
            vec![
                KeyAction::Down("h".to_string()),
                KeyAction::Up("h".to_string()),
                KeyAction::Toggle("CapsLock".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_toggle_is_down_then_up() {
        struct TapInjector {
            seq: Mutex<Vec<&'static str>>,
        }
        impl KeyInjector for TapInjector {
            fn name(&self) -> &str {
                "tap"
            }
            fn key_down(&self, _key: &str) -> Result<()> {
                self.seq.lock().unwrap().push("down");
                Ok(())
            }
            fn key_up(&self, _key: &str) -> Result<()> {
                self.seq.lock().unwrap().push("up");
                Ok(())
            }
        }

        let injector = TapInjector {
            seq: Mutex::new(Vec::new()),
        };
        injector.toggle("CapsLock").unwrap();
        assert_eq!(*injector.seq.lock().unwrap(), vec!["down", "up"]);
    }

    #[test]
    fn test_rdev_injector_rejects_unknown_key() {
        // Name resolution fails before any OS event is attempted
        let err = RdevInjector.key_down("NoSuchKey").unwrap_err();
        assert!(matches!(err, Error::UnknownKey(_)));
    }

    #[test]
    fn test_null_injector_accepts_everything() {
        assert!(NullInjector.key_down("h").is_ok());
        assert!(NullInjector.key_up("NoSuchKey").is_ok());
        assert!(NullInjector.toggle("CapsLock").is_ok());
    }
}
