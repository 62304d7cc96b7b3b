use std::io::stdin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::handlers::KeypressHandler;

/// Spawn a thread that reads console commands. 'exit'/'quit'/'q' set the
/// shutdown flag, 'keys' shows what is currently held, 'debug on'/'debug
/// off' toggle verbose logging at runtime. EOF just ends the console.
pub fn spawn_stdin_handler(
    shutdown: Arc<AtomicBool>,
    keypress: Arc<KeypressHandler>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                // EOF or broken stdin: stop the console, keep serving
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let cmd = line.trim();
            if cmd.is_empty() {
                continue;
            }
            if cmd.eq_ignore_ascii_case("exit")
                || cmd.eq_ignore_ascii_case("quit")
                || cmd.eq_ignore_ascii_case("q")
            {
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            if cmd.eq_ignore_ascii_case("keys") {
                let held = keypress.held_keys();
                if held.is_empty() {
                    println!("No keys held");
                } else {
                    println!("Held keys: {}", held.join(", "));
                }
                continue;
            }
            if cmd.eq_ignore_ascii_case("debug on") || cmd.eq_ignore_ascii_case("debug enable") {
                crate::set_debug_enabled(true);
                println!("Debug enabled");
                continue;
            }
            if cmd.eq_ignore_ascii_case("debug off") || cmd.eq_ignore_ascii_case("debug disable") {
                crate::set_debug_enabled(false);
                println!("Debug disabled");
                continue;
            }
            if cmd.eq_ignore_ascii_case("help") || cmd.eq_ignore_ascii_case("h") {
                println!("Commands:");
                println!("  keys             - Show currently held keys");
                println!("  debug on/off     - Enable/Disable verbose debug prints");
                println!("  help/h           - Show this help");
                println!("  exit/quit/q      - Exit program");
                continue;
            }
            println!(
                "Unrecognized command: '{}'. Type 'help' for available commands.",
                cmd
            );
        }
    })
}
