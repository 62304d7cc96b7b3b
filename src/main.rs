use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use osc_keypress::config::Config;
use osc_keypress::dispatch::Dispatcher;
use osc_keypress::handlers::{self, KeypressHandler};
use osc_keypress::inject::{KeyInjector, NullInjector, RdevInjector};
use osc_keypress::stdin_handler;
use osc_keypress::tcp_server::{TcpFraming, TcpServer};
use osc_keypress::udp_server::UdpServer;

/// OSC server mapping /keypress messages to simulated keyboard input.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The ip to listen on
    #[arg(long)]
    ip: Option<String>,

    /// The port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Perform real key injection instead of only logging actions
    #[arg(long)]
    autohotkey: bool,

    /// Serve OSC over TCP instead of UDP
    #[arg(long)]
    tcp: bool,

    /// Use SLIP framing (OSC 1.1) on TCP; implies --tcp
    #[arg(long)]
    slip: bool,

    /// Path to the configuration file
    #[arg(long, default_value = "config.json")]
    config: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load_or_default(&args.config)
        .with_context(|| format!("loading {}", args.config))?;
    if let Some(ip) = args.ip {
        config.listen.host = ip;
    }
    if let Some(port) = args.port {
        config.listen.port = port;
    }
    if args.tcp {
        config.transport.tcp = true;
    }
    if args.slip {
        config.transport.slip = true;
        config.transport.tcp = true;
    }
    if args.autohotkey {
        config.automation.enabled = true;
    }
    osc_keypress::set_debug_enabled(config.debug);

    let injector: Box<dyn KeyInjector> = if config.automation.enabled {
        Box::new(RdevInjector)
    } else {
        Box::new(NullInjector)
    };
    println!("Key injection backend: {}", injector.name());

    let keypress = Arc::new(KeypressHandler::new(injector));

    let mut dispatcher = Dispatcher::new();
    {
        let keypress = Arc::clone(&keypress);
        dispatcher.map(&format!("{}*", handlers::KEYPRESS_PREFIX), move |peer, msg| {
            keypress.handle(peer, msg)
        })?;
    }
    dispatcher.set_default_handler(handlers::log_unmatched);
    let dispatcher = Arc::new(dispatcher);

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || {
            println!();
            println!("Interrupt received, shutting down...");
            shutdown.store(true, Ordering::SeqCst);
        })
        .context("installing the interrupt handler")?;
    }

    // Not joined: read_line blocks until the next line, process teardown reaps it
    let _console = stdin_handler::spawn_stdin_handler(Arc::clone(&shutdown), Arc::clone(&keypress));

    let bind_addr = config.bind_addr();
    if config.transport.tcp {
        let framing = if config.transport.slip {
            TcpFraming::Slip
        } else {
            TcpFraming::PacketLength
        };
        let server = TcpServer::bind(&bind_addr, framing)
            .with_context(|| format!("binding tcp {}", bind_addr))?;
        print_serving("tcp", server.local_addr()?, framing == TcpFraming::Slip);
        server.serve(Arc::clone(&dispatcher), Arc::clone(&shutdown));
    } else {
        let server =
            UdpServer::bind(&bind_addr).with_context(|| format!("binding udp {}", bind_addr))?;
        print_serving("udp", server.local_addr()?, false);
        server.serve(&dispatcher, &shutdown);
    }

    // Cleanup block: runs on every exit path of the serve loop so nothing
    // stays logically held
    let released = keypress.release_all();
    print_closing(released);
    Ok(())
}

// Print the serving banner in green (works on Windows CMD via termcolor)
fn print_serving(proto: &str, addr: std::net::SocketAddr, slip: bool) {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_intense(true));
    if slip {
        let _ = writeln!(&mut stdout, "Serving on {}://{} (SLIP framing)", proto, addr);
    } else {
        let _ = writeln!(&mut stdout, "Serving on {}://{}", proto, addr);
    }
    let _ = stdout.reset();
    print_quick_help();
}

fn print_quick_help() {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_intense(true));
    let _ = writeln!(&mut stdout, "Type 'help' for commands, 'exit' to quit");
    let _ = stdout.reset();
}

fn print_closing(released: usize) {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_intense(true));
    if released > 0 {
        let _ = writeln!(&mut stdout, "Closing... released {} held key(s)", released);
    } else {
        let _ = writeln!(&mut stdout, "Closing...");
    }
    let _ = stdout.reset();
}
