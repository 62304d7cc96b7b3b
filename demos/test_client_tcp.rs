use std::io::Write;
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use osc_keypress::slip;
use rosc::{encoder, OscMessage, OscPacket, OscType};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut target = "127.0.0.1:6379".to_string();
    let mut use_slip = false;
    for arg in std::env::args().skip(1) {
        if arg == "--slip" {
            use_slip = true;
        } else {
            target = arg;
        }
    }
    println!(
        "OSC keypress test client - sending to {} over TCP ({})",
        target,
        if use_slip {
            "SLIP framing"
        } else {
            "packet-length framing"
        }
    );

    let mut stream = TcpStream::connect(&target)?;

    send(
        &mut stream,
        "/some/address",
        vec![
            OscType::Int(1),
            OscType::Float(2.0),
            OscType::String("hello".to_string()),
        ],
        use_slip,
    )?;
    println!("Sent log handler test message");

    send(
        &mut stream,
        "/keypress/h",
        vec![OscType::Float(1.0)],
        use_slip,
    )?;
    println!("Key down sent. An 'h' should be typed in 2.5 seconds if the server runs with --autohotkey");

    thread::sleep(Duration::from_millis(2500));

    send(
        &mut stream,
        "/keypress/h",
        vec![OscType::Float(0.0)],
        use_slip,
    )?;
    println!("Key up sent");

    println!("Test completed!");
    Ok(())
}

fn send(
    stream: &mut TcpStream,
    addr: &str,
    args: Vec<OscType>,
    use_slip: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = encoder::encode(&OscPacket::Message(OscMessage {
        addr: addr.to_string(),
        args,
    }))?;
    let framed = if use_slip {
        slip::encode(&payload)
    } else {
        // OSC 1.0 framing: 4-byte big-endian packet length, then the packet
        let mut framed = (payload.len() as u32).to_be_bytes().to_vec();
        framed.extend_from_slice(&payload);
        framed
    };
    stream.write_all(&framed)?;
    Ok(())
}
