use std::net::UdpSocket;
use std::thread;
use std::time::Duration;

use rosc::{encoder, OscMessage, OscPacket, OscType};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:6379".to_string());
    println!("OSC keypress test client - sending to {} over UDP", target);

    let socket = UdpSocket::bind("0.0.0.0:0")?;

    // An address no route matches, to exercise the server's log handler
    let unmatched = OscMessage {
        addr: "/some/address".to_string(),
        args: vec![
            OscType::Int(1),
            OscType::Float(2.0),
            OscType::String("hello".to_string()),
        ],
    };
    socket.send_to(&encoder::encode(&OscPacket::Message(unmatched))?, &target)?;
    println!("Sent log handler test message");

    send_keypress(&socket, &target, "h", 1.0)?;
    println!("Key down sent. An 'h' should be typed in 2.5 seconds if the server runs with --autohotkey");

    thread::sleep(Duration::from_millis(2500));

    send_keypress(&socket, &target, "h", 0.0)?;
    println!("Key up sent");

    println!("Test completed!");
    Ok(())
}

fn send_keypress(
    socket: &UdpSocket,
    target: &str,
    key: &str,
    value: f32,
) -> Result<(), Box<dyn std::error::Error>> {
    let msg = OscMessage {
        addr: format!("/keypress/{}", key),
        args: vec![OscType::Float(value)],
    };
    socket.send_to(&encoder::encode(&OscPacket::Message(msg))?, target)?;
    Ok(())
}
