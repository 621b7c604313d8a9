// Operator CLI: sends CONTROL datagrams to a running daemon and prints the
// text replies

use std::io::{self, Write};
use std::net::UdpSocket;
use std::time::Duration;

use serde::Serialize;

#[derive(Serialize)]
struct ControlMessage {
    #[serde(rename = "type")]
    kind: &'static str,
    command: String,
}

fn help() {
    println!("Available commands:");
    println!("  neighbors      - detected neighbors, costs and recognized addresses");
    println!("  routing-table  - derived next-hop table");
    println!("  lsdb           - link-state database contents");
    println!("  help           - this message");
    println!("  exit           - quit");
}

fn prompt(label: &str, default: &str) -> io::Result<String> {
    print!("{} [{}]: ", label, default);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    Ok(if input.is_empty() {
        default.to_string()
    } else {
        input.to_string()
    })
}

fn main() -> io::Result<()> {
    let ip = prompt("Daemon address", "127.0.0.1")?;
    let port: u16 = prompt("Daemon port", "5000")?.parse().unwrap_or(5000);
    let server_addr = format!("{}:{}", ip, port);

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.set_read_timeout(Some(Duration::from_secs(5)))?;
    println!("Talking to {}", server_addr);
    help();

    let mut buffer = [0u8; 4096];
    loop {
        print!("\n> ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let command = input.trim();

        match command {
            "" => continue,
            "exit" => break,
            "help" => {
                help();
                continue;
            }
            _ => {}
        }

        let message = ControlMessage {
            kind: "CONTROL",
            command: command.to_string(),
        };
        let serialized = serde_json::to_vec(&message)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        socket.send_to(&serialized, &server_addr)?;

        match socket.recv_from(&mut buffer) {
            Ok((size, _)) => {
                println!("{}", String::from_utf8_lossy(&buffer[..size]));
            }
            Err(e) => {
                println!("no answer from daemon: {}", e);
            }
        }
    }
    Ok(())
}
