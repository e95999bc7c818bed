use bincode::{deserialize, serialize};
use clap::Parser;
use shared::{Packet, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Name to join the lobby under
    #[arg(short = 'n', long, default_value = "Tester")]
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Create local socket
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    println!("Client socket bound to {}", socket.local_addr()?);

    let server_addr = args.server.parse::<SocketAddr>()?;

    // Join the lobby
    let connect_packet = Packet::Connect {
        username: args.name.clone(),
        client_version: PROTOCOL_VERSION,
    };
    println!("Connecting to {} as {}", server_addr, args.name);
    socket
        .send_to(&serialize(&connect_packet)?, server_addr)
        .await?;

    let mut buf = [0u8; 2048];

    println!("Waiting for server response...");
    let (len, addr) = socket.recv_from(&mut buf).await?;
    println!("Received {} bytes from {}", len, addr);

    match deserialize::<Packet>(&buf[0..len])? {
        Packet::Connected { client_id } => {
            println!("Connected with client ID: {}", client_id);
        }
        Packet::Disconnected { reason } => {
            println!("Server refused the connection: {}", reason);
            return Ok(());
        }
        other => {
            println!("Expected Connected but got: {:?}", other);
            return Ok(());
        }
    }

    // The welcome lines arrive right behind the acknowledgement
    drain_responses(&socket, &mut buf).await;

    // Walk right for a moment so /stats has something to count
    println!("Walking right for 600ms...");
    let walk = Packet::Input {
        left: false,
        right: true,
        jump: false,
    };
    send_packet(&socket, server_addr, &walk).await?;
    sleep(Duration::from_millis(600)).await;
    let stop = Packet::Input {
        left: false,
        right: false,
        jump: false,
    };
    send_packet(&socket, server_addr, &stop).await?;

    // Exercise the commands
    for line in [
        "/color chat red".to_string(),
        "/stats".to_string(),
        format!("/stats {} extended", args.name),
    ] {
        println!("Sending: {}", line);
        send_packet(&socket, server_addr, &Packet::Chat { message: line }).await?;
        drain_responses(&socket, &mut buf).await;
    }

    // Ask what /color offers next
    println!("Completing: \"/color \"");
    let complete = Packet::TabComplete {
        partial: "/color ".to_string(),
    };
    send_packet(&socket, server_addr, &complete).await?;
    drain_responses(&socket, &mut buf).await;

    println!("Sending disconnect");
    send_packet(&socket, server_addr, &Packet::Disconnect).await?;

    println!("Test client finished");
    Ok(())
}

async fn send_packet(
    socket: &UdpSocket,
    server_addr: SocketAddr,
    packet: &Packet,
) -> Result<(), Box<dyn std::error::Error>> {
    socket.send_to(&serialize(packet)?, server_addr).await?;
    Ok(())
}

/// Prints whatever the server sends until it goes quiet for a moment
async fn drain_responses(socket: &UdpSocket, buf: &mut [u8]) {
    loop {
        match timeout(Duration::from_millis(400), socket.recv_from(buf)).await {
            Ok(Ok((len, _))) => match deserialize::<Packet>(&buf[0..len]) {
                Ok(Packet::Response { lines }) => {
                    for line in lines {
                        println!("  {}", line);
                    }
                }
                Ok(Packet::Suggestions { entries }) => {
                    println!("  suggestions: {:?}", entries);
                }
                Ok(Packet::Broadcast { line }) => {
                    println!("  [lobby] {}", line);
                }
                Ok(other) => println!("  unexpected packet: {:?}", other),
                Err(e) => println!("  failed to deserialize packet: {}", e),
            },
            Ok(Err(e)) => {
                println!("  error receiving: {}", e);
                break;
            }
            Err(_) => break,
        }
    }
}
