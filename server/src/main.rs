use clap::Parser;
use log::info;
use server::network::Server;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Tick rate (lobby updates per second)
    #[arg(short = 't', long, default_value = "20")]
    tick_rate: u32,

    /// Maximum number of simultaneous clients
    #[arg(short = 'm', long, default_value = "32")]
    max_clients: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let address = format!("{}:{}", args.host, args.port);
    let tick_duration = Duration::from_millis(1000 / args.tick_rate.max(1) as u64);

    info!("Starting lobby server...");
    info!("Binding to: {}", address);
    info!(
        "Tick rate: {}Hz, max clients: {}",
        args.tick_rate, args.max_clients
    );
    info!("Console: type a command, or 'stop' to shut down");

    let mut server = Server::new(&address, tick_duration, args.max_clients).await?;

    // Run until the console asks to stop or the process is interrupted
    tokio::select! {
        result = server.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
