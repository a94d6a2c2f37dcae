//! Sadhana Web Server binary

use clap::Parser;
use sadhana_core::{init_logging, LoggingConfig};
use sadhana_web::server::SadhanaServerBuilder;

/// HTTP front end for the sadhana access-control engine
#[derive(Parser)]
#[command(name = "sadhana-web")]
#[command(about = "Sadhana platform web server")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Enable development mode (seeds demo records)
    #[arg(long)]
    dev: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let logging = LoggingConfig {
        level: args.log_level.clone(),
        ..LoggingConfig::default()
    };
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let server = match SadhanaServerBuilder::new()
        .host(args.host)
        .port(args.port)
        .dev_mode(args.dev)
        .build()
    {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        eprintln!("Server failed: {}", e);
        std::process::exit(1);
    }
}
