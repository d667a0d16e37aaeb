//! vmctl - VM lifecycle control for a remote hypervisor

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vmctl::cli::Cli;
use vmctl::commands::error_code;
use vmctl::output::json;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = cli.run().await {
        if json_mode {
            match json::format_error(&e.to_string(), error_code(&e)) {
                Ok(body) => println!("{body}"),
                Err(_) => eprintln!("Error: {e:#}"),
            }
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}
