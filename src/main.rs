use clap::Parser;
use tracing_subscriber::EnvFilter;

use rccar_ble_runtime::config::DEVICE_NAME;

/// Tilt-teleop runtime for the BLE RC car
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Advertised name of the car's BLE bridge
    #[arg(long, default_value = DEVICE_NAME)]
    device_name: String,

    /// Run the control loop without connecting to the car
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init(); // installs the subscriber globally

    let args = Args::parse();

    if let Err(e) = rccar_ble_runtime::runtime::run(&args.device_name, args.dry_run).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
