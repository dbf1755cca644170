// GATT diagnostic: READ-ONLY scan of the car's service table
//
// This tool does NOT write anything to the car - it's completely safe.
// Use this first before running drive_test.
//
// Usage: cargo run --example gatt_diagnostic -- [device-name]
// Example: cargo run --example gatt_diagnostic -- BLEBRDG

use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::Manager;
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

use rccar_ble_runtime::config::{DEVICE_NAME, MOTOR_CHAR_UUID, SCAN_TIMEOUT};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("debug".parse().unwrap()),
        )
        .init();

    // Get device name from args or use default
    let device_name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEVICE_NAME.to_string());

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║             Car GATT Diagnostic (READ-ONLY)                  ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  This tool only READS the service table - no motor writes    ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Looking for device: {}", device_name);
    println!("Motor characteristic: {}", MOTOR_CHAR_UUID);
    println!();

    let motor_uuid = Uuid::parse_str(MOTOR_CHAR_UUID)?;

    // Step 1: scan
    println!("Step 1: Scanning for BLE devices...");
    let manager = Manager::new().await?;
    let adapter = manager
        .adapters()
        .await?
        .into_iter()
        .next()
        .ok_or("no Bluetooth adapter available")?;
    adapter.start_scan(ScanFilter::default()).await?;
    sleep(SCAN_TIMEOUT.min(Duration::from_secs(5))).await;

    let mut car = None;
    for p in adapter.peripherals().await? {
        let Some(props) = p.properties().await? else {
            continue;
        };
        let name = props.local_name.clone().unwrap_or("<unnamed>".to_string());
        println!(
            "  found {} (rssi {})",
            name,
            props.rssi.map_or("?".to_string(), |r| r.to_string())
        );
        if name == device_name {
            car = Some(p);
        }
    }
    adapter.stop_scan().await?;

    let Some(car) = car else {
        println!();
        println!("  ✗ No device named {} seen", device_name);
        println!();
        println!("Troubleshooting:");
        println!("  - Check the car is powered on and in range");
        println!("  - Verify nothing else is connected to it already");
        return Ok(());
    };
    println!("  ✓ Found {}", device_name);
    println!();

    // Step 2: connect and walk the service table
    println!("Step 2: Connecting and discovering services...");
    car.connect().await?;
    car.discover_services().await?;
    println!("  ✓ Connected");
    println!();

    let mut motor_char_seen = false;
    for service in car.services() {
        println!("Service {}", service.uuid);
        for ch in &service.characteristics {
            let marker = if ch.uuid == motor_uuid {
                motor_char_seen = true;
                "  <-- motor control"
            } else {
                ""
            };
            println!("  characteristic {} {:?}{}", ch.uuid, ch.properties, marker);
        }
    }
    println!();

    if motor_char_seen {
        println!("✓ Motor characteristic present - the runtime can drive this car");
    } else {
        println!("✗ Motor characteristic NOT found - wrong device or firmware?");
    }

    car.disconnect().await?;
    Ok(())
}
