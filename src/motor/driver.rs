// High-level BLE driver for the car
//
// Finds the bridge by its advertised name, resolves the motor control
// characteristic, and writes motor command frames to it.

use std::time::{Duration, Instant};

use btleplug::api::{Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::frame::MotorCommandFrame;
use crate::config::{MOTOR_CHAR_UUID, SCAN_TIMEOUT};

/// Error types for car communication
#[derive(Debug, thiserror::Error)]
pub enum CarError {
    #[error("BLE transport error: {0}")]
    Ble(#[from] btleplug::Error),

    #[error("no Bluetooth adapter available")]
    NoAdapter,

    #[error("no device named {name} found within {timeout:?}")]
    DeviceNotFound { name: String, timeout: Duration },

    #[error("invalid characteristic uuid: {0}")]
    BadUuid(#[from] uuid::Error),
}

pub type Result<T> = std::result::Result<T, CarError>;

/// Outcome of handing one frame to the BLE stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Frame written to the motor characteristic
    Written,
    /// Motor characteristic not resolved yet - frame dropped
    NoTarget,
}

/// BLE car driver
///
/// Writes are fire-and-forget: each frame goes out without response and the
/// next control cycle supersedes whatever is still in flight.
pub struct CarDriver {
    peripheral: Peripheral,
    motor_char: Option<Characteristic>,
}

impl CarDriver {
    /// Scan for the car by advertised name and connect to it
    pub async fn connect(device_name: &str) -> Result<Self> {
        let manager = Manager::new().await?;
        let adapters = manager.adapters().await?;
        let adapter = adapters.into_iter().next().ok_or(CarError::NoAdapter)?;

        info!("Scanning for {}", device_name);
        adapter.start_scan(ScanFilter::default()).await?;

        let deadline = Instant::now() + SCAN_TIMEOUT;
        let peripheral = loop {
            if let Some(p) = find_by_name(&adapter, device_name).await? {
                break p;
            }
            if Instant::now() >= deadline {
                adapter.stop_scan().await?;
                return Err(CarError::DeviceNotFound {
                    name: device_name.to_string(),
                    timeout: SCAN_TIMEOUT,
                });
            }
            sleep(Duration::from_millis(500)).await;
        };
        adapter.stop_scan().await?;

        info!("Connecting to {}", device_name);
        peripheral.connect().await?;
        info!("Connected");

        Ok(Self {
            peripheral,
            motor_char: None,
        })
    }

    /// Discover the device's GATT services and look up the motor
    /// characteristic
    ///
    /// Returns whether the characteristic was found. A device without it can
    /// stay connected - frames are dropped until a later resolve succeeds.
    pub async fn resolve_motor_characteristic(&mut self) -> Result<bool> {
        self.peripheral.discover_services().await?;

        let motor_uuid = Uuid::parse_str(MOTOR_CHAR_UUID)?;

        for service in self.peripheral.services() {
            debug!("Service {}", service.uuid);
            for ch in &service.characteristics {
                debug!("  characteristic {} ({:?})", ch.uuid, ch.properties);
            }
        }

        match self
            .peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == motor_uuid)
        {
            Some(c) => {
                info!("Motor characteristic {} resolved", motor_uuid);
                self.motor_char = Some(c);
                Ok(true)
            }
            None => {
                warn!("Device reports no motor characteristic {}", motor_uuid);
                Ok(false)
            }
        }
    }

    /// Whether frames currently have somewhere to go
    pub fn has_motor_target(&self) -> bool {
        self.motor_char.is_some()
    }

    /// Write one frame to the motor characteristic
    ///
    /// Without a resolved characteristic the frame is dropped and
    /// `SendOutcome::NoTarget` is returned; transport failures surface
    /// unchanged, with no retries.
    pub async fn send(&mut self, frame: &MotorCommandFrame) -> Result<SendOutcome> {
        let Some(ref motor_char) = self.motor_char else {
            debug!("No motor target, dropping frame {:02X?}", frame.as_bytes());
            return Ok(SendOutcome::NoTarget);
        };

        debug!("Frame {:02X?}", frame.as_bytes());
        self.peripheral
            .write(motor_char, frame.as_bytes(), WriteType::WithoutResponse)
            .await?;
        Ok(SendOutcome::Written)
    }

    /// Send the all-stop frame
    pub async fn stop(&mut self) -> Result<SendOutcome> {
        info!("Stopping motors");
        self.send(&MotorCommandFrame::stop()).await
    }

    /// Drop the BLE connection; the firmware holds the last written duties,
    /// so stop first
    pub async fn disconnect(&mut self) -> Result<()> {
        self.peripheral.disconnect().await?;
        Ok(())
    }
}

async fn find_by_name(adapter: &Adapter, name: &str) -> Result<Option<Peripheral>> {
    for p in adapter.peripherals().await? {
        if let Some(props) = p.properties().await? {
            if props.local_name.as_deref() == Some(name) {
                return Ok(Some(p));
            }
        }
    }
    Ok(None)
}
