// Timeouts, topics, BLE device configuration
use std::time::Duration;

// Runtime loop frequency
pub const LOOP_HZ: u64 = 50;

// Tilt input timeout for watchdog
pub const TILT_TIMEOUT: Duration = Duration::from_millis(250);

// Zenoh topics
pub const TOPIC_TILT: &str = "rccar/tilt"; // accelerometer samples
pub const TOPIC_CONTROL: &str = "rccar/control"; // control-enable flag
pub const TOPIC_DUTY: &str = "rccar/rt/duty"; // per-channel motor duties
pub const TOPIC_HEALTH: &str = "rccar/state/health"; // health status

// BLE configuration
// Name the car's CC2541 bridge advertises
pub const DEVICE_NAME: &str = "BLEBRDG";

// Motor control characteristic exposed by the bridge firmware
pub const MOTOR_CHAR_UUID: &str = "0000fff1-0000-1000-8000-00805f9b34fb";

// How long to scan for the car before giving up
pub const SCAN_TIMEOUT: Duration = Duration::from_secs(10);
