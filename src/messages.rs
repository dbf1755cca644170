// Message types exchanged over zenoh

use serde::{Deserialize, Serialize};

// Accelerometer sample from the phone/teleop -> runtime
// Axis readings in device-native m/s^2
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct TiltSample {
    pub x: f32,
    pub y: f32,
}

// Control-enable flag from the operator UI -> runtime
// While disabled the runtime keeps sending the stop frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ControlState {
    pub enabled: bool,
}

// Per-channel PWM duties of the last frame (bytes 4..8), runtime -> UI
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct DutyReport {
    pub ch0: u8,
    pub ch1: u8,
    pub ch2: u8,
    pub ch3: u8,
}

// Defines how to create a DutyReport from the four duty bytes of a frame
impl From<[u8; 4]> for DutyReport {
    fn from(duties: [u8; 4]) -> Self {
        Self {
            ch0: duties[0],
            ch1: duties[1],
            ch2: duties[2],
            ch3: duties[3],
        }
    }
}

/// Health status published by the runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    TiltStale,
    NoMotorTarget,
}
