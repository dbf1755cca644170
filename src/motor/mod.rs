// Motor control module for the BLE car
//
// Provides:
// - Tilt-to-differential-drive mixing (accelerometer -> per-side speeds)
// - The bridge firmware's 8-byte motor command frame
// - High-level BLE car driver

mod driver;
pub mod frame;
pub mod mixer;

pub use driver::{CarDriver, CarError, SendOutcome};
pub use frame::MotorCommandFrame;
pub use mixer::{MotionIntent, MotorSpeeds, mix, tilt_to_intent};
