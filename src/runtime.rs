// 50 Hz control loop with watchdog
// A crashed teleop or a flipped control switch must halt the car: stale tilt
// input and a disabled flag both produce the all-stop frame.

use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::config::{LOOP_HZ, TILT_TIMEOUT, TOPIC_CONTROL, TOPIC_DUTY, TOPIC_HEALTH, TOPIC_TILT};
use crate::messages::{ControlState, DutyReport, RuntimeHealth, TiltSample};
use crate::motor::{CarDriver, MotionIntent, MotorCommandFrame, SendOutcome, mix, tilt_to_intent};

pub struct Runtime {
    latest_tilt: Option<TiltSample>,
    tilt_received_at: Instant,
    control_enabled: bool,
    health: RuntimeHealth,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            latest_tilt: None,
            tilt_received_at: Instant::now(),
            control_enabled: false, // off until the operator enables control
            health: RuntimeHealth::TiltStale, // start stale until first sample
        }
    }

    /// Process an incoming tilt sample
    fn on_tilt(&mut self, sample: TiltSample) {
        debug!("Received tilt: {:?}", &sample);
        self.latest_tilt = Some(sample);
        self.tilt_received_at = Instant::now();
    }

    /// Process a control-state update
    fn on_control(&mut self, state: ControlState) {
        if state.enabled != self.control_enabled {
            info!(
                "Control {}",
                if state.enabled { "enabled" } else { "disabled" }
            );
        }
        self.control_enabled = state.enabled;
    }

    /// Derive this tick's driving intent, applying the watchdog and the
    /// control-enable gate
    fn compute_intent(&mut self) -> MotionIntent {
        let tilt_age = self.tilt_received_at.elapsed();

        if tilt_age > TILT_TIMEOUT {
            // Watchdog triggered - stop the car
            if self.health != RuntimeHealth::TiltStale {
                warn!("Tilt input stale ({:?} old), stopping car", tilt_age);
            }
            self.health = RuntimeHealth::TiltStale;
            MotionIntent::stop()
        } else if let Some(ref sample) = self.latest_tilt {
            self.health = RuntimeHealth::Ok;
            if self.control_enabled {
                tilt_to_intent(sample.x, sample.y)
            } else {
                MotionIntent::stop()
            }
        } else {
            // No sample ever received
            self.health = RuntimeHealth::TiltStale;
            MotionIntent::stop()
        }
    }
}

pub async fn run(
    device_name: &str,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut driver = if dry_run {
        info!("Dry run: frames are logged instead of written");
        None
    } else {
        let mut driver = CarDriver::connect(device_name).await?;
        if !driver.resolve_motor_characteristic().await? {
            warn!("Motor characteristic missing, frames will be dropped");
        }
        Some(driver)
    };

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let sub_tilt = session.declare_subscriber(TOPIC_TILT).await?;
    let sub_control = session.declare_subscriber(TOPIC_CONTROL).await?;
    let pub_duty = session.declare_publisher(TOPIC_DUTY).await?;
    let pub_health = session.declare_publisher(TOPIC_HEALTH).await?;

    let mut runtime = Runtime::new();
    let mut tick = interval(Duration::from_millis(1000 / LOOP_HZ));

    info!(
        "Runtime started: {}Hz loop, {}ms tilt watchdog",
        LOOP_HZ,
        TILT_TIMEOUT.as_millis()
    );
    info!("Subscribed to: {}, {}", TOPIC_TILT, TOPIC_CONTROL);
    info!("Publishing to: {}, {}", TOPIC_DUTY, TOPIC_HEALTH);

    loop {
        tick.tick().await;

        // 1. Drain all pending input (non-blocking), keep latest
        while let Ok(Some(sample)) = sub_tilt.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<TiltSample>(&payload) {
                Ok(tilt) => {
                    runtime.on_tilt(tilt);
                }
                Err(e) => {
                    warn!("Failed to parse tilt sample: {}", e);
                }
            }
        }
        while let Ok(Some(sample)) = sub_control.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<ControlState>(&payload) {
                Ok(state) => {
                    runtime.on_control(state);
                }
                Err(e) => {
                    warn!("Failed to parse control state: {}", e);
                }
            }
        }

        // 2. Sampler -> mixer -> frame, synchronously in this tick
        let intent = runtime.compute_intent();
        let frame = MotorCommandFrame::encode(mix(intent));

        // 3. Hand the frame to the car
        match driver {
            Some(ref mut driver) => match driver.send(&frame).await {
                Ok(SendOutcome::Written) => {}
                Ok(SendOutcome::NoTarget) => {
                    runtime.health = RuntimeHealth::NoMotorTarget;
                }
                Err(e) => {
                    warn!("Motor write failed: {}", e);
                }
            },
            None => debug!("Frame {:02X?}", frame.as_bytes()),
        }

        // 4. Publish duties and health
        let duty_json = serde_json::to_string(&DutyReport::from(frame.duties()))?;
        pub_duty.put(duty_json).await?;

        let health_json = serde_json::to_string(&runtime.health)?;
        pub_health.put(health_json).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_runtime_with_tilt(x: f32, y: f32) -> Runtime {
        let mut runtime = Runtime::new();
        runtime.on_tilt(TiltSample { x, y });
        runtime
    }

    #[test]
    fn test_disabled_control_forces_stop() {
        let mut runtime = fresh_runtime_with_tilt(0.5, -1.0);
        assert_eq!(runtime.compute_intent(), MotionIntent::stop());
        assert_eq!(runtime.health, RuntimeHealth::Ok);
    }

    #[test]
    fn test_enabled_control_passes_tilt_through() {
        let mut runtime = fresh_runtime_with_tilt(0.0, -1.0);
        runtime.on_control(ControlState { enabled: true });

        let intent = runtime.compute_intent();
        assert_eq!(intent, MotionIntent::new(20, 0));
        assert_eq!(runtime.health, RuntimeHealth::Ok);
    }

    #[test]
    fn test_no_sample_yet_reports_stale() {
        let mut runtime = Runtime::new();
        runtime.on_control(ControlState { enabled: true });

        assert_eq!(runtime.compute_intent(), MotionIntent::stop());
        assert_eq!(runtime.health, RuntimeHealth::TiltStale);
    }

    #[test]
    fn test_watchdog_stops_on_stale_tilt() {
        let mut runtime = fresh_runtime_with_tilt(0.0, -1.0);
        runtime.on_control(ControlState { enabled: true });
        runtime.tilt_received_at = Instant::now() - (TILT_TIMEOUT + Duration::from_millis(50));

        assert_eq!(runtime.compute_intent(), MotionIntent::stop());
        assert_eq!(runtime.health, RuntimeHealth::TiltStale);
    }

    #[test]
    fn test_fresh_sample_recovers_from_stale() {
        let mut runtime = Runtime::new();
        runtime.on_control(ControlState { enabled: true });
        assert_eq!(runtime.compute_intent(), MotionIntent::stop());

        runtime.on_tilt(TiltSample { x: 0.0, y: 1.0 });
        assert_eq!(runtime.compute_intent(), MotionIntent::new(-20, 0));
        assert_eq!(runtime.health, RuntimeHealth::Ok);
    }

    #[test]
    fn test_disabled_frame_has_zero_duties() {
        let mut runtime = fresh_runtime_with_tilt(1.3, -2.7);
        let frame = MotorCommandFrame::encode(mix(runtime.compute_intent()));
        assert_eq!(frame.duties(), [0, 0, 0, 0]);
    }
}
