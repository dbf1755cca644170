// Keyboard teleop standing in for the phone: WASD tilt, E enable/disable,
// R/F tilt strength, Q quit
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::{Duration, Instant};
use tracing::info;

use rccar_ble_runtime::config::{TOPIC_CONTROL, TOPIC_TILT};
use rccar_ble_runtime::messages::{ControlState, TiltSample};

const TILTS: [f32; 3] = [1.0, 2.5, 5.0]; // m/s^2, ~20/50/100% duty
const INPUT_TIMEOUT_MS: u64 = 100; // Level the phone after this much time with no input

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let pub_tilt = session.declare_publisher(TOPIC_TILT).await?;
    let pub_control = session.declare_publisher(TOPIC_CONTROL).await?;

    info!("Controls: WASD=tilt, E=enable/disable, R/F=tilt strength, Q=quit");
    info!("Tilt strength: LOW, control DISABLED");

    enable_raw_mode()?;
    let result = run_teleop(&pub_tilt, &pub_control).await;
    disable_raw_mode()?;

    result
}

async fn run_teleop(
    pub_tilt: &zenoh::pubsub::Publisher<'_>,
    pub_control: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut tilt_idx: usize = 0;
    let mut enabled = false;

    // Persistent simulated phone attitude
    let mut tilt_x = 0.0;
    let mut tilt_y = 0.0;
    let mut last_movement_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    // Pitch - forward drive needs y toward the ground
                    KeyCode::Char('w') if pressed => {
                        tilt_y = -TILTS[tilt_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('s') if pressed => {
                        tilt_y = TILTS[tilt_idx];
                        last_movement_input = Instant::now();
                    }

                    // Roll - positive x turns right
                    KeyCode::Char('d') if pressed => {
                        tilt_x = TILTS[tilt_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('a') if pressed => {
                        tilt_x = -TILTS[tilt_idx];
                        last_movement_input = Instant::now();
                    }

                    // Control-enable toggle
                    KeyCode::Char('e') if pressed => {
                        enabled = !enabled;
                        info!("Control {}", if enabled { "ENABLED" } else { "DISABLED" });
                        let state = serde_json::to_string(&ControlState { enabled })?;
                        pub_control.put(state).await?;
                    }

                    // Tilt strength
                    KeyCode::Char('r') if pressed => {
                        tilt_idx = (tilt_idx + 1).min(2);
                        print_strength(tilt_idx);
                    }
                    KeyCode::Char('f') if pressed => {
                        tilt_idx = tilt_idx.saturating_sub(1);
                        print_strength(tilt_idx);
                    }

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        // Level the phone if no movement input for INPUT_TIMEOUT_MS
        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            tilt_x = 0.0;
            tilt_y = 0.0;
        }

        // Always publish at ~50Hz, like the sensor callback would
        let sample = serde_json::to_string(&TiltSample {
            x: tilt_x,
            y: tilt_y,
        })?;
        pub_tilt.put(sample).await?;
    }

    // Leave the runtime in a safe state
    let state = serde_json::to_string(&ControlState { enabled: false })?;
    pub_control.put(state).await?;

    Ok(())
}

fn print_strength(idx: usize) {
    let label = ["LOW", "MED", "HIGH"][idx];
    info!("Tilt strength: {}", label);
}
