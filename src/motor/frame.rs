// Motor command frame for the CC2541 bridge firmware
//
// A command is a fixed 8-byte characteristic value:
// [0x04, 0, 0, 0, L_fwd, L_rev, R_rev, R_fwd]
// Each duty byte is a PWM percentage in 0..=100. Within a motor pair the
// forward and reverse bytes are never nonzero together.

use super::mixer::{MAX_SPEED, MotorSpeeds};

/// Command-type marker for motor control
pub const CMD_MOTOR: u8 = 0x04;

/// Frame length in bytes
pub const FRAME_LEN: usize = 8;

// Byte offsets of the duty channels. The right motor is mounted mirrored,
// so its forward duty sits in the last byte and reverse comes first.
const LEFT_FWD: usize = 4;
const LEFT_REV: usize = 5;
const RIGHT_REV: usize = 6;
const RIGHT_FWD: usize = 7;

/// One complete 8-byte motor command
///
/// Frames carry the full state of all four PWM channels and are rebuilt
/// from scratch on every control cycle - there is no partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCommandFrame([u8; FRAME_LEN]);

impl MotorCommandFrame {
    /// All-stop frame: marker byte set, every duty zero
    pub fn stop() -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[0] = CMD_MOTOR;
        Self(bytes)
    }

    /// Encode per-side speeds into a frame
    ///
    /// Positive left speed fills byte 4, negative fills byte 5. For the
    /// mirrored right motor, negative fills byte 6 and positive fills
    /// byte 7. Speeds outside [-100, 100] are clamped, and a zero speed
    /// leaves both bytes of the pair at zero.
    pub fn encode(speeds: MotorSpeeds) -> Self {
        let mut frame = Self::stop();

        let left = speeds.left.clamp(-MAX_SPEED, MAX_SPEED);
        let right = speeds.right.clamp(-MAX_SPEED, MAX_SPEED);

        if left > 0 {
            frame.0[LEFT_FWD] = left as u8;
        } else if left < 0 {
            frame.0[LEFT_REV] = (-left) as u8;
        }

        if right < 0 {
            frame.0[RIGHT_REV] = (-right) as u8;
        } else if right > 0 {
            frame.0[RIGHT_FWD] = right as u8;
        }

        frame
    }

    /// Raw bytes, as written to the characteristic
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The four PWM duty bytes (channels 0..=3, frame bytes 4..=7)
    pub fn duties(&self) -> [u8; 4] {
        [
            self.0[LEFT_FWD],
            self.0[LEFT_REV],
            self.0[RIGHT_REV],
            self.0[RIGHT_FWD],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_frame_layout() {
        let frame = MotorCommandFrame::stop();
        assert_eq!(frame.as_bytes(), &[0x04, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_zero_speeds_match_stop() {
        let frame = MotorCommandFrame::encode(MotorSpeeds::default());
        assert_eq!(frame, MotorCommandFrame::stop());
    }

    #[test]
    fn test_forward_fills_outer_bytes() {
        let frame = MotorCommandFrame::encode(MotorSpeeds { left: 50, right: 50 });
        assert_eq!(frame.as_bytes(), &[0x04, 0, 0, 0, 50, 0, 0, 50]);
    }

    #[test]
    fn test_reverse_fills_inner_bytes() {
        let frame = MotorCommandFrame::encode(MotorSpeeds {
            left: -50,
            right: -50,
        });
        assert_eq!(frame.as_bytes(), &[0x04, 0, 0, 0, 0, 50, 50, 0]);
    }

    #[test]
    fn test_backward_right_turn_frame() {
        // left -15 / right -25: both sides reversing at different duties
        let frame = MotorCommandFrame::encode(MotorSpeeds {
            left: -15,
            right: -25,
        });
        assert_eq!(frame.as_bytes(), &[0x04, 0, 0, 0, 0, 15, 25, 0]);
    }

    #[test]
    fn test_duty_pairs_are_exclusive() {
        for speed in [-100, -37, -1, 0, 1, 37, 100] {
            let frame = MotorCommandFrame::encode(MotorSpeeds {
                left: speed,
                right: -speed,
            });
            let b = frame.as_bytes();
            assert!(
                b[4] == 0 || b[5] == 0,
                "left pair both nonzero for speed {}: {:02X?}",
                speed,
                b
            );
            assert!(
                b[6] == 0 || b[7] == 0,
                "right pair both nonzero for speed {}: {:02X?}",
                speed,
                b
            );
        }
    }

    #[test]
    fn test_out_of_range_speeds_clamp() {
        let frame = MotorCommandFrame::encode(MotorSpeeds {
            left: 1000,
            right: -1000,
        });
        assert_eq!(frame.as_bytes(), &[0x04, 0, 0, 0, 100, 0, 100, 0]);
    }

    #[test]
    fn test_reserved_bytes_stay_zero() {
        let frame = MotorCommandFrame::encode(MotorSpeeds {
            left: 100,
            right: -100,
        });
        assert_eq!(&frame.as_bytes()[1..4], &[0, 0, 0]);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let speeds = MotorSpeeds { left: 33, right: -7 };
        assert_eq!(
            MotorCommandFrame::encode(speeds),
            MotorCommandFrame::encode(speeds)
        );
    }

    #[test]
    fn test_duties_mirror_frame_bytes() {
        let frame = MotorCommandFrame::encode(MotorSpeeds { left: 12, right: -34 });
        assert_eq!(frame.duties(), [12, 0, 34, 0]);
    }
}
