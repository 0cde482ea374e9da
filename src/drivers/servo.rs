//! Hobby servo on a PWM channel.
//!
//! 50 Hz frame, pulse width linear in angle: 1.0 ms at 0°, 2.0 ms at 180°.
//! The duty count is derived from the channel's own `max_duty_cycle`, so
//! any `SetDutyCycle` implementation running at 50 Hz works.

use crate::app::ports::PwmChannel;
use crate::config::MAX_ANGLE_DEG;
use crate::error::OutputError;

const FRAME_US: f32 = 20_000.0;
const MIN_PULSE_US: f32 = 1_000.0;
const MAX_PULSE_US: f32 = 2_000.0;

pub struct Servo {
    channel: PwmChannel,
}

impl Servo {
    pub fn new(channel: PwmChannel) -> Self {
        Self { channel }
    }

    /// Duty count for `angle` (clamped to 0–180°).
    pub fn duty_for(&self, angle: f32) -> u16 {
        let angle = angle.clamp(0.0, MAX_ANGLE_DEG);
        let pulse_us = MIN_PULSE_US + (MAX_PULSE_US - MIN_PULSE_US) * angle / MAX_ANGLE_DEG;
        let max = f32::from(self.channel.max_duty_cycle());
        (pulse_us / FRAME_US * max).round() as u16
    }

    pub fn set_angle(&mut self, angle: f32) -> Result<(), OutputError> {
        let duty = self.duty_for(angle);
        self.channel.set_duty_cycle(duty)
    }
}
