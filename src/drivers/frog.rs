//! Frog polarity relay driven from a PWM channel used as a digital output.
//!
//! The PWM channel is held fully on or fully off, which the PCA9685
//! produces as a clean DC level.  Exposed as `embedded_hal::digital::OutputPin`.

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::app::ports::PwmChannel;
use crate::error::OutputError;

pub struct PwmOutputPin {
    channel: PwmChannel,
}

impl PwmOutputPin {
    pub fn new(channel: PwmChannel) -> Self {
        Self { channel }
    }
}

impl ErrorType for PwmOutputPin {
    type Error = OutputError;
}

impl OutputPin for PwmOutputPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.channel.set_duty_cycle_fully_off()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.channel.set_duty_cycle_fully_on()
    }
}
