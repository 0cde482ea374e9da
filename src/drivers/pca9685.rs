//! PCA9685 16-channel, 12-bit PWM controller over I²C.
//!
//! One [`Pca9685`] exists per `(bus, address)` pair; every output that
//! names that address gets a [`Pca9685Channel`] sharing it.  Channels
//! implement `embedded_hal::pwm::SetDutyCycle`, so servo and frog code is
//! unaware of the chip.
//!
//! ## Register map (subset)
//!
//! | Register     | Addr | Use                                   |
//! |--------------|------|---------------------------------------|
//! | MODE1        | 0x00 | sleep / auto-increment                |
//! | MODE2        | 0x01 | totem-pole outputs                    |
//! | LEDn_ON_L..  | 0x06 + 4n | on/off counts, bit 4 of *_H = full |
//! | PRE_SCALE    | 0xFE | output frequency (only while asleep)  |

use std::sync::{Arc, PoisonError};

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use log::debug;

use crate::app::ports::SharedBus;
use crate::error::OutputError;

const MODE1: u8 = 0x00;
const MODE2: u8 = 0x01;
const LED0_ON_L: u8 = 0x06;
const PRE_SCALE: u8 = 0xFE;

const MODE1_SLEEP: u8 = 0x10;
const MODE1_AI: u8 = 0x20;
const MODE2_OUTDRV: u8 = 0x04;

/// Full-on / full-off flag in the high byte of an ON or OFF count.
const FULL: u16 = 0x1000;

/// Internal oscillator frequency.
const OSC_HZ: u32 = 25_000_000;

/// Hobby servos expect a 50 Hz frame.
pub const PWM_FREQ_HZ: u32 = 50;

pub const CHANNELS: u8 = 16;

/// Largest duty count (12-bit).
pub const MAX_DUTY: u16 = 4095;

/// Prescaler value for `freq_hz`: round(osc / (4096 * freq)) - 1.
pub const fn prescale(freq_hz: u32) -> u8 {
    let steps = 4096 * freq_hz;
    ((OSC_HZ + steps / 2) / steps - 1) as u8
}

pub struct Pca9685 {
    bus: SharedBus,
    address: u8,
}

impl Pca9685 {
    /// Configure the controller for 50 Hz output and leave it awake.
    pub fn init(bus: SharedBus, address: u8) -> Result<Self, OutputError> {
        let dev = Self { bus, address };
        dev.write(&[MODE1, MODE1_SLEEP])?;
        dev.write(&[PRE_SCALE, prescale(PWM_FREQ_HZ)])?;
        dev.write(&[MODE1, MODE1_AI])?;
        dev.write(&[MODE2, MODE2_OUTDRV])?;
        debug!("PCA9685@0x{:02x}: initialised at {} Hz", address, PWM_FREQ_HZ);
        Ok(dev)
    }

    /// Hand out a channel handle sharing this controller.
    pub fn channel(self: &Arc<Self>, channel: u8) -> Result<Pca9685Channel, OutputError> {
        if channel >= CHANNELS {
            return Err(OutputError::ChannelOutOfRange(channel));
        }
        Ok(Pca9685Channel {
            device: Arc::clone(self),
            channel,
        })
    }

    /// Write a 12-bit duty count.  0 and [`MAX_DUTY`] use the full-off
    /// and full-on flags so the output is a clean DC level.
    pub fn set_duty(&self, channel: u8, duty: u16) -> Result<(), OutputError> {
        if channel >= CHANNELS {
            return Err(OutputError::ChannelOutOfRange(channel));
        }
        let (on, off) = match duty {
            0 => (0, FULL),
            d if d >= MAX_DUTY => (FULL, 0),
            d => (0, d),
        };
        let [on_l, on_h] = on.to_le_bytes();
        let [off_l, off_h] = off.to_le_bytes();
        self.write(&[LED0_ON_L + 4 * channel, on_l, on_h, off_l, off_h])
    }

    fn write(&self, bytes: &[u8]) -> Result<(), OutputError> {
        let mut bus = self.bus.lock().unwrap_or_else(PoisonError::into_inner);
        bus.write(self.address, bytes)
    }
}

/// One PWM output of a shared [`Pca9685`].
pub struct Pca9685Channel {
    device: Arc<Pca9685>,
    channel: u8,
}

impl ErrorType for Pca9685Channel {
    type Error = OutputError;
}

impl SetDutyCycle for Pca9685Channel {
    fn max_duty_cycle(&self) -> u16 {
        MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.device.set_duty(self.channel, duty)
    }
}
