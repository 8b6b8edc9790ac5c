//! ADC bus seam.

use std::f32::consts::TAU;
use std::time::Instant;

use crate::error::Result;

/// One bus transaction per call: read the raw value of a physical channel.
///
/// Real bus drivers (SPI, I2C) implement this outside the crate. An error is
/// treated as a disconnected device and stops the poller.
pub trait AdcSource: Send {
    fn read_channel(&mut self, channel: u8) -> Result<u32>;
}

/// Stand-in ADC whose channels sweep slowly between 0 and full scale.
///
/// Each channel runs a sine at its own rate so the three controls move
/// independently, the way hands on real pots would.
#[derive(Debug, Clone)]
pub struct SimulatedAdc {
    full_scale: u32,
    start: Instant,
    /// Sweep period of channel 0 (seconds); channel n is slower by n * 0.37 s
    base_period_s: f32,
}

impl SimulatedAdc {
    pub fn new(full_scale: u32) -> Self {
        Self {
            full_scale,
            start: Instant::now(),
            base_period_s: 3.0,
        }
    }

    /// Raw value of `channel` at `t_s` seconds after start
    pub fn value_at(&self, channel: u8, t_s: f32) -> u32 {
        let period = self.base_period_s + f32::from(channel) * 0.37;
        let phase = TAU * t_s / period + f32::from(channel);
        let unit = 0.5 + 0.5 * phase.sin();
        (unit * self.full_scale as f32).round() as u32
    }
}

impl AdcSource for SimulatedAdc {
    fn read_channel(&mut self, channel: u8) -> Result<u32> {
        Ok(self.value_at(channel, self.start.elapsed().as_secs_f32()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_range() {
        let adc = SimulatedAdc::new(1024);
        for channel in 0..8 {
            for step in 0..200 {
                let raw = adc.value_at(channel, step as f32 * 0.05);
                assert!(raw <= 1024);
            }
        }
    }

    #[test]
    fn test_channels_differ() {
        let adc = SimulatedAdc::new(1024);
        assert_ne!(adc.value_at(4, 1.0), adc.value_at(5, 1.0));
    }
}
