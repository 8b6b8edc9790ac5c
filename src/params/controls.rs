//! Analog control (potentiometer) configuration.

use std::ops::Range;
use std::time::Duration;

use crate::error::{PipelineError, Result};

/// Number of logical controls exposed to the shader (A, B, C)
pub const CONTROL_COUNT: usize = 3;

/// Analog control channel configuration
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// Full-scale divisor for raw ADC readings.
    /// 10-bit MCP3008 on the reference board: 1024
    pub full_scale: u32,

    /// Physical ADC channel feeding each logical control [A, B, C].
    /// Pots are wired to channels 4, 5 and 6 on the reference board
    pub channel_map: [u8; CONTROL_COUNT],

    /// Values reported before the first reading arrives
    pub initial_values: [f32; CONTROL_COUNT],

    /// Physical channels the poller scans each sweep.
    /// The whole 8-channel ADC is scanned; unmapped channels are ignored
    pub scan_channels: Range<u8>,

    /// Pause between sweeps of the bus
    pub poll_interval: Duration,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            full_scale: 1024,
            channel_map: [4, 5, 6],
            initial_values: [0.9, 0.7, 0.6],
            scan_channels: 0..8,
            poll_interval: Duration::from_millis(2),
        }
    }
}

impl ControlConfig {
    pub fn validate(&self) -> Result<()> {
        if self.full_scale == 0 {
            return Err(PipelineError::InvalidConfig(
                "control full scale must be > 0".to_string(),
            ));
        }

        for (i, channel) in self.channel_map.iter().enumerate() {
            if self.channel_map[..i].contains(channel) {
                return Err(PipelineError::InvalidConfig(format!(
                    "physical channel {} mapped to more than one control",
                    channel
                )));
            }
        }

        if let Some(value) = self
            .initial_values
            .iter()
            .find(|v| !(0.0..=1.0).contains(*v))
        {
            return Err(PipelineError::InvalidConfig(format!(
                "initial control value {} outside [0, 1]",
                value
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ControlConfig::default().validate().is_ok());

        let zero_scale = ControlConfig {
            full_scale: 0,
            ..Default::default()
        };
        assert!(zero_scale.validate().is_err());

        let duplicate = ControlConfig {
            channel_map: [4, 4, 6],
            ..Default::default()
        };
        assert!(duplicate.validate().is_err());

        let out_of_range = ControlConfig {
            initial_values: [0.5, 1.5, 0.0],
            ..Default::default()
        };
        assert!(out_of_range.validate().is_err());
    }
}
