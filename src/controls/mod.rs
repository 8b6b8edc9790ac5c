//! Analog control channel: latest normalized reading per potentiometer.

mod adc;
mod poller;

use std::ops::Index;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

pub use adc::{AdcSource, SimulatedAdc};
pub use poller::spawn_poller;

use crate::error::Result;
use crate::params::{ControlConfig, CONTROL_COUNT};

/// Receives raw ADC readings from the hardware-control producer
pub trait ChannelReadingSink: Send + Sync {
    fn on_channel_reading(&self, channel: u8, raw: u32);
}

/// Logical controls, bound to shader uniforms `A`, `B` and `C`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Knob {
    A = 0,
    B = 1,
    C = 2,
}

impl Knob {
    pub const ALL: [Knob; CONTROL_COUNT] = [Knob::A, Knob::B, Knob::C];
}

/// Normalized control values in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlState(pub [f32; CONTROL_COUNT]);

impl Index<Knob> for ControlState {
    type Output = f32;

    fn index(&self, knob: Knob) -> &f32 {
        &self.0[knob as usize]
    }
}

/// Latest value per control, each stored in its own atomic.
///
/// Readings are independent: a reader may see a new A with an old B. The
/// physical pots vary independently, so no cross-channel consistency is kept.
#[derive(Debug)]
pub struct ControlChannel {
    values: [AtomicU32; CONTROL_COUNT],
    channel_map: [u8; CONTROL_COUNT],
    full_scale: f32,
    updates: AtomicU64,
}

impl ControlChannel {
    pub fn new(config: &ControlConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            values: config.initial_values.map(|v| AtomicU32::new(v.to_bits())),
            channel_map: config.channel_map,
            full_scale: config.full_scale as f32,
            updates: AtomicU64::new(0),
        })
    }

    /// Store a raw reading for a physical channel.
    ///
    /// Readings at or above full scale clamp to 1.0. Channels not mapped to a
    /// control are ignored.
    pub fn update(&self, channel: u8, raw: u32) {
        let Some(slot) = self.channel_map.iter().position(|&c| c == channel) else {
            return;
        };
        let value = (raw as f32 / self.full_scale).min(1.0);
        self.values[slot].store(value.to_bits(), Ordering::Relaxed);
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn current_values(&self) -> ControlState {
        ControlState(std::array::from_fn(|i| {
            f32::from_bits(self.values[i].load(Ordering::Relaxed))
        }))
    }

    pub fn value(&self, knob: Knob) -> f32 {
        f32::from_bits(self.values[knob as usize].load(Ordering::Relaxed))
    }

    /// Accepted readings since startup
    pub fn update_count(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }
}

impl ChannelReadingSink for ControlChannel {
    fn on_channel_reading(&self, channel: u8, raw: u32) {
        self.update(channel, raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn channel() -> ControlChannel {
        ControlChannel::new(&ControlConfig::default()).unwrap()
    }

    #[test]
    fn test_initial_values() {
        let controls = channel();
        assert_eq!(controls.current_values(), ControlState([0.9, 0.7, 0.6]));
        assert_eq!(controls.update_count(), 0);
    }

    #[test]
    fn test_boundaries() {
        let controls = channel();

        controls.update(4, 0);
        controls.update(5, 1024);
        controls.update(6, 512);

        let state = controls.current_values();
        assert_eq!(state[Knob::A], 0.0);
        assert_eq!(state[Knob::B], 1.0);
        assert_eq!(state[Knob::C], 0.5);
    }

    #[test]
    fn test_over_range_clamps() {
        let controls = channel();
        controls.update(4, 5000);
        assert_eq!(controls.value(Knob::A), 1.0);
    }

    #[test]
    fn test_unmapped_channels_ignored() {
        let controls = channel();
        let before = controls.current_values();

        for ch in [0, 1, 2, 3, 7, 200] {
            controls.update(ch, 100);
        }

        assert_eq!(controls.current_values(), before);
        assert_eq!(controls.update_count(), 0);
    }

    #[test]
    fn test_configurable_full_scale() {
        let config = ControlConfig {
            full_scale: 4096,
            channel_map: [0, 1, 2],
            ..Default::default()
        };
        let controls = ControlChannel::new(&config).unwrap();
        controls.update(1, 1024);
        assert_eq!(controls.value(Knob::B), 0.25);
    }

    proptest! {
        #[test]
        fn prop_monotonic_in_raw(a in 0u32..2048, b in 0u32..2048) {
            let controls = channel();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

            controls.update(4, lo);
            let lo_value = controls.value(Knob::A);
            controls.update(4, hi);
            let hi_value = controls.value(Knob::A);

            prop_assert!(lo_value <= hi_value);
            prop_assert!((0.0..=1.0).contains(&lo_value));
            prop_assert!((0.0..=1.0).contains(&hi_value));
        }
    }
}
