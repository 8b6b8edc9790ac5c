//! Render tick configuration.

use std::time::Duration;

use crate::error::{PipelineError, Result};

/// Render tick configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Tick rate (Hz), normally the display refresh rate
    pub frame_rate_hz: u32,

    /// Viewport width handed to the shader as `W` (pixels)
    pub viewport_width: u32,

    /// Viewport height handed to the shader as `H` (pixels)
    pub viewport_height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: 60,
            viewport_width: 1080,
            viewport_height: 1080, // Square viewport keeps cell shaders unstretched
        }
    }
}

impl RenderConfig {
    /// Time between render ticks
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate_hz.max(1)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_rate_hz == 0 {
            return Err(PipelineError::InvalidConfig(
                "frame rate must be > 0".to_string(),
            ));
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport_width, self.viewport_height
            )));
        }
        Ok(())
    }
}
