//! Parameter definitions with physical units and documented semantics.
//!
//! Every tunable of the pipeline lives here with:
//! - Physical units (samples, Hz, milliseconds, ADC counts)
//! - Documented defaults matching the reference hardware
//! - A `validate()` that rejects configuration faults before startup

mod analysis;
mod controls;
mod render;
mod source;

use std::time::Duration;

use crate::error::Result;

// Re-export all types
pub use analysis::{AnalysisConfig, WindowFunction};
pub use controls::{ControlConfig, CONTROL_COUNT};
pub use render::RenderConfig;
pub use source::{AudioSource, SourceConfig};

/// Complete pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub analysis: AnalysisConfig,
    pub controls: ControlConfig,
    pub render: RenderConfig,
    pub source: SourceConfig,

    /// How long shutdown waits for each producer context to exit
    pub shutdown_grace: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            controls: ControlConfig::default(),
            render: RenderConfig::default(),
            source: SourceConfig::default(),
            shutdown_grace: Duration::from_millis(500),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.controls.validate()?;
        self.render.validate()?;
        self.source.validate()?;
        Ok(())
    }
}
