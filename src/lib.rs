//! BZZZBZ library - audio-reactive shader visuals
//!
//! Three execution contexts share state here: the audio producer publishes
//! sample blocks, the control poller publishes knob readings, and the render
//! tick combines the latest of both into a `Snapshot` for the shader.

pub mod audio;
pub mod cli;
pub mod controls;
pub mod error;
pub mod logging;
pub mod params;
pub mod pipeline;
pub mod producer;
pub mod rendering;
pub mod sync;

pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, ShutdownReport};
pub use sync::{FrameSynchronizer, Snapshot};
