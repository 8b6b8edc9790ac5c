//! Contract with the rendering backend: shader uniforms and per-frame draw.

use bytemuck::{Pod, Zeroable};
use tracing::{debug, info};

use crate::controls::Knob;
use crate::error::{PipelineError, Result};
use crate::params::RenderConfig;
use crate::sync::Snapshot;

/// Uniform names the visualization shaders read
pub const UNIFORM_NAMES: [&str; 6] = ["W", "H", "A", "B", "C", "fft"];

/// Scalar uniform block (viewport + controls)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ControlUniforms {
    pub width: f32,
    pub height: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub _padding: [f32; 3], // Padding for 16-byte alignment
}

impl ControlUniforms {
    /// Viewport comes from the caller, controls from the snapshot
    pub fn new(snapshot: &Snapshot, viewport: (u32, u32)) -> Self {
        let controls = snapshot.controls();
        Self {
            width: viewport.0 as f32,
            height: viewport.1 as f32,
            a: controls[Knob::A],
            b: controls[Knob::B],
            c: controls[Knob::C],
            _padding: [0.0; 3],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Consumer of snapshots: binds uniforms and issues the draw
pub trait RenderBackend {
    /// Uniforms the loaded shader program exposes
    fn uniform_names(&self) -> Vec<String>;

    /// Upload uniforms and the spectrum array, then draw one frame
    fn draw(&mut self, uniforms: &ControlUniforms, spectrum: &[f32]) -> Result<()>;
}

/// Fail startup if the backend cannot bind every uniform in `UNIFORM_NAMES`
pub fn check_bindings(backend: &dyn RenderBackend) -> Result<()> {
    let available = backend.uniform_names();
    for name in UNIFORM_NAMES {
        if !available.iter().any(|n| n == name) {
            return Err(PipelineError::MissingUniform(name.to_string()));
        }
    }
    Ok(())
}

/// Hand one snapshot to a backend
pub fn present(
    backend: &mut dyn RenderBackend,
    snapshot: &Snapshot,
    config: &RenderConfig,
) -> Result<()> {
    let uniforms = ControlUniforms::new(snapshot, (config.viewport_width, config.viewport_height));
    backend.draw(&uniforms, snapshot.spectrum())
}

/// Headless backend that logs what would be drawn
pub struct TraceBackend {
    frames: u64,
    /// Log at info level every this many frames
    summary_every: u64,
}

impl TraceBackend {
    pub fn new(summary_every: u64) -> Self {
        Self {
            frames: 0,
            summary_every: summary_every.max(1),
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderBackend for TraceBackend {
    fn uniform_names(&self) -> Vec<String> {
        UNIFORM_NAMES.iter().map(|n| n.to_string()).collect()
    }

    fn draw(&mut self, uniforms: &ControlUniforms, spectrum: &[f32]) -> Result<()> {
        let (peak_bin, peak) = spectrum
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0.0f32), |best, (i, v)| if v > best.1 { (i, v) } else { best });

        self.frames += 1;
        if self.frames % self.summary_every == 0 {
            info!(
                frame = self.frames,
                peak_bin,
                peak = %format!("{:.3}", peak),
                a = %format!("{:.3}", uniforms.a),
                b = %format!("{:.3}", uniforms.b),
                c = %format!("{:.3}", uniforms.c),
                "frame"
            );
        } else {
            debug!(frame = self.frames, peak_bin, peak, "frame");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PartialProgram;

    impl RenderBackend for PartialProgram {
        fn uniform_names(&self) -> Vec<String> {
            vec!["W".into(), "H".into(), "A".into(), "B".into(), "C".into()]
        }

        fn draw(&mut self, _: &ControlUniforms, _: &[f32]) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_missing_uniform_is_fatal() {
        let err = check_bindings(&PartialProgram).unwrap_err();
        assert!(matches!(err, PipelineError::MissingUniform(name) if name == "fft"));
    }

    #[test]
    fn test_trace_backend_binds_everything() {
        assert!(check_bindings(&TraceBackend::new(60)).is_ok());
    }

    #[test]
    fn test_uniform_block_layout() {
        assert_eq!(std::mem::size_of::<ControlUniforms>(), 32);

        let uniforms = ControlUniforms {
            width: 800.0,
            a: 0.5,
            ..Default::default()
        };
        let bytes = uniforms.as_bytes();
        assert_eq!(&bytes[0..4], &800.0f32.to_ne_bytes());
        assert_eq!(&bytes[8..12], &0.5f32.to_ne_bytes());
    }
}
