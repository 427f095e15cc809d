//! Best-effort pitch estimation for short foley clips: barks, crunches,
//! footsteps and other percussive, often inharmonic sounds.
//!
//! The pipeline skips the attack transient, band-limits a copy of the
//! resonant tail, autocorrelates short frames, fuses the reliable frames by
//! median, falls back to the zero-crossing rate, and folds the result onto a
//! fixed keyboard range.
//!
//! ```no_run
//! use foley_pitch_core::{AnalysisConfig, AudioData, PitchEstimator};
//!
//! let estimator = PitchEstimator::new(AnalysisConfig::default()).unwrap();
//! let samples: Vec<f32> = (0..44100)
//!     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
//!     .collect();
//! let note = estimator.estimate_samples(&AudioData::new(samples, 44100));
//! assert_eq!(note.note_name.as_deref(), Some("A4"));
//! ```

pub mod audio;
pub mod config;
pub mod dsp;
pub mod error;
pub mod estimator;
pub mod types;

#[cfg(test)]
pub(crate) mod test_signals;

pub use audio::decode::{AudioDecoder, DefaultDecoder};
pub use audio::source::AudioSource;
pub use config::AnalysisConfig;
pub use dsp::filter::{AnalysisFilter, BandLimiter};
pub use error::{Error, Result};
pub use estimator::{Analysis, PitchEstimator};
pub use types::{AudioData, FrameEstimate, FusedEstimate, Method, NoteResult};
