use std::ops::Range;

use crate::audio::decode::{AudioDecoder, DefaultDecoder};
use crate::audio::source::AudioSource;
use crate::config::AnalysisConfig;
use crate::dsp::filter::{AnalysisFilter, BandLimiter};
use crate::dsp::fusion::{frame_estimates, fuse};
use crate::dsp::note::map_note;
use crate::dsp::onset_window::select_window;
use crate::dsp::zero_crossing::zero_crossing_frequency;
use crate::error::Result;
use crate::types::{AudioData, FrameEstimate, FusedEstimate, Method, NoteResult};

/// Everything one estimation call produced, for callers that want more than
/// the note.
#[derive(Clone, Debug)]
pub struct Analysis {
    pub sample_rate: u32,
    /// Sample range of the source clip that was analysed.
    pub window: Range<usize>,
    pub frames: Vec<FrameEstimate>,
    pub fused: FusedEstimate,
    pub note: NoteResult,
}

/// Best-effort pitch of short foley clips.
///
/// Holds no per-call state; one estimator can serve any number of concurrent
/// calls.
pub struct PitchEstimator<D = DefaultDecoder, F = BandLimiter> {
    config: AnalysisConfig,
    decoder: D,
    filter: F,
}

impl PitchEstimator {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        let filter = BandLimiter::from_config(&config);
        PitchEstimator::with_parts(config, DefaultDecoder, filter)
    }
}

impl Default for PitchEstimator {
    fn default() -> Self {
        let config = AnalysisConfig::default();
        Self {
            filter: BandLimiter::from_config(&config),
            config,
            decoder: DefaultDecoder,
        }
    }
}

impl<D: AudioDecoder, F: AnalysisFilter> PitchEstimator<D, F> {
    /// Build with a custom decoder and analysis filter.
    pub fn with_parts(config: AnalysisConfig, decoder: D, filter: F) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            decoder,
            filter,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the full pipeline on decoded samples.
    pub fn analyze(&self, audio: &AudioData) -> Analysis {
        let sample_rate = audio.sample_rate;
        if audio.is_empty() || sample_rate == 0 {
            return Analysis {
                sample_rate,
                window: 0..0,
                frames: Vec::new(),
                fused: FusedEstimate::UNPITCHED,
                note: NoteResult::unpitched(),
            };
        }

        let window = select_window(&audio.samples, sample_rate, &self.config);
        let filtered = self.filter.apply(&audio.samples[window.clone()], sample_rate);
        let frames = frame_estimates(&filtered, sample_rate, &self.config);

        let median = fuse(&frames, &self.config);
        let fused = if median > 0.0 {
            FusedEstimate {
                frequency_hz: median,
                method: Method::AutocorrelationMedian,
            }
        } else {
            let zc = zero_crossing_frequency(
                &filtered,
                sample_rate,
                self.config.valid_min_hz,
                self.config.valid_max_hz,
            );
            if zc > 0.0 {
                log::debug!("autocorrelation failed, zero-crossing fallback {:.2} Hz", zc);
                FusedEstimate {
                    frequency_hz: zc,
                    method: Method::ZeroCrossing,
                }
            } else {
                FusedEstimate::UNPITCHED
            }
        };

        let note = map_note(fused, &self.config);
        log::debug!(
            "estimate: {:.2} Hz, {} ({})",
            note.frequency_hz,
            note.note_name.as_deref().unwrap_or("-"),
            note.method
        );

        Analysis {
            sample_rate,
            window,
            frames,
            fused,
            note,
        }
    }

    pub fn estimate_samples(&self, audio: &AudioData) -> NoteResult {
        self.analyze(audio).note
    }

    /// Decode `bytes` and analyse them. Only decoding can fail.
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<Analysis> {
        let audio = self.decoder.decode(bytes)?;
        Ok(self.analyze(&audio))
    }

    pub fn estimate_bytes(&self, bytes: &[u8]) -> Result<NoteResult> {
        Ok(self.analyze_bytes(bytes)?.note)
    }

    /// Load, decode and analyse a clip from any [`AudioSource`].
    pub async fn analyze_source(&self, source: &AudioSource, client: &reqwest::Client) -> Result<Analysis> {
        let bytes = source.load(client).await?;
        self.analyze_bytes(&bytes)
    }

    pub async fn estimate_source(&self, source: &AudioSource, client: &reqwest::Client) -> Result<NoteResult> {
        Ok(self.analyze_source(source, client).await?.note)
    }
}
