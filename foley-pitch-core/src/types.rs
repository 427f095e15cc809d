use serde::{Deserialize, Serialize};
use std::fmt;

/// Decoded mono audio, owned by a single analysis call.
#[derive(Clone, Debug)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Channel count of the source before downmixing.
    pub channels: u32,
    pub duration_secs: f64,
}

impl AudioData {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration_secs = if sample_rate > 0 {
            samples.len() as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            samples,
            sample_rate,
            channels: 1,
            duration_secs,
        }
    }

    /// Average interleaved multi-channel samples down to mono.
    pub fn from_interleaved(interleaved: &[f32], channels: u32, sample_rate: u32) -> Self {
        let mut data = Self::new(downmix(interleaved, channels as usize), sample_rate);
        data.channels = channels.max(1);
        data
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

pub(crate) fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    let scale = 1.0 / channels as f32;
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect()
}

/// Periodicity estimate for one analysis frame. `(0, 0)` means no pitch found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameEstimate {
    pub frequency_hz: f32,
    pub confidence: f32,
}

impl FrameEstimate {
    pub const NONE: FrameEstimate = FrameEstimate {
        frequency_hz: 0.0,
        confidence: 0.0,
    };

    pub fn is_pitched(&self) -> bool {
        self.frequency_hz > 0.0 && self.confidence > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "autocorrelation-median")]
    AutocorrelationMedian,
    #[serde(rename = "zero-crossing")]
    ZeroCrossing,
    #[serde(rename = "unpitched")]
    Unpitched,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::AutocorrelationMedian => "autocorrelation-median",
            Method::ZeroCrossing => "zero-crossing",
            Method::Unpitched => "unpitched",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All frame estimates of a clip combined into one frequency.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FusedEstimate {
    pub frequency_hz: f32,
    pub method: Method,
}

impl FusedEstimate {
    pub const UNPITCHED: FusedEstimate = FusedEstimate {
        frequency_hz: 0.0,
        method: Method::Unpitched,
    };
}

/// Final output of an estimation call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResult {
    pub frequency_hz: f32,
    pub midi_number: Option<i32>,
    pub note_name: Option<String>,
    pub method: Method,
}

impl NoteResult {
    pub fn unpitched() -> Self {
        Self {
            frequency_hz: 0.0,
            midi_number: None,
            note_name: None,
            method: Method::Unpitched,
        }
    }

    pub fn is_pitched(&self) -> bool {
        self.method != Method::Unpitched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_averages_channels() {
        let data = AudioData::from_interleaved(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2, 8000);
        assert_eq!(data.samples, vec![0.5, 0.5, 0.0]);
        assert_eq!(data.channels, 2);
    }

    #[test]
    fn test_duration() {
        let data = AudioData::new(vec![0.0; 22050], 44100);
        assert!((data.duration_secs - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_note_result_json_shape() {
        let json = serde_json::to_value(NoteResult::unpitched()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "frequencyHz": 0.0,
                "midiNumber": null,
                "noteName": null,
                "method": "unpitched"
            })
        );
    }

    #[test]
    fn test_method_strings() {
        assert_eq!(Method::AutocorrelationMedian.to_string(), "autocorrelation-median");
        assert_eq!(
            serde_json::to_string(&Method::ZeroCrossing).unwrap(),
            "\"zero-crossing\""
        );
    }
}
