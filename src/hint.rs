use foley_pitch_core::NoteResult;
use serde::Serialize;

/// Seconds of music requested from the generation service.
pub const DEFAULT_CLIP_SECS: u32 = 10;
/// The service rejects anything longer.
pub const MAX_CLIP_SECS: u32 = 30;

/// Request body the app sends to the music-generation service: the detected
/// note as a text hint, a mood tag and the original (unfiltered) clip.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationHint {
    pub mood: String,
    pub note_text: String,
    pub sample_url: String,
    pub duration: u32,
}

impl GenerationHint {
    pub fn new(mood: &str, note: &NoteResult, sample_url: &str) -> Self {
        Self {
            mood: mood.to_string(),
            note_text: note_text(note),
            sample_url: sample_url.to_string(),
            duration: DEFAULT_CLIP_SECS,
        }
    }

    /// Requested length, clamped to 1..=30 seconds.
    pub fn with_duration(mut self, secs: u32) -> Self {
        self.duration = secs.clamp(1, MAX_CLIP_SECS);
        self
    }
}

/// Empty for unpitched clips so the prompt carries no misleading note.
pub fn note_text(note: &NoteResult) -> String {
    match &note.note_name {
        Some(name) if note.is_pitched() => format!("{} ({:.1} Hz)", name, note.frequency_hz),
        _ => String::new(),
    }
}
