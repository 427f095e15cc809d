use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{Error, Result};
use crate::types::{downmix, AudioData};

/// Turns an encoded audio resource into mono samples.
pub trait AudioDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioData>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
    Wav,
    Flac,
    Ogg,
    Other,
}

/// Identify the container from its leading magic bytes.
pub fn sniff_container(bytes: &[u8]) -> Container {
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
        Container::Wav
    } else if bytes.starts_with(b"fLaC") {
        Container::Flac
    } else if bytes.starts_with(b"OggS") {
        Container::Ogg
    } else {
        Container::Other
    }
}

/// WAV through hound, FLAC through claxon, Ogg Vorbis through lewton, and
/// everything else (MP3, MP4/AAC, ALAC) through symphonia's probe.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultDecoder;

impl AudioDecoder for DefaultDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioData> {
        if bytes.is_empty() {
            return Err(Error::EmptyAudio);
        }

        let container = sniff_container(bytes);
        let audio = match container {
            Container::Wav => decode_wav(bytes)?,
            Container::Flac => decode_flac(bytes)?,
            Container::Ogg => match decode_vorbis(bytes) {
                Ok(audio) => audio,
                Err(e) => {
                    log::debug!("lewton could not read Ogg stream ({e}), trying symphonia");
                    decode_symphonia(bytes)?
                }
            },
            Container::Other => decode_symphonia(bytes)?,
        };

        if audio.sample_rate == 0 {
            return Err(Error::Decode("missing sample rate".into()));
        }
        if audio.is_empty() {
            return Err(Error::EmptyAudio);
        }

        log::info!(
            "decoded {:?}: {} samples, {} ch -> mono, {} Hz ({:.2}s)",
            container,
            audio.samples.len(),
            audio.channels,
            audio.sample_rate,
            audio.duration_secs
        );
        Ok(audio)
    }
}

fn decode_wav(bytes: &[u8]) -> Result<AudioData> {
    let reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| Error::Decode(format!("WAV open error: {e}")))?;
    let spec = reader.spec();

    let interleaved = match spec.sample_format {
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(Error::UnsupportedFormat(format!(
                    "{}-bit integer WAV",
                    spec.bits_per_sample
                )));
            }
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| Error::Decode(format!("WAV sample error: {e}")))?
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| Error::Decode(format!("WAV sample error: {e}")))?,
    };

    Ok(AudioData::from_interleaved(&interleaved, spec.channels as u32, spec.sample_rate))
}

fn decode_flac(bytes: &[u8]) -> Result<AudioData> {
    let mut reader = claxon::FlacReader::new(Cursor::new(bytes))
        .map_err(|e| Error::Decode(format!("FLAC open error: {e}")))?;
    let info = reader.streaminfo();
    if info.bits_per_sample == 0 || info.bits_per_sample > 32 {
        return Err(Error::UnsupportedFormat(format!(
            "{}-bit FLAC",
            info.bits_per_sample
        )));
    }
    let scale = 1.0 / (1u64 << (info.bits_per_sample - 1)) as f32;

    let interleaved = reader
        .samples()
        .map(|s| s.map(|v| v as f32 * scale))
        .collect::<std::result::Result<Vec<f32>, _>>()
        .map_err(|e| Error::Decode(format!("FLAC sample error: {e}")))?;

    Ok(AudioData::from_interleaved(&interleaved, info.channels, info.sample_rate))
}

fn decode_vorbis(bytes: &[u8]) -> Result<AudioData> {
    let mut reader = lewton::inside_ogg::OggStreamReader::new(Cursor::new(bytes))
        .map_err(|e| Error::Decode(format!("Ogg open error: {e}")))?;
    let sample_rate = reader.ident_hdr.audio_sample_rate;
    let channels = reader.ident_hdr.audio_channels as u32;

    let mut interleaved = Vec::new();
    while let Some(packet) = reader
        .read_dec_packet_itl()
        .map_err(|e| Error::Decode(format!("Vorbis packet error: {e}")))?
    {
        interleaved.extend(packet.iter().map(|&s| s as f32 / 32768.0));
    }

    Ok(AudioData::from_interleaved(&interleaved, channels, sample_rate))
}

fn decode_symphonia(bytes: &[u8]) -> Result<AudioData> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::UnsupportedFormat(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Decode("no decodable audio track".into()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u32)
        .unwrap_or(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => {
                return Err(Error::Decode(
                    "decoder requires a reset (unsupported midstream change)".into(),
                ))
            }
            Err(e) => return Err(Error::Decode(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                channels = spec.channels.count() as u32;
                sample_rate = spec.rate;
                samples.extend(downmix(buf.samples(), channels as usize));
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                log::warn!("skipping corrupt packet: {msg}");
            }
            Err(e) => return Err(Error::Decode(e.to_string())),
        }
    }

    // Packets were downmixed as they arrived.
    let mut audio = AudioData::new(samples, sample_rate);
    audio.channels = channels.max(1);
    Ok(audio)
}
