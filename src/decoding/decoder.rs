use crate::error::{MelodyError, Result};
use log::{debug, trace, warn};
use std::fs::File;
use std::io;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Mono PCM of a whole file
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: usize,
}

impl DecodedAudio {
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decode every packet of the first audio track and average the channels to mono.
///
/// Corrupt packets are skipped; the stream ends at EOF.
pub fn decode_to_mono(file_path: &Path) -> Result<DecodedAudio> {
    debug!("Decoding {:?}", file_path);

    let file = File::open(file_path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = file_path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(MelodyError::NoAudioTrack)?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(0);

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut mono: Vec<f32> = Vec::new();
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => {
                warn!("Stream reset requested in {:?}, stopping", file_path);
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                trace!("Skipping corrupt packet in {:?}: {}", file_path, e);
                skipped_packets += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        let frames = decoded.capacity();
        sample_rate = spec.rate;
        channels = spec.channels.count();

        let buf = sample_buf.get_or_insert_with(|| SampleBuffer::<f32>::new(frames as u64, spec));
        if buf.capacity() < frames * channels {
            *buf = SampleBuffer::<f32>::new(frames as u64, spec);
        }
        buf.copy_interleaved_ref(decoded);

        mix_to_mono(buf.samples(), channels, &mut mono);
    }

    if skipped_packets > 0 {
        warn!(
            "Skipped {} corrupt packets while decoding {:?}",
            skipped_packets, file_path
        );
    }

    if sample_rate == 0 {
        return Err(MelodyError::NoAudioTrack);
    }

    let audio = DecodedAudio {
        samples: mono,
        sample_rate,
        channels,
    };
    debug!(
        "Decoded {:?}: {:.2}s at {} Hz, {} channel(s)",
        file_path,
        audio.duration_seconds(),
        audio.sample_rate,
        audio.channels
    );

    Ok(audio)
}

/// Average interleaved frames into `out`
pub fn mix_to_mono(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }

    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}
