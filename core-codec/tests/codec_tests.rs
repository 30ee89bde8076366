//! Integration tests for the codec adapter: container round trips, downmix
//! behavior, and the trait-object seam used by the engine.

use bytes::Bytes;
use core_codec::{AudioSignal, SignalCodec, SymphoniaDecoder, WavEncoder, WavPcmCodec};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

/// Build an in-memory 16-bit PCM WAV container from interleaved samples.
fn write_wav(sample_rate: u32, channels: u16, interleaved: &[f32]) -> Bytes {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
    for &sample in interleaved {
        writer
            .write_sample((sample.clamp(-1.0, 1.0) * 32767.0) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();

    Bytes::from(cursor.into_inner())
}

#[test]
fn test_wav_roundtrip_preserves_rate_and_length() {
    let samples: Vec<f32> = (0..2048)
        .map(|i| (i as f32 * 0.01).sin() * 0.8)
        .collect();
    let signal = AudioSignal::new(16_000, samples.clone()).unwrap();

    let bytes = WavEncoder::encode(&signal).unwrap();
    let decoded = SymphoniaDecoder::decode(bytes).unwrap();

    assert_eq!(decoded.sample_rate(), 16_000);
    assert_eq!(decoded.len(), signal.len());

    // 16-bit quantization bounds the per-sample error.
    for (original, roundtripped) in samples.iter().zip(decoded.samples()) {
        assert!(
            (original - roundtripped).abs() < 2.0 / 32768.0,
            "sample diverged beyond quantization error: {} vs {}",
            original,
            roundtripped
        );
    }
}

#[test]
fn test_stereo_input_downmixes_by_averaging() {
    // Left channel at +0.5, right at -0.1: the mono average is 0.2.
    let mut interleaved = Vec::new();
    for _ in 0..512 {
        interleaved.push(0.5);
        interleaved.push(-0.1);
    }

    let bytes = write_wav(44_100, 2, &interleaved);
    let decoded = SymphoniaDecoder::decode(bytes).unwrap();

    assert_eq!(decoded.len(), 512);
    for &sample in decoded.samples() {
        assert!(
            (sample - 0.2).abs() < 2.0 / 32768.0,
            "downmixed sample was {}",
            sample
        );
    }
}

#[test]
fn test_mono_input_passes_through() {
    let interleaved: Vec<f32> = (0..256).map(|i| ((i % 32) as f32 / 32.0) - 0.5).collect();
    let bytes = write_wav(8_000, 1, &interleaved);

    let decoded = SymphoniaDecoder::decode(bytes).unwrap();

    assert_eq!(decoded.sample_rate(), 8_000);
    assert_eq!(decoded.len(), 256);
}

#[test]
fn test_decoded_samples_stay_in_range() {
    let interleaved: Vec<f32> = (0..1024).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
    let bytes = write_wav(22_050, 1, &interleaved);

    let decoded = SymphoniaDecoder::decode(bytes).unwrap();

    assert!(decoded
        .samples()
        .iter()
        .all(|&s| (-1.0..=1.0).contains(&s)));
}

#[tokio::test]
async fn test_signal_codec_trait_roundtrip() {
    let codec = WavPcmCodec::new();
    let signal = AudioSignal::new(16_000, vec![0.1; 400]).unwrap();

    let bytes = codec.encode(&signal).await.unwrap();
    let decoded = codec.decode(bytes).await.unwrap();

    assert_eq!(decoded.sample_rate(), signal.sample_rate());
    assert_eq!(decoded.len(), signal.len());
}

#[tokio::test]
async fn test_signal_codec_rejects_malformed_bytes() {
    let codec = WavPcmCodec::new();
    let result = codec.decode(Bytes::from_static(&[0u8; 64])).await;

    assert!(result.is_err());
}
