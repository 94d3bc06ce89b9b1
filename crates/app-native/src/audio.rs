//! cpal-backed synthesizer implementing the core `AudioSink`.
//!
//! Each pressed key spawns a note in a shared mixer drained by the output
//! stream callback. The organ voice sustains until its channel is faded out;
//! the piano voice decays on its own like a struck string.

use std::f32::consts::TAU;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use app_core::{AudioSink, ChannelId, Key, Voice};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

const NOTE_AMPLITUDE: f32 = 0.35;
const ATTACK_SEC: f32 = 0.005;
/// Piano notes below this envelope are dropped from the mixer.
const PIANO_CUTOFF_SEC: f32 = 8.0;

struct ActiveNote {
    channel: ChannelId,
    voice: Voice,
    phase: f32,
    phase_inc: f32,
    age: u32,
    /// `(remaining, total)` samples once the note is fading out.
    release: Option<(u32, u32)>,
}

struct MixerState {
    sample_rate: f32,
    notes: Vec<ActiveNote>,
}

/// Handle the keyboard controller plays notes through. Clonable commands go
/// through the shared mixer; the stream callback does the synthesis.
pub struct SynthSink {
    shared: Arc<Mutex<MixerState>>,
    next_channel: u64,
}

impl AudioSink for SynthSink {
    fn play(&mut self, voice: Voice, key: &Key) -> Option<ChannelId> {
        let mut mixer = self.shared.lock().ok()?;
        let channel = ChannelId(self.next_channel);
        self.next_channel += 1;
        let phase_inc = TAU * key.frequency_hz() / mixer.sample_rate;
        mixer.notes.push(ActiveNote {
            channel,
            voice,
            phase: 0.0,
            phase_inc,
            age: 0,
            release: None,
        });
        log::debug!(
            "note on: {}/{} ({:.1} Hz)",
            voice.asset_folder(),
            key.name(),
            key.frequency_hz()
        );
        Some(channel)
    }

    fn fade_out(&mut self, channel: ChannelId, duration: Duration) {
        let Ok(mut mixer) = self.shared.lock() else {
            return;
        };
        let total = ((duration.as_secs_f32() * mixer.sample_rate) as u32).max(1);
        for note in mixer.notes.iter_mut() {
            if note.channel == channel && note.release.is_none() {
                note.release = Some((total, total));
            }
        }
    }
}

/// Opens the default output device and starts the mixer stream. `None` if no
/// usable device exists; the caller falls back to silent playback.
pub fn start() -> Option<(SynthSink, cpal::Stream)> {
    let host = cpal::default_host();
    let device = host.default_output_device()?;
    let config = device.default_output_config().ok()?;
    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let shared = Arc::new(Mutex::new(MixerState {
        sample_rate,
        notes: Vec::new(),
    }));

    let err_fn = |err| log::error!("audio stream error: {err}");

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => {
            build_stream_f32(&device, &config.into(), channels, Arc::clone(&shared), err_fn).ok()?
        }
        cpal::SampleFormat::I16 => {
            build_stream_i16(&device, &config.into(), channels, Arc::clone(&shared), err_fn).ok()?
        }
        cpal::SampleFormat::U16 => {
            build_stream_u16(&device, &config.into(), channels, Arc::clone(&shared), err_fn).ok()?
        }
        _ => return None,
    };
    stream.play().ok()?;

    Some((
        SynthSink {
            shared,
            next_channel: 0,
        },
        stream,
    ))
}

fn voice_sample(voice: Voice, phase: f32, t: f32) -> f32 {
    match voice {
        // Drawbar-ish stack of partials, steady until released.
        Voice::Organ => {
            (phase.sin() + 0.5 * (2.0 * phase).sin() + 0.25 * (4.0 * phase).sin()) / 1.75
        }
        // Struck tone with a natural exponential decay.
        Voice::Piano => {
            let decay = (-2.5 * t).exp();
            (phase.sin() + 0.4 * (2.0 * phase).sin() + 0.2 * (3.0 * phase).sin()) / 1.6 * decay
        }
    }
}

fn mix_sample(notes: &mut Vec<ActiveNote>, sample_rate: f32) -> f32 {
    let mut sum = 0.0_f32;
    let mut i = 0;
    while i < notes.len() {
        let note = &mut notes[i];
        let t = note.age as f32 / sample_rate;
        let mut env = (t / ATTACK_SEC).min(1.0);

        let mut finished = false;
        if let Some((remaining, total)) = &mut note.release {
            env *= *remaining as f32 / *total as f32;
            if *remaining == 0 {
                finished = true;
            } else {
                *remaining -= 1;
            }
        }

        sum += voice_sample(note.voice, note.phase, t) * NOTE_AMPLITUDE * env;
        note.phase += note.phase_inc;
        if note.phase > TAU {
            note.phase -= TAU;
        }
        note.age += 1;

        let decayed = note.voice == Voice::Piano && t > PIANO_CUTOFF_SEC;
        if finished || decayed {
            notes.swap_remove(i);
            continue;
        }
        i += 1;
    }
    sum.tanh()
}

fn build_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    shared: Arc<Mutex<MixerState>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [f32], _| {
            let mut mixer = match shared.lock() {
                Ok(guard) => guard,
                Err(_) => return,
            };
            let sample_rate = mixer.sample_rate;
            let notes = &mut mixer.notes;
            for frame in data.chunks_mut(channels) {
                let sample = mix_sample(notes, sample_rate);
                for out in frame.iter_mut() {
                    *out = sample;
                }
            }
        },
        err_fn,
        None,
    )
}

fn build_stream_i16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    shared: Arc<Mutex<MixerState>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [i16], _| {
            let mut mixer = match shared.lock() {
                Ok(guard) => guard,
                Err(_) => return,
            };
            let sample_rate = mixer.sample_rate;
            let notes = &mut mixer.notes;
            for frame in data.chunks_mut(channels) {
                let sample = (mix_sample(notes, sample_rate) * i16::MAX as f32) as i16;
                for out in frame.iter_mut() {
                    *out = sample;
                }
            }
        },
        err_fn,
        None,
    )
}

fn build_stream_u16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    shared: Arc<Mutex<MixerState>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [u16], _| {
            let mut mixer = match shared.lock() {
                Ok(guard) => guard,
                Err(_) => return,
            };
            let sample_rate = mixer.sample_rate;
            let notes = &mut mixer.notes;
            for frame in data.chunks_mut(channels) {
                let sample = mix_sample(notes, sample_rate) * 0.5 + 0.5;
                let value = (sample.clamp(0.0, 1.0) * u16::MAX as f32) as u16;
                for out in frame.iter_mut() {
                    *out = value;
                }
            }
        },
        err_fn,
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(voice: Voice, hz: f32, sample_rate: f32) -> ActiveNote {
        ActiveNote {
            channel: ChannelId(0),
            voice,
            phase: 0.0,
            phase_inc: TAU * hz / sample_rate,
            age: 0,
            release: None,
        }
    }

    #[test]
    fn organ_note_sustains_until_released() {
        let sr = 8000.0;
        let mut notes = vec![note(Voice::Organ, 440.0, sr)];
        let mut peak = 0.0_f32;
        for _ in 0..8000 {
            peak = peak.max(mix_sample(&mut notes, sr).abs());
        }
        assert_eq!(notes.len(), 1, "organ must keep sounding");
        assert!(peak > 0.1);

        notes[0].release = Some((100, 100));
        for _ in 0..200 {
            mix_sample(&mut notes, sr);
        }
        assert!(notes.is_empty(), "released note must be removed");
    }

    #[test]
    fn piano_note_decays_and_is_dropped() {
        let sr = 8000.0;
        let mut notes = vec![note(Voice::Piano, 220.0, sr)];
        let early = (0..800).map(|_| mix_sample(&mut notes, sr).abs()).fold(0.0, f32::max);
        assert!(early > 0.05);

        let mut last = early;
        for _ in 0..(sr as usize * 9) {
            if notes.is_empty() {
                break;
            }
            last = mix_sample(&mut notes, sr).abs();
        }
        assert!(notes.is_empty(), "decayed piano note must be removed");
        assert!(last < early * 0.01);
    }

    #[test]
    fn silence_when_no_notes_are_active() {
        let mut notes = Vec::new();
        assert_eq!(mix_sample(&mut notes, 48000.0), 0.0);
    }
}
