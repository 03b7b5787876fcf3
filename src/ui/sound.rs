/// Sound cues: short procedural tones for climbing events, played via rodio.
///
/// Buffers are synthesized once at startup. Playback is fire-and-forget,
/// so a cue never holds up the frame that triggered it.
///
/// Built without the "sound" feature, `SoundEngine` is a silent stub.
///
/// ## Cue Table
/// ┌──────────────────────────────┬────────┬──────────────────────────┐
/// │ Event                         │ Cue    │ Sound                    │
/// ├──────────────────────────────┼────────┼──────────────────────────┤
/// │ PlayerMoved (wall hold)       │ Step   │ soft pitched tick        │
/// │ PlayerMoved (body hold)       │ Grip   │ warm rising two-note     │
/// │ RemoteMoved                   │ Step   │ soft pitched tick        │
/// │ QuestionTriggered             │ Chime  │ bell with long tail      │
/// │ Interacted                    │ Wave   │ quick blip               │
/// │ SummitReached                 │ Summit │ ascending fanfare        │
/// └──────────────────────────────┴────────┴──────────────────────────┘

use crate::sim::event::{GameEvent, Grip};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cue {
    Step,
    Grip,
    Chime,
    Wave,
    Summit,
}

/// Which cue, if any, an event should make.
pub fn cue_for(event: &GameEvent) -> Option<Cue> {
    match event {
        GameEvent::PlayerMoved { grip: Grip::WallHold, .. } => Some(Cue::Step),
        GameEvent::PlayerMoved { grip: Grip::BodyHold { .. }, .. } => Some(Cue::Grip),
        GameEvent::RemoteMoved { .. } => Some(Cue::Step),
        GameEvent::QuestionTriggered(_) => Some(Cue::Chime),
        GameEvent::Interacted { .. } => Some(Cue::Wave),
        GameEvent::SummitReached => Some(Cue::Summit),
        GameEvent::AnchorHighlighted { .. } | GameEvent::QuestionDismissed { .. } => None,
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::debug;

    use super::Cue;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_step: Arc<Vec<u8>>,
        sfx_grip: Arc<Vec<u8>>,
        sfx_chime: Arc<Vec<u8>>,
        sfx_wave: Arc<Vec<u8>>,
        sfx_summit: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    debug!("no audio output: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_step: Arc::new(make_wav(&gen_step())),
                sfx_grip: Arc::new(make_wav(&gen_grip())),
                sfx_chime: Arc::new(make_wav(&gen_chime())),
                sfx_wave: Arc::new(make_wav(&gen_blip(880.0, 0.05, 0.2))),
                sfx_summit: Arc::new(make_wav(&gen_summit())),
            })
        }

        pub fn play(&self, cue: Cue) {
            let buf = match cue {
                Cue::Step => &self.sfx_step,
                Cue::Grip => &self.sfx_grip,
                Cue::Chime => &self.sfx_chime,
                Cue::Wave => &self.sfx_wave,
                Cue::Summit => &self.sfx_summit,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators (mono f32 samples)
    // ════════════════════════════════════════════════════════════

    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                (t * freq * TAU).sin() * env * volume
            })
            .collect()
    }

    /// Step: a muted tick with a fast decay
    fn gen_step() -> Vec<f32> {
        let duration = 0.04;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(3.0);
                ((ti * 330.0 * TAU).sin() * 0.6 + (ti * 660.0 * TAU).sin() * 0.4) * env * 0.2
            })
            .collect()
    }

    /// Grip: two soft rising notes, G4 then D5
    fn gen_grip() -> Vec<f32> {
        let notes = [392.0_f32, 587.0];
        let note_dur = 0.08;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.7);
                let wave = (t * freq * TAU).sin() * 0.8 + (t * freq * 2.0 * TAU).sin() * 0.2;
                samples.push(wave * env * 0.25);
            }
        }
        samples
    }

    /// Chime: E6 bell with inharmonic partials and a long tail
    fn gen_chime() -> Vec<f32> {
        let freq = 1319.0_f32;
        let duration = 0.6;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = (-(i as f32 / n as f32) * 5.0).exp();
                let wave = (t * freq * TAU).sin() * 0.6
                    + (t * freq * 2.76 * TAU).sin() * 0.25
                    + (t * freq * 5.40 * TAU).sin() * 0.15;
                wave * env * 0.25
            })
            .collect()
    }

    /// Summit: C5 → E5 → G5 → C6 with a held top note
    fn gen_summit() -> Vec<f32> {
        let notes = [523.0_f32, 659.0, 784.0];
        let mut samples = Vec::new();
        for &freq in &notes {
            samples.extend(gen_blip(freq, 0.1, 0.3));
        }
        let top = 1047.0_f32;
        let n = (SAMPLE_RATE as f32 * 0.35) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32);
            let wave = (t * top * TAU).sin() * 0.7 + (t * top * 2.0 * TAU).sin() * 0.3;
            samples.push(wave * env * 0.3);
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder (16-bit PCM mono)
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let bits_per_sample: u16 = 16;
        let block_align: u16 = bits_per_sample / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_size = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&1u16.to_le_bytes()); // mono
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API (no-ops when the sound feature is off)
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _cue: Cue) {}
}
