use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use silica::{Audio, SoundEffect, SoundInstance};
use std::io::Cursor;

/// Overlapping pooled playbacks allowed at once. Further requests are dropped
/// until a voice finishes.
pub const MAX_POOLED_VOICES: usize = 16;

struct Output {
    // Playback stops when the stream is dropped.
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

fn start_sink(handle: &OutputStreamHandle, sound: &SoundEffect, volume: f32) -> Option<Sink> {
    let source = match Decoder::new(Cursor::new(sound.data().clone())) {
        Ok(source) => source,
        Err(error) => {
            log::warn!("could not decode sound {}: {error}", sound.name());
            return None;
        }
    };
    let sink = match Sink::try_new(handle) {
        Ok(sink) => sink,
        Err(error) => {
            log::warn!("could not play sound {}: {error}", sound.name());
            return None;
        }
    };
    sink.set_volume(volume);
    sink.append(source);
    sink.play();
    Some(sink)
}

/// Audio output shared by every control. Without an output device it stays
/// silent and every playback request is a no-op.
pub struct AudioMaster {
    output: Option<Output>,
    pool: Vec<Sink>,
    volume: f32,
}

impl AudioMaster {
    pub fn new() -> Self {
        match OutputStream::try_default() {
            Ok((stream, handle)) => AudioMaster {
                output: Some(Output {
                    _stream: stream,
                    handle,
                }),
                pool: Vec::new(),
                volume: 1.0,
            },
            Err(error) => {
                log::warn!("no audio output available, sounds are muted: {error}");
                Self::silent()
            }
        }
    }
    pub fn silent() -> Self {
        AudioMaster {
            output: None,
            pool: Vec::new(),
            volume: 1.0,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.output.is_none()
    }
    pub fn volume(&self) -> f32 {
        self.volume
    }
    /// Applies to playbacks started after the call.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Number of pooled playbacks still sounding.
    pub fn pooled_voices(&mut self) -> usize {
        self.pool.retain(|sink| !sink.empty());
        self.pool.len()
    }
}

impl Default for AudioMaster {
    fn default() -> Self {
        AudioMaster::new()
    }
}

impl Audio for AudioMaster {
    fn create_instance(&mut self, sound: &SoundEffect) -> Box<dyn SoundInstance> {
        Box::new(RodioInstance {
            sound: sound.clone(),
            handle: self.output.as_ref().map(|output| output.handle.clone()),
            volume: self.volume,
            sink: None,
        })
    }

    fn play_pooled(&mut self, instance: &dyn SoundInstance) {
        let Some(output) = &self.output else {
            return;
        };
        self.pool.retain(|sink| !sink.empty());
        if self.pool.len() >= MAX_POOLED_VOICES {
            log::debug!("sound pool full, dropping {}", instance.sound().name());
            return;
        }
        if let Some(sink) = start_sink(&output.handle, instance.sound(), self.volume) {
            self.pool.push(sink);
        }
    }
}

/// A sound bound to its own voice.
pub struct RodioInstance {
    sound: SoundEffect,
    handle: Option<OutputStreamHandle>,
    volume: f32,
    sink: Option<Sink>,
}

impl RodioInstance {
    pub fn is_playing(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| !sink.empty())
    }
}

impl SoundInstance for RodioInstance {
    fn sound(&self) -> &SoundEffect {
        &self.sound
    }

    fn play(&mut self) {
        if self.is_playing() {
            return;
        }
        let Some(handle) = &self.handle else {
            return;
        };
        self.sink = start_sink(handle, &self.sound, self.volume);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_master_ignores_playback() {
        let mut audio = AudioMaster::silent();
        let sound = SoundEffect::new("click.wav", vec![0u8; 16]);
        let mut instance = audio.create_instance(&sound);

        instance.play();
        audio.play_pooled(instance.as_ref());

        assert!(audio.is_silent());
        assert_eq!(instance.sound().name(), "click.wav");
        assert_eq!(audio.pooled_voices(), 0);
    }

    #[test]
    fn volume_is_clamped() {
        let mut audio = AudioMaster::silent();
        audio.set_volume(3.0);
        assert_eq!(audio.volume(), 1.0);
        audio.set_volume(-1.0);
        assert_eq!(audio.volume(), 0.0);
    }
}
