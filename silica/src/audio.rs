use std::{fmt, sync::Arc};

/// Encoded sound data shared between every instance created from it.
#[derive(Clone)]
pub struct SoundEffect {
    name: Arc<str>,
    data: Arc<[u8]>,
}

impl SoundEffect {
    pub fn new(name: &str, data: impl Into<Arc<[u8]>>) -> Self {
        SoundEffect {
            name: name.into(),
            data: data.into(),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn data(&self) -> &Arc<[u8]> {
        &self.data
    }
}

impl fmt::Debug for SoundEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundEffect")
            .field("name", &self.name)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// A playable voice bound to one [`SoundEffect`].
pub trait SoundInstance {
    fn sound(&self) -> &SoundEffect;
    /// Plays on this instance's own voice. Playing an instance that is still
    /// sounding does not restart or overlap it.
    fn play(&mut self);
}

pub trait Audio {
    fn create_instance(&mut self, sound: &SoundEffect) -> Box<dyn SoundInstance>;
    /// Plays `instance`'s sound on a voice from the shared pool, so repeated
    /// calls overlap instead of waiting for the previous playback.
    fn play_pooled(&mut self, instance: &dyn SoundInstance);
}
