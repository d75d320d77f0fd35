//! Collaborator ports
//!
//! Audio, backdrop and analytics are injected so a session can run with no
//! ambient singletons. Every port has a no-op default and the crate ships a
//! recording double for tests and a logging one for headless runs.

use std::cell::RefCell;
use std::rc::Rc;

use crate::audio::SoundEffect;

/// Sound and music playback
pub trait AudioPort {
    fn play(&mut self, effect: SoundEffect);

    fn play_music(&mut self, _key: &str) {}
}

/// Stage background swaps
pub trait BackdropPort {
    fn transition_to(&mut self, stage_id: u32, background: &str);
}

/// Fire-and-forget analytics events
pub trait AnalyticsPort {
    fn track(&mut self, name: &str, value: u64);
}

/// Does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPort;

impl AudioPort for NullPort {
    fn play(&mut self, _effect: SoundEffect) {}
}

impl BackdropPort for NullPort {
    fn transition_to(&mut self, _stage_id: u32, _background: &str) {}
}

impl AnalyticsPort for NullPort {
    fn track(&mut self, _name: &str, _value: u64) {}
}

/// Forwards every call to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPort;

impl AudioPort for LogPort {
    fn play(&mut self, effect: SoundEffect) {
        log::debug!("sfx {}", effect.key());
    }

    fn play_music(&mut self, key: &str) {
        log::info!("bgm {key}");
    }
}

impl BackdropPort for LogPort {
    fn transition_to(&mut self, stage_id: u32, background: &str) {
        log::info!("backdrop -> stage {stage_id} ({background})");
    }
}

impl AnalyticsPort for LogPort {
    fn track(&mut self, name: &str, value: u64) {
        log::info!("analytics {name}={value}");
    }
}

/// One recorded port call
#[derive(Debug, Clone, PartialEq)]
pub enum PortCall {
    Sound(SoundEffect),
    Music(String),
    Backdrop(u32),
    Track(String, u64),
}

/// Records calls into a shared log the test keeps a handle to
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Rc<RefCell<Vec<PortCall>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PortCall> {
        self.calls.borrow().clone()
    }

    pub fn sounds(&self) -> Vec<SoundEffect> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                PortCall::Sound(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: PortCall) {
        self.calls.borrow_mut().push(call);
    }

    /// A `Ports` bundle whose three ports all record here
    pub fn ports(&self) -> Ports {
        Ports {
            audio: Box::new(self.clone()),
            backdrop: Box::new(self.clone()),
            analytics: Box::new(self.clone()),
        }
    }
}

impl AudioPort for Recorder {
    fn play(&mut self, effect: SoundEffect) {
        self.push(PortCall::Sound(effect));
    }

    fn play_music(&mut self, key: &str) {
        self.push(PortCall::Music(key.to_string()));
    }
}

impl BackdropPort for Recorder {
    fn transition_to(&mut self, stage_id: u32, _background: &str) {
        self.push(PortCall::Backdrop(stage_id));
    }
}

impl AnalyticsPort for Recorder {
    fn track(&mut self, name: &str, value: u64) {
        self.push(PortCall::Track(name.to_string(), value));
    }
}

/// The set of ports a session talks to
pub struct Ports {
    pub audio: Box<dyn AudioPort>,
    pub backdrop: Box<dyn BackdropPort>,
    pub analytics: Box<dyn AnalyticsPort>,
}

impl Default for Ports {
    fn default() -> Self {
        Self {
            audio: Box::new(NullPort),
            backdrop: Box::new(NullPort),
            analytics: Box::new(NullPort),
        }
    }
}

impl Ports {
    /// All ports log through the `log` facade
    pub fn logging() -> Self {
        Self {
            audio: Box::new(LogPort),
            backdrop: Box::new(LogPort),
            analytics: Box::new(LogPort),
        }
    }
}

impl std::fmt::Debug for Ports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ports").finish_non_exhaustive()
    }
}
