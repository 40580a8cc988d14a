//! Sound event hook
//!
//! The simulation only names sound events; playing them is up to the platform.
//! `SoundBoard` is the stock sink: it tracks which events have a loaded sample,
//! applies volume and mute, and logs what it would play.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SoundEvent {
    /// Apple eaten
    Eat,
    /// Power-up collected
    PowerUp,
    /// Last life lost or challenge timed out
    GameOver,
    /// Achievement unlocked
    Achievement,
}

impl SoundEvent {
    pub const ALL: [SoundEvent; 4] = [
        SoundEvent::Eat,
        SoundEvent::PowerUp,
        SoundEvent::GameOver,
        SoundEvent::Achievement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEvent::Eat => "eat",
            SoundEvent::PowerUp => "power_up",
            SoundEvent::GameOver => "game_over",
            SoundEvent::Achievement => "achievement",
        }
    }
}

/// Audio collaborator.
///
/// `play` must never fail the caller: sinks swallow and log their own errors.
pub trait SoundSink {
    fn play(&mut self, event: SoundEvent);
    fn toggle_mute(&mut self);
    fn is_muted(&self) -> bool;
}

/// Starting volume
const DEFAULT_VOLUME: f32 = 0.5;

/// Audio manager for the game
#[derive(Debug, Clone)]
pub struct SoundBoard {
    loaded: BTreeSet<SoundEvent>,
    volume: f32,
    muted: bool,
    played: Vec<SoundEvent>,
}

impl Default for SoundBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundBoard {
    /// Board with the stock samples loaded (no achievement jingle)
    pub fn new() -> Self {
        Self::with_samples([SoundEvent::Eat, SoundEvent::PowerUp, SoundEvent::GameOver])
    }

    pub fn with_samples(samples: impl IntoIterator<Item = SoundEvent>) -> Self {
        Self {
            loaded: samples.into_iter().collect(),
            volume: DEFAULT_VOLUME,
            muted: false,
            played: Vec::new(),
        }
    }

    /// Set volume (0.0 - 1.0)
    pub fn set_volume(&mut self, vol: f32) {
        self.volume = vol.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// Events actually played so far (most recent last)
    pub fn history(&self) -> &[SoundEvent] {
        &self.played
    }
}

impl SoundSink for SoundBoard {
    fn play(&mut self, event: SoundEvent) {
        if !self.loaded.contains(&event) {
            log::warn!("Sound {} not found", event.as_str());
            return;
        }
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        log::debug!("Playing {} at volume {:.2}", event.as_str(), vol);
        self.played.push(event);
    }

    fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        log::info!("Audio {}", if self.muted { "muted" } else { "unmuted" });
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

/// Shared handle, so the caller can inspect a sink the game owns
impl<S: SoundSink> SoundSink for Rc<RefCell<S>> {
    fn play(&mut self, event: SoundEvent) {
        self.borrow_mut().play(event);
    }

    fn toggle_mute(&mut self) {
        self.borrow_mut().toggle_mute();
    }

    fn is_muted(&self) -> bool {
        self.borrow().is_muted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sample_is_skipped() {
        let mut board = SoundBoard::new();
        board.play(SoundEvent::Achievement);
        board.play(SoundEvent::Eat);
        assert_eq!(board.history(), &[SoundEvent::Eat]);
    }

    #[test]
    fn test_mute_silences_playback() {
        let mut board = SoundBoard::new();
        board.toggle_mute();
        assert!(board.is_muted());
        board.play(SoundEvent::PowerUp);
        assert!(board.history().is_empty());

        board.toggle_mute();
        board.play(SoundEvent::PowerUp);
        assert_eq!(board.history(), &[SoundEvent::PowerUp]);
    }

    #[test]
    fn test_volume_clamped() {
        let mut board = SoundBoard::new();
        board.set_volume(3.0);
        assert_eq!(board.volume(), 1.0);
        board.set_volume(0.0);
        board.play(SoundEvent::Eat);
        assert!(board.history().is_empty());
    }

    #[test]
    fn test_event_names() {
        let names: Vec<&str> = SoundEvent::ALL.iter().map(|e| e.as_str()).collect();
        assert_eq!(names, vec!["eat", "power_up", "game_over", "achievement"]);
    }
}
