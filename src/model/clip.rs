//! Clips and clip slots

use super::{HostError, HostResult};
use crate::subject::{ListenerId, Listeners, Observable};
use std::cell::RefCell;
use std::rc::Rc;

pub type ClipRef = Rc<RefCell<Clip>>;

/// Loops longer than this cannot be duplicated
pub const MAX_LOOP_LENGTH: f64 = 2048.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipKind {
    Midi,
    Audio { warping: bool },
}

/// A clip in a session slot
///
/// Positions and loop bounds are in beats, except for unwarped audio clips
/// where they are in seconds.
#[derive(Debug)]
pub struct Clip {
    pub name: String,
    pub kind: ClipKind,
    pub is_playing: bool,
    pub is_triggered: bool,
    pub is_recording: bool,
    pub loop_start: f64,
    pub loop_end: f64,
    pub playing_position: f64,
    pub signature_numerator: u32,
    pub signature_denominator: u32,
    /// Names of parameters with automation in this clip
    pub envelopes: Vec<String>,
    listeners: Listeners,
}

impl Clip {
    pub fn new(name: &str, kind: ClipKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            is_playing: false,
            is_triggered: false,
            is_recording: false,
            loop_start: 0.0,
            loop_end: 4.0,
            playing_position: 0.0,
            signature_numerator: 4,
            signature_denominator: 4,
            envelopes: Vec::new(),
            listeners: Listeners::default(),
        }
    }

    pub fn into_ref(self) -> ClipRef {
        Rc::new(RefCell::new(self))
    }

    pub fn is_audio_clip(&self) -> bool {
        matches!(self.kind, ClipKind::Audio { .. })
    }

    pub fn is_midi_clip(&self) -> bool {
        self.kind == ClipKind::Midi
    }

    /// Only meaningful for audio clips; MIDI clips are always on the beat grid
    pub fn warping(&self) -> bool {
        match self.kind {
            ClipKind::Audio { warping } => warping,
            ClipKind::Midi => true,
        }
    }

    /// Copy of the clip's content with no listeners and stopped transport
    pub fn duplicate(&self) -> Self {
        let mut copy = Clip::new(&self.name, self.kind);
        copy.loop_start = self.loop_start;
        copy.loop_end = self.loop_end;
        copy.signature_numerator = self.signature_numerator;
        copy.signature_denominator = self.signature_denominator;
        copy.envelopes = self.envelopes.clone();
        copy
    }

    pub fn fire(&mut self) {
        if !self.is_playing {
            self.is_triggered = true;
        }
    }

    pub fn stop(&mut self) {
        self.is_playing = false;
        self.is_triggered = false;
        self.is_recording = false;
        self.playing_position = self.loop_start;
    }

    pub fn start_recording(&mut self) {
        self.is_recording = true;
        self.is_triggered = true;
        self.playing_position = self.loop_start;
    }

    /// Double the loop region
    pub fn duplicate_loop(&mut self) -> HostResult<()> {
        let length = self.loop_end - self.loop_start;
        if length * 2.0 > MAX_LOOP_LENGTH {
            return Err(HostError::Runtime(format!(
                "loop of {} beats cannot be duplicated",
                length
            )));
        }
        self.loop_end += length;
        Ok(())
    }

    /// Returns false when the parameter had no envelope
    pub fn clear_envelope(&mut self, parameter: &str) -> bool {
        let before = self.envelopes.len();
        self.envelopes.retain(|e| e != parameter);
        self.envelopes.len() != before
    }

    /// Move the transport by `seconds` at `tempo`
    ///
    /// Triggered clips start from the loop start. Playing clips wrap at the
    /// loop end; recording clips extend the loop instead. Returns the
    /// listeners to notify when the playing position moved.
    pub fn advance(&mut self, seconds: f64, tempo: f64) -> Vec<ListenerId> {
        if !self.is_playing && !self.is_triggered {
            return Vec::new();
        }
        if self.is_triggered {
            self.is_triggered = false;
            self.is_playing = true;
            self.playing_position = self.loop_start;
        }

        let delta = if self.warping() {
            seconds * tempo / 60.0
        } else {
            seconds
        };
        self.playing_position += delta;

        if self.is_recording {
            self.loop_end = self.loop_end.max(self.playing_position);
        } else if self.playing_position >= self.loop_end {
            let length = self.loop_end - self.loop_start;
            if length > 0.0 {
                let overshoot = (self.playing_position - self.loop_end) % length;
                self.playing_position = self.loop_start + overshoot;
            } else {
                self.playing_position = self.loop_start;
            }
        }

        self.listeners.iter().collect()
    }
}

impl Observable for Clip {
    fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    fn listeners_mut(&mut self) -> &mut Listeners {
        &mut self.listeners
    }
}

/// A session grid cell
#[derive(Debug, Default)]
pub struct ClipSlot {
    pub clip: Option<ClipRef>,
}

impl ClipSlot {
    pub fn with_clip(clip: Clip) -> Self {
        Self {
            clip: Some(clip.into_ref()),
        }
    }

    /// Remove the clip; outstanding weak references go stale
    pub fn delete_clip(&mut self) -> Option<ClipRef> {
        self.clip.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggered_clip_starts_then_wraps() {
        let mut clip = Clip::new("Loop", ClipKind::Midi);
        clip.loop_end = 4.0;
        clip.fire();

        // 120 BPM: one second is two beats
        clip.advance(1.0, 120.0);
        assert!(clip.is_playing);
        assert!(!clip.is_triggered);
        assert_eq!(clip.playing_position, 2.0);

        clip.advance(1.5, 120.0);
        assert_eq!(clip.playing_position, 1.0);
    }

    #[test]
    fn test_unwarped_audio_advances_in_seconds() {
        let mut clip = Clip::new("Vox", ClipKind::Audio { warping: false });
        clip.loop_end = 120.0;
        clip.fire();
        clip.advance(0.5, 90.0);
        assert_eq!(clip.playing_position, 0.5);
    }

    #[test]
    fn test_recording_extends_loop() {
        let mut clip = Clip::new("Take", ClipKind::Midi);
        clip.start_recording();
        clip.advance(4.0, 120.0);
        assert_eq!(clip.playing_position, 8.0);
        assert_eq!(clip.loop_end, 8.0);
    }

    #[test]
    fn test_duplicate_loop_respects_limit() {
        let mut clip = Clip::new("Long", ClipKind::Midi);
        clip.loop_end = 16.0;
        clip.duplicate_loop().unwrap();
        assert_eq!(clip.loop_end, 32.0);

        clip.loop_end = MAX_LOOP_LENGTH;
        assert!(matches!(clip.duplicate_loop(), Err(HostError::Runtime(_))));
    }

    #[test]
    fn test_stopped_clip_does_not_notify() {
        let mut clip = Clip::new("Idle", ClipKind::Midi);
        assert!(clip.advance(1.0, 120.0).is_empty());
        assert_eq!(clip.playing_position, 0.0);
    }
}
