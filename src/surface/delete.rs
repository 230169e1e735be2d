//! Deleting automation while the delete button is held

use crate::component::{Component, ComponentState};
use crate::hardware::ButtonRef;
use crate::model::{ClipRef, SongRef};
use crate::notify::{message, SharedNotifier};

pub struct DeleteComponent {
    state: ComponentState,
    song: SongRef,
    notifier: SharedNotifier,
    delete_button: Option<ButtonRef>,
}

impl DeleteComponent {
    pub fn new(song: SongRef, notifier: SharedNotifier) -> Self {
        Self {
            state: ComponentState::new(),
            song,
            notifier,
            delete_button: None,
        }
    }

    pub fn set_delete_button(&mut self, button: Option<ButtonRef>) {
        self.delete_button = button;
    }

    pub fn is_deleting(&self) -> bool {
        self.delete_button
            .as_ref()
            .is_some_and(|button| button.borrow().is_pressed())
    }

    /// Clear the automation of `parameter` in the clip playing on the
    /// selected track
    pub fn delete_clip_envelope(&self, parameter: &str) {
        let Some(clip) = self.playing_clip() else {
            return;
        };
        clip.borrow_mut().clear_envelope(parameter);
        self.notifier
            .show_notification(&message::delete_envelope(parameter));
    }

    fn playing_clip(&self) -> Option<ClipRef> {
        let song = self.song.borrow();
        let track = song.selected_track()?;
        let index = track.playing_slot_index()?;
        track.clip_slots[index].clip.clone()
    }
}

impl Component for DeleteComponent {
    fn state(&self) -> &ComponentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ComponentState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::Button;
    use crate::model::{Clip, ClipKind, SessionLimits, Song, Track, TrackKind};
    use crate::notify::NotificationLog;
    use std::rc::Rc;

    #[test]
    fn test_is_deleting_follows_button() {
        let song = Song::new(SessionLimits::default()).into_ref();
        let mut delete = DeleteComponent::new(song, Rc::new(NotificationLog::default()));
        assert!(!delete.is_deleting());

        let button = Button::new("Delete");
        delete.set_delete_button(Some(button.clone()));
        button.borrow_mut().send_value(127);
        assert!(delete.is_deleting());
    }

    #[test]
    fn test_delete_envelope_of_playing_clip() {
        let mut song = Song::new(SessionLimits::default());
        song.add_scene("1");
        let mut clip = Clip::new("Pad", ClipKind::Midi);
        clip.is_playing = true;
        clip.envelopes = vec!["Cutoff".to_string(), "Volume".to_string()];
        let clip = clip.into_ref();
        let mut track = Track::new("Synth", TrackKind::Midi, 1);
        track.clip_slots[0].clip = Some(clip.clone());
        song.add_track(track);
        let log = Rc::new(NotificationLog::default());
        let delete = DeleteComponent::new(song.into_ref(), log.clone());

        delete.delete_clip_envelope("Cutoff");

        assert_eq!(clip.borrow().envelopes, vec!["Volume".to_string()]);
        assert_eq!(log.latest().unwrap().text, "Delete automation: Cutoff");
    }

    #[test]
    fn test_nothing_playing_is_silent() {
        let mut song = Song::new(SessionLimits::default());
        song.add_scene("1");
        song.add_track(Track::new("Synth", TrackKind::Midi, 1));
        let log = Rc::new(NotificationLog::default());
        let delete = DeleteComponent::new(song.into_ref(), log.clone());

        delete.delete_clip_envelope("Cutoff");

        assert_eq!(log.len(), 0);
    }
}
