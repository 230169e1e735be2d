//! One-shot session actions
//!
//! Each action mutates the song once per trigger and reports the outcome
//! through its notifier. Host limits become dialogs; runtime failures the
//! user cannot act on are dropped.

use crate::model::{HostError, SongRef};
use crate::notify::{message, SharedNotifier};
use crate::timefmt::convert_length_to_bars_beats_sixteenths;

/// Insert a scene holding copies of the playing clips
pub struct CaptureAndInsertScene {
    song: SongRef,
    notifier: SharedNotifier,
}

impl CaptureAndInsertScene {
    pub fn new(song: SongRef, notifier: SharedNotifier) -> Self {
        Self { song, notifier }
    }

    pub fn trigger(&self) {
        let captured = self.song.borrow_mut().capture_and_insert_scene();
        match captured {
            Ok(_) => {
                let name = self
                    .song
                    .borrow()
                    .selected_scene()
                    .map(|s| s.name.trim().to_string())
                    .unwrap_or_default();
                self.notifier
                    .show_notification(&message::capture_and_insert_scene(&name));
            }
            Err(HostError::Limitation(_)) => {
                self.notifier.expect_dialog(message::SCENE_LIMIT_REACHED)
            }
            Err(err) => tracing::warn!("Scene capture ignored: {}", err),
        }
    }
}

/// Double the loop of the MIDI clip shown in detail view
pub struct DuplicateLoop {
    song: SongRef,
    notifier: SharedNotifier,
}

impl DuplicateLoop {
    pub fn new(song: SongRef, notifier: SharedNotifier) -> Self {
        Self { song, notifier }
    }

    pub fn can_duplicate_loop(&self) -> bool {
        self.song
            .borrow()
            .detail_clip()
            .is_some_and(|clip| clip.borrow().is_midi_clip())
    }

    pub fn trigger(&self) {
        if !self.can_duplicate_loop() {
            return;
        }
        let Some(clip) = self.song.borrow().detail_clip() else {
            return;
        };
        let mut clip = clip.borrow_mut();
        match clip.duplicate_loop() {
            Ok(()) => {
                let length = clip.loop_end - clip.loop_start;
                self.notifier.show_notification(&message::duplicate_loop(
                    &convert_length_to_bars_beats_sixteenths(Some(length)),
                ));
            }
            Err(err) => tracing::debug!("Loop not duplicated: {}", err),
        }
    }
}

/// Delete the clip in the highlighted slot
pub struct DeleteSelectedClip {
    song: SongRef,
    notifier: SharedNotifier,
}

impl DeleteSelectedClip {
    pub fn new(song: SongRef, notifier: SharedNotifier) -> Self {
        Self { song, notifier }
    }

    pub fn trigger(&self) {
        let mut song = self.song.borrow_mut();
        let Some(address) = song.view.highlighted_clip_slot else {
            return;
        };
        let deleted = song.delete_clip(address);
        drop(song);
        if let Ok(name) = deleted {
            self.notifier
                .show_notification(&message::delete_clip(&name));
        }
    }
}

/// Delete the selected scene, then select and launch the one before it
pub struct DeleteSelectedScene {
    song: SongRef,
    notifier: SharedNotifier,
}

impl DeleteSelectedScene {
    pub fn new(song: SongRef, notifier: SharedNotifier) -> Self {
        Self { song, notifier }
    }

    pub fn trigger(&self) {
        let mut song = self.song.borrow_mut();
        let index = song.view.selected_scene;
        let Some(name) = song.selected_scene().map(|s| s.name.clone()) else {
            return;
        };
        if let Err(err) = song.delete_scene(index) {
            tracing::debug!("Scene not deleted: {}", err);
            return;
        }
        let previous = index.saturating_sub(1);
        song.view.selected_scene = previous;
        song.fire_scene(previous);
        drop(song);

        self.notifier
            .show_notification(&message::delete_scene(&name));
    }
}
