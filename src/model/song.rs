//! Song - the host session
//!
//! Tracks, return tracks, scenes and the selection cursor. Mutations that
//! hit a session ceiling fail with `HostError::Limitation`; operations on
//! objects that no longer exist fail with `HostError::InvalidReference`.

use super::browser::BrowserItem;
use super::clip::{Clip, ClipKind, ClipRef, ClipSlot};
use super::{HostError, HostResult};
use crate::subject::ListenerId;
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub type SongRef = Rc<RefCell<Song>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Midi,
    Return,
}

impl TrackKind {
    pub fn label(&self) -> &'static str {
        match self {
            TrackKind::Audio => "Audio",
            TrackKind::Midi => "MIDI",
            TrackKind::Return => "Return",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chain {
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrumPad {
    pub name: String,
    pub chains: Vec<Chain>,
}

impl DrumPad {
    /// A pad with nothing loaded yet
    pub fn is_empty(&self) -> bool {
        self.chains.first().map_or(true, |c| c.devices.is_empty())
    }
}

#[derive(Debug)]
pub struct Track {
    pub name: String,
    pub kind: TrackKind,
    pub clip_slots: Vec<ClipSlot>,
    pub devices: Vec<Device>,
    pub drum_pads: Vec<DrumPad>,
}

impl Track {
    pub fn new(name: &str, kind: TrackKind, num_scenes: usize) -> Self {
        let num_slots = if kind == TrackKind::Return { 0 } else { num_scenes };
        Self {
            name: name.to_string(),
            kind,
            clip_slots: (0..num_slots).map(|_| ClipSlot::default()).collect(),
            devices: Vec::new(),
            drum_pads: Vec::new(),
        }
    }

    /// Slot of the clip that is currently playing
    pub fn playing_slot_index(&self) -> Option<usize> {
        self.clip_slots.iter().position(|slot| {
            slot.clip
                .as_ref()
                .is_some_and(|clip| clip.borrow().is_playing)
        })
    }

    fn clip_kind(&self) -> ClipKind {
        match self.kind {
            TrackKind::Audio => ClipKind::Audio { warping: true },
            _ => ClipKind::Midi,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackAddress {
    Track(usize),
    Return(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAddress {
    pub track: usize,
    pub scene: usize,
}

/// What the device-oriented parts of the surface act on, within the
/// selected track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectedObject {
    Track,
    Device(usize),
    DrumPad(usize),
}

/// Selection cursor
#[derive(Debug, Clone)]
pub struct SongView {
    pub selected_track: TrackAddress,
    pub selected_scene: usize,
    pub highlighted_clip_slot: Option<SlotAddress>,
    pub selected_object: SelectedObject,
}

impl Default for SongView {
    fn default() -> Self {
        Self {
            selected_track: TrackAddress::Track(0),
            selected_scene: 0,
            highlighted_clip_slot: None,
            selected_object: SelectedObject::Track,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub max_tracks: usize,
    pub max_return_tracks: usize,
    pub max_scenes: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_tracks: 64,
            max_return_tracks: 12,
            max_scenes: 128,
        }
    }
}

/// Notifications pushed to subscribed listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    PlayingPositionChanged(ListenerId),
}

#[derive(Debug)]
pub struct Song {
    pub tracks: Vec<Track>,
    pub return_tracks: Vec<Track>,
    pub scenes: Vec<Scene>,
    pub tempo: f64,
    pub view: SongView,
    pub limits: SessionLimits,
    events: Vec<HostEvent>,
}

impl Song {
    pub fn new(limits: SessionLimits) -> Self {
        Self {
            tracks: Vec::new(),
            return_tracks: Vec::new(),
            scenes: Vec::new(),
            tempo: 120.0,
            view: SongView::default(),
            limits,
            events: Vec::new(),
        }
    }

    pub fn into_ref(self) -> SongRef {
        Rc::new(RefCell::new(self))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Structure
    // ─────────────────────────────────────────────────────────────────────────

    pub fn add_scene(&mut self, name: &str) -> usize {
        self.scenes.push(Scene {
            name: name.to_string(),
        });
        for track in &mut self.tracks {
            track.clip_slots.push(ClipSlot::default());
        }
        self.scenes.len() - 1
    }

    /// Append a fully built track, padding its slots to the scene count
    pub fn add_track(&mut self, mut track: Track) -> TrackAddress {
        if track.kind == TrackKind::Return {
            self.return_tracks.push(track);
            return TrackAddress::Return(self.return_tracks.len() - 1);
        }
        track
            .clip_slots
            .resize_with(self.scenes.len(), ClipSlot::default);
        self.tracks.push(track);
        TrackAddress::Track(self.tracks.len() - 1)
    }

    pub fn track(&self, address: TrackAddress) -> Option<&Track> {
        match address {
            TrackAddress::Track(i) => self.tracks.get(i),
            TrackAddress::Return(i) => self.return_tracks.get(i),
        }
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.track(self.view.selected_track)
    }

    pub fn selected_track_mut(&mut self) -> Option<&mut Track> {
        match self.view.selected_track {
            TrackAddress::Track(i) => self.tracks.get_mut(i),
            TrackAddress::Return(i) => self.return_tracks.get_mut(i),
        }
    }

    pub fn selected_scene(&self) -> Option<&Scene> {
        self.scenes.get(self.view.selected_scene)
    }

    pub fn select_track(&mut self, address: TrackAddress) {
        if self.view.selected_track != address {
            self.view.selected_track = address;
            self.view.selected_object = SelectedObject::Track;
        }
    }

    pub fn select_object(&mut self, object: SelectedObject) {
        self.view.selected_object = object;
    }

    /// Where a new track goes: after the selected track, or at the end when
    /// a return track is selected
    pub fn insert_index_after_selected(&self) -> Option<usize> {
        match self.view.selected_track {
            TrackAddress::Track(i) if i < self.tracks.len() => Some(i + 1),
            _ => None,
        }
    }

    pub fn create_audio_track(&mut self, index: Option<usize>) -> HostResult<usize> {
        self.create_track(TrackKind::Audio, index)
    }

    pub fn create_midi_track(&mut self, index: Option<usize>) -> HostResult<usize> {
        self.create_track(TrackKind::Midi, index)
    }

    fn create_track(&mut self, kind: TrackKind, index: Option<usize>) -> HostResult<usize> {
        if self.tracks.len() >= self.limits.max_tracks {
            return Err(HostError::Limitation(format!(
                "track limit of {} reached",
                self.limits.max_tracks
            )));
        }
        let index = index
            .filter(|&i| i <= self.tracks.len())
            .unwrap_or(self.tracks.len());
        let name = format!("{} {}", self.tracks.len() + 1, kind.label());
        self.tracks
            .insert(index, Track::new(&name, kind, self.scenes.len()));
        self.select_track(TrackAddress::Track(index));
        self.view.selected_object = SelectedObject::Track;
        Ok(index)
    }

    /// Return track ceilings surface as runtime errors, not limitations
    pub fn create_return_track(&mut self) -> HostResult<usize> {
        if self.return_tracks.len() >= self.limits.max_return_tracks {
            return Err(HostError::Runtime("maximum number of return tracks".to_string()));
        }
        let letter = (b'A' + (self.return_tracks.len() % 26) as u8) as char;
        self.return_tracks
            .push(Track::new(&format!("{} Return", letter), TrackKind::Return, 0));
        let index = self.return_tracks.len() - 1;
        self.select_track(TrackAddress::Return(index));
        Ok(index)
    }

    /// Insert a scene after the selected one holding copies of the clips
    /// that are playing, and select it
    pub fn capture_and_insert_scene(&mut self) -> HostResult<usize> {
        if self.scenes.len() >= self.limits.max_scenes {
            return Err(HostError::Limitation(format!(
                "scene limit of {} reached",
                self.limits.max_scenes
            )));
        }
        let index = (self.view.selected_scene + 1).min(self.scenes.len());
        self.scenes.insert(
            index,
            Scene {
                name: format!("{}", index + 1),
            },
        );
        for track in &mut self.tracks {
            let captured = track
                .playing_slot_index()
                .and_then(|i| track.clip_slots[i].clip.clone())
                .map(|clip| ClipSlot::with_clip(clip.borrow().duplicate()))
                .unwrap_or_default();
            track.clip_slots.insert(index, captured);
        }
        self.view.selected_scene = index;
        Ok(index)
    }

    pub fn delete_scene(&mut self, index: usize) -> HostResult<()> {
        if index >= self.scenes.len() {
            return Err(HostError::InvalidReference(format!("no scene at {}", index)));
        }
        if self.scenes.len() == 1 {
            return Err(HostError::Runtime("cannot delete the only scene".to_string()));
        }
        self.scenes.remove(index);
        for track in &mut self.tracks {
            track.clip_slots.remove(index);
        }
        let last = self.scenes.len() - 1;
        self.view.selected_scene = self.view.selected_scene.min(last);
        if let Some(slot) = &mut self.view.highlighted_clip_slot {
            slot.scene = slot.scene.min(last);
        }
        Ok(())
    }

    /// Launch every clip in the scene
    pub fn fire_scene(&mut self, index: usize) {
        for track in &self.tracks {
            if let Some(clip) = track.clip_slots.get(index).and_then(|s| s.clip.as_ref()) {
                clip.borrow_mut().fire();
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Clip slots
    // ─────────────────────────────────────────────────────────────────────────

    pub fn slot(&self, address: SlotAddress) -> Option<&ClipSlot> {
        self.tracks
            .get(address.track)
            .and_then(|t| t.clip_slots.get(address.scene))
    }

    pub fn slot_mut(&mut self, address: SlotAddress) -> Option<&mut ClipSlot> {
        self.tracks
            .get_mut(address.track)
            .and_then(|t| t.clip_slots.get_mut(address.scene))
    }

    pub fn clip_at(&self, address: SlotAddress) -> Option<ClipRef> {
        self.slot(address).and_then(|s| s.clip.clone())
    }

    /// Clip in the highlighted slot
    pub fn detail_clip(&self) -> Option<ClipRef> {
        self.view.highlighted_clip_slot.and_then(|a| self.clip_at(a))
    }

    /// Move the cursor; the slot's track becomes the selected track
    pub fn set_highlighted_clip_slot(&mut self, address: SlotAddress) {
        self.view.highlighted_clip_slot = Some(address);
        self.view.selected_scene = address.scene;
        self.select_track(TrackAddress::Track(address.track));
    }

    /// Returns the deleted clip's name
    pub fn delete_clip(&mut self, address: SlotAddress) -> HostResult<String> {
        let clip = self
            .slot_mut(address)
            .and_then(ClipSlot::delete_clip)
            .ok_or_else(|| HostError::InvalidReference("slot has no clip".to_string()))?;
        let name = clip.borrow().name.clone();
        Ok(name)
    }

    /// Fire a stopped clip or stop a running one
    pub fn launch_clip(&mut self, address: SlotAddress) -> HostResult<()> {
        let clip = self
            .clip_at(address)
            .ok_or_else(|| HostError::InvalidReference("slot has no clip".to_string()))?;
        let mut clip = clip.borrow_mut();
        if clip.is_playing || clip.is_triggered {
            clip.stop();
        } else {
            clip.fire();
        }
        Ok(())
    }

    /// Start recording into a slot, creating a clip when it is empty
    pub fn record_clip(&mut self, address: SlotAddress) -> HostResult<()> {
        let track = self
            .tracks
            .get_mut(address.track)
            .ok_or_else(|| HostError::InvalidReference("no such track".to_string()))?;
        let kind = track.clip_kind();
        let slot = track
            .clip_slots
            .get_mut(address.scene)
            .ok_or_else(|| HostError::InvalidReference("no such slot".to_string()))?;
        let clip = slot
            .clip
            .get_or_insert_with(|| Clip::new("", kind).into_ref());
        clip.borrow_mut().start_recording();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Devices
    // ─────────────────────────────────────────────────────────────────────────

    /// Load a browser item at the selected object
    ///
    /// A selected device gets the new one after it; a selected track gets it
    /// at the front of its chain; a selected drum pad gets it at the end of
    /// its first chain.
    pub fn load_item(&mut self, item: &BrowserItem) -> HostResult<()> {
        let selected = self.view.selected_object;
        let track = self
            .selected_track_mut()
            .ok_or_else(|| HostError::InvalidReference("no track selected".to_string()))?;
        let device = Device {
            name: item.name.clone(),
        };

        let selection = match selected {
            SelectedObject::DrumPad(pad) => {
                let pad = track
                    .drum_pads
                    .get_mut(pad)
                    .ok_or_else(|| HostError::InvalidReference("no such drum pad".to_string()))?;
                if pad.chains.is_empty() {
                    pad.chains.push(Chain::default());
                }
                pad.chains[0].devices.push(device);
                selected
            }
            SelectedObject::Device(i) => {
                let at = (i + 1).min(track.devices.len());
                track.devices.insert(at, device);
                SelectedObject::Device(at)
            }
            SelectedObject::Track => {
                track.devices.insert(0, device);
                SelectedObject::Device(0)
            }
        };
        self.view.selected_object = selection;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transport
    // ─────────────────────────────────────────────────────────────────────────

    /// Run playback for `elapsed`, queueing position notifications
    pub fn advance(&mut self, elapsed: Duration) {
        let seconds = elapsed.as_secs_f64();
        for track in &self.tracks {
            for clip in track.clip_slots.iter().filter_map(|s| s.clip.as_ref()) {
                let listeners = clip.borrow_mut().advance(seconds, self.tempo);
                self.events
                    .extend(listeners.into_iter().map(HostEvent::PlayingPositionChanged));
            }
        }
    }

    /// Drain queued notifications
    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }
}
