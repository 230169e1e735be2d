//! Selection display
//!
//! Shows what was just selected (clip, scene, track or drum pad) and, for
//! clips, a live "time remaining" or "record count" readout. The readout is
//! recomputed on selection and whenever the selected clip reports a new
//! playing position; nothing polls it.

use crate::component::{ChildHandle, Component, ComponentState};
use crate::hardware::{Button, ButtonRef, DataSourceRef, DisplayDataSource, DisplayLine};
use crate::model::{Clip, ClipRef, SlotAddress, SongRef};
use crate::subject::{ListenerId, SubjectSlot};
use crate::timefmt::{
    convert_beats_to_mins_secs, convert_length_to_bars_beats_sixteenths,
    convert_length_to_mins_secs,
};
use anyhow::Result;
use std::cell::RefCell;

const UNNAMED: &str = "[unnamed]";
const NONE: &str = "[none]";
const EMPTY_SLOT: &str = "[empty slot]";
const BLANK: &str = " ";

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        UNNAMED
    } else {
        name
    }
}

/// Four segments of text fed to a display line
///
/// The texts are kept while the display is disabled; the line only sees
/// them while it is enabled and shows blanks otherwise.
pub struct SelectionDisplay {
    state: ComponentState,
    texts: RefCell<Vec<String>>,
    data_sources: Vec<DataSourceRef>,
}

impl Default for SelectionDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionDisplay {
    pub const NUM_SEGMENTS: usize = 4;

    pub fn new() -> Self {
        Self {
            state: ComponentState::new(),
            texts: RefCell::new(vec![BLANK.to_string(); Self::NUM_SEGMENTS]),
            data_sources: (0..Self::NUM_SEGMENTS)
                .map(|_| DisplayDataSource::new())
                .collect(),
        }
    }

    /// Split `line` into this display's segments and feed them
    pub fn set_display_line(&self, line: Option<&mut DisplayLine>) {
        let Some(line) = line else {
            return;
        };
        line.set_num_segments(Self::NUM_SEGMENTS);
        for (index, source) in self.data_sources.iter().enumerate() {
            if let Some(segment) = line.segment_mut(index) {
                segment.set_data_source(Some(source.clone()));
            }
        }
        self.refresh();
    }

    /// Out-of-range segments are ignored
    pub fn set_display_string(&self, text: &str, segment: usize) {
        let mut texts = self.texts.borrow_mut();
        let Some(stored) = texts.get_mut(segment) else {
            return;
        };
        *stored = text.to_string();
        if self.is_enabled() {
            self.data_sources[segment].set_display_string(text);
        }
    }

    pub fn display_string(&self, segment: usize) -> Option<String> {
        self.texts.borrow().get(segment).cloned()
    }

    pub fn reset_display(&self) {
        for segment in 0..Self::NUM_SEGMENTS {
            self.set_display_string(BLANK, segment);
        }
    }

    /// Blank the right half, where the clip readout lives
    pub fn reset_display_right(&self) {
        for segment in Self::NUM_SEGMENTS / 2..Self::NUM_SEGMENTS {
            self.set_display_string(BLANK, segment);
        }
    }

    /// Push the texts to the line, or blanks while disabled
    fn refresh(&self) {
        let enabled = self.is_enabled();
        for (text, source) in self.texts.borrow().iter().zip(&self.data_sources) {
            source.set_display_string(if enabled { text } else { BLANK });
        }
    }
}

impl Component for SelectionDisplay {
    fn state(&self) -> &ComponentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ComponentState {
        &mut self.state
    }

    fn update(&mut self) -> Result<()> {
        self.refresh();
        Ok(())
    }
}

/// Handles selection of clips, scenes, tracks and drum pads
pub struct SelectComponent {
    state: ComponentState,
    song: SongRef,
    display: ChildHandle<SelectionDisplay>,
    selected_clip: SubjectSlot<Clip>,
    select_button: SubjectSlot<Button>,
}

impl SelectComponent {
    pub fn new(song: SongRef) -> Result<Self> {
        let mut state = ComponentState::new();
        let display = state.register_component(SelectionDisplay::new());
        state.child_mut(display).set_enabled(false)?;
        Ok(Self {
            state,
            song,
            display,
            selected_clip: SubjectSlot::new(),
            select_button: SubjectSlot::new(),
        })
    }

    pub fn selection_display(&self) -> &SelectionDisplay {
        self.state.child(self.display)
    }

    fn selection_display_mut(&mut self) -> &mut SelectionDisplay {
        self.state.child_mut(self.display)
    }

    pub fn set_display_line(&self, line: Option<&mut DisplayLine>) {
        self.selection_display().set_display_line(line);
    }

    pub fn set_select_button(&mut self, button: Option<&ButtonRef>) {
        self.select_button.set_subject(button);
    }

    /// Listener id playing-position changes are addressed to
    pub fn playing_position_listener(&self) -> ListenerId {
        self.selected_clip.listener()
    }

    pub fn selected_clip(&self) -> Option<ClipRef> {
        self.selected_clip.subject()
    }

    pub fn set_selected_clip(&mut self, clip: Option<&ClipRef>) {
        self.selected_clip.set_subject(clip);
    }

    pub fn on_select_clip(&mut self, slot: Option<SlotAddress>) -> Result<()> {
        let clip_name = match slot {
            Some(address) => {
                let slot_clip = {
                    let mut song = self.song.borrow_mut();
                    let slot_clip = song.slot(address).map(|slot| slot.clip.clone());
                    if slot_clip.is_some() && song.view.highlighted_clip_slot != Some(address) {
                        song.set_highlighted_clip_slot(address);
                    }
                    slot_clip
                };
                match slot_clip {
                    Some(Some(clip)) => {
                        let name = display_name(&clip.borrow().name).to_string();
                        self.set_selected_clip(Some(&clip));
                        name
                    }
                    Some(None) => {
                        self.set_selected_clip(None);
                        EMPTY_SLOT.to_string()
                    }
                    None => {
                        self.set_selected_clip(None);
                        NONE.to_string()
                    }
                }
            }
            None => {
                self.set_selected_clip(None);
                NONE.to_string()
            }
        };

        let display = self.selection_display();
        display.set_display_string("Clip Selection:", 0);
        display.set_display_string(&clip_name, 1);
        self.show_time_remaining();
        self.selection_display_mut().set_enabled(true)
    }

    pub fn on_select_scene(&mut self, scene: Option<usize>) -> Result<()> {
        let scene_name = {
            let mut song = self.song.borrow_mut();
            match scene {
                Some(index) if index < song.scenes.len() => {
                    if song.view.selected_scene != index {
                        song.view.selected_scene = index;
                    }
                    display_name(&song.scenes[index].name).to_string()
                }
                _ => NONE.to_string(),
            }
        };
        self.show_selection("Scene Selection:", &scene_name)
    }

    pub fn on_select_track(&mut self, track: Option<usize>) -> Result<()> {
        let track_name = {
            let song = self.song.borrow();
            track
                .and_then(|index| song.tracks.get(index))
                .map(|t| display_name(&t.name).to_string())
                .unwrap_or_else(|| NONE.to_string())
        };
        self.show_selection("Track Selection:", &track_name)
    }

    /// `pad` indexes the drum pads of the selected track
    pub fn on_select_drum_pad(&mut self, pad: Option<usize>) -> Result<()> {
        let pad_name = {
            let song = self.song.borrow();
            pad.and_then(|index| song.selected_track().and_then(|t| t.drum_pads.get(index)))
                .map(|p| display_name(&p.name).to_string())
                .unwrap_or_else(|| NONE.to_string())
        };
        self.show_selection("Pad Selection:", &pad_name)
    }

    fn show_selection(&mut self, header: &str, name: &str) -> Result<()> {
        let display = self.selection_display();
        display.set_display_string(header, 0);
        display.set_display_string(name, 1);
        display.reset_display_right();
        self.selection_display_mut().set_enabled(true)
    }

    /// Playing-position notification addressed to `listener`
    pub fn on_playing_position_changed(&mut self, listener: ListenerId) {
        if listener == self.selected_clip.listener() {
            self.show_time_remaining();
        }
    }

    /// Select-button value addressed to `listener`; releasing clears
    /// everything
    pub fn on_select_value(&mut self, listener: ListenerId, value: u8) -> Result<()> {
        if listener != self.select_button.listener() || value != 0 {
            return Ok(());
        }
        self.selection_display_mut().set_enabled(false)?;
        self.selection_display().reset_display();
        self.set_selected_clip(None);
        Ok(())
    }

    fn show_time_remaining(&self) {
        let tempo = self.song.borrow().tempo;
        let (label, time) = match self.selected_clip.subject() {
            Some(clip) => clip_readout(&clip.borrow(), tempo),
            None => (BLANK.to_string(), BLANK.to_string()),
        };
        let display = self.selection_display();
        display.set_display_string(&label, 2);
        display.set_display_string(&time, 3);
    }
}

/// Label and value for the right half of the display
fn clip_readout(clip: &Clip, tempo: f64) -> (String, String) {
    if !(clip.is_triggered || clip.is_playing) {
        return (BLANK.to_string(), BLANK.to_string());
    }
    if clip.is_recording {
        let length = (clip.playing_position - clip.loop_start)
            * f64::from(clip.signature_denominator)
            / f64::from(clip.signature_numerator);
        return (
            "Record Count:".to_string(),
            convert_length_to_bars_beats_sixteenths(Some(length)),
        );
    }
    let length = clip.loop_end - clip.playing_position;
    let time = if clip.is_audio_clip() && !clip.warping() {
        convert_length_to_mins_secs(Some(length))
    } else {
        convert_beats_to_mins_secs(Some(length), tempo)
    };
    ("Time Remaining:".to_string(), time)
}

impl Component for SelectComponent {
    fn state(&self) -> &ComponentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ComponentState {
        &mut self.state
    }

    /// Losing enablement drops the clip subscription and the shown selection
    fn update(&mut self) -> Result<()> {
        if self.is_enabled() {
            return Ok(());
        }
        self.set_selected_clip(None);
        self.selection_display().reset_display();
        self.selection_display_mut().set_enabled(false)
    }
}
