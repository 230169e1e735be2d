//! Device creation
//!
//! Works like instrument-track creation, except that loads go onto the
//! selected track and an empty drum pad skips straight to hotswap, since
//! there is nothing to add an effect after.

use super::browser::LoadHandler;
use super::create_track::BrowserFlow;
use super::HotswapTarget;
use crate::component::{Component, ComponentState};
use crate::mode::{ModeBehaviour, ModeLayer, ModeStack};
use crate::model::{BrowserItem, BrowserRef, FilterType, SelectedObject, SongRef, TrackKind};
use crate::task::TaskId;
use anyhow::Result;

/// Filters the browser down to effects that fit the selected track and
/// decides where a new effect goes
pub struct AddEffectMode {
    song: SongRef,
    browser: BrowserRef,
    saved_filter: Option<FilterType>,
}

impl AddEffectMode {
    pub fn new(song: SongRef, browser: BrowserRef) -> Self {
        Self {
            song,
            browser,
            saved_filter: None,
        }
    }

    /// Object a new effect should be loaded at, when it differs from the
    /// current selection
    ///
    /// With the track itself selected, effects go to the end of its chain
    /// rather than in front of the instrument.
    pub fn selection_for_insert(&self) -> Option<SelectedObject> {
        let song = self.song.borrow();
        let track = song.selected_track()?;
        match song.view.selected_object {
            SelectedObject::Track if !track.devices.is_empty() => {
                Some(SelectedObject::Device(track.devices.len() - 1))
            }
            _ => None,
        }
    }

    fn effect_filter(&self) -> FilterType {
        let song = self.song.borrow();
        match song.selected_track() {
            Some(track) if track.kind == TrackKind::Midi && track.devices.is_empty() => {
                FilterType::MidiEffectHotswap
            }
            _ => FilterType::AudioEffectHotswap,
        }
    }
}

impl ModeBehaviour for AddEffectMode {
    fn enter(&mut self) -> Result<()> {
        let filter = self.effect_filter();
        let previous = std::mem::replace(&mut self.browser.borrow_mut().filter_type, filter);
        self.saved_filter = Some(previous);
        Ok(())
    }

    fn exit(&mut self) -> Result<()> {
        if let Some(previous) = self.saved_filter.take() {
            self.browser.borrow_mut().filter_type = previous;
        }
        Ok(())
    }
}

pub struct CreateDeviceComponent {
    state: ComponentState,
    flow: BrowserFlow,
    modes: ModeStack,
    go_to_hotswap_task: TaskId,
}

impl CreateDeviceComponent {
    pub fn new(flow: BrowserFlow) -> Self {
        let mut modes = ModeStack::new();
        modes.add_mode(
            "create",
            vec![
                flow.load_handler_layer(LoadHandler::CreateDevice),
                ModeLayer::behaviour(AddEffectMode::new(flow.song.clone(), flow.browser.clone())),
                ModeLayer::component(flow.browser_component.clone()),
                flow.reset_load_memory_layer(),
            ],
        );
        modes.add_mode("hotswap", flow.hotswap_layers());

        let go_to_hotswap_task = flow.add_hotswap_task(HotswapTarget::Device);
        Self {
            state: ComponentState::with_enabled(false),
            flow,
            modes,
            go_to_hotswap_task,
        }
    }

    pub fn selected_mode(&self) -> Option<&str> {
        self.modes.selected_mode()
    }

    pub fn mode_names(&self) -> impl Iterator<Item = &str> {
        self.modes.mode_names()
    }

    pub fn go_to_hotswap_task(&self) -> TaskId {
        self.go_to_hotswap_task
    }

    pub fn go_to_hotswap(&mut self) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.modes.set_selected_mode(Some("hotswap"))
    }

    /// Load `item` as a new device on the selected track
    pub fn load_item(&mut self, item: &BrowserItem) -> Result<()> {
        let insert_at = AddEffectMode::new(self.flow.song.clone(), self.flow.browser.clone())
            .selection_for_insert();
        let mut song = self.flow.song.borrow_mut();
        if let Some(selection) = insert_at {
            song.select_object(selection);
        }
        let loaded = song.load_item(item);
        drop(song);

        match loaded {
            Ok(()) => {
                self.flow.browser_component.borrow_mut().remember_load(item);
                self.flow.tasks.borrow_mut().restart(self.go_to_hotswap_task);
            }
            Err(err) => tracing::warn!(item = %item.name, "Device not loaded: {}", err),
        }
        Ok(())
    }

    /// An empty drum pad has nothing to add after, so it is hotswapped
    fn starts_in_hotswap(&self) -> bool {
        let song = self.flow.song.borrow();
        let SelectedObject::DrumPad(index) = song.view.selected_object else {
            return false;
        };
        song.selected_track()
            .and_then(|track| track.drum_pads.get(index))
            .is_some_and(|pad| pad.is_empty())
    }
}

impl Component for CreateDeviceComponent {
    fn state(&self) -> &ComponentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ComponentState {
        &mut self.state
    }

    fn on_enabled_changed(&mut self) -> Result<()> {
        self.flow.tasks.borrow_mut().kill(self.go_to_hotswap_task);
        let mode = match self.is_enabled() {
            false => None,
            true if self.starts_in_hotswap() => Some("hotswap"),
            true => Some("create"),
        };
        self.modes.set_selected_mode(mode)
    }
}
