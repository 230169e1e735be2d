//! Browser and hotswap components
//!
//! The browser component owns the cursor into the host browser's visible
//! items. What loading an item does depends on `load_handler`, which the
//! create flows swap in while their mode is entered.

use crate::component::{Component, ComponentState};
use crate::model::{BrowserItem, BrowserRef, HostResult, SelectedObject, SongRef};
use anyhow::Result;

/// Who handles a browser load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadHandler {
    /// Load at the selected object
    #[default]
    Default,
    CreateInstrumentTrack,
    CreateDevice,
}

pub struct BrowserComponent {
    state: ComponentState,
    browser: BrowserRef,
    pub load_handler: LoadHandler,
    selected_index: usize,
    last_loaded: Option<String>,
}

impl BrowserComponent {
    pub fn new(browser: BrowserRef) -> Self {
        Self {
            state: ComponentState::with_enabled(false),
            browser,
            load_handler: LoadHandler::Default,
            selected_index: 0,
            last_loaded: None,
        }
    }

    pub fn load_handler(&self) -> LoadHandler {
        self.load_handler
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    /// Move the cursor, clamped to the visible items
    pub fn move_selection(&mut self, delta: isize) {
        let count = self.browser.borrow().visible_items().len();
        if count == 0 {
            self.selected_index = 0;
            return;
        }
        let index = self.selected_index as isize + delta;
        self.selected_index = index.clamp(0, count as isize - 1) as usize;
    }

    pub fn selected_item(&self) -> Option<BrowserItem> {
        self.browser
            .borrow()
            .visible_items()
            .get(self.selected_index)
            .map(|item| (*item).clone())
    }

    /// Name of the item loaded since the last reset
    pub fn last_loaded(&self) -> Option<&str> {
        self.last_loaded.as_deref()
    }

    pub fn remember_load(&mut self, item: &BrowserItem) {
        self.last_loaded = Some(item.name.clone());
    }

    pub fn reset_load_memory(&mut self) {
        self.last_loaded = None;
    }
}

impl Component for BrowserComponent {
    fn state(&self) -> &ComponentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ComponentState {
        &mut self.state
    }

    fn on_enabled_changed(&mut self) -> Result<()> {
        self.selected_index = 0;
        Ok(())
    }
}

/// Replaces the selected object instead of adding next to it
pub struct HotswapComponent {
    state: ComponentState,
    song: SongRef,
    target: Option<String>,
}

impl HotswapComponent {
    pub fn new(song: SongRef) -> Self {
        Self {
            state: ComponentState::with_enabled(false),
            song,
            target: None,
        }
    }

    /// Name of what the next load replaces
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Swap `item` in for the selected device, or load it at the selected
    /// track or drum pad when no device is selected
    pub fn load(&mut self, item: &BrowserItem) -> HostResult<()> {
        {
            let mut song = self.song.borrow_mut();
            let device = match song.view.selected_object {
                SelectedObject::Device(index) => song
                    .selected_track_mut()
                    .and_then(|track| track.devices.get_mut(index)),
                _ => None,
            };
            match device {
                Some(device) => device.name = item.name.clone(),
                None => song.load_item(item)?,
            }
        }
        self.refresh_target();
        Ok(())
    }

    fn refresh_target(&mut self) {
        let song = self.song.borrow();
        self.target = song.selected_track().map(|track| match song.view.selected_object {
            SelectedObject::Device(index) => track
                .devices
                .get(index)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| track.name.clone()),
            SelectedObject::DrumPad(index) => track
                .drum_pads
                .get(index)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| track.name.clone()),
            SelectedObject::Track => track.name.clone(),
        });
    }
}

impl Component for HotswapComponent {
    fn state(&self) -> &ComponentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ComponentState {
        &mut self.state
    }

    fn on_enabled_changed(&mut self) -> Result<()> {
        if self.is_enabled() {
            self.refresh_target();
            tracing::debug!(target_name = ?self.target, "hotswap started");
        } else {
            self.target = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::browser::ItemKind;
    use crate::model::{Browser, Device, FilterType, SessionLimits, Song, Track, TrackKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn item(name: &str, kind: ItemKind) -> BrowserItem {
        BrowserItem {
            name: name.to_string(),
            kind,
        }
    }

    fn browser() -> BrowserRef {
        Rc::new(RefCell::new(Browser::new(vec![
            item("Operator", ItemKind::Instrument),
            item("Reverb", ItemKind::AudioEffect),
            item("Wavetable", ItemKind::Instrument),
        ])))
    }

    #[test]
    fn test_cursor_is_clamped_to_visible_items() {
        let browser = browser();
        browser.borrow_mut().filter_type = FilterType::InstrumentHotswap;
        let mut component = BrowserComponent::new(browser);

        component.move_selection(5);
        assert_eq!(component.selected_index(), 1);
        assert_eq!(component.selected_item().unwrap().name, "Wavetable");

        component.move_selection(-3);
        assert_eq!(component.selected_item().unwrap().name, "Operator");
    }

    #[test]
    fn test_enabling_resets_cursor() {
        let mut component = BrowserComponent::new(browser());
        component.move_selection(2);
        component.set_enabled(true).unwrap();
        assert_eq!(component.selected_index(), 0);
    }

    #[test]
    fn test_load_memory() {
        let mut component = BrowserComponent::new(browser());
        component.remember_load(&item("Operator", ItemKind::Instrument));
        assert_eq!(component.last_loaded(), Some("Operator"));
        component.reset_load_memory();
        assert_eq!(component.last_loaded(), None);
    }

    #[test]
    fn test_hotswap_replaces_selected_device() {
        let mut song = Song::new(SessionLimits::default());
        let mut track = Track::new("Keys", TrackKind::Midi, 0);
        track.devices.push(Device {
            name: "Operator".to_string(),
        });
        song.add_track(track);
        song.view.selected_object = SelectedObject::Device(0);
        let song = song.into_ref();
        let mut hotswap = HotswapComponent::new(song.clone());

        hotswap.set_enabled(true).unwrap();
        assert_eq!(hotswap.target(), Some("Operator"));

        hotswap.load(&item("Wavetable", ItemKind::Instrument)).unwrap();
        assert_eq!(song.borrow().tracks[0].devices.len(), 1);
        assert_eq!(hotswap.target(), Some("Wavetable"));

        hotswap.set_enabled(false).unwrap();
        assert_eq!(hotswap.target(), None);
    }
}
