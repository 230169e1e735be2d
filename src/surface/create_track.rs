//! Track creation
//!
//! `CreateDefaultTrackComponent` creates an empty track of the chosen type.
//! `CreateInstrumentTrackComponent` runs the browser in "create" mode: each
//! load creates a MIDI track holding the loaded instrument, and after a quiet
//! delay the browser falls back to hotswapping that instrument.

use super::browser::{BrowserComponent, HotswapComponent, LoadHandler};
use super::{HotswapTarget, SchedulerRef};
use crate::action::Action;
use crate::component::{Component, ComponentState};
use crate::mode::{ModeLayer, ModeStack, SetAttributeMode};
use crate::model::{
    ApplicationViewRef, Browser, BrowserItem, BrowserRef, FilterType, HostError, SongRef,
};
use crate::notify::{message, SharedNotifier};
use crate::task::{Task, TaskDelay, TaskId};
use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOption {
    Audio,
    Midi,
    Return,
}

impl TrackOption {
    pub const ALL: [TrackOption; 3] = [TrackOption::Audio, TrackOption::Midi, TrackOption::Return];

    pub fn label(&self) -> &'static str {
        match self {
            TrackOption::Audio => "Audio",
            TrackOption::Midi => "Midi",
            TrackOption::Return => "Return",
        }
    }
}

pub struct CreateDefaultTrackComponent {
    state: ComponentState,
    song: SongRef,
    notifier: SharedNotifier,
    selected_option: Option<TrackOption>,
}

impl CreateDefaultTrackComponent {
    pub const HEADER: &'static str = "Create track:";

    pub fn new(song: SongRef, notifier: SharedNotifier) -> Self {
        Self {
            state: ComponentState::with_enabled(false),
            song,
            notifier,
            selected_option: None,
        }
    }

    pub fn selected_option(&self) -> Option<TrackOption> {
        self.selected_option
    }

    /// Create a track of the chosen type, then forget the choice
    pub fn select_option(&mut self, option: Option<TrackOption>) {
        self.selected_option = option;
        if option.is_some() {
            self.create_track();
            self.selected_option = None;
        }
    }

    fn create_track(&self) {
        let Some(option) = self.selected_option else {
            return;
        };
        let mut song = self.song.borrow_mut();
        let index = song.insert_index_after_selected();
        let result = match option {
            TrackOption::Audio => song.create_audio_track(index),
            TrackOption::Midi => song.create_midi_track(index),
            TrackOption::Return => song.create_return_track(),
        };
        drop(song);

        match result {
            Ok(index) => tracing::info!(kind = option.label(), index, "track created"),
            Err(HostError::Limitation(_)) => {
                self.notifier.expect_dialog(message::TRACK_LIMIT_REACHED)
            }
            Err(HostError::Runtime(_)) => {
                self.notifier.expect_dialog(message::MAX_RETURN_TRACKS_REACHED)
            }
            Err(err) => tracing::warn!("Track creation ignored: {}", err),
        }
    }
}

impl Component for CreateDefaultTrackComponent {
    fn state(&self) -> &ComponentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ComponentState {
        &mut self.state
    }

    fn on_enabled_changed(&mut self) -> Result<()> {
        self.selected_option = None;
        Ok(())
    }
}

/// Shared collaborators of the browser-driven create flows
#[derive(Clone)]
pub struct BrowserFlow {
    pub song: SongRef,
    pub browser: BrowserRef,
    pub application_view: ApplicationViewRef,
    pub browser_component: Rc<RefCell<BrowserComponent>>,
    pub hotswap_component: Rc<RefCell<HotswapComponent>>,
    pub notifier: SharedNotifier,
    pub tasks: SchedulerRef,
    pub hotswap_delay: TaskDelay,
}

fn load_handler_of(component: &mut BrowserComponent) -> &mut LoadHandler {
    &mut component.load_handler
}

pub(super) fn filter_type_of(browser: &mut Browser) -> &mut FilterType {
    &mut browser.filter_type
}

impl BrowserFlow {
    /// Layers shared by every "hotswap" mode
    pub(super) fn hotswap_layers(&self) -> Vec<ModeLayer> {
        vec![
            ModeLayer::component(self.hotswap_component.clone()),
            ModeLayer::component(self.browser_component.clone()),
        ]
    }

    pub(super) fn load_handler_layer(&self, handler: LoadHandler) -> ModeLayer {
        ModeLayer::behaviour(SetAttributeMode::new(
            self.browser_component.clone(),
            "load_handler",
            load_handler_of,
            handler,
        ))
    }

    pub(super) fn reset_load_memory_layer(&self) -> ModeLayer {
        let browser_component = self.browser_component.clone();
        ModeLayer::on_enter(move || {
            browser_component.borrow_mut().reset_load_memory();
            Ok(())
        })
    }

    pub(super) fn add_hotswap_task(&self, target: HotswapTarget) -> TaskId {
        self.tasks
            .borrow_mut()
            .add(Task::sequence(self.hotswap_delay, Action::GoToHotswap(target)).killed())
    }
}

pub struct CreateInstrumentTrackComponent {
    state: ComponentState,
    flow: BrowserFlow,
    modes: ModeStack,
    go_to_hotswap_task: TaskId,
}

impl CreateInstrumentTrackComponent {
    pub fn new(flow: BrowserFlow) -> Self {
        let mut modes = ModeStack::new();

        let application_view = flow.application_view.clone();
        modes.add_mode(
            "create",
            vec![
                ModeLayer::on_enter(move || {
                    let mut view = application_view.borrow_mut();
                    if view.browse_mode {
                        view.toggle_browse();
                    }
                    Ok(())
                }),
                ModeLayer::behaviour(SetAttributeMode::new(
                    flow.browser.clone(),
                    "filter_type",
                    filter_type_of,
                    FilterType::InstrumentHotswap,
                )),
                flow.load_handler_layer(LoadHandler::CreateInstrumentTrack),
                ModeLayer::component(flow.browser_component.clone()),
                flow.reset_load_memory_layer(),
            ],
        );
        modes.add_mode("hotswap", flow.hotswap_layers());

        let go_to_hotswap_task = flow.add_hotswap_task(HotswapTarget::InstrumentTrack);
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

    /// Scheduled fallback; ignored once the component has been disabled
    pub fn go_to_hotswap(&mut self) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.modes.set_selected_mode(Some("hotswap"))
    }

    /// Create a MIDI track after the selected one holding `item`
    pub fn load_item(&mut self, item: &BrowserItem) -> Result<()> {
        let mut song = self.flow.song.borrow_mut();
        let index = song.insert_index_after_selected();
        let created = song.create_midi_track(index);
        if let Err(err) = created {
            drop(song);
            match err {
                HostError::Limitation(_) => {
                    self.flow.notifier.expect_dialog(message::TRACK_LIMIT_REACHED)
                }
                err => tracing::warn!("Instrument track not created: {}", err),
            }
            return Ok(());
        }
        let loaded = song.load_item(item);
        drop(song);

        match loaded {
            Ok(()) => {
                self.flow.browser_component.borrow_mut().remember_load(item);
                self.flow.tasks.borrow_mut().restart(self.go_to_hotswap_task);
            }
            Err(err) => tracing::warn!(item = %item.name, "Instrument not loaded: {}", err),
        }
        Ok(())
    }
}

impl Component for CreateInstrumentTrackComponent {
    fn state(&self) -> &ComponentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ComponentState {
        &mut self.state
    }

    fn on_enabled_changed(&mut self) -> Result<()> {
        let mode = if self.is_enabled() { Some("create") } else { None };
        self.modes.set_selected_mode(mode)?;
        self.flow.tasks.borrow_mut().kill(self.go_to_hotswap_task);
        Ok(())
    }
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::model::browser::ItemKind;
    use crate::model::{ApplicationView, SessionLimits, Song, Track, TrackKind};
    use crate::notify::NotificationLog;
    use crate::task::{TaskScheduler, TaskState};
    use std::time::Duration;

    const TICK: Duration = Duration::from_millis(100);

    pub struct Fixture {
        pub flow: BrowserFlow,
        pub log: Rc<NotificationLog>,
    }

    impl Fixture {
        pub fn new(limits: SessionLimits) -> Self {
            let mut song = Song::new(limits);
            song.add_scene("1");
            song.add_track(Track::new("1 Audio", TrackKind::Audio, 1));
            let browser = Rc::new(RefCell::new(Browser::new(vec![
                BrowserItem {
                    name: "Operator".to_string(),
                    kind: ItemKind::Instrument,
                },
                BrowserItem {
                    name: "Reverb".to_string(),
                    kind: ItemKind::AudioEffect,
                },
                BrowserItem {
                    name: "Arpeggiator".to_string(),
                    kind: ItemKind::MidiEffect,
                },
            ])));
            let song = song.into_ref();
            let log = Rc::new(NotificationLog::default());
            let flow = BrowserFlow {
                song: song.clone(),
                browser: browser.clone(),
                application_view: Rc::new(RefCell::new(ApplicationView::default())),
                browser_component: Rc::new(RefCell::new(BrowserComponent::new(browser))),
                hotswap_component: Rc::new(RefCell::new(HotswapComponent::new(song))),
                notifier: log.clone(),
                tasks: Rc::new(RefCell::new(TaskScheduler::new())),
                hotswap_delay: TaskDelay::Ticks(3),
            };
            Self { flow, log }
        }

        /// Advance the scheduler and return what fired
        pub fn tick(&self, ticks: usize) -> Vec<Action> {
            (0..ticks)
                .flat_map(|_| self.flow.tasks.borrow_mut().tick(TICK))
                .collect()
        }

        pub fn item(&self, name: &str) -> BrowserItem {
            self.flow
                .browser
                .borrow()
                .items
                .iter()
                .find(|i| i.name == name)
                .cloned()
                .unwrap()
        }
    }

    #[test]
    fn test_default_track_created_after_selection() {
        let fixture = Fixture::new(SessionLimits::default());
        let mut create = CreateDefaultTrackComponent::new(
            fixture.flow.song.clone(),
            fixture.flow.notifier.clone(),
        );
        create.set_enabled(true).unwrap();

        create.select_option(Some(TrackOption::Midi));

        let song = fixture.flow.song.borrow();
        assert_eq!(song.tracks.len(), 2);
        assert_eq!(song.tracks[1].kind, TrackKind::Midi);
        assert_eq!(create.selected_option(), None);
    }

    #[test]
    fn test_track_limit_opens_dialog() {
        let fixture = Fixture::new(SessionLimits {
            max_tracks: 1,
            ..SessionLimits::default()
        });
        let mut create = CreateDefaultTrackComponent::new(
            fixture.flow.song.clone(),
            fixture.flow.notifier.clone(),
        );

        create.select_option(Some(TrackOption::Audio));

        let latest = fixture.log.latest().unwrap();
        assert_eq!(latest.text, message::TRACK_LIMIT_REACHED);
    }

    #[test]
    fn test_return_track_ceiling_opens_dialog() {
        let fixture = Fixture::new(SessionLimits {
            max_return_tracks: 0,
            ..SessionLimits::default()
        });
        let mut create = CreateDefaultTrackComponent::new(
            fixture.flow.song.clone(),
            fixture.flow.notifier.clone(),
        );

        create.select_option(Some(TrackOption::Return));

        let latest = fixture.log.latest().unwrap();
        assert_eq!(latest.text, message::MAX_RETURN_TRACKS_REACHED);
    }

    #[test]
    fn test_enabling_enters_create_mode() {
        let fixture = Fixture::new(SessionLimits::default());
        fixture.flow.application_view.borrow_mut().browse_mode = true;
        let mut create = CreateInstrumentTrackComponent::new(fixture.flow.clone());

        create.set_enabled(true).unwrap();

        assert_eq!(create.selected_mode(), Some("create"));
        assert!(!fixture.flow.application_view.borrow().browse_mode);
        assert_eq!(
            fixture.flow.browser.borrow().filter_type,
            FilterType::InstrumentHotswap
        );
        let browser_component = fixture.flow.browser_component.borrow();
        assert!(browser_component.is_enabled());
        assert_eq!(
            browser_component.load_handler(),
            LoadHandler::CreateInstrumentTrack
        );
    }

    #[test]
    fn test_disabling_restores_browser() {
        let fixture = Fixture::new(SessionLimits::default());
        let mut create = CreateInstrumentTrackComponent::new(fixture.flow.clone());
        create.set_enabled(true).unwrap();

        create.set_enabled(false).unwrap();

        assert_eq!(create.selected_mode(), None);
        assert_eq!(fixture.flow.browser.borrow().filter_type, FilterType::All);
        let browser_component = fixture.flow.browser_component.borrow();
        assert!(!browser_component.is_enabled());
        assert_eq!(browser_component.load_handler(), LoadHandler::Default);
    }

    #[test]
    fn test_task_is_inactive_until_a_load() {
        let fixture = Fixture::new(SessionLimits::default());
        let mut create = CreateInstrumentTrackComponent::new(fixture.flow.clone());
        create.set_enabled(true).unwrap();

        assert_eq!(
            fixture.flow.tasks.borrow().state(create.go_to_hotswap_task()),
            TaskState::Killed
        );
        assert!(fixture.tick(10).is_empty());
    }

    #[test]
    fn test_load_creates_track_and_schedules_hotswap() {
        let fixture = Fixture::new(SessionLimits::default());
        let mut create = CreateInstrumentTrackComponent::new(fixture.flow.clone());
        create.set_enabled(true).unwrap();

        create.load_item(&fixture.item("Operator")).unwrap();

        {
            let song = fixture.flow.song.borrow();
            assert_eq!(song.tracks.len(), 2);
            assert_eq!(song.tracks[1].kind, TrackKind::Midi);
            assert_eq!(song.tracks[1].devices[0].name, "Operator");
        }
        assert!(fixture.tick(2).is_empty());
        let fired = fixture.tick(1);
        assert_eq!(fired, vec![Action::GoToHotswap(HotswapTarget::InstrumentTrack)]);

        create.go_to_hotswap().unwrap();
        assert_eq!(create.selected_mode(), Some("hotswap"));
        assert!(fixture.flow.hotswap_component.borrow().is_enabled());
        assert!(fixture.flow.browser_component.borrow().is_enabled());
        assert_eq!(fixture.flow.browser.borrow().filter_type, FilterType::All);
    }

    #[test]
    fn test_each_load_restarts_the_quiet_delay() {
        let fixture = Fixture::new(SessionLimits::default());
        let mut create = CreateInstrumentTrackComponent::new(fixture.flow.clone());
        create.set_enabled(true).unwrap();

        create.load_item(&fixture.item("Operator")).unwrap();
        assert!(fixture.tick(2).is_empty());
        create.load_item(&fixture.item("Operator")).unwrap();
        assert!(fixture.tick(2).is_empty());

        assert_eq!(fixture.tick(1).len(), 1);
    }

    #[test]
    fn test_disabling_kills_pending_hotswap() {
        let fixture = Fixture::new(SessionLimits::default());
        let mut create = CreateInstrumentTrackComponent::new(fixture.flow.clone());
        create.set_enabled(true).unwrap();
        create.load_item(&fixture.item("Operator")).unwrap();

        create.set_enabled(false).unwrap();

        assert!(fixture.tick(10).is_empty());
        create.go_to_hotswap().unwrap();
        assert_eq!(create.selected_mode(), None);
    }

    #[test]
    fn test_failed_creation_does_not_schedule_hotswap() {
        let fixture = Fixture::new(SessionLimits {
            max_tracks: 1,
            ..SessionLimits::default()
        });
        let mut create = CreateInstrumentTrackComponent::new(fixture.flow.clone());
        create.set_enabled(true).unwrap();

        create.load_item(&fixture.item("Operator")).unwrap();

        assert_eq!(
            fixture.log.latest().unwrap().text,
            message::TRACK_LIMIT_REACHED
        );
        assert!(fixture.tick(10).is_empty());
    }
}
