//! Root application
//!
//! The App owns the simulated host (song, browser, application view), the
//! surface components and the shared task scheduler. It turns key presses
//! into Actions, runs the host tick, and draws. App is intentionally lean:
//! what a gesture means is decided by the surface components.

use crate::action::Action;
use crate::component::Component;
use crate::config::Config;
use crate::hardware::{Button, ButtonRef, DisplayLine};
use crate::model::{
    ApplicationView, Browser, BrowserRef, HostError, HostEvent, SelectedObject, SlotAddress,
    SongRef, TrackAddress,
};
use crate::notify::NotificationLog;
use crate::services::{self, Session};
use crate::surface::{
    BrowserComponent, BrowserFlow, CreateDefaultTrackComponent, CreateDeviceComponent,
    CreateInstrumentTrackComponent, HotswapComponent, HotswapTarget, LoadHandler,
    SchedulerRef, SelectionDisplay, SessionComponent, SurfaceComponents, SurfaceMode,
    SurfaceModes, TrackOption,
};
use crate::task::TaskScheduler;
use crate::ui::{
    draw_surface, BrowserPanel, HelpDialog, Modal, ModalStack, QuitDialog, SurfaceRenderContext,
    View,
};
use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{layout::Rect, Frame};
use std::cell::RefCell;
use std::rc::Rc;

const NOTIFICATIONS_SHOWN: usize = 20;

/// Value a pressed hardware button sends
const PRESSED: u8 = 127;

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates the host and the surface
pub struct App {
    pub config: Config,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Clip slot the arrow keys point at
    pub cursor: SlotAddress,

    // ─────────────────────────────────────────────────────────────────────────
    // Host
    // ─────────────────────────────────────────────────────────────────────────
    pub song: SongRef,
    pub browser: BrowserRef,
    pub notifications: Rc<NotificationLog>,
    pub tasks: SchedulerRef,

    // ─────────────────────────────────────────────────────────────────────────
    // Hardware
    // ─────────────────────────────────────────────────────────────────────────
    pub select_button: ButtonRef,
    pub delete_button: ButtonRef,
    pub display_line: DisplayLine,

    // ─────────────────────────────────────────────────────────────────────────
    // Surface
    // ─────────────────────────────────────────────────────────────────────────
    pub modes: SurfaceModes,
    pub session: Rc<RefCell<SessionComponent>>,
    pub create_track: Rc<RefCell<CreateDefaultTrackComponent>>,
    pub create_instrument: Rc<RefCell<CreateInstrumentTrackComponent>>,
    pub create_device: Rc<RefCell<CreateDeviceComponent>>,
    pub browser_component: Rc<RefCell<BrowserComponent>>,
    pub hotswap_component: Rc<RefCell<HotswapComponent>>,

    // ─────────────────────────────────────────────────────────────────────────
    // Dialogs
    // ─────────────────────────────────────────────────────────────────────────
    pub quit_dialog: QuitDialog,
    pub help_dialog: HelpDialog,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Initialization
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    /// Load the configured session (or the demo) and wire the surface to it
    pub fn new(config: Config) -> Result<Self> {
        let limits = config.limits();
        let Session {
            song,
            browser_items,
        } = match &config.session_file {
            Some(path) => services::load_session(path, limits)?,
            None => services::demo_session(limits)?,
        };
        tracing::info!(
            tracks = song.tracks.len(),
            scenes = song.scenes.len(),
            "session loaded"
        );

        let song = song.into_ref();
        let browser: BrowserRef = Rc::new(RefCell::new(Browser::new(browser_items)));
        let notifications = Rc::new(NotificationLog::default());
        let tasks: SchedulerRef = Rc::new(RefCell::new(TaskScheduler::new()));

        let select_button = Button::new("Select");
        let delete_button = Button::new("Delete");
        let mut display_line = DisplayLine::new(
            SelectionDisplay::NUM_SEGMENTS,
            config.display_segment_width,
        );

        let session = Rc::new(RefCell::new(SessionComponent::new(
            song.clone(),
            notifications.clone(),
        )?));
        {
            let mut session = session.borrow_mut();
            session.select().set_display_line(Some(&mut display_line));
            session.select_mut().set_select_button(Some(&select_button));
            session
                .delete_mut()
                .set_delete_button(Some(delete_button.clone()));
        }

        let browser_component = Rc::new(RefCell::new(BrowserComponent::new(browser.clone())));
        let hotswap_component = Rc::new(RefCell::new(HotswapComponent::new(song.clone())));
        let flow = BrowserFlow {
            song: song.clone(),
            browser: browser.clone(),
            application_view: Rc::new(RefCell::new(ApplicationView::default())),
            browser_component: browser_component.clone(),
            hotswap_component: hotswap_component.clone(),
            notifier: notifications.clone(),
            tasks: tasks.clone(),
            hotswap_delay: config.hotswap_delay(),
        };

        let create_track = Rc::new(RefCell::new(CreateDefaultTrackComponent::new(
            song.clone(),
            notifications.clone(),
        )));
        let create_instrument = Rc::new(RefCell::new(CreateInstrumentTrackComponent::new(
            flow.clone(),
        )));
        let create_device = Rc::new(RefCell::new(CreateDeviceComponent::new(flow)));

        let mut modes = SurfaceModes::new(SurfaceComponents {
            session: session.clone(),
            create_track: create_track.clone(),
            create_instrument: create_instrument.clone(),
            create_device: create_device.clone(),
        });
        modes
            .select(Some(SurfaceMode::Session))
            .context("Failed to start in session mode")?;

        Ok(Self {
            config,
            modals: ModalStack::new(),
            should_quit: false,
            cursor: SlotAddress { track: 0, scene: 0 },
            song,
            browser,
            notifications,
            tasks,
            select_button,
            delete_button,
            display_line,
            modes,
            session,
            create_track,
            create_instrument,
            create_device,
            browser_component,
            hotswap_component,
            quit_dialog: QuitDialog,
            help_dialog: HelpDialog::default(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Event Loop
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::ForceQuit));
        }
        if let Some(modal) = self.modals.top().cloned() {
            return self.handle_modal_key_event(&modal, key);
        }

        let action = match key.code {
            KeyCode::Left => Some(Action::MoveCursor { tracks: -1, scenes: 0 }),
            KeyCode::Right => Some(Action::MoveCursor { tracks: 1, scenes: 0 }),
            KeyCode::Up => Some(Action::MoveCursor { tracks: 0, scenes: -1 }),
            KeyCode::Down => Some(Action::MoveCursor { tracks: 0, scenes: 1 }),
            KeyCode::Char('c') => Some(Action::SelectScene),
            KeyCode::Char('t') => Some(Action::SelectTrack),
            KeyCode::Char('p') => Some(Action::SelectDrumPad),
            KeyCode::Char('v') => Some(Action::SelectDevice),
            KeyCode::Char('s') => Some(Action::ToggleSelectButton),
            KeyCode::Char('d') => Some(Action::ToggleDeleteButton),
            KeyCode::Char(' ') => Some(Action::LaunchClip),
            KeyCode::Char('r') => Some(Action::RecordClip),
            KeyCode::Char('x') => Some(Action::DeleteClip),
            KeyCode::Char('X') => Some(Action::DeleteScene),
            KeyCode::Char('i') => Some(Action::CaptureScene),
            KeyCode::Char('l') => Some(Action::DuplicateLoop),
            KeyCode::Char('e') => Some(Action::ClearEnvelope),
            KeyCode::Char('1') => Some(Action::SelectMode(SurfaceMode::Session)),
            KeyCode::Char('2') => Some(Action::SelectMode(SurfaceMode::CreateTrack)),
            KeyCode::Char('3') => Some(Action::SelectMode(SurfaceMode::CreateInstrument)),
            KeyCode::Char('4') => Some(Action::SelectMode(SurfaceMode::CreateDevice)),
            KeyCode::Tab => Some(Action::CycleMode(1)),
            KeyCode::BackTab => Some(Action::CycleMode(-1)),
            KeyCode::Char('a') => Some(Action::ChooseTrackOption(TrackOption::Audio)),
            KeyCode::Char('m') => Some(Action::ChooseTrackOption(TrackOption::Midi)),
            KeyCode::Char('n') => Some(Action::ChooseTrackOption(TrackOption::Return)),
            KeyCode::Char('j') => Some(Action::BrowserMove(1)),
            KeyCode::Char('k') => Some(Action::BrowserMove(-1)),
            KeyCode::Enter => Some(Action::LoadBrowserItem),
            KeyCode::Char('?') => Some(Action::OpenHelp),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::OpenQuitDialog),
            _ => None,
        };
        Ok(action)
    }

    /// Run `action` and every follow-up it produces
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        let mut current_action = Some(action);
        while let Some(a) = current_action {
            current_action = self.update(a)?;
        }
        Ok(())
    }

    pub fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => self.tick(),
            Action::ForceQuit => {
                self.should_quit = true;
            }
            Action::Resize(_, _) => {}

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => self.modals.push(Modal::QuitConfirm),
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.modals.push(Modal::Help);
            }
            Action::CloseModal => {
                self.modals.pop();
            }
            Action::ConfirmModal => {
                if self.modals.pop() == Some(Modal::QuitConfirm) {
                    self.should_quit = true;
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Selection
            // ─────────────────────────────────────────────────────────────────
            Action::MoveCursor { tracks, scenes } => {
                self.cursor.track = self.cursor.track.saturating_add_signed(tracks);
                self.cursor.scene = self.cursor.scene.saturating_add_signed(scenes);
                self.clamp_cursor();
                return Ok(Some(Action::SelectClip));
            }
            Action::SelectClip => {
                self.clamp_cursor();
                if self.selection_active() {
                    self.session
                        .borrow_mut()
                        .select_mut()
                        .on_select_clip(Some(self.cursor))?;
                }
            }
            Action::SelectScene => self.select_scene()?,
            Action::SelectTrack => self.select_track()?,
            Action::SelectDrumPad => self.select_drum_pad()?,
            Action::SelectDevice => self.select_device(),

            // ─────────────────────────────────────────────────────────────────
            // Hardware buttons
            // ─────────────────────────────────────────────────────────────────
            Action::ToggleSelectButton => {
                let value = toggled_value(&self.select_button);
                let listeners = self.select_button.borrow_mut().send_value(value);
                let mut session = self.session.borrow_mut();
                for listener in listeners {
                    session.select_mut().on_select_value(listener, value)?;
                }
            }
            Action::ToggleDeleteButton => {
                let value = toggled_value(&self.delete_button);
                self.delete_button.borrow_mut().send_value(value);
            }

            // ─────────────────────────────────────────────────────────────────
            // Clips and scenes
            // ─────────────────────────────────────────────────────────────────
            Action::LaunchClip => {
                let launched = self.song.borrow_mut().launch_clip(self.cursor);
                if let Err(err) = launched {
                    report_host_error("launch clip", err);
                }
            }
            Action::RecordClip => {
                let recording = self.song.borrow_mut().record_clip(self.cursor);
                match recording {
                    Ok(()) => return Ok(Some(Action::SelectClip)),
                    Err(err) => report_host_error("record clip", err),
                }
            }
            Action::DeleteClip => {
                self.song.borrow_mut().set_highlighted_clip_slot(self.cursor);
                self.session.borrow().delete_selected_clip();
                return Ok(Some(Action::SelectClip));
            }
            Action::DeleteScene => {
                self.session.borrow().delete_selected_scene();
                self.clamp_cursor();
            }
            Action::CaptureScene => self.session.borrow().capture_scene(),
            Action::DuplicateLoop => {
                self.song.borrow_mut().set_highlighted_clip_slot(self.cursor);
                self.session.borrow().duplicate_loop();
            }
            Action::ClearEnvelope => self.clear_envelope(),

            // ─────────────────────────────────────────────────────────────────
            // Surface modes
            // ─────────────────────────────────────────────────────────────────
            Action::SelectMode(mode) => self.modes.select(Some(mode))?,
            Action::CycleMode(delta) => self.modes.cycle(delta)?,
            Action::ChooseTrackOption(option) => {
                let mut create_track = self.create_track.borrow_mut();
                if create_track.is_enabled() {
                    create_track.select_option(Some(option));
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Browser
            // ─────────────────────────────────────────────────────────────────
            Action::BrowserMove(delta) => {
                let mut browser_component = self.browser_component.borrow_mut();
                if browser_component.is_enabled() {
                    browser_component.move_selection(delta);
                }
            }
            Action::LoadBrowserItem => self.load_browser_item()?,
            Action::GoToHotswap(target) => match target {
                HotswapTarget::InstrumentTrack => {
                    self.create_instrument.borrow_mut().go_to_hotswap()?
                }
                HotswapTarget::Device => self.create_device.borrow_mut().go_to_hotswap()?,
            },
        }

        Ok(None)
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        {
            let song = self.song.borrow();
            let browser = self.browser.borrow();
            let browser_component = self.browser_component.borrow();
            let hotswap_component = self.hotswap_component.borrow();
            let create_instrument = self.create_instrument.borrow();
            let create_device = self.create_device.borrow();
            let display_line = self.display_line.render();
            let notifications = self.notifications.recent(NOTIFICATIONS_SHOWN);
            let mode = self.modes.selected();

            let tasks = self.tasks.borrow();
            let (flow_modes, flow_mode, hotswap_pending) = match mode {
                Some(SurfaceMode::CreateInstrument) => (
                    create_instrument.mode_names().collect(),
                    create_instrument.selected_mode(),
                    tasks.is_pending(create_instrument.go_to_hotswap_task()),
                ),
                Some(SurfaceMode::CreateDevice) => (
                    create_device.mode_names().collect(),
                    create_device.selected_mode(),
                    tasks.is_pending(create_device.go_to_hotswap_task()),
                ),
                _ => (Vec::new(), None, false),
            };
            let browser_panel = browser_component.is_enabled().then(|| BrowserPanel {
                flow_modes,
                flow_mode,
                filter: browser.filter_type.name(),
                items: browser
                    .visible_items()
                    .into_iter()
                    .map(|item| item.name.as_str())
                    .collect(),
                selected: browser_component.selected_index(),
                hotswap_target: hotswap_component.target(),
                last_loaded: browser_component.last_loaded(),
                hotswap_pending,
            });

            let ctx = SurfaceRenderContext {
                display_line: &display_line,
                mode,
                song: &song,
                cursor: self.cursor,
                browser: browser_panel,
                notifications: &notifications,
                select_pressed: self.select_button.borrow().is_pressed(),
                delete_pressed: self.delete_button.borrow().is_pressed(),
            };
            draw_surface(frame, area, &ctx)?;
        }

        // Draw modal overlay if active
        if let Some(modal) = self.modals.top().cloned() {
            self.draw_modal(frame, area, &modal)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helper Methods
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    /// One host tick: playback, position notifications, then due tasks
    fn tick(&mut self) {
        let elapsed = self.config.tick_rate();

        let events = {
            let mut song = self.song.borrow_mut();
            song.advance(elapsed);
            song.take_events()
        };
        {
            let mut session = self.session.borrow_mut();
            for event in events {
                match event {
                    HostEvent::PlayingPositionChanged(listener) => {
                        session.select_mut().on_playing_position_changed(listener)
                    }
                }
            }
        }

        let fired = self.tasks.borrow_mut().tick(elapsed);
        for action in fired {
            tracing::debug!(%action, "task fired");
            if let Err(err) = self.dispatch(action) {
                tracing::error!(%action, "Scheduled action failed: {:#}", err);
            }
        }
    }

    fn selection_active(&self) -> bool {
        self.session.borrow().select().is_enabled()
    }

    /// Keep the cursor on the grid after moves and deletions
    fn clamp_cursor(&mut self) {
        let song = self.song.borrow();
        self.cursor.track = self.cursor.track.min(song.tracks.len().saturating_sub(1));
        self.cursor.scene = self.cursor.scene.min(song.scenes.len().saturating_sub(1));
    }

    fn select_scene(&mut self) -> Result<()> {
        let scene = self.cursor.scene;
        if self.selection_active() {
            self.session
                .borrow_mut()
                .select_mut()
                .on_select_scene(Some(scene))?;
        } else {
            let mut song = self.song.borrow_mut();
            if scene < song.scenes.len() {
                song.view.selected_scene = scene;
            }
        }
        Ok(())
    }

    fn select_track(&mut self) -> Result<()> {
        let track = {
            let mut song = self.song.borrow_mut();
            let track = (self.cursor.track < song.tracks.len()).then_some(self.cursor.track);
            if let Some(index) = track {
                song.select_track(TrackAddress::Track(index));
            }
            track
        };
        if self.selection_active() {
            self.session.borrow_mut().select_mut().on_select_track(track)?;
        }
        Ok(())
    }

    /// Step through the drum pads of the selected track
    fn select_drum_pad(&mut self) -> Result<()> {
        let pad = {
            let mut song = self.song.borrow_mut();
            let count = song.selected_track().map_or(0, |t| t.drum_pads.len());
            let pad = (count > 0).then(|| match song.view.selected_object {
                SelectedObject::DrumPad(index) => (index + 1) % count,
                _ => 0,
            });
            if let Some(index) = pad {
                song.select_object(SelectedObject::DrumPad(index));
            }
            pad
        };
        if self.selection_active() {
            self.session.borrow_mut().select_mut().on_select_drum_pad(pad)?;
        }
        Ok(())
    }

    /// Step through the devices of the selected track, then back to the track
    fn select_device(&mut self) {
        let mut song = self.song.borrow_mut();
        let count = song.selected_track().map_or(0, |t| t.devices.len());
        let object = match song.view.selected_object {
            SelectedObject::Device(index) if index + 1 < count => SelectedObject::Device(index + 1),
            SelectedObject::Device(_) => SelectedObject::Track,
            _ if count > 0 => SelectedObject::Device(0),
            _ => SelectedObject::Track,
        };
        song.select_object(object);
    }

    /// Delete the first automation of the playing clip while delete is held
    fn clear_envelope(&mut self) {
        let session = self.session.borrow();
        if !session.is_enabled() || !session.delete().is_deleting() {
            tracing::debug!("hold delete to clear automation");
            return;
        }
        let parameter = {
            let song = self.song.borrow();
            song.selected_track()
                .and_then(|track| {
                    let index = track.playing_slot_index()?;
                    track.clip_slots[index].clip.clone()
                })
                .and_then(|clip| clip.borrow().envelopes.first().cloned())
        };
        if let Some(parameter) = parameter {
            session.delete().delete_clip_envelope(&parameter);
        }
    }

    /// Hand the browser item under the cursor to the active load handler
    fn load_browser_item(&mut self) -> Result<()> {
        let (handler, item) = {
            let browser_component = self.browser_component.borrow();
            if !browser_component.is_enabled() {
                return Ok(());
            }
            (
                browser_component.load_handler(),
                browser_component.selected_item(),
            )
        };
        let Some(item) = item else {
            return Ok(());
        };
        tracing::debug!(item = %item.name, ?handler, "browser load");

        match handler {
            LoadHandler::CreateInstrumentTrack => {
                self.create_instrument.borrow_mut().load_item(&item)?
            }
            LoadHandler::CreateDevice => self.create_device.borrow_mut().load_item(&item)?,
            LoadHandler::Default => {
                let hotswapping = self.hotswap_component.borrow().is_enabled();
                let loaded = if hotswapping {
                    self.hotswap_component.borrow_mut().load(&item)
                } else {
                    self.song.borrow_mut().load_item(&item)
                };
                match loaded {
                    Ok(()) => self.browser_component.borrow_mut().remember_load(&item),
                    Err(err) => report_host_error("load item", err),
                }
            }
        }
        Ok(())
    }

    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.handle_key_event(key),
            Modal::Help => self.help_dialog.handle_key_event(key),
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.draw(frame, area)?,
            Modal::Help => self.help_dialog.draw(frame, area)?,
        }
        Ok(())
    }
}

fn toggled_value(button: &ButtonRef) -> u8 {
    if button.borrow().is_pressed() {
        0
    } else {
        PRESSED
    }
}

fn report_host_error(operation: &str, err: HostError) {
    match err {
        HostError::InvalidReference(_) => tracing::debug!(operation, "ignored: {}", err),
        err => tracing::warn!(operation, "host refused: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FilterType;
    use crate::task::TaskState;

    fn app() -> App {
        App::new(Config {
            hotswap_delay_ticks: 2,
            ..Config::default()
        })
        .unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn display(app: &App) -> String {
        app.display_line.render()
    }

    #[test]
    fn test_starts_in_session_mode() {
        let app = app();
        assert_eq!(app.modes.selected(), Some(SurfaceMode::Session));
        assert!(app.session.borrow().is_enabled());
        assert!(!app.create_instrument.borrow().is_enabled());
        assert!(display(&app).trim().is_empty());
    }

    #[test]
    fn test_moving_the_cursor_selects_the_clip() {
        let mut app = app();
        let follow_up = app
            .update(Action::MoveCursor { tracks: 1, scenes: 1 })
            .unwrap();
        assert_eq!(follow_up, Some(Action::SelectClip));
        app.dispatch(Action::SelectClip).unwrap();

        let line = display(&app);
        assert!(line.contains("Clip Selection:"));
        assert!(line.contains("Walking"));
        assert_eq!(
            app.song.borrow().view.highlighted_clip_slot,
            Some(SlotAddress { track: 1, scene: 1 })
        );
    }

    #[test]
    fn test_cursor_stays_on_the_grid() {
        let mut app = app();
        app.dispatch(Action::MoveCursor {
            tracks: -3,
            scenes: 99,
        })
        .unwrap();
        assert_eq!(app.cursor, SlotAddress { track: 0, scene: 3 });
    }

    #[test]
    fn test_playing_clip_shows_time_remaining() {
        let mut app = app();
        app.dispatch(Action::MoveCursor { tracks: 1, scenes: 1 })
            .unwrap();
        app.dispatch(Action::LaunchClip).unwrap();
        app.dispatch(Action::Tick).unwrap();

        let line = display(&app);
        assert!(line.contains("Time Remaining:"));
        assert!(line.contains("0:07"));
    }

    #[test]
    fn test_releasing_select_blanks_the_display() {
        let mut app = app();
        app.dispatch(Action::ToggleSelectButton).unwrap();
        app.dispatch(Action::SelectClip).unwrap();
        assert!(!display(&app).trim().is_empty());

        app.dispatch(Action::ToggleSelectButton).unwrap();
        assert!(display(&app).trim().is_empty());
        assert!(app.session.borrow().select().selected_clip().is_none());
    }

    #[test]
    fn test_leaving_session_blanks_the_display() {
        let mut app = app();
        app.dispatch(Action::MoveCursor { tracks: 1, scenes: 1 })
            .unwrap();
        app.dispatch(Action::LaunchClip).unwrap();
        app.dispatch(Action::Tick).unwrap();
        assert!(display(&app).contains("Time Remaining:"));

        app.dispatch(Action::SelectMode(SurfaceMode::CreateInstrument))
            .unwrap();
        assert!(display(&app).trim().is_empty());
        assert!(app.session.borrow().select().selected_clip().is_none());

        // playback keeps going but nothing is listening any more
        app.dispatch(Action::Tick).unwrap();
        assert!(display(&app).trim().is_empty());
    }

    #[test]
    fn test_create_instrument_falls_back_to_hotswap() {
        let mut app = app();
        app.dispatch(Action::SelectMode(SurfaceMode::CreateInstrument))
            .unwrap();
        assert_eq!(app.create_instrument.borrow().selected_mode(), Some("create"));
        assert_eq!(
            app.browser.borrow().filter_type,
            FilterType::InstrumentHotswap
        );

        app.dispatch(Action::LoadBrowserItem).unwrap();
        assert_eq!(app.song.borrow().tracks.len(), 5);
        assert_eq!(app.song.borrow().tracks[1].devices[0].name, "Operator");

        app.dispatch(Action::Tick).unwrap();
        assert_eq!(app.create_instrument.borrow().selected_mode(), Some("create"));
        app.dispatch(Action::Tick).unwrap();
        assert_eq!(app.create_instrument.borrow().selected_mode(), Some("hotswap"));
        assert!(app.hotswap_component.borrow().is_enabled());
        assert_eq!(app.browser.borrow().filter_type, FilterType::All);
    }

    #[test]
    fn test_leaving_create_mode_cancels_the_fallback() {
        let mut app = app();
        app.dispatch(Action::SelectMode(SurfaceMode::CreateInstrument))
            .unwrap();
        app.dispatch(Action::LoadBrowserItem).unwrap();
        app.dispatch(Action::SelectMode(SurfaceMode::Session))
            .unwrap();

        for _ in 0..5 {
            app.dispatch(Action::Tick).unwrap();
        }
        assert_eq!(app.create_instrument.borrow().selected_mode(), None);
        assert!(!app.hotswap_component.borrow().is_enabled());
        let task = app.create_instrument.borrow().go_to_hotswap_task();
        assert_eq!(app.tasks.borrow().state(task), TaskState::Killed);
    }

    #[test]
    fn test_track_options_only_apply_in_create_track_mode() {
        let mut app = app();
        app.dispatch(Action::ChooseTrackOption(TrackOption::Audio))
            .unwrap();
        assert_eq!(app.song.borrow().tracks.len(), 4);

        app.dispatch(Action::SelectMode(SurfaceMode::CreateTrack))
            .unwrap();
        app.dispatch(Action::ChooseTrackOption(TrackOption::Return))
            .unwrap();
        assert_eq!(app.song.borrow().return_tracks.len(), 3);
    }

    #[test]
    fn test_drum_pads_cycle() {
        let mut app = app();
        app.dispatch(Action::SelectTrack).unwrap();
        app.dispatch(Action::SelectDrumPad).unwrap();
        app.dispatch(Action::SelectDrumPad).unwrap();
        assert_eq!(
            app.song.borrow().view.selected_object,
            SelectedObject::DrumPad(1)
        );
        assert!(display(&app).contains("Snare"));
    }

    #[test]
    fn test_quit_needs_confirmation() {
        let mut app = app();
        let action = app.handle_key_event(key(KeyCode::Char('q'))).unwrap();
        assert_eq!(action, Some(Action::OpenQuitDialog));
        app.dispatch(Action::OpenQuitDialog).unwrap();

        // Keys go to the dialog while it is open
        let action = app.handle_key_event(key(KeyCode::Char('y'))).unwrap();
        assert_eq!(action, Some(Action::ConfirmModal));
        app.dispatch(Action::ConfirmModal).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_bypasses_dialogs() {
        let mut app = app();
        app.dispatch(Action::OpenHelp).unwrap();
        let action = app
            .handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(action, Some(Action::ForceQuit));
    }
}
