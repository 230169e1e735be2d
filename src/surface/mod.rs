//! Control-surface components
//!
//! Everything here talks to the host model through handles passed in at
//! construction and defers work through the shared task scheduler.

pub mod actions;
pub mod browser;
pub mod create_device;
pub mod create_track;
pub mod delete;
pub mod modes;
pub mod select;
pub mod session;

pub use browser::{BrowserComponent, HotswapComponent, LoadHandler};
pub use create_device::CreateDeviceComponent;
pub use create_track::{
    BrowserFlow, CreateDefaultTrackComponent, CreateInstrumentTrackComponent, TrackOption,
};
pub use modes::{SurfaceComponents, SurfaceMode, SurfaceModes};
pub use select::SelectionDisplay;
pub use session::SessionComponent;

use crate::action::Action;
use crate::task::TaskScheduler;
use std::cell::RefCell;
use std::rc::Rc;

pub type SchedulerRef = Rc<RefCell<TaskScheduler<Action>>>;

/// Which create flow a hotswap fallback belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotswapTarget {
    InstrumentTrack,
    Device,
}
