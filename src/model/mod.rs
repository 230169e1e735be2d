//! Host object model
//!
//! An in-memory session the surface reads and mutates:
//! - `Song` - tracks, scenes, clip slots and the selection cursor
//! - `Clip` - transport flags, loop bounds and position listeners
//! - `Browser` / `ApplicationView` - what the create flows drive

pub mod browser;
pub mod clip;
pub mod song;

pub use browser::{ApplicationView, Browser, BrowserItem, FilterType};
pub use clip::{Clip, ClipKind, ClipRef};
pub use song::{
    Chain, Device, DrumPad, HostEvent, SelectedObject, SessionLimits, SlotAddress, Song, SongRef,
    Track, TrackAddress, TrackKind,
};

use std::cell::RefCell;
use std::rc::Rc;

pub type BrowserRef = Rc<RefCell<Browser>>;
pub type ApplicationViewRef = Rc<RefCell<ApplicationView>>;

/// Errors raised by host mutations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    /// A session ceiling such as the track or scene count
    #[error("Limitation: {0}")]
    Limitation(String),

    /// A host-side failure of the operation itself
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// The object changed or disappeared since it was selected
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

pub type HostResult<T> = std::result::Result<T, HostError>;
