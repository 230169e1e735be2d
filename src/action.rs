//! Action enum - All possible application actions
//!
//! Key presses become Actions, and so do the deferred steps the surface
//! schedules on its task scheduler. The App processes both the same way.

use crate::surface::{HotswapTarget, SurfaceMode, TrackOption};
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// One host tick: playback, notifications and scheduled tasks advance
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Force quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    /// Open quit confirmation dialog
    OpenQuitDialog,
    /// Open help dialog showing all keyboard shortcuts
    OpenHelp,
    /// Close the current modal
    CloseModal,
    /// Confirm the current modal action
    ConfirmModal,

    // ─────────────────────────────────────────────────────────────────────────
    // Session cursor
    // ─────────────────────────────────────────────────────────────────────────
    /// Move the clip cursor by whole tracks and scenes
    MoveCursor { tracks: isize, scenes: isize },
    /// Select the clip under the cursor
    SelectClip,
    /// Select the scene under the cursor
    SelectScene,
    /// Select the track under the cursor
    SelectTrack,
    /// Step to the next drum pad of the selected track and select it
    SelectDrumPad,
    /// Step to the next device of the selected track and select it
    SelectDevice,

    // ─────────────────────────────────────────────────────────────────────────
    // Hardware buttons
    // ─────────────────────────────────────────────────────────────────────────
    /// Press or release the select button
    ToggleSelectButton,
    /// Press or release the delete button
    ToggleDeleteButton,

    // ─────────────────────────────────────────────────────────────────────────
    // Clips and scenes
    // ─────────────────────────────────────────────────────────────────────────
    /// Launch or stop the clip under the cursor
    LaunchClip,
    /// Record into the slot under the cursor
    RecordClip,
    /// Delete the clip under the cursor
    DeleteClip,
    /// Delete the selected scene
    DeleteScene,
    /// Capture playing clips into a new scene
    CaptureScene,
    /// Double the loop of the detail clip
    DuplicateLoop,
    /// Clear automation of the playing clip on the selected track
    ClearEnvelope,

    // ─────────────────────────────────────────────────────────────────────────
    // Surface modes
    // ─────────────────────────────────────────────────────────────────────────
    /// Switch the top-level surface mode
    SelectMode(SurfaceMode),
    /// Step through surface modes
    CycleMode(isize),
    /// Pick a track type in create-track mode
    ChooseTrackOption(TrackOption),

    // ─────────────────────────────────────────────────────────────────────────
    // Browser
    // ─────────────────────────────────────────────────────────────────────────
    /// Move the browser cursor
    BrowserMove(isize),
    /// Load the browser item under the cursor
    LoadBrowserItem,
    /// Fallback to hotswap after a quiet delay
    GoToHotswap(HotswapTarget),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::ConfirmModal => write!(f, "ConfirmModal"),
            Action::MoveCursor { tracks, scenes } => {
                write!(f, "MoveCursor({}, {})", tracks, scenes)
            }
            Action::SelectClip => write!(f, "SelectClip"),
            Action::SelectScene => write!(f, "SelectScene"),
            Action::SelectTrack => write!(f, "SelectTrack"),
            Action::SelectDrumPad => write!(f, "SelectDrumPad"),
            Action::SelectDevice => write!(f, "SelectDevice"),
            Action::ToggleSelectButton => write!(f, "ToggleSelectButton"),
            Action::ToggleDeleteButton => write!(f, "ToggleDeleteButton"),
            Action::LaunchClip => write!(f, "LaunchClip"),
            Action::RecordClip => write!(f, "RecordClip"),
            Action::DeleteClip => write!(f, "DeleteClip"),
            Action::DeleteScene => write!(f, "DeleteScene"),
            Action::CaptureScene => write!(f, "CaptureScene"),
            Action::DuplicateLoop => write!(f, "DuplicateLoop"),
            Action::ClearEnvelope => write!(f, "ClearEnvelope"),
            Action::SelectMode(mode) => write!(f, "SelectMode({})", mode.name()),
            Action::CycleMode(delta) => write!(f, "CycleMode({})", delta),
            Action::ChooseTrackOption(option) => {
                write!(f, "ChooseTrackOption({})", option.label())
            }
            Action::BrowserMove(delta) => write!(f, "BrowserMove({})", delta),
            Action::LoadBrowserItem => write!(f, "LoadBrowserItem"),
            Action::GoToHotswap(target) => write!(f, "GoToHotswap({:?})", target),
        }
    }
}
