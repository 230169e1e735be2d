//! Terminal views
//!
//! Views own their presentation state, turn key presses into Actions and
//! draw themselves. They never touch the surface directly.

pub mod help_dialog;
pub mod layout;
pub mod modal;
pub mod quit_dialog;
pub mod surface_view;

pub use help_dialog::HelpDialog;
pub use layout::centered_popup;
pub use modal::{Modal, ModalStack};
pub use quit_dialog::QuitDialog;
pub use surface_view::{draw_surface, BrowserPanel, SurfaceRenderContext};

use crate::action::Action;
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

/// Trait for terminal views
pub trait View {
    /// Handle a key press, optionally producing an Action
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Render into `area`
    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()>;
}
