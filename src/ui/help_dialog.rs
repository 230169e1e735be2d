//! Help dialog
//!
//! Lists the keys that stand in for the hardware controls.

use super::View;
use crate::action::Action;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

#[derive(Default)]
pub struct HelpDialog {
    pub scroll_offset: usize,
}

impl View for HelpDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Some(Action::CloseModal),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                None
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_add(10);
                None
            }
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        frame.render_widget(Clear, area);

        let margin = 4;
        let dialog_area = Rect::new(
            area.x + margin,
            area.y + margin,
            area.width.saturating_sub(margin * 2),
            area.height.saturating_sub(margin * 2),
        );

        let content = build_help_content();
        let total = content.len();
        let visible_height = dialog_area.height.saturating_sub(2) as usize;

        let max_scroll = total.saturating_sub(visible_height);
        self.scroll_offset = self.scroll_offset.min(max_scroll);

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Keyboard Shortcuts ")
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .scroll((self.scroll_offset as u16, 0));

        frame.render_widget(paragraph, dialog_area);

        if total > visible_height {
            let mut scrollbar_state =
                ScrollbarState::new(max_scroll).position(self.scroll_offset);

            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                dialog_area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Session",
        &[
            ("← ↑ ↓ →", "Move the clip cursor and select the clip"),
            ("c", "Select the scene under the cursor"),
            ("t", "Select the track under the cursor"),
            ("p", "Select the next drum pad"),
            ("v", "Select the next device"),
            ("s", "Press / release the select button"),
            ("space", "Launch or stop the clip"),
            ("r", "Record into the slot"),
        ],
    ),
    (
        "Actions",
        &[
            ("i", "Capture and insert scene"),
            ("l", "Duplicate loop"),
            ("x", "Delete selected clip"),
            ("X", "Delete selected scene"),
            ("d", "Press / release the delete button"),
            ("e", "Delete automation of the playing clip"),
        ],
    ),
    (
        "Modes",
        &[
            ("1", "Session"),
            ("2", "Create track"),
            ("3", "Create instrument track"),
            ("4", "Create device"),
            ("Tab / BackTab", "Cycle modes"),
            ("a / m / n", "Audio / MIDI / return track (create track)"),
            ("j / k", "Move the browser cursor"),
            ("Enter", "Load the browser item"),
        ],
    ),
    (
        "General",
        &[
            ("?", "Toggle this help"),
            ("q", "Quit"),
            ("Ctrl+C", "Quit immediately"),
        ],
    ),
];

fn build_help_content() -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (title, shortcuts) in SECTIONS {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {} ", title),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {}", "─".repeat(title.len() + 2)),
            Style::default().fg(Color::DarkGray),
        )));
        for (key, description) in shortcuts.iter() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:14}", key),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::styled(description.to_string(), Style::default().fg(Color::White)),
            ]));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_scroll_keys() {
        let mut dialog = HelpDialog::default();
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);

        dialog.handle_key_event(key(KeyCode::PageDown)).unwrap();
        dialog.handle_key_event(key(KeyCode::Up)).unwrap();
        assert_eq!(dialog.scroll_offset, 9);
        assert_eq!(
            dialog.handle_key_event(key(KeyCode::Char('?'))).unwrap(),
            Some(Action::CloseModal)
        );
    }

    #[test]
    fn test_content_has_every_section() {
        let content = build_help_content();
        let shortcuts: usize = SECTIONS.iter().map(|(_, s)| s.len()).sum();
        assert_eq!(content.len(), SECTIONS.len() * 3 + shortcuts);
    }
}
