//! Surface screen: display line, session grid, mode panel and notifications

use super::layout::calculate_surface_layout;
use crate::model::{Clip, SelectedObject, SlotAddress, Song};
use crate::notify::{Notification, NotificationKind};
use crate::surface::{CreateDefaultTrackComponent, SurfaceMode, TrackOption};
use anyhow::Result;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const CELL_WIDTH: usize = 14;

/// Browser state shown while a create flow runs
pub struct BrowserPanel<'a> {
    pub flow_modes: Vec<&'a str>,
    pub flow_mode: Option<&'a str>,
    pub filter: &'static str,
    pub items: Vec<&'a str>,
    pub selected: usize,
    pub hotswap_target: Option<&'a str>,
    pub last_loaded: Option<&'a str>,
    /// A create flow will fall back to hotswap unless another load comes first
    pub hotswap_pending: bool,
}

/// Header for the browser panel; the active flow mode is bracketed
fn browser_title(browser: &BrowserPanel) -> String {
    let modes: Vec<String> = browser
        .flow_modes
        .iter()
        .map(|&name| {
            if browser.flow_mode == Some(name) {
                format!("[{}]", name)
            } else {
                name.to_string()
            }
        })
        .collect();
    let modes = if modes.is_empty() { "-".to_string() } else { modes.join(" ") };
    format!("Browser ({}) · {}", modes, browser.filter)
}

/// Everything the surface screen shows
pub struct SurfaceRenderContext<'a> {
    pub display_line: &'a str,
    pub mode: Option<SurfaceMode>,
    pub song: &'a Song,
    pub cursor: SlotAddress,
    pub browser: Option<BrowserPanel<'a>>,
    pub notifications: &'a [Notification],
    pub select_pressed: bool,
    pub delete_pressed: bool,
}

pub fn draw_surface(frame: &mut Frame, area: Rect, ctx: &SurfaceRenderContext) -> Result<()> {
    let layout = calculate_surface_layout(area);

    render_display(frame, layout.display, ctx);
    render_grid(frame, layout.grid, ctx);
    render_mode_panel(frame, layout.modes, ctx);
    render_notifications(frame, layout.notifications, ctx.notifications);
    render_help_bar(frame, layout.help);
    Ok(())
}

fn render_display(frame: &mut Frame, area: Rect, ctx: &SurfaceRenderContext) {
    let button = |label: &str, pressed: bool| {
        let style = if pressed {
            Style::default().fg(Color::Black).bg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(format!(" {} ", label), style)
    };

    let paragraph = Paragraph::new(Line::from(Span::styled(
        ctx.display_line.to_string(),
        Style::default().fg(Color::Cyan),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Line::from(vec![
                Span::raw(" Display "),
                button("Select", ctx.select_pressed),
                Span::raw(" "),
                button("Delete", ctx.delete_pressed),
                Span::raw(" "),
            ])),
    );
    frame.render_widget(paragraph, area);
}

fn clip_cell(clip: Option<&Clip>) -> (String, Style) {
    let Some(clip) = clip else {
        return ("·".to_string(), Style::default().fg(Color::DarkGray));
    };
    let name = if clip.name.is_empty() { "[unnamed]" } else { clip.name.as_str() };
    let (glyph, color) = if clip.is_recording {
        ('●', Color::Red)
    } else if clip.is_playing {
        ('▶', Color::Green)
    } else if clip.is_triggered {
        ('◌', Color::Yellow)
    } else {
        ('■', Color::White)
    };
    (format!("{} {}", glyph, name), Style::default().fg(color))
}

fn fit(text: &str) -> String {
    let truncated: String = text.chars().take(CELL_WIDTH - 1).collect();
    format!("{:width$}", truncated, width = CELL_WIDTH)
}

fn render_grid(frame: &mut Frame, area: Rect, ctx: &SurfaceRenderContext) {
    let song = ctx.song;
    let selected_track = match song.view.selected_track {
        crate::model::TrackAddress::Track(index) => Some(index),
        crate::model::TrackAddress::Return(_) => None,
    };

    let mut header = vec![Span::raw(fit("Scene"))];
    for (index, track) in song.tracks.iter().enumerate() {
        let name = if track.name.is_empty() { "[unnamed]" } else { track.name.as_str() };
        let mut style = Style::default().add_modifier(Modifier::BOLD);
        if selected_track == Some(index) {
            style = style.fg(Color::Yellow);
        }
        header.push(Span::styled(fit(name), style));
    }

    let mut lines = vec![Line::from(header)];
    for (scene_index, scene) in song.scenes.iter().enumerate() {
        let scene_style = if scene_index == song.view.selected_scene {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        let name = if scene.name.is_empty() { "[unnamed]" } else { scene.name.as_str() };
        let mut spans = vec![Span::styled(fit(name), scene_style)];

        for (track_index, track) in song.tracks.iter().enumerate() {
            let clip = track.clip_slots.get(scene_index).and_then(|s| s.clip.clone());
            let borrowed = clip.as_ref().map(|c| c.borrow());
            let (text, mut style) = clip_cell(borrowed.as_deref());
            let address = SlotAddress {
                track: track_index,
                scene: scene_index,
            };
            if address == ctx.cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(fit(&text), style));
        }
        lines.push(Line::from(spans));
    }

    let returns: Vec<&str> = song.return_tracks.iter().map(|t| t.name.as_str()).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Returns: {}", returns.join(", ")),
        Style::default().fg(Color::DarkGray),
    )));

    let title = format!(" Session · {:.0} BPM ", song.tempo);
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(paragraph, area);
}

fn render_mode_panel(frame: &mut Frame, area: Rect, ctx: &SurfaceRenderContext) {
    let mut lines = Vec::new();
    for mode in SurfaceMode::ALL {
        let active = ctx.mode == Some(mode);
        let marker = if active { "▸ " } else { "  " };
        let style = if active {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(format!("{}{}", marker, mode.name()), style)));
    }
    lines.push(Line::from(""));

    if ctx.mode == Some(SurfaceMode::CreateTrack) {
        lines.push(Line::from(CreateDefaultTrackComponent::HEADER));
        let options: Vec<String> = TrackOption::ALL
            .iter()
            .zip(["a", "m", "n"])
            .map(|(option, key)| format!("[{}] {}", key, option.label()))
            .collect();
        lines.push(Line::from(options.join("  ")));
    }

    if let Some(track) = ctx.song.selected_track() {
        let object = match ctx.song.view.selected_object {
            SelectedObject::Track => "track".to_string(),
            SelectedObject::Device(index) => track
                .devices
                .get(index)
                .map(|d| format!("device {}", d.name))
                .unwrap_or_else(|| "device".to_string()),
            SelectedObject::DrumPad(index) => track
                .drum_pads
                .get(index)
                .map(|p| format!("pad {}", p.name))
                .unwrap_or_else(|| "pad".to_string()),
        };
        lines.push(Line::from(format!("Track: {} ({})", track.name, track.kind.label())));
        lines.push(Line::from(format!("Selected: {}", object)));
        let devices: Vec<&str> = track.devices.iter().map(|d| d.name.as_str()).collect();
        lines.push(Line::from(Span::styled(
            format!("Chain: {}", devices.join(" → ")),
            Style::default().fg(Color::DarkGray),
        )));
    }

    if let Some(browser) = &ctx.browser {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            browser_title(browser),
            Style::default().fg(Color::Cyan),
        )));
        if let Some(target) = browser.hotswap_target {
            lines.push(Line::from(format!("Hotswap: {}", target)));
        }
        if let Some(loaded) = browser.last_loaded {
            let suffix = if browser.hotswap_pending { " (hotswap pending)" } else { "" };
            lines.push(Line::from(format!("Loaded: {}{}", loaded, suffix)));
        }
        for (index, item) in browser.items.iter().enumerate() {
            let style = if index == browser.selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(format!(" {} ", item), style)));
        }
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Modes "));
    frame.render_widget(paragraph, area);
}

fn render_notifications(frame: &mut Frame, area: Rect, notifications: &[Notification]) {
    let lines: Vec<Line> = notifications
        .iter()
        .rev()
        .map(|n| {
            let (tag, color) = match n.kind {
                NotificationKind::Dialog => ("dialog", Color::Red),
                NotificationKind::Notification => ("info", Color::Green),
            };
            Line::from(vec![
                Span::styled(
                    format!("{} ", n.timestamp.format("%H:%M:%S")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{:7}", tag), Style::default().fg(color)),
                Span::raw(n.text.clone()),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Notifications "));
    frame.render_widget(paragraph, area);
}

fn render_help_bar(frame: &mut Frame, area: Rect) {
    let hints = [
        ("←↑↓→", "cursor"),
        ("s", "select"),
        ("space", "launch"),
        ("1-4", "mode"),
        ("Enter", "load"),
        ("?", "help"),
        ("q", "quit"),
    ];
    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{} ", label),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClipKind;

    #[test]
    fn test_clip_cells() {
        assert_eq!(clip_cell(None).0, "·");

        let mut clip = Clip::new("", ClipKind::Midi);
        assert_eq!(clip_cell(Some(&clip)).0, "■ [unnamed]");

        clip.name = "Hook".to_string();
        clip.is_playing = true;
        assert_eq!(clip_cell(Some(&clip)).0, "▶ Hook");

        clip.is_recording = true;
        assert_eq!(clip_cell(Some(&clip)).0, "● Hook");
    }

    #[test]
    fn test_browser_title_marks_active_flow_mode() {
        let mut panel = BrowserPanel {
            flow_modes: vec!["create", "hotswap"],
            flow_mode: Some("hotswap"),
            filter: "Instruments",
            items: Vec::new(),
            selected: 0,
            hotswap_target: None,
            last_loaded: None,
            hotswap_pending: false,
        };
        assert_eq!(browser_title(&panel), "Browser (create [hotswap]) · Instruments");

        panel.flow_modes.clear();
        assert_eq!(browser_title(&panel), "Browser (-) · Instruments");
    }

    #[test]
    fn test_fit_pads_and_truncates() {
        assert_eq!(fit("Bass").len(), CELL_WIDTH);
        assert_eq!(fit("A very long track name").trim_end(), "A very long t");
    }
}
