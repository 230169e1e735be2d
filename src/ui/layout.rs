//! Layout calculations for the UI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Main screen layout areas
pub struct SurfaceLayout {
    pub display: Rect,
    pub modes: Rect,
    pub grid: Rect,
    pub notifications: Rect,
    pub help: Rect,
}

/// Calculate centered popup area
pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_x = area.x + (area.width.saturating_sub(width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(
        popup_x,
        popup_y,
        width.min(area.width),
        height.min(area.height),
    )
}

/// Display line on top, session grid and side panel in the middle,
/// notifications and key hints at the bottom
pub fn calculate_surface_layout(area: Rect) -> SurfaceLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .split(area);

    // Session grid (70%) and mode panel (30%)
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(rows[1]);

    SurfaceLayout {
        display: rows[0],
        grid: middle[0],
        modes: middle[1],
        notifications: rows[2],
        help: rows[3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_popup_fits_inside_area() {
        let popup = centered_popup(Rect::new(10, 5, 100, 40), 40, 7);
        assert_eq!(popup, Rect::new(40, 21, 40, 7));

        let clipped = centered_popup(Rect::new(0, 0, 20, 4), 40, 7);
        assert_eq!(clipped, Rect::new(0, 0, 20, 4));
    }

    #[test]
    fn test_surface_layout_stacks_rows() {
        let layout = calculate_surface_layout(Rect::new(0, 0, 100, 40));
        assert_eq!(layout.display.height, 3);
        assert_eq!(layout.help.y, 39);
        assert_eq!(layout.grid.height, 29);
        assert_eq!(layout.grid.width + layout.modes.width, 100);
    }
}
