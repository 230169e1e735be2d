//! Display lines and their data sources

use std::cell::RefCell;
use std::rc::Rc;
use unicode_width::UnicodeWidthChar;

const BLANK: &str = " ";

/// Text feeding one display segment
///
/// Shared between the component that writes it and the segment that shows
/// it, so writes appear on the line without re-binding anything.
#[derive(Debug)]
pub struct DisplayDataSource {
    text: RefCell<String>,
}

pub type DataSourceRef = Rc<DisplayDataSource>;

impl Default for DisplayDataSource {
    fn default() -> Self {
        Self {
            text: RefCell::new(BLANK.to_string()),
        }
    }
}

impl DisplayDataSource {
    pub fn new() -> DataSourceRef {
        Rc::new(Self::default())
    }

    pub fn set_display_string(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }

    pub fn display_string(&self) -> String {
        self.text.borrow().clone()
    }
}

#[derive(Debug, Default)]
pub struct DisplaySegment {
    source: Option<DataSourceRef>,
}

impl DisplaySegment {
    pub fn set_data_source(&mut self, source: Option<DataSourceRef>) {
        self.source = source;
    }

    /// Current text; an unbound segment shows a single space
    pub fn text(&self) -> String {
        self.source
            .as_ref()
            .map(|s| s.display_string())
            .unwrap_or_else(|| BLANK.to_string())
    }
}

/// One line of a multi-segment display
#[derive(Debug)]
pub struct DisplayLine {
    segments: Vec<DisplaySegment>,
    segment_width: usize,
}

impl DisplayLine {
    pub fn new(num_segments: usize, segment_width: usize) -> Self {
        let mut line = Self {
            segments: Vec::new(),
            segment_width,
        };
        line.set_num_segments(num_segments);
        line
    }

    /// Re-split the line; all segments lose their data sources
    pub fn set_num_segments(&mut self, num_segments: usize) {
        self.segments = (0..num_segments).map(|_| DisplaySegment::default()).collect();
    }

    pub fn segment_mut(&mut self, index: usize) -> Option<&mut DisplaySegment> {
        self.segments.get_mut(index)
    }

    /// The whole line as the device would show it
    pub fn render(&self) -> String {
        self.segments
            .iter()
            .map(|s| fit_to_width(&s.text(), self.segment_width))
            .collect()
    }
}

/// Truncate or pad `text` to exactly `width` terminal columns
fn fit_to_width(text: &str, width: usize) -> String {
    let mut fitted = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        fitted.push(c);
        used += w;
    }
    fitted.extend(std::iter::repeat(' ').take(width - used));
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_default_to_blank() {
        let line = DisplayLine::new(4, 3);
        assert_eq!(line.segments[2].text(), " ");
        assert_eq!(line.render(), " ".repeat(12));
    }

    #[test]
    fn test_data_source_writes_show_on_line() {
        let mut line = DisplayLine::new(2, 6);
        let source = DisplayDataSource::new();
        line.segment_mut(1).unwrap().set_data_source(Some(source.clone()));

        source.set_display_string("Bass");
        assert_eq!(line.render(), "      Bass  ");
    }

    #[test]
    fn test_render_truncates_long_text() {
        let mut line = DisplayLine::new(1, 5);
        let source = DisplayDataSource::new();
        line.segment_mut(0).unwrap().set_data_source(Some(source.clone()));

        source.set_display_string("Time Remaining:");
        assert_eq!(line.render(), "Time ");
    }

    #[test]
    fn test_wide_characters_count_double() {
        assert_eq!(fit_to_width("日本語", 5), "日本 ");
    }
}
