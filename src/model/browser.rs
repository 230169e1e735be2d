//! Browser and application view

use serde::Deserialize;

/// Which items the browser offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    All,
    InstrumentHotswap,
    AudioEffectHotswap,
    MidiEffectHotswap,
}

impl FilterType {
    pub fn accepts(&self, kind: ItemKind) -> bool {
        match self {
            FilterType::All => true,
            FilterType::InstrumentHotswap => kind == ItemKind::Instrument,
            FilterType::AudioEffectHotswap => kind == ItemKind::AudioEffect,
            FilterType::MidiEffectHotswap => kind == ItemKind::MidiEffect,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterType::All => "All",
            FilterType::InstrumentHotswap => "Instruments",
            FilterType::AudioEffectHotswap => "Audio Effects",
            FilterType::MidiEffectHotswap => "MIDI Effects",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Instrument,
    AudioEffect,
    MidiEffect,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BrowserItem {
    pub name: String,
    pub kind: ItemKind,
}

#[derive(Debug, Default)]
pub struct Browser {
    pub filter_type: FilterType,
    pub items: Vec<BrowserItem>,
}

impl Browser {
    pub fn new(items: Vec<BrowserItem>) -> Self {
        Self {
            filter_type: FilterType::All,
            items,
        }
    }

    /// Items passing the current filter, in catalogue order
    pub fn visible_items(&self) -> Vec<&BrowserItem> {
        self.items
            .iter()
            .filter(|item| self.filter_type.accepts(item.kind))
            .collect()
    }
}

/// Host window state the surface may change
#[derive(Debug, Default)]
pub struct ApplicationView {
    pub browse_mode: bool,
}

impl ApplicationView {
    pub fn toggle_browse(&mut self) {
        self.browse_mode = !self.browse_mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_limits_visible_items() {
        let mut browser = Browser::new(vec![
            BrowserItem {
                name: "Operator".to_string(),
                kind: ItemKind::Instrument,
            },
            BrowserItem {
                name: "Reverb".to_string(),
                kind: ItemKind::AudioEffect,
            },
        ]);
        assert_eq!(browser.visible_items().len(), 2);

        browser.filter_type = FilterType::InstrumentHotswap;
        let visible = browser.visible_items();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Operator");
    }
}
