//! Top-level surface modes
//!
//! Exactly one of the surface's main components is enabled at a time; the
//! others are disabled by leaving their mode.

use crate::component::Component;
use crate::mode::{ModeLayer, ModeStack};
use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMode {
    Session,
    CreateTrack,
    CreateInstrument,
    CreateDevice,
}

impl SurfaceMode {
    pub const ALL: [SurfaceMode; 4] = [
        SurfaceMode::Session,
        SurfaceMode::CreateTrack,
        SurfaceMode::CreateInstrument,
        SurfaceMode::CreateDevice,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SurfaceMode::Session => "session",
            SurfaceMode::CreateTrack => "create_track",
            SurfaceMode::CreateInstrument => "create_instrument",
            SurfaceMode::CreateDevice => "create_device",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.name() == name)
    }
}

/// The components each surface mode enables
pub struct SurfaceComponents {
    pub session: Rc<RefCell<dyn Component>>,
    pub create_track: Rc<RefCell<dyn Component>>,
    pub create_instrument: Rc<RefCell<dyn Component>>,
    pub create_device: Rc<RefCell<dyn Component>>,
}

pub struct SurfaceModes {
    stack: ModeStack,
}

impl SurfaceModes {
    pub fn new(components: SurfaceComponents) -> Self {
        let mut stack = ModeStack::new();
        let SurfaceComponents {
            session,
            create_track,
            create_instrument,
            create_device,
        } = components;
        for (mode, component) in SurfaceMode::ALL.into_iter().zip([
            session,
            create_track,
            create_instrument,
            create_device,
        ]) {
            stack.add_mode(mode.name(), vec![ModeLayer::component(component)]);
        }
        Self { stack }
    }

    pub fn selected(&self) -> Option<SurfaceMode> {
        self.stack.entered_mode().and_then(SurfaceMode::from_name)
    }

    pub fn select(&mut self, mode: Option<SurfaceMode>) -> Result<()> {
        self.stack.set_selected_mode(mode.map(|m| m.name()))
    }

    pub fn cycle(&mut self, delta: isize) -> Result<()> {
        self.stack.cycle_mode(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentState;

    struct Panel {
        state: ComponentState,
    }

    fn panel() -> Rc<RefCell<Panel>> {
        Rc::new(RefCell::new(Panel {
            state: ComponentState::with_enabled(false),
        }))
    }

    impl Component for Panel {
        fn state(&self) -> &ComponentState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut ComponentState {
            &mut self.state
        }
    }

    #[test]
    fn test_one_component_enabled_at_a_time() {
        let panels = [panel(), panel(), panel(), panel()];
        let mut modes = SurfaceModes::new(SurfaceComponents {
            session: panels[0].clone(),
            create_track: panels[1].clone(),
            create_instrument: panels[2].clone(),
            create_device: panels[3].clone(),
        });

        modes.select(Some(SurfaceMode::CreateTrack)).unwrap();
        let enabled: Vec<bool> = panels.iter().map(|p| p.borrow().is_enabled()).collect();
        assert_eq!(enabled, vec![false, true, false, false]);

        modes.cycle(-2).unwrap();
        assert_eq!(modes.selected(), Some(SurfaceMode::CreateDevice));
        let enabled: Vec<bool> = panels.iter().map(|p| p.borrow().is_enabled()).collect();
        assert_eq!(enabled, vec![false, false, false, true]);

        modes.select(None).unwrap();
        assert!(panels.iter().all(|p| !p.borrow().is_enabled()));
    }
}
