//! Buttons

use crate::subject::{ListenerId, Listeners, Observable};
use std::cell::RefCell;
use std::rc::Rc;

pub type ButtonRef = Rc<RefCell<Button>>;

/// A momentary button
#[derive(Debug)]
pub struct Button {
    name: String,
    pressed: bool,
    listeners: Listeners,
}

impl Button {
    pub fn new(name: &str) -> ButtonRef {
        Rc::new(RefCell::new(Self {
            name: name.to_string(),
            pressed: false,
            listeners: Listeners::default(),
        }))
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Register a value from the hardware
    ///
    /// Returns the listeners that must be told about it.
    pub fn send_value(&mut self, value: u8) -> Vec<ListenerId> {
        self.pressed = value != 0;
        tracing::debug!(button = %self.name, value, "button value");
        self.listeners.iter().collect()
    }
}

impl Observable for Button {
    fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    fn listeners_mut(&mut self) -> &mut Listeners {
        &mut self.listeners
    }
}
