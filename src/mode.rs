//! Mode stack - named-mode state machine
//!
//! A mode is an ordered list of layers. Selecting a mode exits the layers of
//! the current one in reverse order, then enters the new mode's layers in
//! order. At most one mode is entered at any time.
//!
//! If a layer fails to enter, the layers of that mode that already entered
//! are exited again in reverse, nothing stays selected, and the error is
//! returned. Exit failures are logged and do not interrupt the transition,
//! so every entered layer is always exited exactly once.

use crate::component::Component;
use anyhow::{Context, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// Anything that can be entered and exited as part of a mode
pub trait ModeBehaviour {
    fn enter(&mut self) -> Result<()>;

    fn exit(&mut self) -> Result<()>;
}

/// One unit of a mode
pub enum ModeLayer {
    /// Enable a component on enter, disable it on exit
    Component(ComponentMode),
    /// Any enter/exit behaviour, e.g. [`SetAttributeMode`]
    Behaviour(Box<dyn ModeBehaviour>),
    /// Run a function on enter; exit does nothing
    OnEnter(Box<dyn FnMut() -> Result<()>>),
}

impl ModeLayer {
    pub fn component(component: Rc<RefCell<dyn Component>>) -> Self {
        ModeLayer::Component(ComponentMode::new(component))
    }

    pub fn behaviour(behaviour: impl ModeBehaviour + 'static) -> Self {
        ModeLayer::Behaviour(Box::new(behaviour))
    }

    pub fn on_enter(f: impl FnMut() -> Result<()> + 'static) -> Self {
        ModeLayer::OnEnter(Box::new(f))
    }

    fn enter(&mut self) -> Result<()> {
        match self {
            ModeLayer::Component(mode) => mode.enter(),
            ModeLayer::Behaviour(behaviour) => behaviour.enter(),
            ModeLayer::OnEnter(f) => f(),
        }
    }

    fn exit(&mut self) -> Result<()> {
        match self {
            ModeLayer::Component(mode) => mode.exit(),
            ModeLayer::Behaviour(behaviour) => behaviour.exit(),
            ModeLayer::OnEnter(_) => Ok(()),
        }
    }
}

/// Enables a shared component for the duration of a mode
pub struct ComponentMode {
    component: Rc<RefCell<dyn Component>>,
}

impl ComponentMode {
    pub fn new(component: Rc<RefCell<dyn Component>>) -> Self {
        Self { component }
    }
}

impl ModeBehaviour for ComponentMode {
    fn enter(&mut self) -> Result<()> {
        self.component.borrow_mut().set_enabled(true)
    }

    fn exit(&mut self) -> Result<()> {
        self.component.borrow_mut().set_enabled(false)
    }
}

/// Sets an attribute of a collaborator while the mode is entered and puts
/// the previous value back on exit
pub struct SetAttributeMode<T, V> {
    target: Rc<RefCell<T>>,
    name: &'static str,
    attribute: fn(&mut T) -> &mut V,
    value: V,
    saved: Option<V>,
}

impl<T, V: Clone> SetAttributeMode<T, V> {
    pub fn new(
        target: Rc<RefCell<T>>,
        name: &'static str,
        attribute: fn(&mut T) -> &mut V,
        value: V,
    ) -> Self {
        Self {
            target,
            name,
            attribute,
            value,
            saved: None,
        }
    }
}

impl<T, V: Clone> ModeBehaviour for SetAttributeMode<T, V> {
    fn enter(&mut self) -> Result<()> {
        let mut target = self.target.borrow_mut();
        let slot = (self.attribute)(&mut target);
        self.saved = Some(std::mem::replace(slot, self.value.clone()));
        tracing::trace!(attribute = self.name, "attribute set");
        Ok(())
    }

    fn exit(&mut self) -> Result<()> {
        if let Some(previous) = self.saved.take() {
            let mut target = self.target.borrow_mut();
            *(self.attribute)(&mut target) = previous;
            tracing::trace!(attribute = self.name, "attribute restored");
        }
        Ok(())
    }
}

struct Mode {
    name: String,
    layers: Vec<ModeLayer>,
}

/// Selects at most one named mode at a time
#[derive(Default)]
pub struct ModeStack {
    modes: Vec<Mode>,
    selected: Option<String>,
    /// Index of the mode whose layers are currently entered
    entered: Option<usize>,
}

impl ModeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mode
    ///
    /// # Panics
    ///
    /// Panics if a mode with the same name already exists.
    pub fn add_mode(&mut self, name: &str, layers: Vec<ModeLayer>) {
        assert!(!self.has_mode(name), "mode '{}' added twice", name);
        self.modes.push(Mode {
            name: name.to_string(),
            layers,
        });
    }

    pub fn has_mode(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn mode_names(&self) -> impl Iterator<Item = &str> {
        self.modes.iter().map(|m| m.name.as_str())
    }

    pub fn selected_mode(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Name of the mode whose layers are entered, if any
    pub fn entered_mode(&self) -> Option<&str> {
        self.entered.map(|i| self.modes[i].name.as_str())
    }

    /// Switch to `mode`, or to no mode with `None`
    ///
    /// Selecting the current mode again does nothing. A name without a
    /// registered mode is remembered as selected but enters nothing.
    pub fn set_selected_mode(&mut self, mode: Option<&str>) -> Result<()> {
        if self.selected.as_deref() == mode {
            return Ok(());
        }

        if let Some(index) = self.entered.take() {
            self.exit_mode(index);
        }
        self.selected = mode.map(str::to_string);

        let Some(name) = mode else {
            tracing::debug!("mode cleared");
            return Ok(());
        };
        let Some(index) = self.index_of(name) else {
            tracing::warn!(mode = name, "selected mode is not registered");
            return Ok(());
        };

        if let Err(err) = self.enter_mode(index) {
            self.selected = None;
            return Err(err).with_context(|| format!("Failed to enter mode '{}'", name));
        }
        self.entered = Some(index);
        tracing::debug!(mode = name, "mode entered");
        Ok(())
    }

    /// Step through the modes in registration order, wrapping around
    ///
    /// With nothing selected, a positive step lands on the first mode and a
    /// negative one on the last.
    pub fn cycle_mode(&mut self, delta: isize) -> Result<()> {
        let count = self.modes.len() as isize;
        if count == 0 {
            return Ok(());
        }
        let next = match self.entered {
            Some(index) => (index as isize + delta).rem_euclid(count),
            None if delta >= 0 => 0,
            None => count - 1,
        };
        let name = self.modes[next as usize].name.clone();
        self.set_selected_mode(Some(&name))
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.modes.iter().position(|m| m.name == name)
    }

    fn enter_mode(&mut self, index: usize) -> Result<()> {
        let layers = &mut self.modes[index].layers;
        for entered in 0..layers.len() {
            if let Err(err) = layers[entered].enter() {
                for layer in layers[..entered].iter_mut().rev() {
                    if let Err(exit_err) = layer.exit() {
                        tracing::warn!("Layer exit failed during rollback: {:#}", exit_err);
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn exit_mode(&mut self, index: usize) {
        let mode = &mut self.modes[index];
        for layer in mode.layers.iter_mut().rev() {
            if let Err(err) = layer.exit() {
                tracing::warn!(mode = %mode.name, "Layer exit failed: {:#}", err);
            }
        }
        tracing::debug!(mode = %mode.name, "mode exited");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentState;
    use anyhow::anyhow;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
        fail_enter: bool,
    }

    impl ModeBehaviour for Recorder {
        fn enter(&mut self) -> Result<()> {
            if self.fail_enter {
                return Err(anyhow!("{} refused", self.name));
            }
            self.log.borrow_mut().push(format!("enter {}", self.name));
            Ok(())
        }

        fn exit(&mut self) -> Result<()> {
            self.log.borrow_mut().push(format!("exit {}", self.name));
            Ok(())
        }
    }

    fn layer(name: &'static str, log: &Log) -> ModeLayer {
        ModeLayer::behaviour(Recorder {
            name,
            log: log.clone(),
            fail_enter: false,
        })
    }

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    #[test]
    fn test_enter_forward_exit_reverse() {
        let log = Log::default();
        let mut modes = ModeStack::new();
        modes.add_mode("m", vec![layer("a", &log), layer("b", &log), layer("c", &log)]);

        modes.set_selected_mode(Some("m")).unwrap();
        assert_eq!(take(&log), vec!["enter a", "enter b", "enter c"]);

        modes.set_selected_mode(None).unwrap();
        assert_eq!(take(&log), vec!["exit c", "exit b", "exit a"]);
        assert_eq!(modes.selected_mode(), None);
    }

    #[test]
    fn test_reselecting_is_noop() {
        let log = Log::default();
        let mut modes = ModeStack::new();
        modes.add_mode("m", vec![layer("a", &log)]);

        modes.set_selected_mode(Some("m")).unwrap();
        modes.set_selected_mode(Some("m")).unwrap();
        assert_eq!(take(&log), vec!["enter a"]);
    }

    #[test]
    fn test_switching_exits_before_entering() {
        let log = Log::default();
        let mut modes = ModeStack::new();
        modes.add_mode("one", vec![layer("a", &log), layer("b", &log)]);
        modes.add_mode("two", vec![layer("c", &log)]);

        modes.set_selected_mode(Some("one")).unwrap();
        take(&log);
        modes.set_selected_mode(Some("two")).unwrap();

        assert_eq!(take(&log), vec!["exit b", "exit a", "enter c"]);
        assert_eq!(modes.entered_mode(), Some("two"));
    }

    #[test]
    fn test_at_most_one_mode_entered() {
        let log = Log::default();
        let mut modes = ModeStack::new();
        modes.add_mode("one", vec![layer("a", &log)]);
        modes.add_mode("two", vec![layer("b", &log)]);

        for selection in [Some("one"), Some("two"), Some("ghost"), None, Some("two"), Some("one")] {
            modes.set_selected_mode(selection).unwrap();
            let entered = log.borrow().iter().filter(|e| e.starts_with("enter")).count()
                - log.borrow().iter().filter(|e| e.starts_with("exit")).count();
            let expected = usize::from(selection.is_some_and(|s| modes.has_mode(s)));
            assert_eq!(entered, expected, "after selecting {:?}", selection);
        }
    }

    #[test]
    fn test_unknown_mode_is_selected_but_not_entered() {
        let mut modes = ModeStack::new();
        modes.set_selected_mode(Some("ghost")).unwrap();
        assert_eq!(modes.selected_mode(), Some("ghost"));
        assert_eq!(modes.entered_mode(), None);
    }

    #[test]
    fn test_failed_enter_rolls_back() {
        let log = Log::default();
        let mut modes = ModeStack::new();
        modes.add_mode(
            "m",
            vec![
                layer("a", &log),
                layer("b", &log),
                ModeLayer::behaviour(Recorder {
                    name: "c",
                    log: log.clone(),
                    fail_enter: true,
                }),
                layer("d", &log),
            ],
        );

        let err = modes.set_selected_mode(Some("m")).unwrap_err();
        assert!(format!("{:#}", err).contains("c refused"));
        assert_eq!(take(&log), vec!["enter a", "enter b", "exit b", "exit a"]);
        assert_eq!(modes.selected_mode(), None);
        assert_eq!(modes.entered_mode(), None);
    }

    #[test]
    fn test_on_enter_layer_has_no_exit() {
        let log = Log::default();
        let mut modes = ModeStack::new();
        let on_enter_log = log.clone();
        modes.add_mode(
            "m",
            vec![
                ModeLayer::on_enter(move || {
                    on_enter_log.borrow_mut().push("setup".to_string());
                    Ok(())
                }),
                layer("a", &log),
            ],
        );

        modes.set_selected_mode(Some("m")).unwrap();
        modes.set_selected_mode(None).unwrap();
        assert_eq!(take(&log), vec!["setup", "enter a", "exit a"]);
    }

    #[derive(Debug, PartialEq, Clone, Copy)]
    enum Filter {
        All,
        Instruments,
    }

    struct FakeBrowser {
        filter: Filter,
    }

    #[test]
    fn test_set_attribute_mode_restores_previous_value() {
        let browser = Rc::new(RefCell::new(FakeBrowser { filter: Filter::All }));
        let mut modes = ModeStack::new();
        modes.add_mode(
            "create",
            vec![ModeLayer::behaviour(SetAttributeMode::new(
                browser.clone(),
                "filter",
                |b: &mut FakeBrowser| &mut b.filter,
                Filter::Instruments,
            ))],
        );

        modes.set_selected_mode(Some("create")).unwrap();
        assert_eq!(browser.borrow().filter, Filter::Instruments);

        modes.set_selected_mode(None).unwrap();
        assert_eq!(browser.borrow().filter, Filter::All);
    }

    struct Panel {
        state: ComponentState,
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
    fn test_component_layer_shared_between_modes() {
        let panel = Rc::new(RefCell::new(Panel {
            state: ComponentState::with_enabled(false),
        }));
        let mut modes = ModeStack::new();
        modes.add_mode("one", vec![ModeLayer::component(panel.clone())]);
        modes.add_mode("two", vec![ModeLayer::component(panel.clone())]);

        modes.set_selected_mode(Some("one")).unwrap();
        assert!(panel.borrow().is_enabled());
        modes.set_selected_mode(Some("two")).unwrap();
        assert!(panel.borrow().is_enabled());
        modes.set_selected_mode(None).unwrap();
        assert!(!panel.borrow().is_enabled());
    }

    #[test]
    fn test_cycle_mode_wraps() {
        let log = Log::default();
        let mut modes = ModeStack::new();
        modes.add_mode("a", vec![layer("a", &log)]);
        modes.add_mode("b", vec![layer("b", &log)]);
        modes.add_mode("c", vec![layer("c", &log)]);

        modes.cycle_mode(1).unwrap();
        assert_eq!(modes.selected_mode(), Some("a"));
        modes.cycle_mode(-1).unwrap();
        assert_eq!(modes.selected_mode(), Some("c"));
        modes.cycle_mode(2).unwrap();
        assert_eq!(modes.selected_mode(), Some("b"));
        assert_eq!(modes.mode_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    #[should_panic(expected = "added twice")]
    fn test_duplicate_mode_panics() {
        let mut modes = ModeStack::new();
        modes.add_mode("m", Vec::new());
        modes.add_mode("m", Vec::new());
    }
}
