//! Component trait - enable/disable-aware composition primitive
//!
//! Every control-surface behaviour is a component. Components form a tree:
//! a parent owns its registered children and forwards `update` calls to them
//! in registration order.
//!
//! Enablement is tracked twice on purpose:
//! - the component's own flag, toggled by `set_enabled`
//! - whether all of its ancestors are enabled, refreshed on every update pass
//!
//! `is_enabled` is true only when both hold. A child keeps its own flag while
//! a parent is disabled, so re-enabling the parent restores the child as it was.

use anyhow::Result;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

/// Upcast helper so boxed children can be handed back with their concrete type
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Typed handle to a child registered with [`ComponentState::register_component`]
pub struct ChildHandle<C> {
    index: usize,
    _marker: PhantomData<fn() -> C>,
}

impl<C> Clone for ChildHandle<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for ChildHandle<C> {}

impl<C> fmt::Debug for ChildHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChildHandle({})", self.index)
    }
}

/// Enablement flags and children shared by every component
pub struct ComponentState {
    enabled: bool,
    ancestors_enabled: bool,
    children: Vec<Box<dyn Component>>,
}

impl Default for ComponentState {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentState {
    /// State for a component that starts enabled
    pub fn new() -> Self {
        Self::with_enabled(true)
    }

    /// State with an explicit initial flag
    ///
    /// No hooks run for the initial value; only later `set_enabled` calls
    /// count as changes.
    pub fn with_enabled(enabled: bool) -> Self {
        Self {
            enabled,
            ancestors_enabled: true,
            children: Vec::new(),
        }
    }

    /// Own flag and all ancestors enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled && self.ancestors_enabled
    }

    /// Add `child` to the tree and return a handle to it
    pub fn register_component<C: Component>(&mut self, mut child: C) -> ChildHandle<C> {
        child.state_mut().set_ancestors_enabled(self.is_enabled());
        self.children.push(Box::new(child));
        ChildHandle {
            index: self.children.len() - 1,
            _marker: PhantomData,
        }
    }

    /// Borrow a registered child
    ///
    /// # Panics
    ///
    /// Panics if the handle was issued by a different parent and points at a
    /// child of another type.
    pub fn child<C: Component>(&self, handle: ChildHandle<C>) -> &C {
        (*self.children[handle.index])
            .as_any()
            .downcast_ref::<C>()
            .expect("child handle does not belong to this component")
    }

    /// Mutably borrow a registered child
    ///
    /// # Panics
    ///
    /// Same contract as [`ComponentState::child`].
    pub fn child_mut<C: Component>(&mut self, handle: ChildHandle<C>) -> &mut C {
        (*self.children[handle.index])
            .as_any_mut()
            .downcast_mut::<C>()
            .expect("child handle does not belong to this component")
    }

    /// Refresh the ancestor flag through the subtree without running hooks
    fn set_ancestors_enabled(&mut self, ancestors_enabled: bool) {
        self.ancestors_enabled = ancestors_enabled;
        let enabled = self.is_enabled();
        for child in &mut self.children {
            child.state_mut().set_ancestors_enabled(enabled);
        }
    }
}

/// Trait for control-surface components
///
/// Implementors only provide access to their [`ComponentState`] and override
/// the hooks they care about. Collaborators are passed in at construction;
/// there is no global registry to look them up from.
pub trait Component: AsAny {
    fn state(&self) -> &ComponentState;

    fn state_mut(&mut self) -> &mut ComponentState;

    /// Called after the component's own flag actually changed
    fn on_enabled_changed(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called on every structural or enablement change in the subtree
    fn update(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.state().is_enabled()
    }

    /// Toggle the component's own flag
    ///
    /// A no-op when the flag already has that value. Otherwise runs
    /// `on_enabled_changed` and then updates the whole subtree.
    fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        if self.state().enabled == enabled {
            return Ok(());
        }
        self.state_mut().enabled = enabled;
        self.on_enabled_changed()?;
        let ancestors_enabled = self.state().ancestors_enabled;
        self.propagate_update(ancestors_enabled)
    }

    /// Refresh the ancestor flag, run `update`, then recurse into children
    fn propagate_update(&mut self, ancestors_enabled: bool) -> Result<()> {
        self.state_mut().ancestors_enabled = ancestors_enabled;
        self.update()?;
        let enabled = self.is_enabled();
        for child in self.state_mut().children.iter_mut() {
            child.propagate_update(enabled)?;
        }
        Ok(())
    }
}
