//! Modal stack for managing overlays

/// An overlay drawn on top of the surface
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Quit confirmation dialog
    QuitConfirm,
    /// Help dialog showing all keyboard shortcuts
    Help,
}

/// A stack of modal overlays
///
/// Modals are rendered from bottom to top, with only the top modal
/// receiving input events.
#[derive(Debug, Default)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Push a modal unless the same one is already on top
    pub fn push(&mut self, modal: Modal) {
        if self.top() != Some(&modal) {
            self.stack.push(modal);
        }
    }

    pub fn pop(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Modal> {
        self.stack.last()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modal> {
        self.stack.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_order() {
        let mut modals = ModalStack::new();
        modals.push(Modal::Help);
        modals.push(Modal::QuitConfirm);

        assert_eq!(modals.top(), Some(&Modal::QuitConfirm));
        assert_eq!(modals.pop(), Some(Modal::QuitConfirm));
        assert_eq!(modals.top(), Some(&Modal::Help));
    }

    #[test]
    fn test_same_modal_is_not_stacked_twice() {
        let mut modals = ModalStack::new();
        modals.push(Modal::QuitConfirm);
        modals.push(Modal::QuitConfirm);
        modals.pop();
        assert!(modals.is_empty());
    }
}
