//! Session mode: selection, deletion and the one-shot actions

use super::actions::{
    CaptureAndInsertScene, DeleteSelectedClip, DeleteSelectedScene, DuplicateLoop,
};
use super::delete::DeleteComponent;
use super::select::SelectComponent;
use crate::component::{ChildHandle, Component, ComponentState};
use crate::model::SongRef;
use crate::notify::SharedNotifier;
use anyhow::Result;

pub struct SessionComponent {
    state: ComponentState,
    select: ChildHandle<SelectComponent>,
    delete: ChildHandle<DeleteComponent>,
    capture_scene: CaptureAndInsertScene,
    duplicate_loop: DuplicateLoop,
    delete_clip: DeleteSelectedClip,
    delete_scene: DeleteSelectedScene,
}

impl SessionComponent {
    pub fn new(song: SongRef, notifier: SharedNotifier) -> Result<Self> {
        let mut state = ComponentState::with_enabled(false);
        let select = state.register_component(SelectComponent::new(song.clone())?);
        let delete =
            state.register_component(DeleteComponent::new(song.clone(), notifier.clone()));
        Ok(Self {
            state,
            select,
            delete,
            capture_scene: CaptureAndInsertScene::new(song.clone(), notifier.clone()),
            duplicate_loop: DuplicateLoop::new(song.clone(), notifier.clone()),
            delete_clip: DeleteSelectedClip::new(song.clone(), notifier.clone()),
            delete_scene: DeleteSelectedScene::new(song, notifier),
        })
    }

    pub fn select(&self) -> &SelectComponent {
        self.state.child(self.select)
    }

    pub fn select_mut(&mut self) -> &mut SelectComponent {
        self.state.child_mut(self.select)
    }

    pub fn delete(&self) -> &DeleteComponent {
        self.state.child(self.delete)
    }

    pub fn delete_mut(&mut self) -> &mut DeleteComponent {
        self.state.child_mut(self.delete)
    }

    pub fn capture_scene(&self) {
        if self.is_enabled() {
            self.capture_scene.trigger();
        }
    }

    pub fn duplicate_loop(&self) {
        if self.is_enabled() {
            self.duplicate_loop.trigger();
        }
    }

    pub fn delete_selected_clip(&self) {
        if self.is_enabled() {
            self.delete_clip.trigger();
        }
    }

    pub fn delete_selected_scene(&self) {
        if self.is_enabled() {
            self.delete_scene.trigger();
        }
    }
}

impl Component for SessionComponent {
    fn state(&self) -> &ComponentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ComponentState {
        &mut self.state
    }
}
