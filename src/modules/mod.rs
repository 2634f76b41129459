// src/modules/mod.rs
//
// Panel registry. To add a new panel:
//   1. Create modules/mypanel.rs implementing PanelModule
//   2. Add `pub mod mypanel;` below
//   3. Give it a field + a show call in app.rs

pub mod navigator;
pub mod player;

use crate::commands::NavCommand;
use crate::state::SessionState;
use egui::{TextureHandle, Ui};
use std::collections::HashMap;
use uuid::Uuid;

/// GPU-resident frame cache: loaded-video token → current preview texture.
pub type FrameCache = HashMap<Uuid, TextureHandle>;

/// Every panel implements this trait.
/// Panels read state, emit commands — they never mutate state directly.
pub trait PanelModule {
    fn name(&self) -> &str;
    fn ui(
        &mut self,
        ui:     &mut Ui,
        state:  &SessionState,
        frames: &mut FrameCache,
        cmd:    &mut Vec<NavCommand>,
    );
}
