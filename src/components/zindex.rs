//! Draw order for the battle stage.
//!
//! Backgrounds and fallback images sit at the bottom, characters above them
//! and travelling effects on top. The render pass sorts by [`ZIndex`] and
//! draws lower values first.

use bevy_ecs::prelude::Component;

#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ZIndex(pub i32);

impl ZIndex {
    pub const BACKDROP: ZIndex = ZIndex(-10);
    pub const CHARACTER: ZIndex = ZIndex(0);
    pub const EFFECT: ZIndex = ZIndex(10);
}
