//! Sprite events and the scene observers that queue them.
//!
//! Submodules:
//! - [`animation`] – a frame sequence ended (naturally or forced)
//! - [`collision`] – a moving sprite reached a boundary
pub mod animation;
pub mod collision;
