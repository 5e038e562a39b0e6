//! ECS components for sprite entities.
//!
//! Submodules overview:
//! - [`animation`] – frame playback state ([`animation::AnimatedSprite`])
//! - [`mapposition`] – anchor position in surface pixels
//! - [`motion`] – fixed-step travel and boundary fired flags
//! - [`scale`] – 2D scale, negative x mirrors
//! - [`sprite`] – texture drawn this frame, anchor and visibility
//! - [`zindex`] – draw order

pub mod animation;
pub mod mapposition;
pub mod motion;
pub mod scale;
pub mod sprite;
pub mod zindex;
