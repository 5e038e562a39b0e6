//! battlefx library.
//!
//! Sprite effects for the battle screen: animated sprites, fixed-step motion
//! with boundary hits, scene lifecycle and the composition roots built on top
//! of them (effects, characters, the battle stage).
//!
//! # Project Structure
//!
//! - [`components`] – ECS components (animated sprite, sprite, position, motion, ...)
//! - [`events`] – frame-end and boundary-hit events plus the observers queuing them
//! - [`resources`] – texture cache, frame sources, catalog, surfaces, config
//! - [`systems`] – per-tick animation and motion, clock update, render pass
//! - [`scene`] – world + ticker + surface for one mount
//! - [`effect`] – the effect animation component
//! - [`character`] – character state animations
//! - [`battle`] – two fighters and a travelling effect

pub mod battle;
pub mod character;
pub mod components;
pub mod effect;
pub mod events;
pub mod resources;
pub mod scene;
pub mod systems;
