//! Shared data: assets, surfaces, queues and configuration.
//!
//! Overview
//! - `animationstore` – catalog of named effects and character profiles
//! - `canvas` – software compositor surface
//! - `deferred` – signal queue and the host-turn task queue
//! - `framesource` – frame sequence descriptors and sprite sheet geometry
//! - `fxconfig` – INI-backed engine settings
//! - `gamestate` – battle session context
//! - `rendertarget` – surface traits, draw commands, headless host
//! - `texturestore` – process-wide texture cache
//! - `ticktime` – ticker clock
pub mod animationstore;
pub mod canvas;
pub mod deferred;
pub mod framesource;
pub mod fxconfig;
pub mod gamestate;
pub mod rendertarget;
pub mod texturestore;
pub mod ticktime;
