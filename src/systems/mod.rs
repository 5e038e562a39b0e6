//! Ticker systems.
//!
//! Submodules overview
//! - [`animation`] – advance animated sprites and update the drawn frame
//! - [`motion`] – move active sprites and detect boundary crossings
//! - [`render`] – draw visible sprites into a surface
//! - [`time`] – update the tick clock

pub mod animation;
pub mod motion;
pub mod render;
pub mod time;
