//! Vector globe engine.
//!
//! Coordinate transforms, a point-in-polygon hit-testing index, an orbit
//! camera controller and a per-frame hover animator. Rendering and input
//! delivery are left to the caller; the `vector-globe` binary is one such
//! caller, drawing the globe in a terminal.

pub mod config;
pub mod controls;
pub mod data;
pub mod easing;
pub mod geo;
pub mod globe;

pub use config::GlobeConfig;
pub use controls::OrbitController;
pub use globe::Globe;
