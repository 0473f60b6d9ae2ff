mod geometry;
mod renderer;

pub use renderer::{GlobeLayers, GlobeRenderer};
