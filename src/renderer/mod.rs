pub mod grid;

pub use grid::{grid_shape, GridRenderer};
