//! Utility functions for displaying and animating grids

pub mod display;

pub use display::{Animator, ColorOutput, GridFormatter};
