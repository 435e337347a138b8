//! Utility functions for strip image processing
//!
//! - Brightness planes (mean and max channel)
//! - Colour comparison and packing
//! - Right-triangle and rotation geometry

pub mod brightness;
pub mod color;
pub mod geometry;
