//! HTML rendering: mount points, fragment templates and page layouts.

pub mod mounts;
pub mod partials;
pub mod render;
pub mod views;
