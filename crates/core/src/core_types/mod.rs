//! Core types and utilities

pub mod vec2;
pub mod wind;

pub use vec2::Vec2;
pub use wind::Wind;
