//! Core domain types, structural operations, and text utilities
//! for the slide document model.

pub mod error;
pub mod ops;
pub mod text;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    Background, BackgroundKind, ElementStyle, ElementType, Position, Presentation, Slide,
    SlideElement, TextAlign,
};
