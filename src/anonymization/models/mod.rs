//! Entity and span data models

pub mod entity;
pub mod span;

pub use entity::{ClassifiedEntity, Entity, EntityKind, EntitySource, Sensitivity};
pub use span::{Span, TextIndex};
