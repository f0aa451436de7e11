//! Operations that derive new structures from parsed ones.

mod annotate;

pub use annotate::{AnnotateConfig, annotate, annotate_with};
