//! Email templates with `{{placeholder}}` substitution

pub mod renderer;

pub use renderer::{ReplacementMap, TemplateRenderer};
