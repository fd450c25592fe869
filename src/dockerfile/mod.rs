//! Dockerfile inspection and canonical templates

pub mod health;
pub mod template;

pub use health::{check_build_file, BuildFileHealth, BuildFileReport, DOCKERFILE_NAME};
pub use template::{template_for, CanonicalTemplate};
