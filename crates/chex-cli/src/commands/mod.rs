//! CLI command implementations

pub mod build;
pub mod doctor;
pub mod icons;
pub mod sync_manifest;
pub mod validate;
pub mod watch;

mod reporting;
