//! Command implementations for devsync CLI

pub mod cache;
pub mod completions;
pub mod helpers;
pub mod status;
pub mod sync;
pub mod version;
