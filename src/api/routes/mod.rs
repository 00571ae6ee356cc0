//! API route modules.

pub mod info;
pub mod meeting;
