//! Presentation helpers shared by the templates

pub mod cookie;
pub mod date;
