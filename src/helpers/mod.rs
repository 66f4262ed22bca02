//! Helper functions shared by the content transforms
//!
//! Date formatting and the small HTML building blocks used by the
//! rich-text renderer.

mod date;
mod html;

pub use date::*;
pub use html::*;
