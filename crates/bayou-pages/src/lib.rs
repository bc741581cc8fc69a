//! Page generation for researched topics.
//!
//! [`PageRenderer`] turns one researched topic into a standalone HTML page
//! and records it as a presentation. [`Consolidator`] merges the latest
//! presentations of a category into a single tabbed page.

pub mod category;
pub mod consolidate;
pub mod error;
mod extract;
pub mod html;
pub mod render;

pub use category::{CATEGORIES, Category};
pub use consolidate::{ConsolidatedOutput, Consolidator};
pub use error::{Error, Result};
pub use render::{FACT_LIMIT, PageRenderer, RenderedPage};
