//! Slot baking tools for a character-customization asset pipeline.
//!
//! Imports skinned meshes, drops bones no vertex is weighted to, and writes
//! the result as reusable slot assets collected in slot libraries.

pub mod bake;
pub mod compaction;
pub mod error;
pub mod import;
pub mod library;
pub mod logging;
pub mod mesh;
pub mod project;
pub mod skin;
pub mod types;

pub use error::SlotError;
pub use logging::{LogLevel, ResultExt, init_logging, send_log};
