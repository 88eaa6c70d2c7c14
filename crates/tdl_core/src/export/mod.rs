//! Plain-text renderings of a document.

pub mod taskpaper;

pub use taskpaper::{as_taskpaper, as_taskpaper_lines};
