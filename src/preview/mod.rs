//! Interactive preview: scale state and the session that owns it.
//!
//! Previews are rendered at screen resolution by downscaling the source first
//! and drawing the watermark with a proportionally scaled font size.

pub mod scale;
pub mod session;

pub use scale::{fit_scale, ScaleState};
pub use session::{PreviewFrame, PreviewSession};
