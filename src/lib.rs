// Photomark batch watermarking library

pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod preview;
pub mod watermark;
