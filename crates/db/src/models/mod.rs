//! Row models and request DTOs.

pub mod video_metadata;
