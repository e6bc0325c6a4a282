//! # Media Handling
//!
//! Turns the flat track and caption lists of an [`Event`](crate::event::Event)
//! into the manifest the player engine consumes.
//!
//! ```rust
//! use livecast::event::Track;
//! use livecast::media::{group_by_kind, ClassifiedSources};
//!
//! let tracks = vec![
//!     Track::new("https://cdn.example.com/a/360.mp4", "presenter/delivery"),
//!     Track::new("https://cdn.example.com/a/master.m3u8", "presenter/delivery").with_master(true),
//!     Track::new("https://cdn.example.com/b/360.mp4", "presentation/delivery"),
//! ];
//!
//! let groups = group_by_kind(&tracks);
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups[0].kind, "presenter");
//!
//! let sources = ClassifiedSources::classify(&groups[0].tracks);
//! assert_eq!(sources.segmented.len(), 1);
//! assert_eq!(sources.progressive.len(), 1);
//! ```

/// Player manifest types and builder
pub mod manifest;

/// Track grouping and classification
pub mod tracks;

pub use manifest::{
    resolve_duration, CaptionTrack, Manifest, ManifestBuilder, Metadata, Resolution, Source,
    SourceKind, Stream, StreamRole,
};
pub use tracks::{aspect_ratio, group_by_kind, is_segmented, ClassifiedSources, TrackGroup};
