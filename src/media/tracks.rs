use crate::event::Track;
use url::Url;

/// MIME types announcing an HLS playlist.
const SEGMENTED_MIMETYPES: [&str; 2] = ["application/x-mpegURL", "application/vnd.apple.mpegurl"];

/// File extension of an HLS playlist.
const SEGMENTED_EXTENSION: &str = ".m3u8";

/// Aspect ratio used whenever the tracks don't pin one down.
pub const DEFAULT_ASPECT_RATIO: (u32, u32) = (16, 9);

/// Tracks sharing the same kind, e.g. all `presenter/*` tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackGroup {
    /// Leading flavor segment
    pub kind: String,
    /// Tracks in input order
    pub tracks: Vec<Track>,
}

/// Groups tracks by [`Track::kind`]. Groups appear in order of first
/// occurrence; tracks keep their input order within a group.
pub fn group_by_kind(tracks: &[Track]) -> Vec<TrackGroup> {
    let mut groups: Vec<TrackGroup> = Vec::new();
    for track in tracks {
        match groups.iter_mut().find(|g| g.kind == track.kind()) {
            Some(group) => group.tracks.push(track.clone()),
            None => groups.push(TrackGroup {
                kind: track.kind().to_string(),
                tracks: vec![track.clone()],
            }),
        }
    }
    groups
}

/// Whether a track is an HLS playlist rather than a single progressive file.
pub fn is_segmented(track: &Track) -> bool {
    let by_mimetype = track
        .mimetype
        .as_deref()
        .map(|m| SEGMENTED_MIMETYPES.iter().any(|s| s.eq_ignore_ascii_case(m)))
        .unwrap_or(false);
    if by_mimetype || track.uri.ends_with(SEGMENTED_EXTENSION) {
        return true;
    }

    // Signed URLs carry the extension before the query string
    Url::parse(&track.uri)
        .map(|url| url.path().ends_with(SEGMENTED_EXTENSION))
        .unwrap_or(false)
}

/// Tracks split into HLS playlists and progressive files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedSources {
    /// HLS tracks, master playlists first
    pub segmented: Vec<Track>,
    /// Everything else, in input order
    pub progressive: Vec<Track>,
}

impl ClassifiedSources {
    /// Partitions `tracks`. The engine's quality selector treats the first
    /// HLS entry as the master playlist, so masters are moved to the front
    /// (stable, so ties keep their input order).
    pub fn classify(tracks: &[Track]) -> Self {
        let (mut segmented, progressive): (Vec<Track>, Vec<Track>) =
            tracks.iter().cloned().partition(is_segmented);
        segmented.sort_by_key(|t| !t.is_master());
        Self {
            segmented,
            progressive,
        }
    }
}

/// Aspect ratio the player area should reserve for these tracks.
///
/// With several flavors the engine shows a composite layout, so only a
/// single-flavor event uses the resolution of its first track.
pub fn aspect_ratio(tracks: &[Track]) -> (u32, u32) {
    let first = match tracks.first() {
        Some(track) => track,
        None => return DEFAULT_ASPECT_RATIO,
    };
    if tracks.iter().any(|t| t.flavor != first.flavor) {
        return DEFAULT_ASPECT_RATIO;
    }
    match first.resolution {
        Some([w, h]) if w > 0 && h > 0 => (w, h),
        _ => DEFAULT_ASPECT_RATIO,
    }
}
