use super::tracks::{group_by_kind, ClassifiedSources};
use crate::event::{Caption, Event, Track};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind whose stream carries the main audio when present.
pub const PRIMARY_KIND: &str = "presenter";

/// Caption format understood by the engine.
pub const CAPTION_FORMAT: &str = "vtt";

/// Placeholder duration for events without one. The engine refuses `0` and
/// takes the real duration from the stream once it loads.
pub const PLACEHOLDER_DURATION: f64 = 1.0;

/// Everything the player engine needs to play one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Title, duration and preview
    pub metadata: Metadata,
    /// One stream per track kind
    pub streams: Vec<Stream>,
    /// Subtitle tracks
    pub captions: Vec<CaptionTrack>,
}

/// Manifest metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Event title
    pub title: String,
    /// Duration in seconds, never zero
    pub duration: f64,
    /// Preview image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// One displayable stream, e.g. the presenter camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    /// Track kind this stream was built from
    pub content: String,
    /// Set on the stream the engine takes audio from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<StreamRole>,
    /// Sources per delivery format
    pub sources: BTreeMap<SourceKind, Vec<Source>>,
}

/// Role marker on a [`Stream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamRole {
    /// The engine plays this stream's audio
    #[serde(rename = "mainAudio")]
    MainAudio,
}

/// Delivery format key of a source list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// HLS of a running live event
    #[serde(rename = "hlsLive")]
    SegmentedLive,
    /// HLS of a recording
    #[serde(rename = "hls")]
    SegmentedVod,
    /// Single progressive file
    #[serde(rename = "mp4")]
    Progressive,
}

/// A single source entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Media location
    pub src: String,
    /// MIME type, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    /// Resolution, zero when unknown
    pub res: Resolution,
}

/// Width and height of a [`Source`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Width in pixels
    pub w: u32,
    /// Height in pixels
    pub h: u32,
}

/// A caption entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionTrack {
    /// Always [`CAPTION_FORMAT`]
    pub format: String,
    /// Location of the caption file
    pub url: String,
    /// Language tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Display label
    pub text: String,
}

impl From<&Track> for Source {
    fn from(track: &Track) -> Self {
        let [w, h] = track.resolution.unwrap_or([0, 0]);
        Self {
            src: track.uri.clone(),
            mimetype: track.mimetype.clone(),
            res: Resolution { w, h },
        }
    }
}

impl Manifest {
    /// The stream marked as main audio, if any.
    pub fn main_audio(&self) -> Option<&Stream> {
        self.streams
            .iter()
            .find(|s| s.role == Some(StreamRole::MainAudio))
    }

    /// Encodes the manifest in the engine's JSON schema.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Effective duration in seconds.
///
/// An unknown (zero) duration falls back to the scheduled length of the
/// event, and to [`PLACEHOLDER_DURATION`] if that is unknown too.
pub fn resolve_duration(
    duration: f64,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
) -> f64 {
    let mut resolved = duration;
    if resolved == 0.0 {
        if let (Some(start), Some(end)) = (start_time, end_time) {
            resolved = (end - start).num_milliseconds() as f64 / 1000.0;
        }
    }
    if resolved == 0.0 {
        resolved = PLACEHOLDER_DURATION;
    }
    resolved
}

/// Builds a [`Manifest`] from event data.
#[derive(Debug, Clone)]
pub struct ManifestBuilder<'a> {
    title: &'a str,
    duration: f64,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    is_live: bool,
    tracks: &'a [Track],
    captions: &'a [Caption],
    preview: Option<&'a str>,
    caption_label: &'a str,
}

impl<'a> ManifestBuilder<'a> {
    /// Creates a builder with only a title; everything else is empty.
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            duration: 0.0,
            start_time: None,
            end_time: None,
            is_live: false,
            tracks: &[],
            captions: &[],
            preview: None,
            caption_label: "Captions",
        }
    }

    /// Creates a builder with everything taken from `event`.
    pub fn from_event(event: &'a Event) -> Self {
        let data = &event.synced_data;
        Self::new(&event.title)
            .with_duration(data.duration)
            .with_schedule(data.start_time, data.end_time)
            .with_live(event.is_live)
            .with_tracks(&data.tracks)
            .with_captions(&data.captions)
            .with_preview(data.thumbnail.as_deref())
    }

    /// Sets the nominal duration in seconds.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the scheduled start and end.
    pub fn with_schedule(
        mut self,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    /// Sets whether HLS sources are live.
    pub fn with_live(mut self, is_live: bool) -> Self {
        self.is_live = is_live;
        self
    }

    /// Sets the media tracks.
    pub fn with_tracks(mut self, tracks: &'a [Track]) -> Self {
        self.tracks = tracks;
        self
    }

    /// Sets the caption tracks.
    pub fn with_captions(mut self, captions: &'a [Caption]) -> Self {
        self.captions = captions;
        self
    }

    /// Sets the preview image.
    pub fn with_preview(mut self, preview: Option<&'a str>) -> Self {
        self.preview = preview;
        self
    }

    /// Sets the (already localized) caption label prefix.
    pub fn with_caption_label(mut self, label: &'a str) -> Self {
        self.caption_label = label;
        self
    }

    /// Builds the manifest. Never fails; no tracks means no streams.
    pub fn build(&self) -> Manifest {
        let mut streams: Vec<Stream> = group_by_kind(self.tracks)
            .into_iter()
            .map(|group| Stream {
                role: (group.kind == PRIMARY_KIND).then_some(StreamRole::MainAudio),
                sources: self.sources(&ClassifiedSources::classify(&group.tracks)),
                content: group.kind,
            })
            .collect();

        // With several streams and no presenter we have no idea which one
        // carries the audio. Pick the first one, reproducibly.
        if streams.len() > 1 && !streams.iter().any(|s| s.role.is_some()) {
            let kinds: Vec<&str> = streams.iter().map(|s| s.content.as_str()).collect();
            warn!(
                "No {} stream among {:?}, using {} as main audio",
                PRIMARY_KIND, kinds, kinds[0]
            );
            streams[0].role = Some(StreamRole::MainAudio);
        }

        let manifest = Manifest {
            metadata: Metadata {
                title: self.title.to_string(),
                duration: resolve_duration(self.duration, self.start_time, self.end_time),
                preview: self.preview.map(str::to_string),
            },
            streams,
            captions: self.caption_tracks(),
        };

        debug!(
            "Built manifest for {:?}: {} streams, {} captions",
            manifest.metadata.title,
            manifest.streams.len(),
            manifest.captions.len()
        );
        manifest
    }

    fn sources(&self, classified: &ClassifiedSources) -> BTreeMap<SourceKind, Vec<Source>> {
        let mut sources = BTreeMap::new();
        if !classified.segmented.is_empty() {
            let key = if self.is_live {
                SourceKind::SegmentedLive
            } else {
                SourceKind::SegmentedVod
            };
            sources.insert(key, classified.segmented.iter().map(Source::from).collect());
        }
        if !classified.progressive.is_empty() {
            sources.insert(
                SourceKind::Progressive,
                classified.progressive.iter().map(Source::from).collect(),
            );
        }
        sources
    }

    fn caption_tracks(&self) -> Vec<CaptionTrack> {
        let numbered = self.captions.len() > 1;
        self.captions
            .iter()
            .enumerate()
            .map(|(i, caption)| {
                let mut text = self.caption_label.to_string();
                if let Some(lang) = &caption.lang {
                    text.push_str(&format!(" ({})", lang));
                }
                if numbered {
                    text.push_str(&format!(" [{}]", i + 1));
                }
                CaptionTrack {
                    format: CAPTION_FORMAT.to_string(),
                    url: caption.uri.clone(),
                    lang: caption.lang.clone(),
                    text,
                }
            })
            .collect()
    }
}
