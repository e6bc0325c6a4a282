use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An event as delivered by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event title
    pub title: String,
    /// When the event was created
    pub created: DateTime<Utc>,
    /// Whether this is a live event. Start and end times only matter if set.
    pub is_live: bool,
    /// Media data synced from the video backend
    pub synced_data: SyncedData,
}

/// Media-related event data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncedData {
    /// Last time this data was synced
    pub updated: DateTime<Utc>,
    /// Scheduled start of a live event
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// Scheduled end of a live event
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Duration in seconds, `0` when unknown
    #[serde(default)]
    pub duration: f64,
    /// Media tracks in backend order
    #[serde(default)]
    pub tracks: Vec<Track>,
    /// Caption tracks in backend order
    #[serde(default)]
    pub captions: Vec<Caption>,
    /// Preview image
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// A single media source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Location of the media
    pub uri: String,
    /// Role label such as `presenter/delivery`
    pub flavor: String,
    /// MIME type, if known
    #[serde(default)]
    pub mimetype: Option<String>,
    /// Width and height in pixels
    #[serde(default)]
    pub resolution: Option<[u32; 2]>,
    /// Set for the top-level HLS playlist
    #[serde(default)]
    pub is_master: Option<bool>,
}

/// A subtitle resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// Location of the WebVTT file
    pub uri: String,
    /// Language tag
    #[serde(default)]
    pub lang: Option<String>,
}

impl Event {
    /// Decodes an event from the host's JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Start time relevant for live windowing.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.synced_data.start_time
    }

    /// End time relevant for live windowing.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.synced_data.end_time
    }
}

impl Track {
    /// Creates a track with only uri and flavor set.
    pub fn new(uri: impl Into<String>, flavor: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            flavor: flavor.into(),
            mimetype: None,
            resolution: None,
            is_master: None,
        }
    }

    /// Sets the MIME type.
    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    /// Sets the resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some([width, height]);
        self
    }

    /// Sets the master playlist flag.
    pub fn with_master(mut self, is_master: bool) -> Self {
        self.is_master = Some(is_master);
        self
    }

    /// Leading segment of the flavor, e.g. `presenter` for `presenter/delivery`.
    pub fn kind(&self) -> &str {
        self.flavor.split('/').next().unwrap_or(&self.flavor)
    }

    /// Whether the track is the master playlist.
    pub fn is_master(&self) -> bool {
        self.is_master.unwrap_or(false)
    }
}

impl Caption {
    /// Creates a caption.
    pub fn new(uri: impl Into<String>, lang: Option<&str>) -> Self {
        Self {
            uri: uri.into(),
            lang: lang.map(str::to_string),
        }
    }
}
