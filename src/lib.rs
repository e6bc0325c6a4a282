#![doc(html_root_url = "https://docs.rs/livecast/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

//! # livecast - presentation core for an embedded event player
//!
//! `livecast` sits between a host application that knows about recorded and
//! live events and an external video player engine that does the actual
//! decoding and rendering. It decides what should be shown for an event
//! (a "not started yet" or "ended" placeholder, or the player), builds the
//! manifest the engine consumes, and keeps the engine instance lifecycle
//! ordered when events change or go live.
//!
//! ## Features
//!
//! - Live window evaluation with tri-state `started`/`ended` flags
//! - Track grouping by flavor kind, HLS vs. progressive classification
//! - Player manifest building (duration fallbacks, caption labels, main audio)
//! - A presentation shell with cancellable transition timers and
//!   load-then-unload ordering for the engine instance
//! - Playback offset parsing (`1h2m3s`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use livecast::engine::JsonFileBackend;
//! use livecast::event::Event;
//! use livecast::shell::PresentationShell;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let json = std::fs::read_to_string("event.json")?;
//!     let event = Event::from_json(&json)?;
//!
//!     let backend = Arc::new(JsonFileBackend::new("player.json"));
//!     let shell = PresentationShell::builder(backend)
//!         .with_notifier(|| println!("live state changed"))
//!         .with_start_offset("1m30s")
//!         .mount(event);
//!
//!     println!("{:?}", shell.state());
//!     shell.unmount().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - `event`: inbound event, track and caption data
//! - `time`: live window evaluation, transition delays, offset parsing
//! - `media`: track classification and manifest building
//! - `engine`: the seam to the external player engine
//! - `timer`: cancellable one-shot tasks
//! - `shell`: the state machine tying all of the above together
//! - `config`: player options loaded from environment and config files
//! - `error`: error type and result alias

/// Configuration module
pub mod config;

/// Player engine abstraction
pub mod engine;

/// Error types and utilities
pub mod error;

/// Event, track and caption data model
pub mod event;

/// Track classification and manifest building
pub mod media;

/// Presentation shell state machine
pub mod shell;

/// Live window evaluation and time parsing
pub mod time;

/// Cancellable scheduled tasks
pub mod timer;

pub use config::PlayerOptions;
pub use error::{PlayerError, Result};
pub use event::{Caption, Event, SyncedData, Track};
pub use media::{Manifest, ManifestBuilder};
pub use shell::{PresentationShell, ShellState, View};
pub use time::{parse_offset, TimeWindow};
