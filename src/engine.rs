//! # Player Engine Seam
//!
//! The actual decoding and rendering happens in an external player engine.
//! The shell only knows two traits: a [`PlayerBackend`] that turns a
//! manifest into a running [`EngineInstance`], and the instance itself.
//! Supporting another engine means adding an implementation here, the shell
//! stays untouched.

use crate::config::PlayerOptions;
use crate::error::{PlayerError, Result};
use crate::media::Manifest;
use async_trait::async_trait;
use log::{debug, info};
use parking_lot::Mutex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Something that can load a manifest into a player engine.
#[async_trait]
pub trait PlayerBackend: Send + Sync {
    /// Starts loading. The returned future resolves once the engine reports
    /// that loading has completed.
    async fn render(
        &self,
        manifest: &Manifest,
        options: &PlayerOptions,
    ) -> Result<Arc<dyn EngineInstance>>;
}

/// A loaded engine instance.
#[async_trait]
pub trait EngineInstance: Send + Sync {
    /// Jumps to `seconds` into the media.
    async fn seek(&self, seconds: u64) -> Result<()>;

    /// Releases the engine. Only called after loading has settled.
    async fn unload(&self) -> Result<()>;
}

#[derive(Serialize)]
struct PlayerDocument<'a> {
    manifest: &'a Manifest,
    options: &'a PlayerOptions,
    position: u64,
}

/// Hands the manifest to an engine that reads its configuration from a JSON
/// file, e.g. a web page polling a static asset.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Writes the player document to `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_owned(),
        }
    }

    /// Location of the player document
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PlayerBackend for JsonFileBackend {
    async fn render(
        &self,
        manifest: &Manifest,
        options: &PlayerOptions,
    ) -> Result<Arc<dyn EngineInstance>> {
        let instance = JsonFileInstance {
            path: self.path.clone(),
            manifest: manifest.clone(),
            options: options.clone(),
            position: Mutex::new(0),
        };
        instance.write().await?;
        info!("Player document written to {}", self.path.display());
        Ok(Arc::new(instance))
    }
}

/// Instance created by [`JsonFileBackend`].
#[derive(Debug)]
pub struct JsonFileInstance {
    path: PathBuf,
    manifest: Manifest,
    options: PlayerOptions,
    position: Mutex<u64>,
}

impl JsonFileInstance {
    async fn write(&self) -> Result<()> {
        let position = *self.position.lock();
        let document = PlayerDocument {
            manifest: &self.manifest,
            options: &self.options,
            position,
        };
        let json = serde_json::to_vec_pretty(&document)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl EngineInstance for JsonFileInstance {
    async fn seek(&self, seconds: u64) -> Result<()> {
        *self.position.lock() = seconds;
        self.write().await
    }

    async fn unload(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Removed player document {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PlayerError::Engine(format!(
                "failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}
