//! Rendering and persistence of the top-level and per-rendition manifests.

use crate::config::Rendition;
use crate::error::{LoopcastError, Result};
use crate::hls::parser::{parse_hls_playlist, serialize_playlist};
use crate::playlist::window::{Entry, WindowSnapshot};
use m3u8_rs::{MasterPlaylist, MediaPlaylist, MediaSegment, Playlist, Resolution, VariantStream};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the top-level manifest inside the manifest directory
pub const MASTER_MANIFEST: &str = "master.m3u8";

const HLS_VERSION: usize = 3;

/// Build the live media playlist for a window snapshot
///
/// No `#EXT-X-ENDLIST`: the stream never ends.
pub fn render_media_playlist(snapshot: &WindowSnapshot, target_duration: u16) -> MediaPlaylist {
    let segments = snapshot
        .entries
        .iter()
        .map(|entry| MediaSegment {
            uri: entry.uri.clone(),
            duration: entry.duration,
            discontinuity: entry.discontinuity,
            ..Default::default()
        })
        .collect();

    MediaPlaylist {
        version: Some(HLS_VERSION),
        target_duration: target_duration.into(),
        media_sequence: snapshot.media_sequence,
        discontinuity_sequence: snapshot.discontinuity_sequence,
        segments,
        end_list: false,
        ..Default::default()
    }
}

/// Build the top-level manifest listing every rendition
pub fn render_master_playlist(renditions: &[Rendition], uri_prefix: &str) -> MasterPlaylist {
    let variants = renditions
        .iter()
        .map(|rendition| VariantStream {
            uri: format!("{}/{}", uri_prefix, rendition.manifest_name()),
            bandwidth: rendition.bandwidth,
            resolution: Some(Resolution {
                width: rendition.width,
                height: rendition.height,
            }),
            ..Default::default()
        })
        .collect();

    MasterPlaylist {
        version: Some(HLS_VERSION),
        variants,
        ..Default::default()
    }
}

/// Parse a persisted media manifest back into a window snapshot
///
/// Entry kinds are not part of the wire format; decoded entries are
/// reported as content.
pub fn decode_window(content: &str) -> Result<WindowSnapshot> {
    let Playlist::MediaPlaylist(media) = parse_hls_playlist(content)? else {
        return Err(LoopcastError::PlaylistParseError(
            "expected a media playlist, found a master playlist".to_string(),
        ));
    };

    Ok(WindowSnapshot {
        entries: media
            .segments
            .into_iter()
            .map(|segment| Entry {
                discontinuity: segment.discontinuity,
                ..Entry::content(segment.uri, segment.duration)
            })
            .collect(),
        media_sequence: media.media_sequence,
        discontinuity_sequence: media.discontinuity_sequence,
    })
}

/// Persists manifests into the manifest directory
///
/// Files are overwritten in place; readers may observe a partially written
/// manifest and simply pick up the complete one on their next refresh.
#[derive(Debug, Clone)]
pub struct ManifestWriter {
    dir: PathBuf,
    target_duration: u16,
}

impl ManifestWriter {
    /// Target duration is the longest segment duration, rounded up
    pub fn new(dir: impl Into<PathBuf>, content_duration: f32, ad_duration: f32) -> Self {
        let longest = content_duration.max(ad_duration).ceil().max(1.0);
        Self {
            dir: dir.into(),
            target_duration: longest.min(f32::from(u16::MAX)) as u16,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn target_duration(&self) -> u16 {
        self.target_duration
    }

    /// Create the manifest directory if needed
    pub async fn prepare(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| LoopcastError::ManifestWriteError {
                path: self.dir.clone(),
                source,
            })
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Serialize a rendition window and overwrite its manifest file
    pub async fn write_media(&self, file_name: &str, snapshot: &WindowSnapshot) -> Result<()> {
        let playlist = Playlist::MediaPlaylist(render_media_playlist(snapshot, self.target_duration));
        let body = serialize_playlist(&playlist)?;
        self.persist(file_name, body).await?;

        debug!(
            "Manifest {} written: {} entries, media sequence {}, discontinuity sequence {}",
            file_name,
            snapshot.entries.len(),
            snapshot.media_sequence,
            snapshot.discontinuity_sequence
        );
        Ok(())
    }

    /// Render and write the top-level manifest
    pub async fn write_master(&self, renditions: &[Rendition], uri_prefix: &str) -> Result<()> {
        let playlist = Playlist::MasterPlaylist(render_master_playlist(renditions, uri_prefix));
        let body = serialize_playlist(&playlist)?;
        self.persist(MASTER_MANIFEST, body).await?;

        info!(
            "Master manifest written with {} rendition(s)",
            renditions.len()
        );
        Ok(())
    }

    async fn persist(&self, file_name: &str, body: String) -> Result<()> {
        let path = self.path_for(file_name);
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| LoopcastError::ManifestWriteError { path, source })
    }
}
