//! The playlist state machine.
//!
//! One [`PlaylistEngine`] owns the content pointer, the ad-break sub-state and
//! every rendition window. Each call to [`PlaylistEngine::tick`] moves all
//! renditions forward by exactly one entry, so a player switching renditions
//! always lands on the same content/ad phase and discontinuity state.

use crate::ad::AdCatalog;
use crate::config::{Config, Rendition};
use crate::error::Result;
use crate::hls::cue::{self, CueScan};
use crate::hls::manifest::ManifestWriter;
use crate::metrics;
use crate::playlist::window::{Entry, EntryKind, LiveWindow};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Ad-break sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Normal,
    AdBreak {
        /// Ad segments this break inserts
        total: u32,
        /// Ad segments inserted so far, shared by all renditions
        inserted: u32,
    },
}

/// What a single tick appended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Content segment `index` (already wrapped) was appended
    Content { index: usize, loop_point: bool },
    /// Ad segment `position` of a `total`-segment break was appended
    Ad { position: u32, total: u32 },
    /// No content to play
    Idle,
}

/// Read-only view of the scheduler published after every tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchedulerStatus {
    /// Ticks completed so far
    pub ticks: u64,
    pub content_pointer: u64,
    pub in_ad_break: bool,
}

/// Static inputs of the engine, shared read-only
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub window_size: usize,
    pub ad_segment_duration: f32,
    pub uri_prefix: String,
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            window_size: config.window_size,
            ad_segment_duration: config.ad_segment_duration,
            uri_prefix: config.uri_prefix.clone(),
        }
    }
}

struct Track {
    rendition: Rendition,
    manifest_name: String,
    window: LiveWindow,
}

pub struct PlaylistEngine {
    settings: EngineSettings,
    content: Arc<CueScan>,
    /// Content index → number of ad segments to insert
    breaks: BTreeMap<usize, u32>,
    catalog: Arc<AdCatalog>,
    writer: ManifestWriter,
    tracks: Vec<Track>,
    content_pointer: u64,
    phase: Phase,
    ticks: u64,
}

impl PlaylistEngine {
    pub fn new(
        settings: EngineSettings,
        renditions: &[Rendition],
        content: Arc<CueScan>,
        catalog: Arc<AdCatalog>,
        writer: ManifestWriter,
    ) -> Self {
        let breaks = plan_breaks(&content, settings.ad_segment_duration);
        let tracks = renditions
            .iter()
            .map(|rendition| Track {
                rendition: rendition.clone(),
                manifest_name: rendition.manifest_name(),
                window: LiveWindow::new(settings.window_size),
            })
            .collect();

        Self {
            settings,
            content,
            breaks,
            catalog,
            writer,
            tracks,
            content_pointer: 0,
            phase: Phase::Normal,
            ticks: 0,
        }
    }

    /// Startup wiring: scan the source, load the ad catalog, write the
    /// top-level manifest and build the engine
    ///
    /// Fails only on an unreadable source or an unusable manifest directory.
    pub async fn bootstrap(config: &Config) -> Result<Self> {
        info!("Starting initialization");

        let content =
            cue::scan_source(&config.source_playlist, config.content_segment_duration).await?;
        if content.total() == 0 {
            warn!(
                "Source playlist {} has no content segments, manifests will stay empty",
                config.source_playlist.display()
            );
        }

        let catalog = AdCatalog::load(
            &config.ad_dir,
            &config.renditions,
            &config.ad_segment_extension,
            config.ad_segment_duration,
        )
        .await;

        let writer = ManifestWriter::new(
            &config.manifest_dir,
            config.content_segment_duration,
            config.ad_segment_duration,
        );
        writer.prepare().await?;
        info!("Persisting manifests under {}", writer.dir().display());
        writer
            .write_master(&config.renditions, &config.uri_prefix)
            .await?;

        let engine = Self::new(
            EngineSettings::from(config),
            &config.renditions,
            Arc::new(content),
            Arc::new(catalog),
            writer,
        );

        info!("Initialization complete");
        Ok(engine)
    }

    /// Advance every rendition by one entry and persist their manifests
    pub async fn tick(&mut self) -> TickOutcome {
        let Some(index) = self.content.wrap(self.content_pointer) else {
            self.ticks += 1;
            return TickOutcome::Idle;
        };

        let outcome = match self.break_step(index) {
            Some((position, total)) => {
                self.append_ad(position, total).await;
                self.phase = Phase::AdBreak {
                    total,
                    inserted: position + 1,
                };
                TickOutcome::Ad { position, total }
            }
            None => {
                let loop_point = index == 0 && self.content_pointer > 0;
                self.append_content(loop_point).await;
                self.phase = Phase::Normal;
                self.content_pointer += 1;
                TickOutcome::Content { index, loop_point }
            }
        };

        self.ticks += 1;
        metrics::record_tick(self.content_pointer, self.in_ad_break());
        outcome
    }

    /// Position and size of the ad segment due this tick, if a break is running
    fn break_step(&self, index: usize) -> Option<(u32, u32)> {
        let total = *self.breaks.get(&index)?;

        match self.phase {
            Phase::AdBreak { total, inserted } if inserted < total => Some((inserted, total)),
            Phase::AdBreak { .. } => None,
            Phase::Normal => {
                info!(
                    "Ad break starting at content segment #{}: {} ad segment(s)",
                    index, total
                );
                metrics::record_ad_break();
                Some((0, total))
            }
        }
    }

    async fn append_ad(&mut self, position: u32, total: u32) {
        let media_sequence = self.media_sequence();
        let last = position + 1 == total;

        for track in &mut self.tracks {
            let Some(segment) = self.catalog.segment(&track.rendition.name, position as usize)
            else {
                warn!(
                    "No ad segment #{} for rendition {}, skipping it this tick",
                    position, track.rendition.name
                );
                continue;
            };

            let uri = format!(
                "{}/ads/{}/{}",
                self.settings.uri_prefix, track.rendition.name, segment.file_name
            );
            let starts_break = position == 0 || track.window.tail_kind() != Some(EntryKind::Ad);

            track.window.append(Entry::ad(uri, segment.duration));
            if starts_break {
                track.window.mark_tail_discontinuity();
            }
            if last {
                track.window.set_pending_discontinuity();
            }
            debug!(
                "Ad segment {} ({}/{}) appended for {}",
                segment.file_name,
                position + 1,
                total,
                track.rendition.name
            );

            persist(&self.writer, track, media_sequence).await;
        }

        metrics::record_ad_segment();
    }

    async fn append_content(&mut self, loop_point: bool) {
        let Some(segment) = self.content.segment_at(self.content_pointer) else {
            return;
        };
        let media_sequence = self.media_sequence();

        if loop_point {
            info!("Loop point reached, restarting content at segment #0");
        }

        for track in &mut self.tracks {
            // A break whose closing ad was skipped for this rendition still needs a boundary
            if track.window.tail_kind() == Some(EntryKind::Ad) {
                track.window.set_pending_discontinuity();
            }

            let uri = format!(
                "{}/{}/{}",
                self.settings.uri_prefix, track.rendition.name, segment.uri
            );
            track.window.append(Entry::content(uri, segment.duration));
            if loop_point {
                track.window.mark_tail_discontinuity();
            }

            persist(&self.writer, track, media_sequence).await;
        }
    }

    /// Media sequence derived from the tick count, identical for every rendition
    fn media_sequence(&self) -> u64 {
        (self.ticks + 1).saturating_sub(self.settings.window_size as u64)
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            ticks: self.ticks,
            content_pointer: self.content_pointer,
            in_ad_break: self.in_ad_break(),
        }
    }

    fn in_ad_break(&self) -> bool {
        matches!(self.phase, Phase::AdBreak { total, inserted } if inserted < total)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn content_pointer(&self) -> u64 {
        self.content_pointer
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn window_size(&self) -> usize {
        self.settings.window_size
    }

    /// Live window of a rendition
    pub fn window(&self, rendition: &str) -> Option<&LiveWindow> {
        self.tracks
            .iter()
            .find(|t| t.rendition.name == rendition)
            .map(|t| &t.window)
    }
}

/// Persist one rendition; failures are logged and retried implicitly next tick
async fn persist(writer: &ManifestWriter, track: &mut Track, media_sequence: u64) {
    track.window.advance_media_sequence(media_sequence);
    let snapshot = track.window.snapshot();

    match writer.write_media(&track.manifest_name, &snapshot).await {
        Ok(()) => metrics::record_manifest_write(&track.rendition.name, true),
        Err(e) => {
            error!(
                "Failed to persist manifest for rendition {}: {}",
                track.rendition.name, e
            );
            metrics::record_manifest_write(&track.rendition.name, false);
        }
    }
}

/// Turn cue markers into ad segment counts
///
/// A marker too short to hold one ad segment can never run; it is dropped
/// here once instead of being re-evaluated on every pass of the loop.
fn plan_breaks(content: &CueScan, ad_segment_duration: f32) -> BTreeMap<usize, u32> {
    content
        .markers
        .iter()
        .filter_map(|(&index, &duration)| {
            let count = (duration / ad_segment_duration).floor();
            if count >= 1.0 {
                Some((index, count.min(u32::MAX as f32) as u32))
            } else {
                warn!(
                    "Ad break marker at content segment #{} ({}s) is shorter than one {}s ad segment, skipping it",
                    index, duration, ad_segment_duration
                );
                None
            }
        })
        .collect()
}
