use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default rendition ladder: `name:bandwidth:WIDTHxHEIGHT`, comma separated
const DEFAULT_RENDITIONS: &str = "360p:800000:640x360,480p:1200000:854x480,720p:3000000:1280x720";

/// One bitrate/resolution variant of the looped asset
#[derive(Clone, Debug, PartialEq)]
pub struct Rendition {
    /// Identifier, also the per-rendition directory name for content and ad segments
    pub name: String,
    /// Advertised BANDWIDTH in bits per second
    pub bandwidth: u64,
    pub width: u64,
    pub height: u64,
}

impl Rendition {
    /// File name of this rendition's live manifest, e.g. `720p.m3u8`
    pub fn manifest_name(&self) -> String {
        format!("{}.m3u8", self.name)
    }
}

/// Parse a rendition list of the form `360p:800000:640x360,720p:3000000:1280x720`
pub fn parse_renditions(list: &str) -> Result<Vec<Rendition>, String> {
    let mut renditions = Vec::new();

    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let mut parts = item.split(':');
        let (Some(name), Some(bandwidth), Some(resolution), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(format!(
                "rendition '{}' must look like name:bandwidth:WIDTHxHEIGHT",
                item
            ));
        };

        if name.is_empty() || name.contains(['/', '\\']) || name == ".." || name == "ads" {
            return Err(format!("invalid rendition name '{}'", name));
        }

        let bandwidth = bandwidth
            .parse::<u64>()
            .map_err(|e| format!("invalid bandwidth for rendition '{}': {}", name, e))?;

        let (width, height) = resolution
            .split_once('x')
            .and_then(|(w, h)| Some((w.parse::<u64>().ok()?, h.parse::<u64>().ok()?)))
            .ok_or_else(|| format!("invalid resolution '{}' for rendition '{}'", resolution, name))?;

        if renditions.iter().any(|r: &Rendition| r.name == name) {
            return Err(format!("duplicate rendition '{}'", name));
        }

        renditions.push(Rendition {
            name: name.to_string(),
            bandwidth,
            width,
            height,
        });
    }

    if renditions.is_empty() {
        return Err("at least one rendition is required".to_string());
    }

    Ok(renditions)
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub is_dev: bool,
    /// Upstream playlist scanned once at startup for content segments and cue markers
    pub source_playlist: PathBuf,
    /// Content segments live under `<content_dir>/<rendition>/`
    pub content_dir: PathBuf,
    /// Ad segments live under `<ad_dir>/<rendition>/`
    pub ad_dir: PathBuf,
    /// Where the top-level and per-rendition manifests are persisted
    pub manifest_dir: PathBuf,
    /// Path prefix used for every URI written into manifests
    pub uri_prefix: String,
    /// Live window capacity, in segments
    pub window_size: usize,
    pub tick_interval: Duration,
    /// Pause between startup and the first periodic tick
    pub startup_delay: Duration,
    /// Run `window_size` ticks at startup so the first manifest is already full
    pub prime_window: bool,
    pub content_segment_duration: f32,
    pub ad_segment_duration: f32,
    /// File extension (without dot) of ad segment files
    pub ad_segment_extension: String,
    pub renditions: Vec<Rendition>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8084,
            is_dev: false,
            source_playlist: PathBuf::from("./input-playlist.m3u8"),
            content_dir: PathBuf::from("./segments"),
            ad_dir: PathBuf::from("./adv"),
            manifest_dir: PathBuf::from("./manifests"),
            uri_prefix: "/vod".to_string(),
            window_size: 5,
            tick_interval: Duration::from_secs(1),
            startup_delay: Duration::from_secs(5),
            prime_window: true,
            content_segment_duration: 10.0,
            ad_segment_duration: 5.0,
            ad_segment_extension: "ts".to_string(),
            renditions: parse_renditions(DEFAULT_RENDITIONS).unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    /// Every variable is optional; unset ones fall back to the reference deployment values.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let defaults = Config::default();

        let is_dev = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        let port = match env::var("PORT") {
            Ok(port) => port.parse()?,
            Err(_) => defaults.port,
        };

        let path_var = |key: &str, default: PathBuf| {
            env::var(key).map(PathBuf::from).unwrap_or(default)
        };

        let source_playlist = path_var("SOURCE_PLAYLIST", defaults.source_playlist);
        let content_dir = path_var("CONTENT_DIR", defaults.content_dir);
        let ad_dir = path_var("AD_DIR", defaults.ad_dir);
        let manifest_dir = path_var("MANIFEST_DIR", defaults.manifest_dir);

        let uri_prefix = env::var("URI_PREFIX")
            .map(|p| p.trim_end_matches('/').to_string())
            .unwrap_or(defaults.uri_prefix);
        if !(uri_prefix.is_empty() || uri_prefix.starts_with('/')) {
            return Err("URI_PREFIX must start with '/'".into());
        }

        let window_size: usize = match env::var("WINDOW_SIZE") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.window_size,
        };
        if window_size == 0 {
            return Err("WINDOW_SIZE must be at least 1".into());
        }

        let tick_interval = match env::var("TICK_INTERVAL_MS") {
            Ok(v) => Duration::from_millis(v.parse()?),
            Err(_) => defaults.tick_interval,
        };
        if tick_interval.is_zero() {
            return Err("TICK_INTERVAL_MS must be greater than 0".into());
        }

        let startup_delay = match env::var("STARTUP_DELAY_SECS") {
            Ok(v) => Duration::from_secs(v.parse()?),
            Err(_) => defaults.startup_delay,
        };

        let prime_window = env::var("PRIME_WINDOW")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.prime_window);

        let content_segment_duration: f32 = match env::var("CONTENT_SEGMENT_DURATION") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.content_segment_duration,
        };
        let ad_segment_duration: f32 = match env::var("AD_SEGMENT_DURATION") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.ad_segment_duration,
        };
        if !(content_segment_duration > 0.0 && ad_segment_duration > 0.0) {
            return Err("segment durations must be positive".into());
        }

        let ad_segment_extension = env::var("AD_SEGMENT_EXTENSION")
            .map(|e| e.trim_start_matches('.').to_string())
            .unwrap_or(defaults.ad_segment_extension);

        let renditions = match env::var("RENDITIONS") {
            Ok(v) => parse_renditions(&v)?,
            Err(_) => defaults.renditions,
        };

        Ok(Config {
            port,
            is_dev,
            source_playlist,
            content_dir,
            ad_dir,
            manifest_dir,
            uri_prefix,
            window_size,
            tick_interval,
            startup_delay,
            prime_window,
            content_segment_duration,
            ad_segment_duration,
            ad_segment_extension,
            renditions,
        })
    }
}
