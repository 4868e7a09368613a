use crate::error::{LoopcastError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// One entry of the looped content, in source playlist order
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSegment {
    /// Ordinal within the source playlist
    pub index: usize,
    /// URI line exactly as it appeared in the source
    pub uri: String,
    /// Duration in seconds
    pub duration: f32,
}

/// Result of scanning the source playlist
///
/// `markers` maps a content segment ordinal to the duration (seconds) of the
/// ad break that must run when the loop reaches that segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CueScan {
    pub segments: Vec<ContentSegment>,
    pub markers: BTreeMap<usize, f32>,
}

impl CueScan {
    /// Number of content segments in one pass of the loop
    pub fn total(&self) -> usize {
        self.segments.len()
    }

    /// Wrap an unbounded content pointer onto the segment list
    pub fn wrap(&self, pointer: u64) -> Option<usize> {
        match self.segments.len() {
            0 => None,
            n => Some((pointer % n as u64) as usize),
        }
    }

    /// Content segment for an unbounded content pointer
    pub fn segment_at(&self, pointer: u64) -> Option<&ContentSegment> {
        self.wrap(pointer).and_then(|i| self.segments.get(i))
    }
}

/// Read and scan the source playlist
///
/// The only fatal condition is an unreadable source; everything malformed
/// inside it degrades gracefully.
pub async fn scan_source(path: &Path, segment_duration: f32) -> Result<CueScan> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoopcastError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let scan = scan_lines(&content, segment_duration);

    info!(
        "Scanned {}: {} content segments, {} ad break marker(s)",
        path.display(),
        scan.total(),
        scan.markers.len()
    );
    debug!("Ad break markers: {:?}", scan.markers);

    Ok(scan)
}

/// Scan playlist text line by line
///
/// - `#EXTINF` followed by its URI line yields one content segment.
/// - `#EXT-X-CUE-OUT` arms a pending cue which is attached to the next content
///   segment and then cleared, so every cue produces exactly one marker.
pub fn scan_lines(content: &str, segment_duration: f32) -> CueScan {
    let mut scan = CueScan::default();
    let mut pending_cue: Option<f32> = None;
    let mut awaiting_uri = false;

    for (line_no, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if awaiting_uri {
            awaiting_uri = false;
            if !line.starts_with('#') {
                let index = scan.segments.len();
                if let Some(duration) = pending_cue.take() {
                    info!(
                        "Ad break marker at content segment #{}: duration {}s",
                        index, duration
                    );
                    scan.markers.insert(index, duration);
                }
                scan.segments.push(ContentSegment {
                    index,
                    uri: line.to_string(),
                    duration: segment_duration,
                });
                continue;
            }
            warn!(
                "Line {}: #EXTINF without a URI line, dropping segment",
                line_no + 1
            );
        }

        if is_cue_out(line) {
            let duration = parse_cue_out(line).unwrap_or_else(|| {
                warn!(
                    "Line {}: malformed CUE-OUT duration in '{}', using 0",
                    line_no + 1,
                    line
                );
                0.0
            });
            debug!("CUE-OUT on line {}: {}s", line_no + 1, duration);
            pending_cue = Some(duration);
        } else if line.starts_with("#EXTINF") {
            awaiting_uri = true;
        }
    }

    if let Some(duration) = pending_cue {
        warn!(
            "CUE-OUT ({}s) at end of playlist has no following segment, ignoring",
            duration
        );
    }

    scan
}

fn is_cue_out(line: &str) -> bool {
    (line.starts_with("#EXT-X-CUE-OUT") || line.starts_with("#EXT-CUE-OUT"))
        && !line.contains("CUE-OUT-CONT")
}

/// Parse CUE-OUT tag to extract duration
///
/// Supports formats:
/// - `#EXT-X-CUE-OUT:30` → 30.0
/// - `#EXT-X-CUE-OUT:DURATION=30` → 30.0
/// - `#EXT-X-CUE-OUT:ID=1,DURATION=30.5` → 30.5
/// - `#EXT-CUE-OUT:30` → 30.0 (legacy format)
pub(crate) fn parse_cue_out(tag: &str) -> Option<f32> {
    if !is_cue_out(tag) {
        return None;
    }

    let (_, attributes) = tag.split_once(':')?;

    // Handle "DURATION=30" format, possibly among other attributes
    if let Some((_, after)) = attributes.split_once("DURATION=") {
        let value = after.split(',').next().unwrap_or("").trim().trim_matches('"');
        return value
            .parse::<f32>()
            .ok()
            .filter(|d| d.is_finite() && *d >= 0.0);
    }

    // Handle simple "30" format
    attributes
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "#EXTM3U\n\
        #EXT-X-VERSION:3\n\
        #EXT-X-TARGETDURATION:10\n\
        #EXTINF:10.0,\n\
        seg_0.ts\n\
        #EXTINF:10.0,\n\
        seg_1.ts\n\
        #EXT-X-CUE-OUT:DURATION=30\n\
        #EXTINF:10.0,\n\
        seg_2.ts\n\
        #EXTINF:10.0,\n\
        seg_3.ts\n\
        #EXT-X-CUE-IN\n\
        #EXTINF:10.0,\n\
        seg_4.ts\n\
        #EXT-X-ENDLIST\n";

    #[test]
    fn test_parse_cue_out_simple() {
        assert_eq!(parse_cue_out("#EXT-X-CUE-OUT:30"), Some(30.0));
        assert_eq!(parse_cue_out("#EXT-X-CUE-OUT:60.5"), Some(60.5));
    }

    #[test]
    fn test_parse_cue_out_with_duration_key() {
        assert_eq!(parse_cue_out("#EXT-X-CUE-OUT:DURATION=30"), Some(30.0));
        assert_eq!(parse_cue_out("#EXT-X-CUE-OUT:DURATION=45.5"), Some(45.5));
        assert_eq!(
            parse_cue_out("#EXT-X-CUE-OUT:ID=7,DURATION=20,CUE=\"abc\""),
            Some(20.0)
        );
    }

    #[test]
    fn test_parse_cue_out_legacy() {
        assert_eq!(parse_cue_out("#EXT-CUE-OUT:30"), Some(30.0));
    }

    #[test]
    fn test_parse_cue_out_invalid() {
        assert_eq!(parse_cue_out("#EXT-X-CUE-OUT-CONT:10/30"), None);
        assert_eq!(parse_cue_out("#EXT-X-CUE-IN"), None);
        assert_eq!(parse_cue_out("#EXT-X-CUE-OUT:invalid"), None);
        assert_eq!(parse_cue_out("#EXT-X-CUE-OUT:DURATION=abc"), None);
        assert_eq!(parse_cue_out("#EXT-X-CUE-OUT"), None);
    }

    #[test]
    fn test_scan_segments_and_marker() {
        let scan = scan_lines(SOURCE, 10.0);

        assert_eq!(scan.total(), 5);
        assert_eq!(scan.segments[2].uri, "seg_2.ts");
        assert_eq!(scan.segments[2].index, 2);
        assert_eq!(scan.segments[2].duration, 10.0);
        // The cue marks the segment that follows it
        assert_eq!(scan.markers.len(), 1);
        assert_eq!(scan.markers.get(&2).copied(), Some(30.0));
        assert_eq!(scan.markers.get(&1).copied(), None);
    }

    #[test]
    fn test_malformed_duration_still_creates_marker() {
        let scan = scan_lines(
            "#EXTINF:10,\na.ts\n#EXT-X-CUE-OUT:DURATION=soon\n#EXTINF:10,\nb.ts\n",
            10.0,
        );
        assert_eq!(scan.total(), 2);
        assert_eq!(scan.markers.get(&1).copied(), Some(0.0));
    }

    #[test]
    fn test_dangling_cue_is_dropped() {
        let scan = scan_lines("#EXTINF:10,\na.ts\n#EXT-X-CUE-OUT:30\n", 10.0);
        assert_eq!(scan.total(), 1);
        assert!(scan.markers.is_empty());
    }

    #[test]
    fn test_one_marker_per_cue() {
        let scan = scan_lines(
            "#EXT-X-CUE-OUT:10\n#EXTINF:10,\na.ts\n#EXTINF:10,\nb.ts\n#EXT-X-CUE-OUT:20\n#EXTINF:10,\nc.ts\n",
            10.0,
        );
        assert_eq!(scan.markers.len(), 2);
        assert_eq!(scan.markers.get(&0).copied(), Some(10.0));
        assert_eq!(scan.markers.get(&1).copied(), None);
        assert_eq!(scan.markers.get(&2).copied(), Some(20.0));
    }

    #[test]
    fn test_extinf_without_uri_is_skipped() {
        let scan = scan_lines("#EXTINF:10,\n#EXTINF:10,\n\nb.ts\n", 10.0);
        assert_eq!(scan.total(), 1);
        assert_eq!(scan.segments[0].uri, "b.ts");
        assert_eq!(scan.segments[0].index, 0);
    }

    #[test]
    fn test_nested_uri_is_kept_verbatim() {
        let scan = scan_lines("#EXTINF:10,\npart2/seg_9.ts\n", 10.0);
        assert_eq!(scan.segments[0].uri, "part2/seg_9.ts");
    }

    #[test]
    fn test_wrap_cycles_over_segments() {
        let scan = scan_lines(SOURCE, 10.0);
        assert_eq!(scan.wrap(0), Some(0));
        assert_eq!(scan.wrap(7), Some(2));
        assert_eq!(scan.segment_at(10).map(|s| s.uri.as_str()), Some("seg_0.ts"));
        assert_eq!(CueScan::default().wrap(3), None);
    }

    #[tokio::test]
    async fn test_scan_source_unreadable_is_fatal() {
        let err = scan_source(Path::new("/definitely/not/here.m3u8"), 10.0)
            .await
            .unwrap_err();
        assert!(matches!(err, LoopcastError::SourceUnreadable { .. }));
    }

    #[tokio::test]
    async fn test_scan_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.m3u8");
        std::fs::write(&path, SOURCE).unwrap();

        let scan = scan_source(&path, 10.0).await.unwrap();
        assert_eq!(scan.total(), 5);
        assert_eq!(scan.markers.get(&2).copied(), Some(30.0));
    }
}
