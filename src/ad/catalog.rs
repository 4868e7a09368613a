use crate::config::Rendition;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// A pre-encoded ad segment available for one rendition
#[derive(Debug, Clone, PartialEq)]
pub struct AdSegment {
    pub rendition: String,
    /// Numeric suffix of `<prefix>_<ordinal>.<ext>`, `None` when the name does not carry one
    pub ordinal: Option<u32>,
    pub file_name: String,
    /// Duration of the segment in seconds
    pub duration: f32,
}

/// Per-rendition, ordinal-sorted list of ad segments
///
/// Built once at startup and read-only afterwards. A rendition with no
/// entry simply gets no ads.
#[derive(Debug, Clone, Default)]
pub struct AdCatalog {
    by_rendition: HashMap<String, Vec<AdSegment>>,
}

impl AdCatalog {
    /// List `<ad_dir>/<rendition>/` for every rendition
    ///
    /// Unreadable directories are logged and leave that rendition empty.
    pub async fn load(
        ad_dir: &Path,
        renditions: &[Rendition],
        extension: &str,
        segment_duration: f32,
    ) -> Self {
        let mut catalog = Self::default();

        for rendition in renditions {
            let dir = ad_dir.join(&rendition.name);
            let names = match list_files(&dir, extension).await {
                Ok(names) => names,
                Err(e) => {
                    warn!(
                        "Failed to read ad segments from {}: {}. Ads disabled for {}",
                        dir.display(),
                        e,
                        rendition.name
                    );
                    continue;
                }
            };

            catalog.insert(&rendition.name, names, extension, segment_duration);
            info!(
                "Cached {} ad segment(s) for rendition {}",
                catalog.len(&rendition.name),
                rendition.name
            );
        }

        catalog
    }

    /// Register a rendition's ad files, sorting them by ordinal
    pub fn insert(
        &mut self,
        rendition: &str,
        file_names: Vec<String>,
        extension: &str,
        segment_duration: f32,
    ) {
        let mut segments: Vec<AdSegment> = file_names
            .into_iter()
            .map(|file_name| {
                let ordinal = parse_ordinal(&file_name, extension);
                if ordinal.is_none() {
                    warn!(
                        "Ad segment {} has no numeric ordinal, ordering it last",
                        file_name
                    );
                }
                AdSegment {
                    rendition: rendition.to_string(),
                    ordinal,
                    file_name,
                    duration: segment_duration,
                }
            })
            .collect();

        segments.sort_by(compare_segments);
        self.by_rendition.insert(rendition.to_string(), segments);
    }

    /// Ad segment at `position` within the rendition's sorted list
    pub fn segment(&self, rendition: &str, position: usize) -> Option<&AdSegment> {
        self.by_rendition.get(rendition)?.get(position)
    }

    pub fn len(&self, rendition: &str) -> usize {
        self.by_rendition.get(rendition).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, rendition: &str) -> bool {
        self.len(rendition) == 0
    }
}

async fn list_files(dir: &Path, extension: &str) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let suffix = format!(".{}", extension);
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str()
            && name.ends_with(&suffix)
        {
            names.push(name.to_string());
        }
    }

    Ok(names)
}

/// Extract the ordinal from `<prefix>_<ordinal>.<ext>`
///
/// The ordinal is the text after the last `_` and before the extension.
pub fn parse_ordinal(file_name: &str, extension: &str) -> Option<u32> {
    let stem = file_name.strip_suffix(extension)?.strip_suffix('.')?;
    let (_, digits) = stem.rsplit_once('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Parsed ordinals ascending, unparsable names last; ties broken by name
fn compare_segments(a: &AdSegment, b: &AdSegment) -> Ordering {
    match (a.ordinal, b.ordinal) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.file_name.cmp(&b.file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_ordinal() {
        assert_eq!(parse_ordinal("ad_0.ts", "ts"), Some(0));
        assert_eq!(parse_ordinal("ad_12.ts", "ts"), Some(12));
        assert_eq!(parse_ordinal("spot_a_7.ts", "ts"), Some(7));
        assert_eq!(parse_ordinal("ad.ts", "ts"), None);
        assert_eq!(parse_ordinal("ad_.ts", "ts"), None);
        assert_eq!(parse_ordinal("ad_x1.ts", "ts"), None);
        assert_eq!(parse_ordinal("ad_-1.ts", "ts"), None);
        assert_eq!(parse_ordinal("ad_3.m4s", "ts"), None);
    }

    #[test]
    fn test_numeric_not_lexicographic_order() {
        let mut catalog = AdCatalog::default();
        catalog.insert("360p", names(&["ad_10.ts", "ad_2.ts", "ad_1.ts"]), "ts", 5.0);

        let order: Vec<_> = (0..3)
            .map(|i| catalog.segment("360p", i).unwrap().file_name.clone())
            .collect();
        assert_eq!(order, vec!["ad_1.ts", "ad_2.ts", "ad_10.ts"]);
    }

    #[test]
    fn test_unparsable_names_sort_last_without_colliding_with_zero() {
        let mut catalog = AdCatalog::default();
        catalog.insert(
            "360p",
            names(&["promo.ts", "ad_1.ts", "ad_0.ts", "bumper.ts"]),
            "ts",
            5.0,
        );

        assert_eq!(catalog.segment("360p", 0).unwrap().file_name, "ad_0.ts");
        assert_eq!(catalog.segment("360p", 0).unwrap().ordinal, Some(0));
        assert_eq!(catalog.segment("360p", 1).unwrap().file_name, "ad_1.ts");
        assert_eq!(catalog.segment("360p", 2).unwrap().file_name, "bumper.ts");
        assert_eq!(catalog.segment("360p", 3).unwrap().file_name, "promo.ts");
        assert_eq!(catalog.segment("360p", 3).unwrap().ordinal, None);
    }

    #[test]
    fn test_missing_rendition_is_empty() {
        let catalog = AdCatalog::default();
        assert!(catalog.is_empty("720p"));
        assert!(catalog.segment("720p", 0).is_none());
    }

    #[tokio::test]
    async fn test_load_filters_extension_and_tolerates_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let rendition_dir = dir.path().join("360p");
        std::fs::create_dir_all(&rendition_dir).unwrap();
        for name in ["ad_1.ts", "ad_0.ts", "notes.txt"] {
            std::fs::write(rendition_dir.join(name), b"x").unwrap();
        }
        std::fs::create_dir(rendition_dir.join("nested_2.ts")).unwrap();

        let renditions = crate::config::parse_renditions("360p:1:1x1,720p:2:2x2").unwrap();
        let catalog = AdCatalog::load(dir.path(), &renditions, "ts", 5.0).await;

        assert_eq!(catalog.len("360p"), 2);
        assert_eq!(catalog.segment("360p", 0).unwrap().file_name, "ad_0.ts");
        assert_eq!(catalog.segment("360p", 0).unwrap().rendition, "360p");
        assert_eq!(catalog.segment("360p", 0).unwrap().duration, 5.0);
        assert!(catalog.is_empty("720p"));
    }
}
