//! Startup loading of the per-resolution sample files.

use std::path::Path;

use futures::future::try_join_all;

use crate::config::ViewerConfig;
use crate::error::{Error, Result};
use crate::sample::{Resolution, Sample};
use crate::store::RecordStore;

/// Parse a JSON array of samples.
///
/// Numeric fields may be numbers or numeric strings; unknown keys are kept
/// as metric fields.
pub fn parse_samples(path: &Path, bytes: &[u8]) -> Result<Vec<Sample>> {
    serde_json::from_slice(bytes).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse one sample file.
pub async fn load_file(path: &Path) -> Result<Vec<Sample>> {
    let bytes = tokio::fs::read(path).await.map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_samples(path, &bytes)
}

/// Load every configured resolution concurrently.
///
/// All files must load before the store is returned; the first failure
/// aborts the whole load, so no view ever renders from partial data.
pub async fn load_store(config: &ViewerConfig) -> Result<RecordStore> {
    let loads = config.resolutions.iter().map(|&resolution| {
        let path = config.data_path(resolution);
        async move {
            let samples = load_file(&path).await?;
            log::debug!("loaded {} samples from {}", samples.len(), path.display());
            Ok::<(Resolution, Vec<Sample>), Error>((resolution, samples))
        }
    });
    let collections = try_join_all(loads).await?;
    let store = RecordStore::from_collections(collections);
    log::info!(
        "loaded {} samples across {} resolutions",
        store.len(),
        store.resolutions().count()
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Metric;

    const HOURLY: &str = r#"[
        {"day": 0, "bin": 0, "hour": 0.5, "estrus": 0, "activity_mean": 1.5, "temperature_mean": 36.6},
        {"day": 0, "bin": 1, "hour": "1.5", "estrus": "0", "activity_mean": "2.5"},
        {"day": "1", "bin": 0, "hour": 0.5, "estrus": 1, "ratio": 12.0}
    ]"#;

    fn write(dir: &Path, resolution: Resolution, text: &str) {
        let config = ViewerConfig {
            data_dir: dir.to_path_buf(),
            ..ViewerConfig::default()
        };
        std::fs::write(config.data_path(resolution), text).unwrap();
    }

    #[test]
    fn parses_mixed_numeric_encodings() {
        let samples = parse_samples(Path::new("hourly.json"), HOURLY.as_bytes()).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[1].hour, Some(1.5));
        assert_eq!(samples[1].metric(Metric::Activity), Some(2.5));
        assert_eq!(samples[0].metric(Metric::Temperature), Some(36.6));
        assert_eq!(samples[2].day, 1);
        assert!(samples[2].estrus);
        assert_eq!(samples[2].metric(Metric::Ratio), Some(12.0));
    }

    #[test]
    fn null_hour_does_not_fail_the_file() {
        let text = r#"[
            {"day": 0, "bin": 0, "hour": null, "estrus": 0, "activity_mean": 1.0},
            {"day": 0, "bin": 1, "hour": 1.5, "estrus": 0, "activity_mean": null}
        ]"#;
        let samples = parse_samples(Path::new("hourly.json"), text.as_bytes()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].hour, None);
        assert_eq!(samples[0].metric(Metric::Activity), Some(1.0));
        assert_eq!(samples[1].metric(Metric::Activity), None);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let err = parse_samples(Path::new("bad.json"), b"{\"day\": 1}").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[tokio::test]
    async fn loads_all_configured_resolutions() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), Resolution::Min15, HOURLY);
        write(dir.path(), Resolution::Min60, HOURLY);
        let config = ViewerConfig {
            data_dir: dir.path().to_path_buf(),
            resolutions: vec![Resolution::Min15, Resolution::Min60],
            ..ViewerConfig::default()
        };

        let store = load_store(&config).await.unwrap();
        assert_eq!(store.len(), 6);
        assert!(store.contains(Resolution::Min15));
        assert!(!store.contains(Resolution::Min5));
    }

    #[tokio::test]
    async fn one_missing_file_fails_the_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), Resolution::Min60, HOURLY);
        let config = ViewerConfig {
            data_dir: dir.path().to_path_buf(),
            resolutions: vec![Resolution::Min5, Resolution::Min60],
            ..ViewerConfig::default()
        };

        let err = load_store(&config).await.unwrap_err();
        match err {
            Error::Io { path, .. } => assert!(path.ends_with("hourly_5min.json")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
