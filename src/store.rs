//! Record store: one immutable sample collection per resolution.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::sample::{Resolution, Sample};

/// Loaded samples keyed by resolution.
///
/// Collections are written once at startup and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    collections: BTreeMap<Resolution, Vec<Sample>>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(resolution, samples)` pairs.
    pub fn from_collections<I>(collections: I) -> Self
    where
        I: IntoIterator<Item = (Resolution, Vec<Sample>)>,
    {
        Self {
            collections: collections.into_iter().collect(),
        }
    }

    /// Samples for a resolution.
    ///
    /// A resolution without loaded data is an error, never a fallback to
    /// another resolution.
    pub fn samples(&self, resolution: Resolution) -> Result<&[Sample]> {
        self.collections
            .get(&resolution)
            .map(Vec::as_slice)
            .ok_or(Error::MissingResolution(resolution))
    }

    /// Resolutions with loaded data, finest first.
    pub fn resolutions(&self) -> impl Iterator<Item = Resolution> + '_ {
        self.collections.keys().copied()
    }

    /// Check whether a resolution has data.
    pub fn contains(&self, resolution: Resolution) -> bool {
        self.collections.contains_key(&resolution)
    }

    /// Largest day present in any collection.
    pub fn max_day(&self) -> Option<u32> {
        self.collections
            .values()
            .flat_map(|samples| samples.iter().map(|sample| sample.day))
            .max()
    }

    /// Total number of samples across all collections.
    pub fn len(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    /// Check whether the store holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_resolution_is_an_error() {
        let store = RecordStore::from_collections([(Resolution::Min60, vec![Sample::new(2, 0)])]);
        assert!(store.samples(Resolution::Min60).is_ok());
        assert!(matches!(
            store.samples(Resolution::Min5),
            Err(Error::MissingResolution(Resolution::Min5))
        ));
    }

    #[test]
    fn max_day_spans_all_collections() {
        assert_eq!(RecordStore::new().max_day(), None);
        let store = RecordStore::from_collections([
            (Resolution::Min60, vec![Sample::new(2, 0)]),
            (Resolution::Min15, vec![Sample::new(9, 3), Sample::new(4, 1)]),
        ]);
        assert_eq!(store.max_day(), Some(9));
        assert_eq!(store.len(), 3);
        assert_eq!(
            store.resolutions().collect::<Vec<_>>(),
            vec![Resolution::Min15, Resolution::Min60]
        );
    }
}
