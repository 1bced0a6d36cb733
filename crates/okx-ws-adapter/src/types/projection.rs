/*
[INPUT]:  Raw JSON blocks carried by envelopes
[OUTPUT]: Caller-declared typed values, or the partial result plus error
[POS]:    Data layer - generic raw-to-typed projection
[UPDATE]: When projection failure semantics change
*/

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::error::OkxError;

/// Decode one raw block; an absent block decodes as `null`.
pub(crate) fn decode_raw<T: DeserializeOwned>(raw: Option<&RawValue>) -> serde_json::Result<T> {
    serde_json::from_str(raw.map_or("null", RawValue::get))
}

/// Decode every block in order, stopping at the first failure.
pub(crate) fn decode_each<T: DeserializeOwned>(
    blocks: &[Box<RawValue>],
) -> Result<Vec<T>, ProjectionError<T>> {
    let mut decoded = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        match decode_raw(Some(&**block)) {
            Ok(value) => decoded.push(value),
            Err(source) => {
                return Err(ProjectionError {
                    decoded,
                    index: Some(index),
                    source,
                });
            }
        }
    }
    Ok(decoded)
}

/// Projection stopped early
///
/// `decoded` holds the elements that were projected before the failure.
/// `index` is `None` when the channel argument itself failed.
pub struct ProjectionError<D> {
    pub decoded: Vec<D>,
    pub index: Option<usize>,
    pub source: serde_json::Error,
}

impl<D> ProjectionError<D> {
    pub(crate) fn arg(source: serde_json::Error) -> Self {
        Self {
            decoded: Vec::new(),
            index: None,
            source,
        }
    }
}

impl<D> fmt::Debug for ProjectionError<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionError")
            .field("decoded", &self.decoded.len())
            .field("index", &self.index)
            .field("source", &self.source)
            .finish()
    }
}

impl<D> fmt::Display for ProjectionError<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "failed to project data[{index}]: {}", self.source),
            None => write!(f, "failed to project arg: {}", self.source),
        }
    }
}

impl<D> std::error::Error for ProjectionError<D> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl<D> From<ProjectionError<D>> for OkxError {
    fn from(err: ProjectionError<D>) -> Self {
        OkxError::MalformedMessage(err.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(items: &[&str]) -> Vec<Box<RawValue>> {
        items
            .iter()
            .map(|item| RawValue::from_string((*item).to_string()).unwrap())
            .collect()
    }

    #[test]
    fn test_decode_each_in_order() {
        let values: Vec<u32> = decode_each(&blocks(&["1", "2", "3"])).unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_each_stops_at_first_failure() {
        let err = decode_each::<u32>(&blocks(&["1", "\"x\"", "3"])).unwrap_err();
        assert_eq!(err.decoded, vec![1]);
        assert_eq!(err.index, Some(1));
        assert!(err.to_string().contains("data[1]"));
    }

    #[test]
    fn test_decode_absent_as_null() {
        let value: Option<u32> = decode_raw(None).unwrap();
        assert_eq!(value, None);
    }
}
