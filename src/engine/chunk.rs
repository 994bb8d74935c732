//! Fixed-duration time bucketing of transcripts.

use crate::transcript::{Segment, TranscriptResult};
use std::collections::BTreeMap;

/// A time bucket `[start_seconds, end_seconds)` and the segments starting in it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeChunk {
    /// Bucket number, `floor(start / chunk_seconds)`.
    pub index: u64,
    pub start_seconds: f64,
    pub end_seconds: f64,
    /// Member segments in their original order.
    pub segments: Vec<Segment>,
}

impl TimeChunk {
    /// Space-joined text of the member segments.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Group segments by the bucket their start time falls in.
///
/// Buckets come out in ascending order; empty buckets are omitted. A segment
/// starting exactly on a boundary belongs to the later bucket.
/// A `chunk_seconds` that is not positive and finite yields no buckets.
pub fn chunk(transcript: &TranscriptResult, chunk_seconds: f64) -> Vec<TimeChunk> {
    if !(chunk_seconds.is_finite() && chunk_seconds > 0.0) {
        return Vec::new();
    }

    let mut buckets: BTreeMap<u64, Vec<Segment>> = BTreeMap::new();

    for segment in &transcript.segments {
        let index = (segment.start.max(0.0) / chunk_seconds).floor() as u64;
        buckets.entry(index).or_default().push(segment.clone());
    }

    buckets
        .into_iter()
        .map(|(index, segments)| TimeChunk {
            index,
            start_seconds: index as f64 * chunk_seconds,
            end_seconds: index.saturating_add(1) as f64 * chunk_seconds,
            segments,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript_with_starts(starts: &[f64]) -> TranscriptResult {
        let segments = starts
            .iter()
            .map(|s| Segment::new(format!("at {}", s), *s, 1.0))
            .collect();
        TranscriptResult::from_segments("dQw4w9WgXcQ", "en", false, segments, "local")
    }

    fn starts(chunk: &TimeChunk) -> Vec<f64> {
        chunk.segments.iter().map(|s| s.start).collect()
    }

    #[test]
    fn test_minute_buckets() {
        let chunks = chunk(&transcript_with_starts(&[0.0, 30.0, 61.0, 119.0]), 60.0);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(starts(&chunks[0]), vec![0.0, 30.0]);
        assert_eq!(chunks[1].index, 1);
        assert_eq!(starts(&chunks[1]), vec![61.0, 119.0]);
        assert_eq!(chunks[1].start_seconds, 60.0);
        assert_eq!(chunks[1].end_seconds, 120.0);
    }

    #[test]
    fn test_boundary_belongs_to_later_bucket() {
        let chunks = chunk(&transcript_with_starts(&[59.9, 60.0]), 60.0);
        assert_eq!(chunks.len(), 2);
        assert_eq!(starts(&chunks[1]), vec![60.0]);
    }

    #[test]
    fn test_buckets_sorted_regardless_of_arrival_order() {
        let chunks = chunk(&transcript_with_starts(&[400.0, 10.0, 350.0, 20.0]), 300.0);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(starts(&chunks[0]), vec![10.0, 20.0]);
        assert_eq!(starts(&chunks[1]), vec![400.0, 350.0]);
    }

    #[test]
    fn test_gaps_are_skipped() {
        let chunks = chunk(&transcript_with_starts(&[5.0, 900.0]), 300.0);
        let indices: Vec<u64> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 3]);
    }

    #[test]
    fn test_chunk_text() {
        let chunks = chunk(&transcript_with_starts(&[0.0, 1.0]), 60.0);
        assert_eq!(chunks[0].text(), "at 0 at 1");
    }

    #[test]
    fn test_non_positive_width_yields_nothing() {
        let transcript = transcript_with_starts(&[0.0, 30.0]);
        assert!(chunk(&transcript, 0.0).is_empty());
        assert!(chunk(&transcript, -60.0).is_empty());
        assert!(chunk(&transcript, f64::NAN).is_empty());
    }

    #[test]
    fn test_huge_start_does_not_overflow() {
        let chunks = chunk(&transcript_with_starts(&[f64::MAX]), 1.0);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, u64::MAX);
        assert!(chunks[0].end_seconds >= chunks[0].start_seconds);
    }

    #[test]
    fn test_empty_transcript() {
        assert!(chunk(&transcript_with_starts(&[]), 60.0).is_empty());
    }
}
