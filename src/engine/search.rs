//! Keyword search over transcript segments.

use crate::transcript::{Segment, TranscriptResult};

/// One search hit with its surrounding context.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchGroup {
    /// Index of the matching segment in the transcript.
    pub match_index: usize,
    /// Index of the first segment in `segments`.
    pub first_index: usize,
    /// Contiguous slice of the transcript around the match.
    pub segments: Vec<Segment>,
}

impl MatchGroup {
    /// The matching segment itself.
    pub fn matched(&self) -> &Segment {
        &self.segments[self.match_index - self.first_index]
    }

    /// Iterate `(transcript index, segment, is_match)` over the group.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &Segment, bool)> {
        self.segments.iter().enumerate().map(move |(offset, segment)| {
            let index = self.first_index + offset;
            (index, segment, index == self.match_index)
        })
    }
}

/// Case-insensitive substring search, in segment order.
///
/// Every matching segment yields one group spanning `context_window` segments
/// on either side, clipped to the transcript.
pub fn search(transcript: &TranscriptResult, query: &str, context_window: usize) -> Vec<MatchGroup> {
    let needle = query.to_lowercase();
    let segments = &transcript.segments;

    segments
        .iter()
        .enumerate()
        .filter(|(_, segment)| segment.text.to_lowercase().contains(&needle))
        .map(|(i, _)| {
            let first = i.saturating_sub(context_window);
            let end = i.saturating_add(context_window).saturating_add(1).min(segments.len());
            MatchGroup {
                match_index: i,
                first_index: first,
                segments: segments[first..end].to_vec(),
            }
        })
        .collect()
}
