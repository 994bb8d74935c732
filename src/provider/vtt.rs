//! WebVTT caption parsing.
//!
//! Handles both uploaded subtitles and YouTube's rolling automatic captions,
//! where each cue repeats the previous cue's last line before adding new words.

use crate::transcript::Segment;
use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex"));

/// Parse a WebVTT document into segments, in cue order.
///
/// A cue's text runs until the next empty line. Whitespace-only lines inside a
/// cue (YouTube emits them) are kept as part of the cue and cleaned away.
/// With `rolling` set, lines carried over from the previous cue are dropped;
/// only automatic captions repeat lines that way.
pub fn parse_vtt(vtt: &str, rolling: bool) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut previous_lines: Vec<String> = Vec::new();
    let mut lines = vtt.lines();

    while let Some(line) = lines.next() {
        let Some((start, end)) = parse_timing_line(line) else {
            continue;
        };

        let cue_lines: Vec<String> = lines
            .by_ref()
            .take_while(|l| !l.is_empty())
            .map(clean_line)
            .filter(|l| !l.is_empty())
            .collect();

        let fresh: Vec<&str> = cue_lines
            .iter()
            .filter(|l| !rolling || !previous_lines.contains(l))
            .map(String::as_str)
            .collect();

        if !fresh.is_empty() {
            segments.push(Segment::new(fresh.join(" "), start, (end - start).max(0.0)));
        }
        previous_lines = cue_lines;
    }

    segments
}

/// `00:00:01.000 --> 00:00:03.500 align:start position:0%`
fn parse_timing_line(line: &str) -> Option<(f64, f64)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    Some((parse_cue_time(start.trim())?, parse_cue_time(end)?))
}

/// Accepts `HH:MM:SS.mmm` and `MM:SS.mmm`.
fn parse_cue_time(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (h.parse::<f64>().ok()?, m.parse::<f64>().ok()?, *s),
        [m, s] => (0.0, m.parse::<f64>().ok()?, *s),
        _ => return None,
    };
    let seconds = seconds.replace(',', ".").parse::<f64>().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

fn clean_line(line: &str) -> String {
    let stripped = TAG.replace_all(line, "");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
