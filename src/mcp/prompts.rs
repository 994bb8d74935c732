//! Prompt templates and static resources exposed over MCP.

use super::protocol::{Prompt, PromptArgument, Resource};
use serde_json::{Map, Value};

pub const HELP_URI: &str = "youtube://help";
pub const CACHE_STATS_URI: &str = "youtube://cache/stats";

pub const HELP_TEXT: &str = r#"# YouTube Transcript MCP Server - Help Guide

## Available Tools

### get_transcript
Extract the full transcript from a YouTube video.
- Supports multiple languages (en, de, es, fr, ja, ko, zh, etc.)
- Output formats: text, segments (with timestamps), both, json, srt, vtt
- Example: get_transcript(url="https://youtube.com/watch?v=VIDEO_ID", language="en", format="segments")

### search_transcript
Search for specific keywords within a video transcript.
- Case-insensitive search
- Shows surrounding context segments
- Example: search_transcript(url="VIDEO_ID", query="machine learning", context_segments=2)

### get_transcript_summary
Get the transcript organized in time chunks for analysis.
- Configurable chunk size (default: 5 minutes)
- Great for long videos
- Example: get_transcript_summary(url="VIDEO_ID", chunk_minutes=10)

### batch_transcripts
Process multiple videos at once (max 10).
- Returns preview of each transcript
- Example: batch_transcripts(urls=["VIDEO1", "VIDEO2"], language="en")

## Tips
- Use video IDs or full YouTube URLs
- Try different language codes if default transcript isn't available
- Use search_transcript to quickly find specific topics in long videos
- Use get_transcript_summary for videos over 20 minutes
"#;

fn arg(name: &str, description: &str) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        description: description.to_string(),
        required: true,
    }
}

/// Get all available prompts.
pub fn get_prompts() -> Vec<Prompt> {
    vec![
        Prompt {
            name: "summarize_video".to_string(),
            description: "Generate a comprehensive summary of a YouTube video from its transcript."
                .to_string(),
            arguments: vec![arg("url", "YouTube video URL or video ID to summarize")],
        },
        Prompt {
            name: "compare_videos".to_string(),
            description: "Compare the content of two YouTube videos side by side.".to_string(),
            arguments: vec![
                arg("url1", "First YouTube video URL or ID"),
                arg("url2", "Second YouTube video URL or ID"),
            ],
        },
        Prompt {
            name: "find_key_moments".to_string(),
            description: "Find and analyze key moments in a video related to a specific topic."
                .to_string(),
            arguments: vec![
                arg("url", "YouTube video URL or video ID"),
                arg("topic", "The topic or keyword to search for"),
            ],
        },
    ]
}

/// Render a prompt. Returns its description and text, or an error message.
pub fn render_prompt(name: &str, arguments: &Map<String, Value>) -> Result<(String, String), String> {
    let prompt = get_prompts()
        .into_iter()
        .find(|p| p.name == name)
        .ok_or_else(|| format!("Unknown prompt: {}", name))?;

    let get = |key: &str| -> Result<&str, String> {
        arguments
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| format!("Missing '{}' argument", key))
    };

    let text = match name {
        "summarize_video" => format!(
            "Please use the get_transcript tool to fetch the transcript for this YouTube video: {}\n\n\
             Then provide a comprehensive summary including:\n\
             1. Main topic and key points\n\
             2. Important quotes or statements\n\
             3. A brief conclusion\n\n\
             Keep the summary concise but informative.",
            get("url")?
        ),
        "compare_videos" => format!(
            "Please use the batch_transcripts tool to fetch transcripts for these two videos:\n\
             - Video 1: {}\n\
             - Video 2: {}\n\n\
             Then compare them:\n\
             1. What topics does each video cover?\n\
             2. Where do they agree or disagree?\n\
             3. Which provides more depth on the subject?\n\
             4. Key differences in perspective or approach",
            get("url1")?,
            get("url2")?
        ),
        _ => {
            let url = get("url")?;
            let topic = get("topic")?;
            format!(
                "Please use the search_transcript tool to find mentions of \"{topic}\" in this video: {url}\n\n\
                 Then use get_transcript_summary to get the full time-chunked transcript.\n\n\
                 Analyze and present:\n\
                 1. All timestamps where \"{topic}\" is discussed\n\
                 2. Context around each mention\n\
                 3. The speaker's main points about this topic\n\
                 4. A summary of the overall stance on \"{topic}\""
            )
        }
    };

    Ok((prompt.description, text))
}

/// Get all available resources.
pub fn get_resources() -> Vec<Resource> {
    vec![
        Resource {
            uri: HELP_URI.to_string(),
            name: "help".to_string(),
            description: "Help guide for the YouTube Transcript MCP server.".to_string(),
            mime_type: "text/markdown".to_string(),
        },
        Resource {
            uri: CACHE_STATS_URI.to_string(),
            name: "cache_stats".to_string(),
            description: "Transcript cache size, hits, misses and hit rate.".to_string(),
            mime_type: "application/json".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_summarize_prompt() {
        let (description, text) =
            render_prompt("summarize_video", &args(json!({"url": "dQw4w9WgXcQ"}))).unwrap();
        assert!(description.starts_with("Generate a comprehensive summary"));
        assert!(text.contains("this YouTube video: dQw4w9WgXcQ\n\nThen provide"));
        assert!(text.ends_with("Keep the summary concise but informative."));
    }

    #[test]
    fn test_find_key_moments_mentions_topic() {
        let (_, text) = render_prompt(
            "find_key_moments",
            &args(json!({"url": "dQw4w9WgXcQ", "topic": "rust"})),
        )
        .unwrap();
        assert_eq!(text.matches("\"rust\"").count(), 3);
    }

    #[test]
    fn test_missing_prompt_argument() {
        let err = render_prompt("compare_videos", &args(json!({"url1": "a"}))).unwrap_err();
        assert_eq!(err, "Missing 'url2' argument");
    }

    #[test]
    fn test_unknown_prompt() {
        assert!(render_prompt("nope", &Map::new()).is_err());
    }

    #[test]
    fn test_resources() {
        let uris: Vec<String> = get_resources().into_iter().map(|r| r.uri).collect();
        assert_eq!(uris, vec![HELP_URI, CACHE_STATS_URI]);
        assert!(HELP_TEXT.contains("### batch_transcripts"));
    }
}
