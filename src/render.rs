//! Discord markdown for analysis, doctor and history results.

use crate::analysis::types::{AnalysisResult, Confidence, DoctorSearchResult};
use crate::history::HistoryItem;

/// Discord rejects messages over 2000 chars; leave headroom.
pub const MAX_MESSAGE_LEN: usize = 1990;

const PREVIEW_CHARS: usize = 60;

fn confidence_marker(confidence: &Confidence) -> &'static str {
    match confidence.label.to_ascii_lowercase().as_str() {
        "high" => "🟢",
        "medium" => "🟡",
        _ => "🔴",
    }
}

pub fn render_confidence(confidence: &Confidence) -> String {
    format!(
        "{} **Confidence:** {}/100 ({})",
        confidence_marker(confidence),
        confidence.score,
        confidence.label
    )
}

pub fn render_analysis(result: &AnalysisResult) -> String {
    let mut out = format!(
        "{} | **Language:** {}\n\n{}",
        render_confidence(&result.confidence),
        result.language,
        result.content
    );

    if !result.sources.is_empty() {
        out.push_str("\n\n**Sources:**\n");
        for source in &result.sources {
            out.push_str(&format!("- [{}](<{}>)\n", source.title, source.uri));
        }
    }
    out
}

pub fn render_doctors(result: &DoctorSearchResult) -> String {
    let mut out = format!("**Doctors near you**\n\n{}", result.content);

    if !result.map_sources.is_empty() {
        out.push_str("\n\n**Places:**\n");
        for place in &result.map_sources {
            match &place.address {
                Some(address) => out.push_str(&format!(
                    "- [{}](<{}>) · {}\n",
                    place.title, place.uri, address
                )),
                None => out.push_str(&format!("- [{}](<{}>)\n", place.title, place.uri)),
            }
        }
    }
    out
}

fn preview(symptoms: &str) -> String {
    let symptoms = symptoms.trim();
    if symptoms.is_empty() {
        return "(image only)".to_string();
    }
    let mut chars = symptoms.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown time".to_string())
}

/// Numbered, most-recent-first list; indices match `/symptom recall`.
pub fn render_history(items: &[HistoryItem]) -> String {
    if items.is_empty() {
        return "No saved analyses yet. Use `/symptom analyze` to start one.".to_string();
    }

    let mut out = String::from("**Recent analyses**\n\n");
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!(
            "`{}` {} — {} {} ({})\n",
            i + 1,
            format_timestamp(item.timestamp),
            preview(&item.symptoms),
            confidence_marker(&item.result.confidence),
            item.result.confidence.score,
        ));
    }
    out
}

pub fn render_recall(item: &HistoryItem) -> String {
    format!(
        "**Symptoms:** {}\n**Analyzed:** {}\n\n{}",
        preview(&item.symptoms),
        format_timestamp(item.timestamp),
        render_analysis(&item.result)
    )
}

/// Split text into chunks of at most `max` bytes, preferring line then word breaks.
pub fn split_chunks(text: &str, max: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        if remaining.len() <= max {
            chunks.push(remaining);
            break;
        }
        let mut limit = max;
        while !remaining.is_char_boundary(limit) {
            limit -= 1;
        }
        let window = &remaining[..limit];
        let split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .map(|i| i + 1)
            .unwrap_or(limit.max(remaining.chars().next().map_or(1, char::len_utf8)));
        chunks.push(&remaining[..split_at]);
        remaining = &remaining[split_at..];
    }
    chunks
}
