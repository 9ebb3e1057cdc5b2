use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use super::types::Confidence;

const CONFIDENCE_MARKER: &str = "CONFIDENCE_SCORE:";

static SCORE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CONFIDENCE_SCORE:\s*(\d+)").unwrap());
static LABEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CONFIDENCE_LABEL:\s*([A-Za-z]+)").unwrap());

/// Model output split into the confidence header and the displayable body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub confidence: Confidence,
    pub body: String,
}

/// Split the leading `CONFIDENCE_SCORE: N | CONFIDENCE_LABEL: L` line off a model answer.
///
/// Lenient and single-shot: anything but a fully parsable first line yields the
/// default confidence and the raw text untouched.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let mut lines = raw.split('\n');
    let first = lines.next().unwrap_or_default();

    if first.contains(CONFIDENCE_MARKER) {
        if let Some(confidence) = parse_confidence_line(first) {
            let rest: Vec<&str> = lines.collect();
            return ParsedResponse {
                confidence,
                body: rest.join("\n").trim().to_string(),
            };
        }
        warn!(line = first, "confidence line present but unparsable");
    }

    ParsedResponse {
        confidence: Confidence::default(),
        body: raw.to_string(),
    }
}

/// Both extractions must succeed; a partial match commits nothing.
fn parse_confidence_line(line: &str) -> Option<Confidence> {
    let score = SCORE_PATTERN
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())?;
    let label = LABEL_PATTERN
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())?;
    Some(Confidence { score, label })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_header() {
        let raw = "CONFIDENCE_SCORE: 85 | CONFIDENCE_LABEL: High\n**Summary**: mild cold";
        let parsed = parse_response(raw);
        assert_eq!(parsed.confidence.score, 85);
        assert_eq!(parsed.confidence.label, "High");
        assert_eq!(parsed.body, "**Summary**: mild cold");
    }

    #[test]
    fn test_parse_keeps_literal_label_word() {
        let raw = "CONFIDENCE_SCORE: 40 | CONFIDENCE_LABEL: Medium\n\n### Summary\nText";
        let parsed = parse_response(raw);
        assert_eq!(parsed.confidence.score, 40);
        assert_eq!(parsed.confidence.label, "Medium");
        assert!(parsed.body.starts_with("### Summary"));
        assert!(!parsed.body.contains("CONFIDENCE"));
    }

    #[test]
    fn test_no_marker_leaves_body_untouched() {
        let raw = "No marker here at all";
        let parsed = parse_response(raw);
        assert_eq!(parsed.confidence, Confidence::default());
        assert_eq!(parsed.confidence.score, 0);
        assert_eq!(parsed.confidence.label, "Low");
        assert_eq!(parsed.body, raw);
    }

    #[test]
    fn test_empty_input() {
        let parsed = parse_response("");
        assert_eq!(parsed.confidence, Confidence::default());
        assert_eq!(parsed.body, "");
    }

    #[test]
    fn test_marker_only_on_later_line_is_ignored() {
        let raw = "Summary first\nCONFIDENCE_SCORE: 90 | CONFIDENCE_LABEL: High";
        let parsed = parse_response(raw);
        assert_eq!(parsed.confidence, Confidence::default());
        assert_eq!(parsed.body, raw);
    }

    #[test]
    fn test_partial_header_falls_back() {
        let raw = "CONFIDENCE_SCORE: 77 | CONFIDENCE_LABEL: 12\nBody";
        let parsed = parse_response(raw);
        assert_eq!(parsed.confidence, Confidence::default());
        assert_eq!(parsed.body, raw);

        let raw = "CONFIDENCE_SCORE: high | CONFIDENCE_LABEL: High\nBody";
        let parsed = parse_response(raw);
        assert_eq!(parsed.confidence, Confidence::default());
        assert_eq!(parsed.body, raw);
    }

    #[test]
    fn test_header_without_body() {
        let parsed = parse_response("CONFIDENCE_SCORE: 10 | CONFIDENCE_LABEL: Low");
        assert_eq!(parsed.confidence.score, 10);
        assert_eq!(parsed.body, "");
    }

    #[test]
    fn test_crlf_header() {
        let raw = "CONFIDENCE_SCORE: 55 | CONFIDENCE_LABEL: Medium\r\nBody line";
        let parsed = parse_response(raw);
        assert_eq!(parsed.confidence.score, 55);
        assert_eq!(parsed.confidence.label, "Medium");
        assert_eq!(parsed.body, "Body line");
    }
}
