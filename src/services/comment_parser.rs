use crate::enums::severity::Severity;

const FILE_MARKER: &str = "**File**";
const LINE_START_MARKER: &str = "**Line_Start**";
const SEVERITY_MARKER: &str = "**Severity**";
const TITLE_MARKER: &str = "**Title**";
const PROMPT_MARKER: &str = "**Prompt for AI**";

/// Metadata embedded as `**Marker**: value` lines in a comment body.
/// The structured markers are authoritative; severity falls back to a
/// keyword heuristic when the marker is absent or unrecognized.
#[derive(Debug, Clone, Default)]
pub struct CommentMetadata {
    pub file: Option<String>,
    pub line_start: Option<u32>,
    pub severity: Option<Severity>,
    pub title: Option<String>,
}

pub fn parse_metadata(content: &str) -> CommentMetadata {
    let mut metadata = CommentMetadata::default();

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with(PROMPT_MARKER) {
            // markers live above the prompt section
            break;
        }
        if let Some(value) = marker_value(line, FILE_MARKER) {
            metadata.file.get_or_insert_with(|| value.to_string());
        } else if let Some(value) = marker_value(line, LINE_START_MARKER) {
            if metadata.line_start.is_none() {
                metadata.line_start = value.parse::<u32>().ok();
            }
        } else if let Some(value) = marker_value(line, SEVERITY_MARKER) {
            if metadata.severity.is_none() {
                match value.parse::<Severity>() {
                    Ok(severity) => metadata.severity = Some(severity),
                    Err(e) => log::debug!("Ignoring severity marker: {}", e),
                }
            }
        } else if let Some(value) = marker_value(line, TITLE_MARKER) {
            metadata.title.get_or_insert_with(|| value.to_string());
        }
    }

    metadata
}

fn marker_value<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?;
    let value = rest.trim_start_matches(':').trim();
    if value.is_empty() {
        return None;
    }
    Some(value)
}

/// Best-effort severity classification over the lowercased body, used when
/// no structured marker is present.
pub fn severity_heuristic(content: &str) -> Severity {
    let lowered = content.to_lowercase();
    if lowered.contains("critical") || lowered.contains("security") {
        Severity::Critical
    } else if lowered.contains("warning") || lowered.contains("potential issue") {
        Severity::High
    } else if lowered.contains("suggestion") {
        Severity::Medium
    } else {
        Severity::Low
    }
}

pub fn effective_severity(content: &str) -> Severity {
    parse_metadata(content)
        .severity
        .unwrap_or_else(|| severity_heuristic(content))
}

/// First usable prose line of the body, truncated; used when neither the
/// payload nor the markers carry a title.
pub fn fallback_title(content: &str) -> String {
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("**") {
            continue;
        }
        if line.chars().count() > 80 {
            let truncated: String = line.chars().take(77).collect();
            return format!("{}...", truncated);
        }
        return line.to_string();
    }
    "Review comment".to_string()
}
