use similar::TextDiff;

pub struct DiffComputer;

impl DiffComputer {
    /// Unified diff between the previously reviewed snapshot and the current
    /// content. With no baseline the "patch" is the full new content; with
    /// identical contents the result is the empty string, never an error.
    /// Headers carry the logical path even though snapshots come from
    /// ephemeral staging copies.
    pub fn diff(path: &str, old_content: Option<&str>, new_content: &str) -> String {
        let Some(old) = old_content else {
            return new_content.to_string();
        };
        if old == new_content {
            return String::new();
        }
        TextDiff::from_lines(old, new_content)
            .unified_diff()
            .context_radius(3)
            .header(&format!("a/{}", path), &format!("b/{}", path))
            .to_string()
    }

    /// Added/removed line counts estimated from the patch text. Header lines
    /// are excluded and each count saturates at zero.
    pub fn count_changes(patch: &str) -> (u32, u32) {
        let mut additions: u32 = 0;
        let mut deletions: u32 = 0;
        for line in patch.lines() {
            if line.starts_with("+++") || line.starts_with("---") {
                continue;
            }
            if line.starts_with('+') {
                additions = additions.saturating_add(1);
            } else if line.starts_with('-') {
                deletions = deletions.saturating_add(1);
            }
        }
        (additions, deletions)
    }
}
