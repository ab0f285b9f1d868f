//! `share=` directive parsing for application notes.
//!
//! A notes string is shared when one of its lines reads `share=<value>`,
//! with optional whitespace before `share`, around `=`, and after the value.
//! When several lines carry a directive the last one wins.

/// Extract the share target from a free-text notes field.
///
/// Returns `None` when no line carries a directive or the value is empty.
pub fn parse_share_directive(notes: &str) -> Option<String> {
    notes.lines().filter_map(parse_line).last()
}

fn parse_line(line: &str) -> Option<String> {
    let rest = line.trim_start().strip_prefix("share")?;
    let value = rest.trim_start().strip_prefix('=')?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}
