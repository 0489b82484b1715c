//! Display helpers for log output.

/// Longest command shown in a log line.
pub const MAX_LOGGED_COMMAND: usize = 200;

/// Truncate a string to `max` bytes, appending "..." if truncated.
///
/// Cuts on a character boundary, so the result may be a few bytes shorter.
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max.saturating_sub(3);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// A command line ready for a log message: single line, bounded length.
pub fn display_command(command: &str) -> String {
    let single_line: String = command
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    truncate(&single_line, MAX_LOGGED_COMMAND)
}
