use regex::Regex;

use crate::error::{PatternError, PatternResult};

/// A compiled pattern ready for matching.
#[derive(Debug, Clone)]
pub enum CompiledPattern {
    /// Exact string match (no wildcards).
    Exact(String),
    /// Glob pattern compiled to regex.
    Glob { original: String, regex: Regex },
    /// Explicit regex pattern (prefixed with "regex:" in YAML).
    Regex { original: String, regex: Regex },
}

impl CompiledPattern {
    /// Check if the pattern matches the input string.
    pub fn matches(&self, input: &str) -> bool {
        match self {
            CompiledPattern::Exact(s) => s == input,
            CompiledPattern::Glob { regex, .. } => regex.is_match(input),
            CompiledPattern::Regex { regex, .. } => regex.is_match(input),
        }
    }

    /// Get the original pattern string.
    pub fn original(&self) -> &str {
        match self {
            CompiledPattern::Exact(s) => s,
            CompiledPattern::Glob { original, .. } => original,
            CompiledPattern::Regex { original, .. } => original,
        }
    }
}

/// Compile a pattern string into a CompiledPattern.
///
/// Pattern syntax:
/// - `regex:...` - Explicit regex pattern (unanchored)
/// - Contains `*` or `?` - Glob pattern, anchored at both ends
/// - Otherwise - Exact match
///
/// Command lines are not paths, so `*` also matches `/` and spaces:
/// `rm -rf *` matches `rm -rf /var/www`.
pub fn compile_pattern(pattern: &str) -> PatternResult<CompiledPattern> {
    if let Some(regex_str) = pattern.strip_prefix("regex:") {
        let regex = Regex::new(regex_str).map_err(|e| PatternError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        return Ok(CompiledPattern::Regex {
            original: pattern.to_string(),
            regex,
        });
    }

    if pattern.contains('*') || pattern.contains('?') {
        let regex = glob_to_regex(pattern)?;
        return Ok(CompiledPattern::Glob {
            original: pattern.to_string(),
            regex,
        });
    }

    Ok(CompiledPattern::Exact(pattern.to_string()))
}

/// Convert a glob pattern to an anchored regex.
///
/// `*` matches any sequence, `?` any single character; everything else is
/// matched literally.
fn glob_to_regex(glob: &str) -> PatternResult<Regex> {
    let mut regex = String::with_capacity(glob.len() + 8);
    // Commands may span lines (here-docs passed to a shell).
    regex.push_str("(?s)^");

    for c in glob.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            _ => {
                if is_regex_metachar(c) {
                    regex.push('\\');
                }
                regex.push(c);
            }
        }
    }

    regex.push('$');

    Regex::new(&regex).map_err(|e| PatternError::InvalidRegex {
        pattern: glob.to_string(),
        reason: e.to_string(),
    })
}

fn is_regex_metachar(c: char) -> bool {
    matches!(
        c,
        '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$' | '\\'
    )
}
