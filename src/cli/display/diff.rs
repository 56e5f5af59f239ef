//! Filtering and coloring of `kubectl diff` output

use colored::Colorize;

/// A line of `kubectl diff` output worth showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLine<'a> {
    /// `+++ <file>` header that starts a new object
    Header(&'a str),
    Added(&'a str),
    Removed(&'a str),
}

impl<'a> DiffLine<'a> {
    /// Unchanged context lines and `---` headers are dropped.
    pub fn classify(line: &'a str) -> Option<Self> {
        if line.starts_with("+++") {
            Some(Self::Header(line))
        } else if line.starts_with('+') {
            Some(Self::Added(line))
        } else if line.starts_with('-') && line.chars().nth(1).is_some_and(|c| c != '-') {
            Some(Self::Removed(line))
        } else {
            None
        }
    }

    pub fn render(&self) -> String {
        match self {
            Self::Header(line) => format!("\n-----------\n{}", line).bright_blue().to_string(),
            Self::Added(line) => line.green().to_string(),
            Self::Removed(line) => line.red().to_string(),
        }
    }
}

/// Keeps only header, added and removed lines, colored.
pub fn colorize_diff(output: &str) -> String {
    output
        .lines()
        .filter_map(DiffLine::classify)
        .map(|line| format!("{}\n", line.render()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(
            DiffLine::classify("+++ /tmp/LIVE/apps.v1.Deployment"),
            Some(DiffLine::Header("+++ /tmp/LIVE/apps.v1.Deployment"))
        );
        assert_eq!(DiffLine::classify("+  replicas: 3"), Some(DiffLine::Added("+  replicas: 3")));
        assert_eq!(DiffLine::classify("-  replicas: 2"), Some(DiffLine::Removed("-  replicas: 2")));
        assert_eq!(DiffLine::classify("--- /tmp/MERGED"), None);
        assert_eq!(DiffLine::classify("-"), None);
        assert_eq!(DiffLine::classify("   selector:"), None);
    }

    #[test]
    fn test_colorize_drops_context() {
        colored::control::set_override(false);
        let output = "--- a\n+++ b\n   kind: Deployment\n-  replicas: 2\n+  replicas: 3\n";

        assert_eq!(
            colorize_diff(output),
            "\n-----------\n+++ b\n-  replicas: 2\n+  replicas: 3\n"
        );
    }
}
