use super::{ARCHIVE_NAME, STAGING_DIR_NAME};

/// Names never copied into a deploy package. A leading `*` matches any
/// prefix. Patterns are matched against single path components, at any depth.
const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    "node_modules",
    STAGING_DIR_NAME,
    "__pycache__",
    "*.pyc",
    "*.pyo",
    "*.pyd",
    ".env",
    "venv",
    ".venv",
    ".idea",
    ".vscode",
    "*.egg-info",
    "dist",
    "build",
    ARCHIVE_NAME,
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    Name(String),
    Suffix(String),
}

impl Pattern {
    fn parse(pattern: &str) -> Self {
        match pattern.strip_prefix('*') {
            Some(suffix) => Pattern::Suffix(suffix.to_string()),
            None => Pattern::Name(pattern.to_string()),
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Pattern::Name(expected) => name == expected,
            Pattern::Suffix(suffix) => name.ends_with(suffix.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExclusionRules {
    patterns: Vec<Pattern>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDES.iter().copied())
    }
}

impl ExclusionRules {
    pub fn new<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            patterns: patterns.into_iter().map(Pattern::parse).collect(),
        }
    }

    /// Whether a file or directory with this name is left out.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }
}
