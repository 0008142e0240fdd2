//! Percent-style version templates (`"%(prog)s %(version)s"`)

use crate::core::error::ConfigError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Template used when neither the action nor the parser sets one
pub const DEFAULT_TEMPLATE: &str = "%(version)s";

// Compile once; matches `%(name)s`, `%%` and a bare `%`
static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"%(?:\((\w+)\)s|(%))?").expect("Invalid template token regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Version,
    Prog,
}

/// A validated template that is guaranteed to reference `%(version)s`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl VersionTemplate {
    /// Parse and validate a template string
    pub fn parse(template: &str) -> Result<Self, ConfigError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;
        let mut has_version = false;

        for caps in TOKEN_REGEX.captures_iter(template) {
            let Some(whole) = caps.get(0) else { continue };
            literal.push_str(&template[last..whole.start()]);
            last = whole.end();

            if caps.get(2).is_some() {
                literal.push('%');
                continue;
            }

            let Some(name) = caps.get(1) else {
                return Err(ConfigError::MalformedTemplate {
                    template: template.to_string(),
                    offset: whole.start(),
                });
            };

            let segment = match name.as_str() {
                "version" => {
                    has_version = true;
                    Segment::Version
                }
                "prog" => Segment::Prog,
                other => {
                    return Err(ConfigError::UnknownPlaceholder {
                        name: other.to_string(),
                        template: template.to_string(),
                    })
                }
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(segment);
        }

        literal.push_str(&template[last..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        if !has_version {
            return Err(ConfigError::MissingVersionPlaceholder {
                template: template.to_string(),
            });
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// The template as it was written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the template references `%(prog)s`
    pub fn uses_prog(&self) -> bool {
        self.segments.contains(&Segment::Prog)
    }

    /// Substitute `version` and `prog` into the template
    pub fn render(&self, prog: &str, version: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + version.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Version => out.push_str(version),
                Segment::Prog => out.push_str(prog),
            }
        }
        out
    }
}

impl Default for VersionTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
            segments: vec![Segment::Version],
        }
    }
}

impl fmt::Display for VersionTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
