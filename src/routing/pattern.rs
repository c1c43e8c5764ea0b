//! Path pattern compilation and matching.
//!
//! # Responsibilities
//! - Parse a pattern string into a segment AST at load time
//! - Match request paths against the compiled segments
//! - Report specificity and overlap for load-time ordering checks
//!
//! # Design Decisions
//! - Patterns compile once; no string re-parsing in the hot path
//! - `*` matches exactly one non-empty segment
//! - `**` matches any remaining segments, only legal in final position
//! - `{name}` matches one segment and captures it as a parameter
//! - Matching is case-sensitive and does not normalize trailing slashes

use std::collections::HashMap;
use thiserror::Error;

/// Captured `{name}` parameters for a matched path.
pub type PathParams = HashMap<String, String>;

/// Error raised when a pattern string cannot be compiled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern must start with '/'")]
    NoLeadingSlash,
    #[error("pattern contains an empty segment")]
    EmptySegment,
    #[error("'**' is only allowed as the final segment")]
    CatchAllNotLast,
    #[error("unclosed or empty '{{name}}' parameter")]
    BadParam,
    #[error("segment `{0}` mixes wildcard characters with literal text")]
    MixedSegment(String),
}

/// One compiled path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches this exact text.
    Literal(String),
    /// Matches one non-empty segment and captures it under the given name.
    Param(String),
    /// Matches one non-empty segment (`*`).
    Wildcard,
    /// Matches zero or more trailing segments (`**`).
    CatchAll,
}

impl Segment {
    fn is_literal(&self) -> bool {
        matches!(self, Segment::Literal(_))
    }

    /// True when some segment text could satisfy both.
    fn compatible(&self, other: &Segment) -> bool {
        match (self, other) {
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
            _ => true,
        }
    }
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compile a pattern string into segments.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let rest = source.strip_prefix('/').ok_or(PatternError::NoLeadingSlash)?;

        let mut segments = Vec::new();
        if !rest.is_empty() {
            let raw: Vec<&str> = rest.split('/').collect();
            let last = raw.len() - 1;
            for (i, piece) in raw.iter().enumerate() {
                let segment = match *piece {
                    "" => return Err(PatternError::EmptySegment),
                    "**" => {
                        if i != last {
                            return Err(PatternError::CatchAllNotLast);
                        }
                        Segment::CatchAll
                    }
                    "*" => Segment::Wildcard,
                    p if p.starts_with('{') => {
                        let name = p
                            .strip_prefix('{')
                            .and_then(|s| s.strip_suffix('}'))
                            .filter(|s| !s.is_empty() && !s.contains(['{', '}']))
                            .ok_or(PatternError::BadParam)?;
                        Segment::Param(name.to_string())
                    }
                    p if p.contains(['*', '{', '}']) => {
                        return Err(PatternError::MixedSegment(p.to_string()))
                    }
                    p => Segment::Literal(p.to_string()),
                };
                segments.push(segment);
            }
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The pattern as written in configuration.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of literal segments; higher means more specific.
    pub fn specificity(&self) -> usize {
        self.segments.iter().filter(|s| s.is_literal()).count()
    }

    /// True when every segment is literal (no wildcards or params).
    pub fn is_exact(&self) -> bool {
        self.segments.iter().all(|s| s.is_literal())
    }

    /// Match a request path, returning captured parameters on success.
    ///
    /// Pure function of (pattern, path).
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        let mut params = PathParams::new();
        let mut i = 0;
        for segment in &self.segments {
            match segment {
                // Consumes everything left, including nothing.
                Segment::CatchAll => return Some(params),
                Segment::Literal(text) => {
                    if parts.get(i).copied() != Some(text.as_str()) {
                        return None;
                    }
                }
                Segment::Wildcard => {
                    if parts.get(i).map_or(true, |p| p.is_empty()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let part = parts.get(i).filter(|p| !p.is_empty())?;
                    params.insert(name.clone(), (*part).to_string());
                }
            }
            i += 1;
        }

        if i == parts.len() {
            Some(params)
        } else {
            None
        }
    }

    /// True when some path could match both patterns.
    ///
    /// Used at load time to detect routes that would tie at match time.
    pub fn overlaps(&self, other: &Pattern) -> bool {
        fn step(a: &[Segment], b: &[Segment]) -> bool {
            match (a.first(), b.first()) {
                (Some(Segment::CatchAll), _) | (_, Some(Segment::CatchAll)) => true,
                (None, None) => true,
                (None, Some(_)) | (Some(_), None) => false,
                (Some(x), Some(y)) => x.compatible(y) && step(&a[1..], &b[1..]),
            }
        }
        step(&self.segments, &other.segments)
    }
}
