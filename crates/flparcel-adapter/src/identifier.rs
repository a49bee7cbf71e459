//! Parcel identifier normalization.
//!
//! Users type identifiers with dashes, dots, spaces, or nothing at all. The
//! normalizer accepts either form, checks it against the county's segment
//! pattern, and produces a canonical compact value. Validation is syntactic
//! only; a valid identifier may still not exist upstream.

use crate::error::LookupError;
use crate::registry::{CountyProfile, IdPattern, QueryIdStyle, ACCEPTED_SEPARATORS};

/// A syntactically valid parcel identifier for one county.
///
/// Only [`ParcelIdentifier::parse`] constructs one, so holding a value means
/// `normalized` conforms to the county's pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParcelIdentifier {
    normalized: String,
    display: String,
    query_value: String,
}

impl ParcelIdentifier {
    /// Normalizes `raw` against `profile`'s identifier pattern.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InvalidIdentifier`] if the segment count, a
    /// segment length, or a character does not match the pattern.
    pub(crate) fn parse(profile: &CountyProfile, raw: &str) -> Result<Self, LookupError> {
        let pattern = &profile.id_pattern;
        let invalid = |reason: String| LookupError::InvalidIdentifier {
            county: profile.key,
            raw: raw.to_string(),
            reason,
        };

        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(invalid("identifier is empty".to_string()));
        }

        let segments = split_segments(&compact, pattern).map_err(invalid)?;

        for (idx, (segment, expected)) in segments.iter().zip(pattern.segments).enumerate() {
            if let Some(bad) = segment.chars().find(|c| !expected.chars.allows(*c)) {
                return Err(invalid(format!(
                    "segment {} contains unexpected character '{bad}'",
                    idx + 1
                )));
            }
        }

        let normalized = segments.concat().to_uppercase();
        let display = render_segmented(&segments, pattern).to_uppercase();
        let query_value = match pattern.query_style {
            QueryIdStyle::Compact => normalized.clone(),
            QueryIdStyle::Segmented => display.clone(),
        };

        Ok(Self {
            normalized,
            display,
            query_value,
        })
    }

    /// Canonical form: separators removed, upper case.
    #[must_use]
    pub(crate) fn normalized(&self) -> &str {
        &self.normalized
    }

    /// The identifier in the county's separator format.
    #[must_use]
    pub(crate) fn display(&self) -> &str {
        &self.display
    }

    /// Value compared against the county's parcel-id attribute.
    #[must_use]
    pub(crate) fn query_value(&self) -> &str {
        &self.query_value
    }
}

impl std::fmt::Display for ParcelIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display)
    }
}

/// Splits on user separators when present, otherwise re-segments the
/// contiguous string by the pattern's lengths.
fn split_segments<'a>(compact: &'a str, pattern: &IdPattern) -> Result<Vec<&'a str>, String> {
    let expected_count = pattern.segments.len();

    if compact.contains(ACCEPTED_SEPARATORS) {
        let parts: Vec<&str> = compact.split(ACCEPTED_SEPARATORS).collect();
        if parts.len() != expected_count {
            return Err(format!(
                "expected {expected_count} segments ({}), found {}",
                pattern.hint,
                parts.len()
            ));
        }
        let separators = compact.chars().filter(|c| ACCEPTED_SEPARATORS.contains(c));
        for (idx, sep) in separators.enumerate() {
            // '-' is accepted at any boundary; '.' only where the county writes one.
            if sep != '-' && pattern.joiners.get(idx) != Some(&sep) {
                return Err(format!(
                    "unexpected separator '{sep}' after segment {} ({})",
                    idx + 1,
                    pattern.hint
                ));
            }
        }
        for (idx, (part, expected)) in parts.iter().zip(pattern.segments).enumerate() {
            let len = part.chars().count();
            if len != expected.len {
                return Err(format!(
                    "segment {} has {len} characters, expected {} ({})",
                    idx + 1,
                    expected.len,
                    pattern.hint
                ));
            }
        }
        return Ok(parts);
    }

    let total = pattern.total_len();
    let len = compact.chars().count();
    if len != total || !compact.is_ascii() {
        return Err(format!(
            "expected {total} characters without separators ({}), found {len}",
            pattern.hint
        ));
    }

    let mut parts = Vec::with_capacity(expected_count);
    let mut offset = 0;
    for segment in pattern.segments {
        parts.push(&compact[offset..offset + segment.len]);
        offset += segment.len;
    }
    Ok(parts)
}

fn render_segmented(segments: &[&str], pattern: &IdPattern) -> String {
    let mut out = String::with_capacity(pattern.total_len() + pattern.joiners.len());
    for (idx, segment) in segments.iter().enumerate() {
        if idx > 0 {
            if let Some(joiner) = pattern.joiners.get(idx - 1) {
                out.push(*joiner);
            }
        }
        out.push_str(segment);
    }
    out
}
