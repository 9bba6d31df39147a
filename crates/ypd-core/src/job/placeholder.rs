//! Output-template placeholders (`%(field)s`) in requested names.
//!
//! The extractor substitutes placeholders at fetch time, so a name that still
//! contains one is matched against produced files as a pattern in which each
//! placeholder stands for a non-empty run of characters.

/// Placeholder substituted with the media title by the extractor.
pub const TITLE_PLACEHOLDER: &str = "%(title)s";

/// A matching key compiled from a sanitized stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    /// Literal text around placeholders; `n` placeholders give `n + 1` parts.
    parts: Vec<String>,
}

impl NamePattern {
    pub fn compile(key: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = key;
        while let Some(start) = rest.find("%(") {
            let Some(len) = placeholder_len(&rest[start..]) else {
                break;
            };
            literal.push_str(&rest[..start]);
            parts.push(std::mem::take(&mut literal));
            rest = &rest[start + len..];
        }
        literal.push_str(rest);
        parts.push(literal);
        Self { parts }
    }

    /// True when the key has no placeholder and matches by equality only.
    pub fn is_literal(&self) -> bool {
        self.parts.len() == 1
    }

    /// Characters of literal text; more literal text means a more specific pattern.
    pub fn literal_len(&self) -> usize {
        self.parts.iter().map(|p| p.chars().count()).sum()
    }

    pub fn matches(&self, candidate: &str) -> bool {
        let (first, rest) = match self.parts.split_first() {
            Some(split) => split,
            None => return candidate.is_empty(),
        };
        let Some((last, middle)) = rest.split_last() else {
            return candidate == first;
        };
        if !candidate.starts_with(first.as_str()) {
            return false;
        }

        let mut pos = first.len();
        for part in middle {
            let Some(after) = skip_one_char(candidate, pos) else {
                return false;
            };
            let Some(idx) = candidate[after..].find(part.as_str()) else {
                return false;
            };
            pos = after + idx + part.len();
        }

        match skip_one_char(candidate, pos) {
            Some(after) => {
                candidate.len() >= after + last.len() && candidate.ends_with(last.as_str())
            }
            None => false,
        }
    }
}

/// Byte offset one character past `pos`, if any character remains.
fn skip_one_char(s: &str, pos: usize) -> Option<usize> {
    s[pos..].chars().next().map(|c| pos + c.len_utf8())
}

/// Length of a placeholder at the start of `s` (`%(` ... `)` + conversion
/// flags up to the first ASCII letter), or `None` if it is not well formed.
fn placeholder_len(s: &str) -> Option<usize> {
    let close = s.find(')')?;
    let tail = &s[close + 1..];
    let conv = tail.find(|c: char| c.is_ascii_alphabetic())?;
    Some(close + 1 + conv + 1)
}
