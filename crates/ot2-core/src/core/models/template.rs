use crate::engine::error::EngineError;
use std::collections::BTreeSet;

/// Line content that marks where the parameter block is spliced in.
pub const PARAMETER_MARKER: &str = "# ot2:parameters";

/// Directive prefix naming the parameter keys a template reads.
pub const REQUIRES_DIRECTIVE: &str = "# ot2:requires";

/// A loaded protocol template.
///
/// The marker position is located once at load time; the text itself is never
/// interpreted beyond the marker and the `requires` directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolTemplate {
    name: String,
    text: String,
    marker_offset: usize,
    required_keys: BTreeSet<String>,
}

impl ProtocolTemplate {
    pub fn parse(name: impl Into<String>, text: impl Into<String>) -> Result<Self, EngineError> {
        let name = name.into();
        let text = text.into();

        let mut marker_offset = None;
        let mut required_keys = BTreeSet::new();
        let mut line_start = 0;

        for line in text.split_inclusive('\n') {
            let trimmed = line.trim();
            if trimmed == PARAMETER_MARKER {
                if marker_offset.is_some() {
                    return Err(EngineError::TemplateMalformed {
                        name,
                        reason: format!("marker '{}' appears more than once", PARAMETER_MARKER),
                    });
                }
                let indent = line.len() - line.trim_start().len();
                marker_offset = Some(line_start + indent);
            } else if let Some(keys) = trimmed
                .strip_prefix(REQUIRES_DIRECTIVE)
                .and_then(directive_arguments)
            {
                required_keys.extend(
                    keys.split(',')
                        .map(str::trim)
                        .filter(|k| !k.is_empty())
                        .map(str::to_string),
                );
            } else if trimmed.contains(PARAMETER_MARKER) {
                return Err(EngineError::TemplateMalformed {
                    name,
                    reason: format!("marker '{}' must be alone on its line", PARAMETER_MARKER),
                });
            }
            line_start += line.len();
        }

        let marker_offset = marker_offset.ok_or_else(|| EngineError::TemplateMalformed {
            name: name.clone(),
            reason: format!("marker '{}' is missing", PARAMETER_MARKER),
        })?;

        Ok(Self {
            name,
            text,
            marker_offset,
            required_keys,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn required_keys(&self) -> impl Iterator<Item = &str> {
        self.required_keys.iter().map(String::as_str)
    }

    /// Text before the marker, byte-for-byte.
    pub fn prefix(&self) -> &str {
        &self.text[..self.marker_offset]
    }

    /// Text after the marker, byte-for-byte, including the marker line's ending.
    pub fn suffix(&self) -> &str {
        &self.text[self.marker_offset + PARAMETER_MARKER.len()..]
    }
}

/// The text after a directive, when the directive is followed by whitespace,
/// a colon or nothing at all.
fn directive_arguments(rest: &str) -> Option<&str> {
    match rest.chars().next() {
        None => Some(""),
        Some(c) if c == ':' || c.is_whitespace() => Some(rest.trim_start().trim_start_matches(':')),
        Some(_) => None,
    }
}
