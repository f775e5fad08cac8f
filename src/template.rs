use std::fmt;

use crate::dialect::ParamAdapter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Text(String),
    /// Expansion marker for `collection_params[param]`.
    Expand { param: usize, name: String },
}

/// Query text with collection markers whose placeholder count is only known
/// once the real arguments are supplied.
///
/// Rendering never mutates the template: every call starts its own running
/// position at [`start`](Self::start), so one template can serve concurrent
/// executions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionTemplate {
    segments: Vec<Segment>,
    start: usize,
}

impl ExpansionTemplate {
    pub(crate) fn new(segments: Vec<Segment>, start: usize) -> Self {
        Self { segments, start }
    }

    /// First position handed out to collection placeholders, one past the
    /// last scalar position.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Renders the query, expanding marker `i` into `lengths[i]` placeholders.
    ///
    /// Markers without a length expand to nothing.
    pub fn render(&self, adapter: &dyn ParamAdapter, lengths: &[usize]) -> String {
        let (out, _) = self.segments.iter().fold(
            (String::new(), self.start),
            |(mut out, pos), segment| match segment {
                Segment::Text(text) => {
                    out.push_str(text);
                    (out, pos)
                }
                Segment::Expand { param, .. } => {
                    let total = lengths.get(*param).copied().unwrap_or_default();
                    out.push_str(&expand(adapter, pos, total));
                    (out, pos + total)
                }
            },
        );
        out
    }
}

impl fmt::Display for ExpansionTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => f.write_str(text)?,
                Segment::Expand { name, .. } => write!(f, "{{{{.{name} | expand}}}}")?,
            }
        }
        Ok(())
    }
}

/// `total` placeholders starting at `start`, joined by `", "`.
pub(crate) fn expand(adapter: &dyn ParamAdapter, start: usize, total: usize) -> String {
    (start..start + total)
        .map(|pos| adapter.placeholder(pos))
        .collect::<Vec<_>>()
        .join(", ")
}
