use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::dialect::ParamAdapter;
use crate::error::{Error, Result};
use crate::template::ExpansionTemplate;

static NULL: Value = Value::Null;

/// One placeholder occurrence and the function input it reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    /// Validated placeholder path, e.g. `user.address.zip`.
    pub name: String,
    /// Position of the source parameter among the function inputs.
    pub position: usize,
}

impl ParamInfo {
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }

    /// Path segments below the parameter itself.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.name.split('.').skip(1)
    }

    /// Reads the addressed value out of the call arguments.
    ///
    /// `args[0]` is the input at position 1; the executor is not an argument.
    /// Missing object keys read as `null`.
    fn lookup<'a>(&self, args: &'a [Value]) -> Result<&'a Value> {
        let mut current = self
            .position
            .checked_sub(1)
            .and_then(|i| args.get(i))
            .ok_or(Error::MissingArgument(self.position))?;
        for member in self.members() {
            current = match current {
                Value::Object(fields) => fields.get(member).unwrap_or(&NULL),
                Value::Null => &NULL,
                other => {
                    return Err(Error::unresolvable(
                        &self.name,
                        format!("cannot read '{member}' from {other}"),
                    ))
                }
            };
        }
        Ok(current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Final text known at compile time.
    Simple,
    /// Contains collection markers expanded per call.
    Templated,
}

impl QueryKind {
    pub fn is_templated(self) -> bool {
        self == QueryKind::Templated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Scalar(usize),
    Collection(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Body {
    Simple(String),
    Templated(ExpansionTemplate),
}

/// Result of compiling one query against one function signature.
///
/// Immutable and cheap to clone; build it once and reuse it for every call.
#[derive(Clone)]
pub struct CompiledQuery {
    pub(crate) body: Body,
    pub(crate) scalar_params: Vec<ParamInfo>,
    pub(crate) collection_params: Vec<ParamInfo>,
    /// Placeholder occurrences in the order they appear in the text.
    pub(crate) slots: Vec<Slot>,
    pub(crate) adapter: Arc<dyn ParamAdapter>,
}

impl fmt::Debug for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledQuery")
            .field("body", &self.body)
            .field("scalar_params", &self.scalar_params)
            .field("collection_params", &self.collection_params)
            .finish_non_exhaustive()
    }
}

impl CompiledQuery {
    pub fn kind(&self) -> QueryKind {
        match self.body {
            Body::Simple(_) => QueryKind::Simple,
            Body::Templated(_) => QueryKind::Templated,
        }
    }

    /// Final query text, for queries without collection parameters.
    pub fn literal(&self) -> Option<&str> {
        match &self.body {
            Body::Simple(sql) => Some(sql),
            Body::Templated(_) => None,
        }
    }

    pub fn template(&self) -> Option<&ExpansionTemplate> {
        match &self.body {
            Body::Simple(_) => None,
            Body::Templated(template) => Some(template),
        }
    }

    /// Scalar placeholders in query order; the i-th one binds position i + 1.
    pub fn scalar_params(&self) -> &[ParamInfo] {
        &self.scalar_params
    }

    /// Collection placeholders in query order.
    pub fn collection_params(&self) -> &[ParamInfo] {
        &self.collection_params
    }

    /// Query text for the given collection lengths, one per entry of
    /// [`collection_params`](Self::collection_params).
    pub fn render(&self, lengths: &[usize]) -> String {
        match &self.body {
            Body::Simple(sql) => sql.clone(),
            Body::Templated(template) => template.render(self.adapter.as_ref(), lengths),
        }
    }

    /// Resolves every placeholder against the call arguments and produces the
    /// final statement.
    ///
    /// `args[i]` is the function input at position `i + 1`.
    pub fn bind(&self, args: &[Value]) -> Result<BoundQuery> {
        let mut bindings = Vec::with_capacity(self.scalar_params.len());
        for info in &self.scalar_params {
            bindings.push(Binding {
                position: bindings.len() + 1,
                value: info.lookup(args)?.clone(),
            });
        }

        let mut lengths = Vec::with_capacity(self.collection_params.len());
        let mut collection_starts = Vec::with_capacity(self.collection_params.len());
        for info in &self.collection_params {
            let items: &[Value] = match info.lookup(args)? {
                Value::Array(items) => items.as_slice(),
                Value::Null => &[],
                _ => return Err(Error::NotACollection(info.name.clone())),
            };
            collection_starts.push(bindings.len());
            lengths.push(items.len());
            for item in items {
                bindings.push(Binding {
                    position: bindings.len() + 1,
                    value: item.clone(),
                });
            }
        }

        let text_order = self
            .slots
            .iter()
            .flat_map(|slot| match *slot {
                Slot::Scalar(i) => i..i + 1,
                Slot::Collection(i) => collection_starts[i]..collection_starts[i] + lengths[i],
            })
            .collect();

        let sql = self.render(&lengths);
        tracing::debug!(sql = %sql, bindings = bindings.len(), "bound query");
        Ok(BoundQuery {
            sql,
            bindings,
            text_order,
        })
    }
}

/// A value destined for one positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub position: usize,
    pub value: Value,
}

/// A statement ready for the driver: final SQL text plus its bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    pub sql: String,
    /// Sorted by position.
    pub bindings: Vec<Binding>,
    text_order: Vec<usize>,
}

impl BoundQuery {
    /// Values in position order, for numbered dialects (`$1`, `$2`, ...).
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.bindings.iter().map(|b| &b.value)
    }

    /// Values in the order their placeholders appear in [`sql`](Self::sql),
    /// for anonymous `?` dialects.
    pub fn values_in_text_order(&self) -> impl Iterator<Item = &Value> {
        self.text_order.iter().map(|&i| &self.bindings[i].value)
    }
}
