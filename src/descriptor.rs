//! Explicit type descriptors for the functions a query is bound to.
//!
//! A [`Signature`] lists the input and output types of the wrapped function.
//! Input 0 is always the executor; the remaining inputs are the values the
//! query's placeholders read from.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Bool,
    Int32,
    Int64,
    Float64,
    Text,
    Bytes,
    Timestamp,
}

/// Shape of a function parameter or return value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// Anything capable of running a statement (pool, connection, transaction).
    Executor,
    Scalar {
        #[serde(rename = "type")]
        ty: ScalarType,
    },
    /// Named fields, addressed by `param.field` paths.
    Record {
        fields: IndexMap<String, TypeDescriptor>,
    },
    /// String-keyed map; any key addresses a value of the same type.
    Mapping { value: Box<TypeDescriptor> },
    /// Variable-length ordered collection.
    Collection { element: Box<TypeDescriptor> },
    /// Stream of values. Never valid as an input.
    Channel { element: Box<TypeDescriptor> },
    Error,
}

impl TypeDescriptor {
    pub fn scalar(ty: ScalarType) -> Self {
        Self::Scalar { ty }
    }

    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, TypeDescriptor)>,
        K: Into<String>,
    {
        Self::Record {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn mapping(value: TypeDescriptor) -> Self {
        Self::Mapping {
            value: Box::new(value),
        }
    }

    pub fn collection(element: TypeDescriptor) -> Self {
        Self::Collection {
            element: Box::new(element),
        }
    }

    pub fn channel(element: TypeDescriptor) -> Self {
        Self::Channel {
            element: Box::new(element),
        }
    }

    /// Records and mappings are the only types a dotted path may walk into.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Record { .. } | Self::Mapping { .. })
    }

    fn is_channel(&self) -> bool {
        matches!(self, Self::Channel { .. })
    }
}

/// Input and output types of a wrapped function.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub inputs: Vec<TypeDescriptor>,
    #[serde(default)]
    pub outputs: Vec<TypeDescriptor>,
}

impl Signature {
    pub fn new(inputs: Vec<TypeDescriptor>, outputs: Vec<TypeDescriptor>) -> Self {
        Self { inputs, outputs }
    }

    /// Starts a signature whose first input is the executor.
    ///
    /// ```
    /// use sqlx_path_bind::{ScalarType, Signature, TypeDescriptor};
    ///
    /// let sig = Signature::with_executor()
    ///     .input(TypeDescriptor::scalar(ScalarType::Int64))
    ///     .output(TypeDescriptor::scalar(ScalarType::Int64))
    ///     .output(TypeDescriptor::Error);
    /// assert!(sig.validate(true).is_ok());
    /// ```
    pub fn with_executor() -> Self {
        Self::new(vec![TypeDescriptor::Executor], Vec::new())
    }

    pub fn input(mut self, ty: TypeDescriptor) -> Self {
        self.inputs.push(ty);
        self
    }

    pub fn output(mut self, ty: TypeDescriptor) -> Self {
        self.outputs.push(ty);
        self
    }

    /// Type of the input at `position` (0 is the executor).
    pub fn param(&self, position: usize) -> Option<&TypeDescriptor> {
        self.inputs.get(position)
    }

    /// Checks that the function can be bound to a query.
    ///
    /// `is_exec` marks mutating statements, whose first output must be the
    /// affected-row count.
    pub fn validate(&self, is_exec: bool) -> Result<()> {
        match self.inputs.first() {
            None => return Err(invalid("need to supply an executor parameter")),
            Some(TypeDescriptor::Executor) => {}
            Some(_) => return Err(invalid("first parameter must be an executor")),
        }
        if self.inputs[1..].iter().any(TypeDescriptor::is_channel) {
            return Err(invalid("no input parameter can be a channel"));
        }

        if self.outputs.len() > 2 {
            return Err(invalid("must return 0, 1, or 2 values"));
        }
        if let Some(second) = self.outputs.get(1) {
            if *second != TypeDescriptor::Error {
                return Err(invalid("2nd output parameter must be an error"));
            }
        }
        if let Some(first) = self.outputs.first() {
            if first.is_channel() {
                return Err(invalid("1st output parameter cannot be a channel"));
            }
            if is_exec && *first != TypeDescriptor::scalar(ScalarType::Int64) {
                return Err(invalid("the 1st output parameter of an exec must be int64"));
            }
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> Error {
    Error::InvalidSignature(reason.to_string())
}
