use std::sync::Arc;

use crate::compiled::{Body, CompiledQuery, ParamInfo, Slot};
use crate::descriptor::Signature;
use crate::dialect::ParamAdapter;
use crate::error::{Error, Result};
use crate::ident::validate_identifier;
use crate::params::ParamNameIndex;
use crate::resolver::{DescriptorResolver, PathTypeResolver, Shape};
use crate::template::{ExpansionTemplate, Segment};

/// How a placeholder binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Exactly one positional slot, assigned at compile time.
    Scalar,
    /// One slot per element, assigned when the arguments are known.
    Collection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    InPlaceholder,
    Escaping { in_placeholder: bool },
}

/// Converts `:name:` placeholders into the positional placeholders of
/// `adapter`, checking every name against the declared parameters.
///
/// `params` is the comma-separated list of parameter names, in the order of
/// the function inputs that follow the executor. `\` escapes the next
/// character, so `\:` is a literal colon.
///
/// # Examples
///
/// ```
/// use sqlx_path_bind::builder::build_query;
/// use sqlx_path_bind::{Dialect, ScalarType, Signature, TypeDescriptor};
///
/// let sig = Signature::with_executor()
///     .input(TypeDescriptor::scalar(ScalarType::Int64))
///     .input(TypeDescriptor::scalar(ScalarType::Text));
/// let query = build_query(
///     "SELECT * FROM users WHERE id = :id: AND name = :name:",
///     "id,name",
///     &sig,
///     Dialect::Postgres,
/// )?;
/// assert_eq!(query.literal(), Some("SELECT * FROM users WHERE id = $1 AND name = $2"));
/// # Ok::<(), sqlx_path_bind::Error>(())
/// ```
pub fn build_query<A>(
    query: &str,
    params: &str,
    signature: &Signature,
    adapter: A,
) -> Result<CompiledQuery>
where
    A: ParamAdapter + 'static,
{
    build_query_with(query, params, signature, adapter, &DescriptorResolver)
}

/// [`build_query`] with a custom [`PathTypeResolver`].
pub fn build_query_with<A>(
    query: &str,
    params: &str,
    signature: &Signature,
    adapter: A,
    resolver: &dyn PathTypeResolver,
) -> Result<CompiledQuery>
where
    A: ParamAdapter + 'static,
{
    let index = ParamNameIndex::parse(params);
    let mut rewriter = Rewriter::new(&index, signature, resolver, Arc::new(adapter));

    let mut state = State::Normal;
    let mut var = String::new();
    for (offset, c) in query.char_indices() {
        state = match state {
            // the escaped character goes to the output even inside a placeholder
            State::Escaping { in_placeholder } => {
                rewriter.push(c);
                if in_placeholder {
                    State::InPlaceholder
                } else {
                    State::Normal
                }
            }
            State::Normal => match c {
                '\\' => State::Escaping { in_placeholder: false },
                ':' => State::InPlaceholder,
                c => {
                    rewriter.push(c);
                    State::Normal
                }
            },
            State::InPlaceholder => match c {
                '\\' => State::Escaping { in_placeholder: true },
                ':' => {
                    if var.is_empty() {
                        return Err(Error::EmptyVariableDeclaration { offset });
                    }
                    rewriter.placeholder(&var)?;
                    var.clear();
                    State::Normal
                }
                c => {
                    var.push(c);
                    State::InPlaceholder
                }
            },
        };
    }

    if matches!(
        state,
        State::InPlaceholder | State::Escaping { in_placeholder: true }
    ) {
        return Err(Error::UnterminatedPlaceholder {
            query: query.to_string(),
        });
    }
    Ok(rewriter.finish())
}

struct Rewriter<'a> {
    index: &'a ParamNameIndex,
    signature: &'a Signature,
    resolver: &'a dyn PathTypeResolver,
    adapter: Arc<dyn ParamAdapter>,
    text: String,
    segments: Vec<Segment>,
    scalar_params: Vec<ParamInfo>,
    collection_params: Vec<ParamInfo>,
    slots: Vec<Slot>,
}

impl<'a> Rewriter<'a> {
    fn new(
        index: &'a ParamNameIndex,
        signature: &'a Signature,
        resolver: &'a dyn PathTypeResolver,
        adapter: Arc<dyn ParamAdapter>,
    ) -> Self {
        Self {
            index,
            signature,
            resolver,
            adapter,
            text: String::new(),
            segments: Vec::new(),
            scalar_params: Vec::new(),
            collection_params: Vec::new(),
            slots: Vec::new(),
        }
    }

    fn push(&mut self, c: char) {
        self.text.push(c);
    }

    fn placeholder(&mut self, raw: &str) -> Result<()> {
        let id = validate_identifier(raw)?;
        let (info, class) = self.classify(&id)?;
        tracing::trace!(
            placeholder = %id,
            position = info.position,
            ?class,
            "classified placeholder"
        );

        match class {
            Classification::Scalar => {
                let pos = self.scalar_params.len() + 1;
                self.text.push_str(&self.adapter.placeholder(pos));
                self.slots.push(Slot::Scalar(self.scalar_params.len()));
                self.scalar_params.push(info);
            }
            Classification::Collection => {
                let param = self.collection_params.len();
                self.segments.push(Segment::Text(std::mem::take(&mut self.text)));
                self.segments.push(Segment::Expand { param, name: id });
                self.slots.push(Slot::Collection(param));
                self.collection_params.push(info);
            }
        }
        Ok(())
    }

    fn classify(&self, id: &str) -> Result<(ParamInfo, Classification)> {
        let (name, has_path) = match id.split_once('.') {
            Some((name, _)) => (name, true),
            None => (id, false),
        };
        let position = self
            .index
            .position(name)
            .ok_or_else(|| Error::UnknownParameter(name.to_string()))?;
        let ty = self.signature.param(position).ok_or_else(|| {
            Error::InvalidSignature(format!(
                "parameter {name} is at position {position} of {} inputs",
                self.signature.inputs.len()
            ))
        })?;
        if has_path && !ty.is_structured() {
            return Err(Error::PathOnNonStructuredParameter(name.to_string()));
        }

        let path: Vec<&str> = id.split('.').collect();
        let class = match self.resolver.resolve(ty, &path)? {
            Shape::Collection => Classification::Collection,
            _ => Classification::Scalar,
        };
        Ok((ParamInfo::new(id, position), class))
    }

    fn finish(mut self) -> CompiledQuery {
        let body = if self.collection_params.is_empty() {
            Body::Simple(self.text)
        } else {
            if !self.text.is_empty() {
                self.segments.push(Segment::Text(self.text));
            }
            Body::Templated(ExpansionTemplate::new(
                self.segments,
                self.scalar_params.len() + 1,
            ))
        };

        let query = CompiledQuery {
            body,
            scalar_params: self.scalar_params,
            collection_params: self.collection_params,
            slots: self.slots,
            adapter: self.adapter,
        };
        tracing::debug!(
            kind = ?query.kind(),
            scalars = query.scalar_params.len(),
            collections = query.collection_params.len(),
            "compiled query"
        );
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiled::QueryKind;
    use crate::descriptor::{ScalarType, TypeDescriptor};
    use crate::dialect::Dialect;

    fn int64() -> TypeDescriptor {
        TypeDescriptor::scalar(ScalarType::Int64)
    }

    fn sig(inputs: Vec<TypeDescriptor>) -> Signature {
        inputs.into_iter().fold(Signature::with_executor(), Signature::input)
    }

    #[test]
    fn test_build_query_no_params() {
        let q = build_query("SELECT * FROM users", "", &sig(vec![]), Dialect::MySql).unwrap();
        assert_eq!(q.kind(), QueryKind::Simple);
        assert_eq!(q.literal(), Some("SELECT * FROM users"));
        assert!(q.scalar_params().is_empty());
        assert!(q.collection_params().is_empty());
    }

    #[test]
    fn test_build_query_multiple_params() {
        let q = build_query(
            "WHERE id = :id: AND status = :status:",
            "id,status",
            &sig(vec![int64(), int64()]),
            Dialect::MySql,
        )
        .unwrap();
        assert_eq!(q.literal(), Some("WHERE id = ? AND status = ?"));
        assert_eq!(
            q.scalar_params(),
            &[ParamInfo::new("id", 1), ParamInfo::new("status", 2)]
        );
    }

    #[test]
    fn test_build_query_query_order_not_declaration_order() {
        let q = build_query(
            "WHERE b = :b: AND a = :a: OR b2 = :b:",
            "a,b",
            &sig(vec![int64(), int64()]),
            Dialect::Postgres,
        )
        .unwrap();
        assert_eq!(q.literal(), Some("WHERE b = $1 AND a = $2 OR b2 = $3"));
        assert_eq!(
            q.scalar_params(),
            &[
                ParamInfo::new("b", 2),
                ParamInfo::new("a", 1),
                ParamInfo::new("b", 2)
            ]
        );
    }

    #[test]
    fn test_build_query_escapes() {
        let q = build_query(
            r"SELECT '\:x', 'a\\b' FROM t\",
            "",
            &sig(vec![]),
            Dialect::MySql,
        )
        .unwrap();
        assert_eq!(q.literal(), Some(r"SELECT ':x', 'a\b' FROM t"));
    }

    #[test]
    fn test_build_query_escape_inside_placeholder_goes_to_output() {
        let q = build_query(r"x = :i\!d:", "id", &sig(vec![int64()]), Dialect::MySql).unwrap();
        assert_eq!(q.literal(), Some("x = !?"));
        assert_eq!(q.scalar_params(), &[ParamInfo::new("id", 1)]);
    }

    #[test]
    fn test_build_query_empty_placeholder() {
        let err = build_query("WHERE a = ::", "", &sig(vec![]), Dialect::MySql).unwrap_err();
        assert!(matches!(err, Error::EmptyVariableDeclaration { offset: 11 }));
    }

    #[test]
    fn test_build_query_unterminated() {
        let err = build_query("WHERE a = :id", "id", &sig(vec![int64()]), Dialect::MySql)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnterminatedPlaceholder { ref query } if query == "WHERE a = :id"
        ));

        let err = build_query(r"WHERE a = :id\", "id", &sig(vec![int64()]), Dialect::MySql)
            .unwrap_err();
        assert!(matches!(err, Error::UnterminatedPlaceholder { .. }));
    }

    #[test]
    fn test_build_query_invalid_identifier() {
        let err = build_query("a = :id;drop:", "id", &sig(vec![int64()]), Dialect::MySql)
            .unwrap_err();
        assert!(matches!(err, Error::IllegalCharacter(_)));

        let err = build_query("a = :   :", "id", &sig(vec![int64()]), Dialect::MySql)
            .unwrap_err();
        assert!(matches!(err, Error::EmptyIdentifier(ref text) if text == "   "));
    }

    #[test]
    fn test_build_query_unknown_parameter() {
        let err = build_query("a = :nonexistent:", "id", &sig(vec![int64()]), Dialect::MySql)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownParameter(ref name) if name == "nonexistent"));
    }

    #[test]
    fn test_build_query_path_on_scalar() {
        let err = build_query("a = :id.foo:", "id", &sig(vec![int64()]), Dialect::MySql)
            .unwrap_err();
        assert!(matches!(err, Error::PathOnNonStructuredParameter(ref name) if name == "id"));
    }

    #[test]
    fn test_build_query_declared_beyond_inputs() {
        let err = build_query("a = :b:", "a,b", &sig(vec![int64()]), Dialect::MySql).unwrap_err();
        assert!(matches!(err, Error::InvalidSignature(_)));
    }

    #[test]
    fn test_build_query_collection() {
        let q = build_query(
            "WHERE id = :id: AND status IN (:status:)",
            "id,status",
            &sig(vec![int64(), TypeDescriptor::collection(int64())]),
            Dialect::MySql,
        )
        .unwrap();
        assert!(q.kind().is_templated());
        assert_eq!(q.literal(), None);
        assert_eq!(q.collection_params(), &[ParamInfo::new("status", 2)]);

        let template = q.template().unwrap();
        assert_eq!(template.start(), 2);
        assert_eq!(
            template.to_string(),
            "WHERE id = ? AND status IN ({{.status | expand}})"
        );
        assert_eq!(q.render(&[3]), "WHERE id = ? AND status IN (?, ?, ?)");
    }

    #[test]
    fn test_build_query_nested_collection_path() {
        let user = TypeDescriptor::record([
            ("name", TypeDescriptor::scalar(ScalarType::Text)),
            (
                "roles",
                TypeDescriptor::collection(TypeDescriptor::scalar(ScalarType::Text)),
            ),
        ]);
        let q = build_query(
            "WHERE name = :u.name: AND role IN (:u.roles:) AND id > :min:",
            "u,min",
            &sig(vec![user, int64()]),
            Dialect::Postgres,
        )
        .unwrap();
        assert_eq!(
            q.scalar_params(),
            &[ParamInfo::new("u.name", 1), ParamInfo::new("min", 2)]
        );
        assert_eq!(q.collection_params(), &[ParamInfo::new("u.roles", 1)]);
        assert_eq!(
            q.render(&[2]),
            "WHERE name = $1 AND role IN ($3, $4) AND id > $2"
        );
    }

    #[test]
    fn test_build_query_unresolvable_path() {
        let user = TypeDescriptor::record([("name", TypeDescriptor::scalar(ScalarType::Text))]);
        let err = build_query("a = :u.missing:", "u", &sig(vec![user]), Dialect::MySql)
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvablePath { .. }));
    }

    #[test]
    fn test_build_query_custom_resolver() {
        struct AlwaysCollection;
        impl PathTypeResolver for AlwaysCollection {
            fn resolve(&self, _: &TypeDescriptor, _: &[&str]) -> Result<Shape> {
                Ok(Shape::Collection)
            }
        }

        let q = build_query_with(
            "x IN (:id:)",
            "id",
            &sig(vec![int64()]),
            Dialect::MySql,
            &AlwaysCollection,
        )
        .unwrap();
        assert!(q.kind().is_templated());
        assert_eq!(q.render(&[2]), "x IN (?, ?)");
    }
}
