//! # sqlx-path-bind
//!
//! Compiles queries with named `:placeholder:` markers into positional SQLx
//! statements, checked against the signature of the function they back.
//!
//! ## Features
//!
//! - **Named Placeholders**: Write `:id:` instead of `?`, and reach into
//!   structured parameters with paths such as `:user.address.zip:`
//! - **Checked at Startup**: Every placeholder is validated against the
//!   declared parameter names and their types when the query is compiled
//! - **Collection Expansion**: Collection parameters expand to one placeholder
//!   per element (`IN (?, ?, ?)`) at call time
//! - **Pluggable Dialects**: `?` for MySQL and SQLite, `$N` for PostgreSQL, or
//!   any closure
//! - **Shareable**: A compiled query is immutable; expansion never mutates it,
//!   so one instance serves any number of concurrent calls
//!
//! ## Quick Start
//!
//! ```rust
//! use sqlx_path_bind::{build_query, Dialect, ScalarType, Signature, TypeDescriptor};
//!
//! let signature = Signature::with_executor()
//!     .input(TypeDescriptor::scalar(ScalarType::Int64))
//!     .input(TypeDescriptor::collection(TypeDescriptor::scalar(ScalarType::Text)));
//!
//! let query = build_query(
//!     "SELECT * FROM t WHERE id = :id: AND status IN (:status:)",
//!     "id,status",
//!     &signature,
//!     Dialect::Postgres,
//! )?;
//!
//! let bound = query.bind(&[serde_json::json!(7), serde_json::json!(["new", "open", "late"])])?;
//! assert_eq!(bound.sql, "SELECT * FROM t WHERE id = $1 AND status IN ($2, $3, $4)");
//! assert_eq!(bound.bindings.len(), 4);
//! # Ok::<(), sqlx_path_bind::Error>(())
//! ```
//!
//! ## Executing with MySQL
//!
//! ```rust,no_run
//! use serde_json::json;
//! use sqlx::MySqlPool;
//! use sqlx_path_bind::{PreparedQuery, ScalarType, Signature, TypeDescriptor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = MySqlPool::connect("mysql://localhost/test").await?;
//!
//! let signature = Signature::with_executor()
//!     .input(TypeDescriptor::scalar(ScalarType::Int64))
//!     .input(TypeDescriptor::scalar(ScalarType::Text))
//!     .output(TypeDescriptor::scalar(ScalarType::Int64));
//!
//! let query = PreparedQuery::new(
//!     "INSERT INTO users (id, name) VALUES (:id:, :name:)",
//!     "id,name",
//!     &signature,
//! )?;
//!
//! let result = query.execute(&pool, &[json!(42), json!("John Doe")]).await?;
//! println!("Inserted {} rows", result.rows_affected());
//! # Ok(())
//! # }
//! ```
//!
//! ## Placeholder Syntax
//!
//! - `:name:` binds the declared parameter `name`
//! - `:name.field.sub:` walks into a record or mapping parameter
//! - `\` escapes the next character: `\:` is a literal colon, `\\` a literal
//!   backslash
//!
//! ## How It Works
//!
//! 1. **Compile**: Scan the template once, validate each placeholder, assign
//!    static positions to scalars and leave markers for collections
//! 2. **Bind**: Given the call arguments, expand each collection marker from a
//!    fresh running position and collect the values in position order
//! 3. **Execute**: Construct a fresh SQLx `Query` on each execution
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at your option.

mod bind;
pub mod builder;
pub mod compiled;
pub mod config;
pub mod descriptor;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod params;
pub mod query;
pub mod query_as;
pub mod resolver;
pub mod template;

pub use builder::{build_query, build_query_with, Classification};
pub use compiled::{Binding, BoundQuery, CompiledQuery, ParamInfo, QueryKind};
pub use config::{QueryCatalog, QueryDecl};
pub use descriptor::{ScalarType, Signature, TypeDescriptor};
pub use dialect::{Dialect, ParamAdapter};
pub use error::{Error, Result};
pub use params::ParamNameIndex;
pub use query::PreparedQuery;
pub use query_as::PreparedQueryAs;
pub use resolver::{DescriptorResolver, PathTypeResolver, Shape};
pub use template::ExpansionTemplate;

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::{build_query, CompiledQuery, Dialect, QueryCatalog, Signature, TypeDescriptor};
    pub use crate::PreparedQuery;
    pub use crate::PreparedQueryAs;
}
