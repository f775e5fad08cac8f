//! Declarative query catalogs.
//!
//! A catalog names every query together with its parameter declaration and
//! the signature of the function it backs:
//!
//! ```toml
//! dialect = "postgres"
//!
//! [queries.users_by_status]
//! query = "SELECT * FROM users WHERE org = :org: AND status IN (:statuses:)"
//! params = "org,statuses"
//! signature.inputs = [
//!     { kind = "executor" },
//!     { kind = "scalar", type = "int64" },
//!     { kind = "collection", element = { kind = "scalar", type = "text" } },
//! ]
//! ```

use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::builder::build_query;
use crate::compiled::CompiledQuery;
use crate::descriptor::Signature;
use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// One query and the function it is bound to.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryDecl {
    pub query: String,
    /// Comma-separated parameter names, in function input order.
    #[serde(default)]
    pub params: String,
    /// Mutating statement returning an affected-row count.
    #[serde(default)]
    pub exec: bool,
    pub signature: Signature,
}

impl QueryDecl {
    pub fn compile(&self, dialect: Dialect) -> Result<CompiledQuery> {
        self.signature.validate(self.exec)?;
        build_query(&self.query, &self.params, &self.signature, dialect)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryCatalog {
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default)]
    pub queries: IndexMap<String, QueryDecl>,
}

impl QueryCatalog {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Compiles every declared query, in file order. Fails on the first
    /// query that does not compile.
    pub fn compile(&self) -> Result<IndexMap<String, CompiledQuery>> {
        self.queries
            .iter()
            .map(|(name, decl)| {
                tracing::debug!(query = %name, "compiling catalog query");
                decl.compile(self.dialect).map(|q| (name.clone(), q))
            })
            .collect()
    }
}

impl FromStr for QueryCatalog {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_toml_str(s)
    }
}
