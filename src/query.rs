use serde_json::Value;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;
use sqlx::{mysql::MySqlQueryResult, Executor, MySql};

use crate::bind::BindValue;
use crate::builder::build_query;
use crate::compiled::CompiledQuery;
use crate::descriptor::Signature;
use crate::dialect::Dialect;

/// Type alias for SQLx Query with MySQL arguments
pub type Q<'q> = Query<'q, MySql, MySqlArguments>;

/// A mutating statement compiled from a `:name:` template.
///
/// The template is compiled once against the signature of the function it
/// stands for. Every call to [`execute`](Self::execute) supplies the
/// arguments, expands collection parameters to the right number of `?`
/// placeholders and builds a fresh SQLx `Query`.
///
/// # Examples
///
/// ```rust,no_run
/// use serde_json::json;
/// use sqlx::MySqlPool;
/// use sqlx_path_bind::{PreparedQuery, ScalarType, Signature, TypeDescriptor};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
/// let signature = Signature::with_executor()
///     .input(TypeDescriptor::scalar(ScalarType::Text))
///     .input(TypeDescriptor::collection(TypeDescriptor::scalar(ScalarType::Int64)))
///     .output(TypeDescriptor::scalar(ScalarType::Int64))
///     .output(TypeDescriptor::Error);
///
/// let query = PreparedQuery::new(
///     "UPDATE users SET name = :name: WHERE id IN (:ids:)",
///     "name,ids",
///     &signature,
/// )?;
///
/// let result = query.execute(&pool, &[json!("Jane Doe"), json!([1, 2, 3])]).await?;
/// println!("Updated {} rows", result.rows_affected());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    compiled: CompiledQuery,
}

impl PreparedQuery {
    /// Compiles `template` for a function whose inputs after the executor are
    /// named by `params`.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature is not exec-shaped (its first output,
    /// when present, must be an `int64` row count) or the template does not
    /// compile against it.
    pub fn new<T>(template: T, params: &str, signature: &Signature) -> crate::Result<Self>
    where
        T: AsRef<str>,
    {
        signature.validate(true)?;
        let compiled = build_query(template.as_ref(), params, signature, Dialect::MySql)?;
        Ok(Self { compiled })
    }

    /// Wraps a query that was already compiled for a `?` dialect.
    pub fn from_compiled(compiled: CompiledQuery) -> Self {
        Self { compiled }
    }

    pub fn compiled(&self) -> &CompiledQuery {
        &self.compiled
    }

    /// Executes the statement with `args`, one value per declared parameter.
    ///
    /// Works with any SQLx `Executor` implementation, including `MySqlPool`
    /// and `Transaction`.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument is missing or has the wrong shape, or
    /// if the database query fails.
    pub async fn execute<'e, E>(
        &self,
        executor: E,
        args: &[Value],
    ) -> crate::Result<MySqlQueryResult>
    where
        E: Executor<'e, Database = MySql>,
    {
        let bound = self.compiled.bind(args)?;
        let q: Q<'_> = sqlx::query::<MySql>(&bound.sql).bind_all(bound.values_in_text_order());
        Ok(q.execute(executor).await?)
    }
}
