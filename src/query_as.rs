use serde_json::Value;
use sqlx::{
    mysql::{MySqlArguments, MySqlRow},
    query::QueryAs,
    Executor, MySql,
};

use crate::bind::BindValue;
use crate::builder::build_query;
use crate::compiled::{BoundQuery, CompiledQuery};
use crate::descriptor::Signature;
use crate::dialect::Dialect;

/// Type alias for SQLx QueryAs with MySQL arguments
pub type QA<'q, R> = QueryAs<'q, MySql, R, MySqlArguments>;

/// A row-returning query compiled from a `:name:` template.
///
/// Like [`PreparedQuery`](crate::PreparedQuery) but returns strongly-typed
/// results using SQLx's `FromRow` trait.
///
/// # Type Parameters
///
/// * `R` - The result type that implements `FromRow`
///
/// # Examples
///
/// ```rust,no_run
/// use serde_json::json;
/// use sqlx::{FromRow, MySqlPool};
/// use sqlx_path_bind::{PreparedQueryAs, ScalarType, Signature, TypeDescriptor};
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
/// let filter = TypeDescriptor::record([
///     ("min_age", TypeDescriptor::scalar(ScalarType::Int32)),
///     ("teams", TypeDescriptor::collection(TypeDescriptor::scalar(ScalarType::Text))),
/// ]);
/// let signature = Signature::with_executor().input(filter);
///
/// let query = PreparedQueryAs::<User>::new(
///     "SELECT id, name FROM users WHERE age >= :f.min_age: AND team IN (:f.teams:)",
///     "f",
///     &signature,
/// )?;
///
/// let users = query
///     .fetch_all(&pool, &[json!({"min_age": 18, "teams": ["red", "blue"]})])
///     .await?;
/// println!("Found {} users", users.len());
/// # Ok(())
/// # }
/// ```
pub struct PreparedQueryAs<R> {
    compiled: CompiledQuery,
    _pd: std::marker::PhantomData<fn() -> R>,
}

impl<R> PreparedQueryAs<R>
where
    for<'row> R: sqlx::FromRow<'row, MySqlRow> + Send + Unpin,
{
    /// Compiles `template` for a function whose inputs after the executor are
    /// named by `params`.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature is invalid or the template does not
    /// compile against it.
    pub fn new<T>(template: T, params: &str, signature: &Signature) -> crate::Result<Self>
    where
        T: AsRef<str>,
    {
        signature.validate(false)?;
        let compiled = build_query(template.as_ref(), params, signature, Dialect::MySql)?;
        Ok(Self::from_compiled(compiled))
    }

    /// Wraps a query that was already compiled for a `?` dialect.
    pub fn from_compiled(compiled: CompiledQuery) -> Self {
        Self {
            compiled,
            _pd: std::marker::PhantomData,
        }
    }

    pub fn compiled(&self) -> &CompiledQuery {
        &self.compiled
    }

    /// Executes the query and returns all matching rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments do not fit the query, the query
    /// fails, or any row cannot be converted to type `R`.
    pub async fn fetch_all<'e, E>(&self, executor: E, args: &[Value]) -> crate::Result<Vec<R>>
    where
        E: Executor<'e, Database = MySql>,
    {
        let bound = self.compiled.bind(args)?;
        Ok(typed(&bound).fetch_all(executor).await?)
    }

    /// Executes the query and returns exactly one row.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No rows are found
    /// - The arguments do not fit the query
    /// - The query fails
    /// - The row cannot be converted to type `R`
    pub async fn fetch_one<'e, E>(&self, executor: E, args: &[Value]) -> crate::Result<R>
    where
        E: Executor<'e, Database = MySql>,
    {
        let bound = self.compiled.bind(args)?;
        Ok(typed(&bound).fetch_one(executor).await?)
    }

    /// Executes the query and returns at most one row.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments do not fit the query, the query
    /// fails, or the row cannot be converted to type `R`.
    pub async fn fetch_optional<'e, E>(
        &self,
        executor: E,
        args: &[Value],
    ) -> crate::Result<Option<R>>
    where
        E: Executor<'e, Database = MySql>,
    {
        let bound = self.compiled.bind(args)?;
        Ok(typed(&bound).fetch_optional(executor).await?)
    }
}

fn typed<R>(bound: &BoundQuery) -> QA<'_, R>
where
    for<'row> R: sqlx::FromRow<'row, MySqlRow>,
{
    sqlx::query_as::<MySql, R>(&bound.sql).bind_all(bound.values_in_text_order())
}
