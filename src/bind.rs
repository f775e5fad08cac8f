//! Binding JSON argument values onto SQLx MySQL queries.

use serde_json::Value;
use sqlx::mysql::MySqlArguments;
use sqlx::query::{Query, QueryAs};
use sqlx::types::Json;
use sqlx::{Encode, MySql, Type};

/// Anything that accepts MySQL bind parameters one at a time.
pub(crate) trait BindValue<'q>: Sized {
    fn push<T>(self, value: T) -> Self
    where
        T: 'q + Encode<'q, MySql> + Type<MySql>;

    /// Binds a JSON value as the closest native MySQL type. Arrays and
    /// objects bind as `JSON`.
    fn bind_value(self, value: &'q Value) -> Self {
        match value {
            Value::Null => self.push(None::<String>),
            Value::Bool(v) => self.push(*v),
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    self.push(v)
                } else if let Some(v) = n.as_u64() {
                    self.push(v)
                } else {
                    self.push(n.as_f64())
                }
            }
            Value::String(v) => self.push(v.as_str()),
            Value::Array(_) | Value::Object(_) => self.push(Json(value)),
        }
    }

    fn bind_all<I>(self, values: I) -> Self
    where
        I: IntoIterator<Item = &'q Value>,
    {
        values.into_iter().fold(self, Self::bind_value)
    }
}

impl<'q> BindValue<'q> for Query<'q, MySql, MySqlArguments> {
    fn push<T>(self, value: T) -> Self
    where
        T: 'q + Encode<'q, MySql> + Type<MySql>,
    {
        self.bind(value)
    }
}

impl<'q, R> BindValue<'q> for QueryAs<'q, MySql, R, MySqlArguments> {
    fn push<T>(self, value: T) -> Self
    where
        T: 'q + Encode<'q, MySql> + Type<MySql>,
    {
        self.bind(value)
    }
}
