use serde::Deserialize;

/// Renders the driver-specific text for "bind positional parameter `N` here".
///
/// Positions start at 1. Implementations must be deterministic: the same
/// position always produces the same text, both when scalar placeholders are
/// rewritten at compile time and when collection markers are expanded later.
///
/// Any `Fn(usize) -> String` closure is an adapter:
///
/// ```
/// use sqlx_path_bind::ParamAdapter;
///
/// let oracle = |pos: usize| format!(":{pos}");
/// assert_eq!(oracle.placeholder(3), ":3");
/// ```
pub trait ParamAdapter: Send + Sync {
    fn placeholder(&self, position: usize) -> String;
}

impl<F> ParamAdapter for F
where
    F: Fn(usize) -> String + Send + Sync,
{
    fn placeholder(&self, position: usize) -> String {
        self(position)
    }
}

/// Built-in placeholder dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `?`
    #[default]
    MySql,
    /// `$1`, `$2`, ...
    Postgres,
    /// `?`
    Sqlite,
}

impl ParamAdapter for Dialect {
    fn placeholder(&self, position: usize) -> String {
        match self {
            Dialect::MySql | Dialect::Sqlite => "?".to_string(),
            Dialect::Postgres => format!("${position}"),
        }
    }
}
