use std::collections::HashMap;

/// Maps each declared parameter name to its position among the function's
/// inputs. Position 0 belongs to the executor, so names start at 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamNameIndex {
    positions: HashMap<String, usize>,
}

impl ParamNameIndex {
    /// Builds the index from a comma-separated declaration such as
    /// `"id,name,status"`.
    ///
    /// Names are taken verbatim. A name declared twice keeps the position of
    /// its last occurrence.
    pub fn parse(declaration: &str) -> Self {
        if declaration.is_empty() {
            return Self::default();
        }
        let positions = declaration
            .split(',')
            .enumerate()
            .map(|(i, name)| (name.to_string(), i + 1))
            .collect();
        Self { positions }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_are_one_based() {
        let index = ParamNameIndex::parse("id,name,status");
        assert_eq!(index.position("id"), Some(1));
        assert_eq!(index.position("name"), Some(2));
        assert_eq!(index.position("status"), Some(3));
        assert_eq!(index.position("missing"), None);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let index = ParamNameIndex::parse("id,name,id");
        assert_eq!(index.position("id"), Some(3));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_empty_declaration() {
        assert!(ParamNameIndex::parse("").is_empty());
    }

    #[test]
    fn test_names_are_not_trimmed() {
        let index = ParamNameIndex::parse("id, name");
        assert_eq!(index.position("name"), None);
        assert_eq!(index.position(" name"), Some(2));
    }
}
