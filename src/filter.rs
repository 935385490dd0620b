use std::collections::BTreeMap;

use crate::table::Value;

/// A filter rule for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Case-insensitive containment in the stringified value.
    Substring(String),
    /// Exact match against the stringified value.
    Equals(String),
}

impl Criterion {
    pub fn text(&self) -> &str {
        match self {
            Criterion::Substring(s) | Criterion::Equals(s) => s,
        }
    }

    /// An unset criterion places no constraint on its column. Search terms are
    /// unset when blank, picked values only when empty.
    pub fn is_unset(&self) -> bool {
        match self {
            Criterion::Substring(term) => term.trim().is_empty(),
            Criterion::Equals(expected) => expected.is_empty(),
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        let Some(s) = value.as_string() else {
            return false;
        };
        match self {
            Criterion::Substring(term) => s
                .to_lowercase()
                .contains(&term.trim().to_lowercase()),
            Criterion::Equals(expected) => s == *expected,
        }
    }
}

/// Staged criteria by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    criteria: BTreeMap<String, Criterion>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the criterion of `column`. `None` or an unset criterion removes it.
    pub fn set(&mut self, column: impl Into<String>, criterion: Option<Criterion>) {
        let column = column.into();
        match criterion {
            Some(c) if !c.is_unset() => {
                self.criteria.insert(column, c);
            }
            _ => {
                self.criteria.remove(&column);
            }
        }
    }

    pub fn get(&self, column: &str) -> Option<&Criterion> {
        self.criteria.get(column)
    }

    pub fn clear(&mut self) {
        self.criteria.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Criterion)> {
        self.criteria.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_is_case_insensitive() {
        let c = Criterion::Substring("a2".to_string());
        assert!(c.matches(&Value::from("A200")));
        assert!(c.matches(&Value::from("xa2x")));
        assert!(!c.matches(&Value::from("B300")));
        assert!(!c.matches(&Value::Null));
    }

    #[test]
    fn substring_ignores_surrounding_whitespace() {
        let c = Criterion::Substring("  p51 ".to_string());
        assert!(c.matches(&Value::from("P51700012345")));
    }

    #[test]
    fn substring_matches_numbers_by_string_form() {
        let c = Criterion::Substring("23".to_string());
        assert!(c.matches(&Value::Integer(1234)));
        assert!(!c.matches(&Value::Integer(1324)));
    }

    #[test]
    fn equals_is_exact() {
        let c = Criterion::Equals("MH".to_string());
        assert!(c.matches(&Value::from("MH")));
        assert!(!c.matches(&Value::from("mh")));
        assert!(!c.matches(&Value::from("MH ")));
        assert!(!c.matches(&Value::Null));

        let n = Criterion::Equals("10".to_string());
        assert!(n.matches(&Value::Integer(10)));
        let f = Criterion::Equals("2.5".to_string());
        assert!(f.matches(&Value::Float(2.5)));
    }

    #[test]
    fn set_replaces_and_unsets() {
        let mut filters = FilterSet::new();
        filters.set("state", Some(Criterion::Equals("MH".to_string())));
        filters.set("state", Some(Criterion::Equals("KA".to_string())));
        assert_eq!(filters.len(), 1);
        assert_eq!(
            filters.get("state"),
            Some(&Criterion::Equals("KA".to_string()))
        );

        filters.set("state", Some(Criterion::Equals(String::new())));
        assert!(filters.is_empty());

        filters.set("reraNo", Some(Criterion::Substring("A".to_string())));
        filters.set("reraNo", None);
        assert!(filters.is_empty());

        filters.set("reraNo", Some(Criterion::Substring("  ".to_string())));
        assert!(filters.is_empty());
    }

    #[test]
    fn whitespace_is_a_real_picked_value() {
        let c = Criterion::Equals(" ".to_string());
        assert!(!c.is_unset());
        assert!(c.matches(&Value::from(" ")));
        assert!(!c.matches(&Value::from("MH")));

        let mut filters = FilterSet::new();
        filters.set("state", Some(c.clone()));
        assert_eq!(filters.get("state"), Some(&c));
    }
}
