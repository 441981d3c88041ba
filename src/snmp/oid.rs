//! Object Identifier value type: string <-> component-sequence conversion,
//! subtree/prefix relationships, and table-index extraction.

use std::fmt;

use crate::error::{Result, SnmpError};

/// An immutable, ordered sequence of OID components.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid(Vec<u32>);

impl Oid {
    /// Build an OID from components, validating the X.690 shape rules.
    pub fn new(components: Vec<u32>) -> Result<Self> {
        if components.len() < 2 {
            return Err(SnmpError::InvalidOid(
                "OID must have at least two components".into(),
            ));
        }
        if components[0] > 2 {
            return Err(SnmpError::InvalidOid(format!(
                "first component must be 0, 1, or 2, got {}",
                components[0]
            )));
        }
        if components[0] < 2 && components[1] >= 40 {
            return Err(SnmpError::InvalidOid(format!(
                "second component must be < 40 when first is {}, got {}",
                components[0], components[1]
            )));
        }
        Ok(Oid(components))
    }

    /// Build an OID without re-validating; used internally by the BER
    /// decoder, which already enforces the shape by construction.
    pub(crate) fn from_decoded(components: Vec<u32>) -> Self {
        Oid(components)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a dotted string form. A leading dot is permitted and ignored.
    pub fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.strip_prefix('.').unwrap_or(s);
        if trimmed.is_empty() || trimmed.ends_with('.') {
            return Err(SnmpError::InvalidOid(format!("malformed OID string: {s:?}")));
        }
        let components = trimmed
            .split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| SnmpError::InvalidOid(format!("invalid component {part:?} in {s:?}")))
            })
            .collect::<Result<Vec<u32>>>()?;
        Oid::new(components)
    }

    /// Render without a leading dot, e.g. `1.3.6.1.2.1.1.1.0`.
    pub fn to_dotted_string(&self) -> String {
        self.0
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// `true` if `self` is a strict, proper descendant of `parent`
    /// (`parent` is shorter and a component-wise prefix).
    pub fn is_child_of(&self, parent: &Oid) -> bool {
        parent.0.len() < self.0.len() && self.0.starts_with(&parent.0)
    }

    /// `true` if `parent` is a prefix of `self`, including equality.
    pub fn has_prefix(&self, parent: &Oid) -> bool {
        self.0.len() >= parent.0.len() && self.0.starts_with(&parent.0)
    }

    /// Append one component, returning a new OID (e.g. `sysDescr` -> `sysDescr.0`).
    pub fn child(&self, component: u32) -> Oid {
        let mut v = self.0.clone();
        v.push(component);
        Oid(v)
    }

    /// The suffix of `row_oid` that remains after stripping a matching
    /// `table_column_oid` prefix, i.e. the table index.
    pub fn table_index(row_oid: &Oid, table_column_oid: &Oid) -> Option<Oid> {
        if !row_oid.has_prefix(table_column_oid) || row_oid.len() == table_column_oid.len() {
            return None;
        }
        Some(Oid(row_oid.0[table_column_oid.len()..].to_vec()))
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dotted_string())
    }
}

impl std::str::FromStr for Oid {
    type Err = SnmpError;

    fn from_str(s: &str) -> Result<Self> {
        Oid::from_str(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(components: &[u32]) -> Self {
        Oid(components.to_vec())
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(components: [u32; N]) -> Self {
        Oid(components.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_dotted_string() {
        let oid = Oid::from_str("1.3.6.1.2.1.1.1.0").unwrap();
        assert_eq!(oid.to_dotted_string(), "1.3.6.1.2.1.1.1.0");
    }

    #[test]
    fn leading_dot_is_equivalent() {
        let a = Oid::from_str("1.3.6.1").unwrap();
        let b = Oid::from_str(".1.3.6.1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn trailing_dot_rejected() {
        assert!(Oid::from_str("1.3.6.1.").is_err());
    }

    #[test]
    fn empty_rejected() {
        assert!(Oid::from_str("").is_err());
        assert!(Oid::from_str(".").is_err());
    }

    #[test]
    fn second_component_bound_enforced() {
        assert!(Oid::new(vec![1, 40]).is_err());
        assert!(Oid::new(vec![2, 40]).is_ok());
        assert!(Oid::new(vec![3, 0]).is_err());
    }

    #[test]
    fn is_child_of() {
        let parent = Oid::from_str("1.3.6.1.2.1.1").unwrap();
        let child = Oid::from_str("1.3.6.1.2.1.1.1.0").unwrap();
        assert!(child.is_child_of(&parent));
        assert!(!parent.is_child_of(&child));
        assert!(!parent.is_child_of(&parent));
    }

    #[test]
    fn has_prefix_includes_equal() {
        let a = Oid::from_str("1.3.6.1.2.1.1").unwrap();
        assert!(a.has_prefix(&a));
    }

    #[test]
    fn table_index_extracts_suffix() {
        let column = Oid::from_str("1.3.6.1.2.1.2.2.1.2").unwrap();
        let row = Oid::from_str("1.3.6.1.2.1.2.2.1.2.7").unwrap();
        let index = Oid::table_index(&row, &column).unwrap();
        assert_eq!(index.to_dotted_string(), "7");
    }

    #[test]
    fn table_index_none_when_not_prefixed() {
        let column = Oid::from_str("1.3.6.1.2.1.2.2.1.2").unwrap();
        let row = Oid::from_str("1.3.6.1.2.1.2.2.1.3.7").unwrap();
        assert!(Oid::table_index(&row, &column).is_none());
    }

    #[test]
    fn lexicographic_ordering() {
        let a = Oid::from_str("1.3.6.1.2.1.1.1").unwrap();
        let b = Oid::from_str("1.3.6.1.2.1.1.2").unwrap();
        assert!(a < b);
    }
}
