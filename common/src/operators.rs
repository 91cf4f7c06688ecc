//! Operator Directory
//!
//! Maps 5-digit PLMN codes (MCC + MNC) to operator names

use crate::types::UNKNOWN_OPERATOR;
use std::collections::HashMap;

/// Indonesian PLMN codes and their operators
const INDONESIA_OPERATORS: [(&str, &str); 10] = [
    ("51010", "Telkomsel"),
    ("51001", "Telkomsel"),
    ("51021", "Indosat"),
    ("51011", "XL"),
    ("51009", "SF"),
    ("51028", "SF"),
    ("51089", "Tri"),
    ("51088", "Tri"),
    ("51008", "Axis"),
    ("51027", "Bolt"),
];

/// Immutable PLMN to operator lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorDirectory {
    operators: HashMap<String, String>,
}

impl OperatorDirectory {
    /// Build a directory from `(plmn, operator)` pairs
    pub fn new<I, P, O>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, O)>,
        P: Into<String>,
        O: Into<String>,
    {
        let operators = entries
            .into_iter()
            .map(|(plmn, name)| (plmn.into(), name.into()))
            .collect();
        Self { operators }
    }

    /// Directory seeded with the Indonesian carriers
    pub fn indonesia() -> Self {
        Self::new(INDONESIA_OPERATORS)
    }

    /// Operator name for a PLMN, or "Unknown"
    pub fn lookup(&self, plmn: &str) -> &str {
        self.operators
            .get(plmn)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_OPERATOR)
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl Default for OperatorDirectory {
    fn default() -> Self {
        Self::indonesia()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_operators() {
        let directory = OperatorDirectory::indonesia();
        assert_eq!(directory.len(), 10);
        assert_eq!(directory.lookup("51010"), "Telkomsel");
        assert_eq!(directory.lookup("51001"), "Telkomsel");
        assert_eq!(directory.lookup("51089"), "Tri");
        assert_eq!(directory.lookup("51027"), "Bolt");
    }

    #[test]
    fn test_unknown_plmn() {
        let directory = OperatorDirectory::indonesia();
        assert_eq!(directory.lookup("00101"), UNKNOWN_OPERATOR);
        assert_eq!(directory.lookup(""), UNKNOWN_OPERATOR);
    }

    #[test]
    fn test_custom_directory() {
        let directory = OperatorDirectory::new([("00101", "Test Network")]);
        assert_eq!(directory.lookup("00101"), "Test Network");
        assert_eq!(directory.lookup("51010"), UNKNOWN_OPERATOR);
    }
}
