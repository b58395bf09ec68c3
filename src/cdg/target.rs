//! Coverage target identity.

use std::fmt;
use std::sync::Arc;

/// Block id reserved for the synthetic root of every control dependence
/// graph.
///
/// The analysis emits `u64::MAX` as the root node id; it is never a real
/// objective.
pub const ROOT_BLOCK: u64 = u64::MAX;

/// Identifier of one code unit (a function or method body).
///
/// Cloning is cheap: the id is reference counted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodeUnitId(Arc<str>);

impl CodeUnitId {
    /// Creates an id from any string-like value.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodeUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CodeUnitId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CodeUnitId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

/// One coverage goal: a basic block inside a code unit.
///
/// Identity is the pair `(code_unit, block)`. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoverageTarget {
    code_unit: CodeUnitId,
    block: u64,
}

impl CoverageTarget {
    /// Creates a target for `block` in `code_unit`.
    pub fn new(code_unit: impl Into<CodeUnitId>, block: u64) -> Self {
        Self {
            code_unit: code_unit.into(),
            block,
        }
    }

    /// Creates the root sentinel of `code_unit`.
    pub fn root(code_unit: impl Into<CodeUnitId>) -> Self {
        Self::new(code_unit, ROOT_BLOCK)
    }

    /// The code unit owning this target.
    pub fn code_unit(&self) -> &CodeUnitId {
        &self.code_unit
    }

    /// The local block id.
    pub fn block(&self) -> u64 {
        self.block
    }

    /// Whether this is the synthetic root rather than a real objective.
    pub fn is_root(&self) -> bool {
        self.block == ROOT_BLOCK
    }
}

impl fmt::Display for CoverageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "{}:root", self.code_unit)
        } else {
            write!(f, "{}:{}", self.code_unit, self.block)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_unit_and_block() {
        let a = CoverageTarget::new("lib::f", 3);
        let b = CoverageTarget::new(CodeUnitId::new("lib::f"), 3);
        let c = CoverageTarget::new("lib::g", 3);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, CoverageTarget::new("lib::f", 4));
    }

    #[test]
    fn test_root_sentinel() {
        let root = CoverageTarget::root("lib::f");
        assert!(root.is_root());
        assert_eq!(root.block(), ROOT_BLOCK);
        assert!(!CoverageTarget::new("lib::f", 0).is_root());
        assert_eq!(root.to_string(), "lib::f:root");
    }

    #[test]
    fn test_display() {
        assert_eq!(CoverageTarget::new("m", 7).to_string(), "m:7");
    }
}
