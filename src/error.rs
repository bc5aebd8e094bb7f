//! Error types for `fanout_tree`.

use thiserror::Error;

/// Convenient result alias for fallible tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by [`BTree`](crate::BTree).
///
/// Only two operations can fail: construction (the branching factor must
/// support splitting and merging) and the min/max queries (undefined on an
/// empty tree). Everything else returns a definite value.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error {
    /// Construction was requested with an order below the structural minimum.
    ///
    /// With fewer than three children per node, split and merge degenerate.
    #[error("invalid order {order}: a B-tree requires an order of at least 3")]
    InvalidOrder {
        /// The rejected branching factor.
        order: usize,
    },

    /// A min/max query was invoked on a tree with no keys.
    #[error("operation is undefined on an empty tree")]
    EmptyTree,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::InvalidOrder { order: 2 };
        assert_eq!(format!("{err}"), "invalid order 2: a B-tree requires an order of at least 3");

        let err = Error::EmptyTree;
        assert_eq!(format!("{err}"), "operation is undefined on an empty tree");
    }
}
