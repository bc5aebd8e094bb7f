//! Runtime-order B-tree set for Rust.
//!
//! This crate provides [`BTree`], an ordered set of unique keys backed by a
//! classic B-tree whose branching factor (*order*) is chosen at
//! construction rather than baked into the type:
//!
//! - [`insert`](BTree::insert) / [`remove`](BTree::remove) /
//!   [`contains`](BTree::contains) - O(log n) membership operations
//! - [`find_least`](BTree::find_least) / [`find_greatest`](BTree::find_greatest) -
//!   min/max queries
//! - [`height`](BTree::height) / [`len`](BTree::len) - structural diagnostics
//!
//! # Example
//!
//! ```
//! use fanout_tree::BTree;
//!
//! // An order-5 tree: at most 4 keys per node.
//! let mut tree = BTree::new(5).unwrap();
//!
//! for key in [42, 7, 19, 3, 23] {
//!     tree.insert(key);
//! }
//!
//! assert!(tree.contains(&19));
//! assert_eq!(tree.len(), 5);
//! assert_eq!(tree.find_least().unwrap(), &3);
//!
//! tree.remove(&3);
//! assert_eq!(tree.find_least().unwrap(), &7);
//! ```
//!
//! # Implementation
//!
//! Nodes live in an index-addressed arena and reference each other by stable
//! handles, so there are no parent back-pointers and no aliasing during
//! rebalancing: splits, merges, and rotations replace child slots through
//! the arena, driven by an explicit root-to-leaf path stack. Splits promote
//! the floor-median key; removals repair underflow by rotating from the
//! right sibling first, then the left, then merging. All of this is safe
//! code - the crate forbids `unsafe`.

#![forbid(unsafe_code)]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]

mod error;
mod raw;

pub mod btree;

pub use btree::{BTree, Iter};
pub use error::{Error, Result};
