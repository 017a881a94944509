/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! A left-leaning red-black (LLRB) tree, following Sedgewick's formulation.
//!
//! [`Tree`] is a balanced ordered map/set over a caller-defined total order.
//! Ordering is expressed through the [`Compare`] trait rather than [`Ord`]
//! so that lookups can be driven by lightweight query keys of a different
//! type than the stored elements, and so that callers can supply a
//! comparator that never reports equality to obtain non-replacing
//! (multiset) insertion.
//!
//! # Operation mode
//!
//! The tree balances either with 2-3 semantics ([`Mode::Bu23`], the
//! default) or top-down 2-3-4 semantics ([`Mode::Td234`]). Deletion is only
//! implemented for 2-3 semantics; the delete methods panic on a
//! [`Mode::Td234`] tree.
//!
//! # Example
//!
//! ```
//! use llrb::Tree;
//!
//! let mut t = Tree::new();
//! for v in [5i64, 3, 8, 1] {
//!     t.insert(v);
//! }
//! assert_eq!(t.len(), 4);
//! assert_eq!(t.min(), Some(&1));
//! assert_eq!(t.floor(&4i64), Some(&3));
//! assert_eq!(t.delete(&3i64), Some(3));
//! assert_eq!(t.iter().copied().collect::<Vec<_>>(), vec![1, 5, 8]);
//! ```

mod compare;
mod iter;
mod node;
mod tree;

pub use compare::Compare;
pub use iter::Iter;
pub use node::Mode;
pub use tree::Tree;
