/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! A k-d tree: a binary space partition over points in k dimensions.
//!
//! [`Tree`] is bulk-built with approximate median pivots (median of up to
//! [`DEFAULT_PIVOT_SAMPLES`] random samples, found by quickselect), giving
//! a balanced tree in expected `O(n log n)`. Incremental
//! [`Tree::insert`] does not rebalance; insert-heavy workloads should
//! periodically rebuild from the point set.
//!
//! Searches are classic branch-and-bound: descend the near side first,
//! then visit the far side only when the squared distance to the splitting
//! plane is within the current bound. [`Tree::nearest`] finds the single
//! closest point, [`Tree::nearest_n`] the `n` closest, and
//! [`Tree::nearest_set`] hands every in-bound candidate to a caller-owned
//! [`Keeper`] (within-radius and nearest-n keepers are provided).
//!
//! Distances are whatever [`Point::distance`] computes, as long as the
//! metric is monotone in per-axis differences; squared Euclidean is the
//! canonical choice and nothing in the crate ever takes a square root.
//!
//! # Example
//!
//! ```
//! use kdtree::Tree;
//!
//! let points: Vec<Vec<f64>> = [(2., 3.), (5., 4.), (9., 6.), (4., 7.), (8., 1.), (7., 2.)]
//!     .iter()
//!     .map(|&(x, y)| vec![x, y])
//!     .collect();
//! let tree = Tree::new(points);
//! let (nearest, dist) = tree.nearest(&vec![4.0, 6.0]).unwrap();
//! assert_eq!(nearest, &vec![4.0, 7.0]);
//! assert_eq!(dist, 1.0);
//! ```

mod keeper;
mod medians;
mod point;
mod tree;

pub use keeper::{DistKeeper, Keeper, NKeeper};
pub use medians::{median_of_medians, median_of_randoms, partition, select};
pub use point::{Bounding, Extender, Point, bounds_of};
pub use tree::{DEFAULT_PIVOT_SAMPLES, Tree};
