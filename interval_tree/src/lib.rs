/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Interval trees built on an augmented left-leaning red-black tree.
//!
//! Every node carries the *extent* of its subtree — the minimum of all
//! stored start endpoints and the maximum of all stored end endpoints below
//! it — which lets overlap queries skip entire subtrees whose extent cannot
//! overlap the query.
//!
//! Two variants share the balancing and extent machinery:
//!
//! - [`Tree`] is generic over any [`Interval`] element with `Ord + Clone`
//!   endpoints.
//! - [`IntTree`] is a monomorphic fast path for machine-integer endpoints:
//!   extents are inline [`IntRange`] values and comparisons are integer
//!   arithmetic, with no calls back into the element on the hot path.
//!
//! Elements with coincident start endpoints are told apart by a
//! caller-supplied identity, so equal-start intervals coexist rather than
//! replacing one another. Use a monotonic counter for the identity; it must
//! be unique per stored element and stable for the element's lifetime.
//!
//! The overlap predicate is the implementor's own; the provided
//! [`IntRange`] query and the documentation assume half-open `[min, max)`
//! intervals, the convention all examples and tests here follow.
//!
//! Insertion and deletion maintain extents incrementally. Passing
//! `fast = true` skips that maintenance, leaving extents stale; call
//! [`Tree::adjust_ranges`] (or [`IntTree::adjust_ranges`]) once after a
//! batch before the next overlap query.

mod color;
mod int;
mod tree;

use thiserror::Error;

pub use int::{IntInterval, IntOverlaps, IntRange, IntTree};
pub use tree::{Interval, Overlaps, Tree};

/// The error returned when an interval's minimum endpoint sorts after its
/// maximum endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("interval_tree: inverted range")]
pub struct InvertedRange;
