/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! A run-length-encoded step vector.
//!
//! [`Vector`] represents a dense function `[start, end) -> T` over the
//! integer line, stored as the ordered set of positions where the value
//! changes. High-volume data with long constant runs (coverage tracks,
//! occupancy maps, per-index counters) stays proportional to the number of
//! runs rather than the number of indices.
//!
//! Run boundaries live in an [`llrb::Tree`] keyed by position; every
//! mutation re-establishes the canonical form: distinct boundary keys,
//! no two adjacent runs with equal values, and a single end sentinel.
//!
//! Value equality is the [`StepValue`] trait rather than [`PartialEq`] so
//! that floating-point vectors can treat `NaN == NaN` as true — without
//! that, adjacent NaN runs would never merge.
//!
//! # Example
//!
//! ```
//! use step_vector::Vector;
//!
//! let mut v = Vector::new(1, 10, 0i64).unwrap();
//! v.set_range(1, 3, 3).unwrap();
//! v.set_range(4, 5, 1).unwrap();
//! assert_eq!(v.at(2), Ok(&3));
//! assert_eq!(v.at(3), Ok(&0));
//! assert_eq!(v.to_string(), "[1:3 3:0 4:1 5:0 10:<nil>]");
//! ```

mod value;
mod vector;

use thiserror::Error;

pub use value::StepValue;
pub use vector::Vector;

/// Errors reported by [`Vector`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepError {
    /// An index or range outside the vector's extent, on a vector that is
    /// not relaxed.
    #[error("step_vector: index out of range")]
    OutOfRange,
    /// A range whose end sorts before its start.
    #[error("step_vector: inverted range")]
    InvertedRange,
    /// An attempt to create a vector with no extent.
    #[error("step_vector: zero length vector")]
    ZeroLength,
}
