/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

/// A point in k-d space.
///
/// [`Point::compare`] reports the signed per-axis difference and
/// [`Point::distance`] the global metric. The tree's pruning assumes the
/// metric is monotone in axis differences and compares squared axis
/// distances against it directly, so `distance` should be the *squared*
/// metric (squared Euclidean for `Vec<f64>`).
pub trait Point: Clone {
    /// The number of dimensions.
    fn dims(&self) -> usize;

    /// The signed difference `self[dim] - other[dim]`.
    fn compare(&self, other: &Self, dim: usize) -> f64;

    /// The (squared) distance between `self` and `other`.
    fn distance(&self, other: &Self) -> f64;
}

/// A point that can grow a bounding box to cover itself.
///
/// Bounding maintenance is optional; only the bounded constructors and
/// [`Tree::insert_extend`](crate::Tree::insert_extend) require it.
pub trait Extender: Point {
    /// Grows `bounding` so that it contains `self`.
    fn extend(&self, bounding: &mut Bounding<Self>);
}

impl Point for Vec<f64> {
    fn dims(&self) -> usize {
        self.len()
    }

    fn compare(&self, other: &Self, dim: usize) -> f64 {
        self[dim] - other[dim]
    }

    fn distance(&self, other: &Self) -> f64 {
        self.iter()
            .zip(other)
            .map(|(a, b)| {
                let d = a - b;
                d * d
            })
            .sum()
    }
}

impl Extender for Vec<f64> {
    fn extend(&self, bounding: &mut Bounding<Self>) {
        for (d, &v) in self.iter().enumerate() {
            if v < bounding.min[d] {
                bounding.min[d] = v;
            }
            if v > bounding.max[d] {
                bounding.max[d] = v;
            }
        }
    }
}

/// An axis-aligned box given by its two extreme corners.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounding<P> {
    pub min: P,
    pub max: P,
}

impl<P: Point> Bounding<P> {
    /// Whether `p` lies within the box on every axis.
    pub fn contains(&self, p: &P) -> bool {
        (0..p.dims()).all(|d| p.compare(&self.min, d) >= 0.0 && p.compare(&self.max, d) <= 0.0)
    }

    /// Whether the two boxes share any volume.
    pub fn intersects(&self, other: &Bounding<P>) -> bool {
        (0..self.min.dims())
            .all(|d| self.min.compare(&other.max, d) <= 0.0 && self.max.compare(&other.min, d) >= 0.0)
    }
}

/// The tight bounding box of a point set, or `None` for an empty set.
pub fn bounds_of<P: Extender>(points: &[P]) -> Option<Bounding<P>> {
    let first = points.first()?;
    let mut bounding = Bounding {
        min: first.clone(),
        max: first.clone(),
    };
    for p in &points[1..] {
        p.extend(&mut bounding);
    }
    Some(bounding)
}
