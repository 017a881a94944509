/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Quickselect partitioning and approximate-median pivot heuristics,
//! on one axis of a point slice.

use rand::Rng;

use crate::point::Point;

/// Partitions `points` on axis `dim` around the element at `pivot`:
/// everything not greater than the pivot value lands before its final
/// position, everything greater after. Returns the pivot's final index.
///
/// # Panics
///
/// Panics on an empty slice.
pub fn partition<P: Point>(points: &mut [P], dim: usize, pivot: usize) -> usize {
    let last = points.len().checked_sub(1).expect("cannot partition an empty slice");
    points.swap(pivot, last);
    let mut index = 0;
    for i in 0..last {
        if points[last].compare(&points[i], dim) >= 0.0 {
            points.swap(index, i);
            index += 1;
        }
    }
    points.swap(last, index);
    index
}

/// Partitions `points` on axis `dim` so that `points[k]` holds the k-th
/// smallest value, smaller values before it and larger after. Returns `k`.
///
/// # Panics
///
/// Panics when `k` is out of range for a non-empty slice.
pub fn select<P, R>(points: &mut [P], dim: usize, k: usize, rng: &mut R) -> usize
where
    P: Point,
    R: Rng + ?Sized,
{
    let mut start = 0;
    let mut end = points.len();
    let mut rel = k;
    if k >= end {
        if k == 0 {
            return 0;
        }
        panic!("kdtree: select index out of range");
    }
    if end == 1 {
        return k;
    }

    loop {
        let sub = &mut points[start..end];
        let pivot = partition(sub, dim, rng.random_range(0..sub.len()));
        match rel.cmp(&pivot) {
            std::cmp::Ordering::Equal => return k,
            std::cmp::Ordering::Less => end = start + pivot,
            std::cmp::Ordering::Greater => {
                rel -= pivot;
                start += pivot;
            }
        }
    }
}

/// The index of an approximate median on axis `dim`: the median of the
/// medians of consecutive groups of five, each found by quickselect.
pub fn median_of_medians<P, R>(points: &mut [P], dim: usize, rng: &mut R) -> usize
where
    P: Point,
    R: Rng + ?Sized,
{
    let groups = points.len() / 5;
    if groups == 0 {
        return 0;
    }
    for i in 0..groups {
        let left = i * 5;
        select(&mut points[left..left + 5], dim, 2, rng);
        points.swap(i, left + 2);
    }
    select(&mut points[..groups], dim, groups / 2, rng);
    groups / 2
}

/// The index of the median of up to `n` randomly sampled elements, found
/// by quickselect over the sample.
pub fn median_of_randoms<P, R>(points: &mut [P], dim: usize, n: usize, rng: &mut R) -> usize
where
    P: Point,
    R: Rng + ?Sized,
{
    let n = n.min(points.len());
    if n == 0 {
        return 0;
    }
    if n < points.len() {
        for i in 0..n {
            let j = rng.random_range(i..points.len());
            points.swap(i, j);
        }
    }
    select(&mut points[..n], dim, n / 2, rng);
    n / 2
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn points(values: &[f64]) -> Vec<Vec<f64>> {
        values.iter().map(|&v| vec![v]).collect()
    }

    #[test]
    fn partition_splits_around_the_pivot() {
        let mut pts = points(&[9.0, 1.0, 8.0, 2.0, 7.0, 3.0, 5.0]);
        let pivot_value = pts[6][0];
        let at = partition(&mut pts, 0, 6);
        assert_eq!(pts[at][0], pivot_value);
        for p in &pts[..at] {
            assert!(p[0] <= pivot_value);
        }
        for p in &pts[at + 1..] {
            assert!(p[0] > pivot_value);
        }
    }

    #[test]
    fn select_places_the_kth_smallest() {
        let mut rng = StdRng::seed_from_u64(1);
        for k in 0..10 {
            let mut pts = points(&[3.0, 9.0, 0.0, 4.0, 8.0, 1.0, 7.0, 2.0, 6.0, 5.0]);
            select(&mut pts, 0, k, &mut rng);
            assert_eq!(pts[k][0], k as f64);
        }
    }

    #[test]
    fn median_heuristics_land_mid_slice() {
        let mut rng = StdRng::seed_from_u64(7);
        let values: Vec<f64> = (0..101).map(f64::from).collect();

        let mut pts = points(&values);
        let m = median_of_randoms(&mut pts, 0, 100, &mut rng);
        let v = pts[m][0];
        // A median of a large sample sits well away from the extremes.
        assert!((10.0..=90.0).contains(&v), "sampled median was {v}");

        let mut pts = points(&values);
        let m = median_of_medians(&mut pts, 0, &mut rng);
        let v = pts[m][0];
        assert!((10.0..=90.0).contains(&v), "median of medians was {v}");
    }
}
