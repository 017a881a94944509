/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

use std::cmp::Ordering;

use llrb::{Compare, Tree};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn collected(t: &Tree<i64>) -> Vec<i64> {
    let mut out = Vec::new();
    t.walk(|&e| {
        out.push(e);
        false
    });
    out
}

#[test]
fn walk_yields_sorted_elements() {
    let mut t = Tree::new();
    for v in [9i64, 1, 8, 2, 7, 3, 6, 4, 5] {
        t.insert(v);
    }
    assert_eq!(collected(&t), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);

    let mut rev = Vec::new();
    t.walk_reverse(|&e| {
        rev.push(e);
        false
    });
    assert_eq!(rev, vec![9, 8, 7, 6, 5, 4, 3, 2, 1]);
}

#[test]
fn walk_short_circuits() {
    let mut t = Tree::new();
    for v in 0..100i64 {
        t.insert(v);
    }
    let mut seen = Vec::new();
    let interrupted = t.walk(|&e| {
        seen.push(e);
        e == 10
    });
    assert!(interrupted);
    assert_eq!(seen.len(), 11);
    assert_eq!(seen.last(), Some(&10));
}

#[test]
fn walk_range_forward_and_reverse() {
    let mut t = Tree::new();
    for v in 0..20i64 {
        t.insert(v);
    }

    let mut seen = Vec::new();
    t.walk_range(
        |&e| {
            seen.push(e);
            false
        },
        &5i64,
        &10,
    );
    assert_eq!(seen, vec![5, 6, 7, 8, 9]);

    // Inverted endpoints walk the same interval backwards.
    seen.clear();
    t.walk_range(
        |&e| {
            seen.push(e);
            false
        },
        &10i64,
        &5,
    );
    assert_eq!(seen, vec![9, 8, 7, 6, 5]);

    // Coincident endpoints visit the matching elements only.
    seen.clear();
    t.walk_range(
        |&e| {
            seen.push(e);
            false
        },
        &7i64,
        &7,
    );
    assert_eq!(seen, vec![7]);
}

#[test]
#[should_panic(expected = "inverted range")]
fn strict_range_walk_rejects_inversion() {
    let mut t = Tree::new();
    t.insert(1i64);
    t.walk_range_strict(|_| false, &10i64, &5);
}

#[test]
fn floor_ceil_duality() {
    let mut t = Tree::new();
    for v in (0..100i64).step_by(5) {
        t.insert(v);
    }
    for q in -3..103i64 {
        let floor = t.floor(&q).copied();
        let ceil = t.ceil(&q).copied();
        if let Some(f) = floor {
            assert!(f <= q);
        } else {
            assert!(q < 0);
        }
        if let Some(c) = ceil {
            assert!(c >= q);
        } else {
            assert!(q > 95);
        }
        let present = t.get(&q).is_some();
        assert_eq!(floor == Some(q), present);
        assert_eq!(ceil == Some(q), present);
    }
}

#[test]
fn min_max_after_delete_min_sweep() {
    let mut t = Tree::new();
    for v in 0..=1000i64 {
        t.insert(v);
    }
    for _ in 0..500 {
        t.delete_min();
    }
    assert_eq!(t.len(), 501);
    assert_eq!(t.min(), Some(&500));
    assert_eq!(t.max(), Some(&1000));
    assert_eq!(collected(&t), (500..=1000).collect::<Vec<_>>());
}

#[test]
fn iterator_matches_walk() {
    let mut t = Tree::new();
    for v in [42i64, 17, 99, 3, 56, 23, 80] {
        t.insert(v);
    }
    assert_eq!(t.iter().copied().collect::<Vec<_>>(), collected(&t));
}

/// A wrapper whose comparator never reports equality, giving multiset
/// insertion. Lookups use the raw value, which does report equality.
#[derive(Debug, Clone, Copy)]
struct Dup(i64);

impl Compare for Dup {
    fn compare(&self, other: &Self) -> Ordering {
        match self.0.cmp(&other.0) {
            Ordering::Equal => Ordering::Greater,
            c => c,
        }
    }
}

struct DupQuery(i64);

impl Compare<Dup> for DupQuery {
    fn compare(&self, other: &Dup) -> Ordering {
        self.0.cmp(&other.0)
    }
}

#[test]
fn never_equal_comparator_gives_multiset_insert() {
    let mut t = Tree::new();
    for _ in 0..4 {
        for v in 0..8i64 {
            assert!(t.insert(Dup(v)).is_none());
        }
    }
    assert_eq!(t.len(), 32);

    let mut matching = 0;
    t.walk_matching(
        |_| {
            matching += 1;
            false
        },
        &DupQuery(3),
    );
    assert_eq!(matching, 4);

    // Deleting through the equality-reporting query removes one at a time.
    assert!(t.delete(&DupQuery(3)).is_some());
    assert_eq!(t.len(), 31);
}

proptest! {
    #[test]
    fn behaves_like_btreeset(ops in prop::collection::vec((any::<bool>(), 0i64..500), 1..400)) {
        let mut t = Tree::new();
        let mut model = std::collections::BTreeSet::new();
        for (is_insert, v) in ops {
            if is_insert {
                prop_assert_eq!(t.insert(v).is_some(), !model.insert(v));
            } else {
                prop_assert_eq!(t.delete(&v), model.take(&v));
            }
            prop_assert_eq!(t.len(), model.len());
        }
        let walked = {
            let mut out = Vec::new();
            t.walk(|&e| { out.push(e); false });
            out
        };
        prop_assert_eq!(walked, model.iter().copied().collect::<Vec<_>>());
        prop_assert_eq!(t.min(), model.first());
        prop_assert_eq!(t.max(), model.last());
    }

    #[test]
    fn floor_ceil_agree_with_model(
        values in prop::collection::btree_set(0i64..1000, 0..100),
        probes in prop::collection::vec(0i64..1000, 1..50),
    ) {
        let mut t = Tree::new();
        for &v in &values {
            t.insert(v);
        }
        for q in probes {
            prop_assert_eq!(t.floor(&q), values.range(..=q).next_back());
            prop_assert_eq!(t.ceil(&q), values.range(q..).next());
        }
    }
}
