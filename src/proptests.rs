use super::*;

use crate::alphabet::SYMBOLS;
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

fn validate_tree<V>(t: &RadixTree<V>) {
    let issues = t.verify_integrity();
    assert!(issues.is_empty(), "integrity issues: {issues:?}\n{}", t.dump());
}

/// Rebuild `t` from its own enumeration into a fresh tree.
fn rebuilt<V: Clone>(t: &RadixTree<V>) -> RadixTree<V> {
    let mut fresh = RadixTree::new();
    for (k, v) in t.iter() {
        fresh.insert(&k, v.clone()).unwrap();
    }
    fresh
}

fn rank_seq(key: &[u8]) -> Vec<usize> {
    key.iter()
        .map(|&b| alphabet::rank_of(b).map(alphabet::Rank::index).unwrap())
        .collect()
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A handful of symbols from each class keeps shared prefixes common.
    let symbols: Vec<u8> = b"01ab:{}".to_vec();
    prop::collection::vec(prop::sample::select(symbols), 0..=8)
}

fn wide_key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    prop::collection::vec(prop::sample::select(SYMBOLS.to_vec()), 1..=40)
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(#[proptest(strategy = "key_strategy()")] Vec<u8>, u64),
    #[proptest(weight = 3)]
    Remove(#[proptest(strategy = "key_strategy()")] Vec<u8>),
    #[proptest(weight = 2)]
    Get(#[proptest(strategy = "key_strategy()")] Vec<u8>),
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_u64(ops in prop::collection::vec(any::<Op>(), 0..=400)) {
        let mut t: RadixTree<u64> = RadixTree::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for op in ops {
            match op {
                // The empty key is never stored.
                Op::Insert(key, value) if key.is_empty() => {
                    prop_assert_eq!(t.insert(&key, value), Ok(None));
                }
                Op::Insert(key, value) => {
                    let old_t = t.insert(&key, value).unwrap();
                    let old_m = m.insert(key, value);
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Remove(key) => {
                    let old_t = t.remove(&key).unwrap();
                    let old_m = m.remove(key.as_slice());
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Get(key) => {
                    let got_t = t.get(&key).unwrap().copied();
                    let got_m = m.get(key.as_slice()).copied();
                    prop_assert_eq!(got_t, got_m);
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t);

        // Enumeration is complete and in rank order.
        let got: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let mut expected: Vec<(Vec<u8>, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        expected.sort_by_key(|(k, _)| rank_seq(k));
        prop_assert_eq!(got, expected);

        // Maximal compression: the shape depends only on the key set.
        prop_assert_eq!(t.dump(), rebuilt(&t).dump());
    }

    #[test]
    fn prop_remove_absent_is_noop(
        keys in prop::collection::vec(wide_key_strategy(), 0..=64),
        absent in wide_key_strategy(),
    ) {
        let mut t: RadixTree<usize> = RadixTree::new();
        for (i, k) in keys.iter().enumerate() {
            t.insert(k, i).unwrap();
        }
        prop_assume!(!keys.contains(&absent));

        let before = t.dump();
        let len = t.len();
        prop_assert_eq!(t.remove(&absent), Ok(None));
        prop_assert_eq!(t.dump(), before);
        prop_assert_eq!(t.len(), len);
    }

    #[test]
    fn prop_round_trip_wide(keys in prop::collection::vec(wide_key_strategy(), 0..=200)) {
        let mut t: RadixTree<usize> = RadixTree::new();
        let mut m: BTreeMap<Vec<u8>, usize> = BTreeMap::new();
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(t.insert(k, i).unwrap(), m.insert(k.clone(), i));
        }
        for (k, v) in &m {
            prop_assert_eq!(t.get(k).unwrap(), Some(v));
        }
        let enumerated: BTreeMap<Vec<u8>, usize> = t.iter().map(|(k, v)| (k, *v)).collect();
        prop_assert_eq!(enumerated, m);
        validate_tree(&t);
    }

    #[test]
    fn prop_rejects_out_of_alphabet(
        prefix in key_strategy(),
        bad in any::<u8>().prop_filter("outside alphabet", |b| !alphabet::contains(*b)),
    ) {
        let mut t: RadixTree<()> = RadixTree::new();
        t.insert(b"ab", ()).unwrap();
        let mut key = prefix.clone();
        key.push(bad);

        let err = Error::OutOfAlphabet { byte: bad, offset: prefix.len() };
        prop_assert_eq!(t.insert(&key, ()), Err(err.clone()));
        prop_assert_eq!(t.get(&key), Err(err.clone()));
        prop_assert_eq!(t.remove(&key), Err(err));
        prop_assert_eq!(t.len(), 1);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

fn small_key_set() -> Vec<Vec<u8>> {
    vec![
        b"a".to_vec(),
        b"b".to_vec(),
        b"ab".to_vec(),
        b"abc".to_vec(),
        b"abd".to_vec(),
        b"b{".to_vec(),
    ]
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = small_key_set();
    let mut reference: Option<String> = None;

    for_each_permutation(&keys, |perm| {
        let mut t: RadixTree<u64> = RadixTree::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            assert_eq!(t.insert(&k, v).unwrap(), m.insert(k, v));
        }

        validate_tree(&t);
        for (k, v) in &m {
            assert_eq!(t.get(k).unwrap(), Some(v));
        }

        // Every insertion order yields the same shape.
        let dump = t.dump();
        match &reference {
            Some(r) => assert_eq!(&dump, r),
            None => reference = Some(dump),
        }
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys = small_key_set();

    // Insert in a fixed order, then remove in all permutations.
    let mut base_tree: RadixTree<u64> = RadixTree::new();
    let mut base_map: BTreeMap<Vec<u8>, u64> = BTreeMap::new();
    for (i, k) in keys.iter().enumerate() {
        let v = i as u64;
        assert_eq!(base_tree.insert(k, v).unwrap(), base_map.insert(k.clone(), v));
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base_tree.clone();
        let mut m = base_map.clone();

        for k in perm {
            assert_eq!(t.remove(&k).unwrap(), m.remove(k.as_slice()));
            assert_eq!(t.len(), m.len());
            validate_tree(&t);
            assert_eq!(t.dump(), rebuilt(&t).dump());
        }
        assert_eq!(t.len(), 0);
        assert_eq!(t.stats().nodes, 0);
    });
}
