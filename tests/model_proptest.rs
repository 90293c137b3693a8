use std::collections::HashMap as ModelMap;
use std::hash::BuildHasher;
use std::hash::Hasher;

use prime_probe::HashMap;
use prime_probe::HashTable;
use prime_probe::primes::is_prime;
use proptest::prelude::*;

// Folds every key into a handful of hashes so probe chains, tombstones and
// growth on an exhausted probe all get exercised.
#[derive(Clone, Default)]
struct CollidingBuilder;

#[derive(Default)]
struct CollidingHasher(u64);

impl Hasher for CollidingHasher {
    fn finish(&self) -> u64 {
        self.0 % 4
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.wrapping_mul(31).wrapping_add(u64::from(b));
        }
    }
}

impl BuildHasher for CollidingBuilder {
    type Hasher = CollidingHasher;

    fn build_hasher(&self) -> Self::Hasher {
        CollidingHasher::default()
    }
}

fn check_shape<K, V, S>(m: &HashMap<K, V, S>) -> Result<(), TestCaseError> {
    let capacity = m.capacity();
    prop_assert!(is_prime(capacity));
    prop_assert!(capacity >= 11);
    if m.len() > 0 {
        // Growth happens before an insert that would start above the load
        // factor, so at most one entry sits past it.
        prop_assert!((m.len() - 1) as f64 <= f64::from(m.load_factor()) * capacity as f64);
    }
    Ok(())
}

// Model operations on HashMap against std's map and compare after each step.
proptest! {
    #[test]
    fn prop_map_matches_model(keys in 1u32..=64, ops in proptest::collection::vec((0u8..=3u8, 0u32..1000u32, any::<i32>()), 1..400)) {
        let mut m: HashMap<u32, i32> = HashMap::new();
        let mut model: ModelMap<u32, i32> = ModelMap::new();

        for (op, raw_k, value) in ops {
            let k = raw_k % keys;
            match op {
                0 | 1 => {
                    prop_assert_eq!(m.insert(k, value), model.insert(k, value));
                }
                2 => {
                    prop_assert_eq!(m.remove(&k), model.remove(&k));
                }
                3 => {
                    *m.entry(k).or_insert(0) += 1;
                    *model.entry(k).or_insert(0) += 1;
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(m.len(), model.len());
            prop_assert_eq!(m.get(&k), model.get(&k));
            prop_assert_eq!(m.contains_key(&k), model.contains_key(&k));
            check_shape(&m)?;
        }

        for (k, v) in &model {
            prop_assert_eq!(m.get(k), Some(v));
        }
        let mut seen: Vec<(u32, i32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        seen.sort();
        let mut expected: Vec<(u32, i32)> = model.into_iter().collect();
        expected.sort();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn prop_colliding_keys_match_model(ops in proptest::collection::vec((0u8..=2u8, 0u64..200u64), 1..300)) {
        let mut m: HashMap<u64, u64, CollidingBuilder> = HashMap::with_hasher(CollidingBuilder);
        let mut model: ModelMap<u64, u64> = ModelMap::new();

        for (op, k) in ops {
            match op {
                0 | 1 => {
                    prop_assert_eq!(m.insert(k, k * 2), model.insert(k, k * 2));
                }
                2 => {
                    prop_assert_eq!(m.remove(&k), model.remove(&k));
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(m.len(), model.len());
            check_shape(&m)?;
        }

        for k in 0..200u64 {
            prop_assert_eq!(m.get(&k), model.get(&k));
        }
    }

    #[test]
    fn prop_table_slot_accounting(ops in proptest::collection::vec((any::<bool>(), 0u64..100u64), 1..300)) {
        let mut table: HashTable<u64> = HashTable::new();
        let mut model = std::collections::HashSet::new();

        for (insert, k) in ops {
            // Hashes equal to the key put keys sharing a residue on the same
            // probe sequence.
            if insert {
                table.entry(k, |&v| v == k).or_insert(k);
                model.insert(k);
            } else {
                prop_assert_eq!(table.remove(k, |&v| v == k).is_some(), model.remove(&k));
            }

            prop_assert_eq!(table.len(), model.len());
            prop_assert!(table.len() + table.tombstones() <= table.capacity());
            prop_assert!(is_prime(table.capacity()));
        }

        for k in 0..100u64 {
            prop_assert_eq!(table.find(k, |&v| v == k).is_some(), model.contains(&k));
        }
    }

    #[test]
    fn prop_from_map_keeps_every_entry(entries in proptest::collection::hash_map(any::<u16>(), any::<u16>(), 0..200)) {
        let m = HashMap::from_map(entries.clone());
        prop_assert_eq!(m.len(), entries.len());
        for (k, v) in &entries {
            prop_assert_eq!(m.get(k), Some(v));
        }
        check_shape(&m)?;
    }
}
