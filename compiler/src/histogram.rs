// histogram.rs - chained hash table counting sampled outcomes
use serde::Serialize;
use std::io::{self, Write};

/// Maximum average chain length before the table grows.
const AVG_LEN_MAX: usize = 2;
const RESIZE_COEF: usize = 2;

/// sdbm-style polynomial string hash over the raw key bytes.
pub fn outcome_hash(key: &[u8]) -> u64 {
    key.iter().fold(0u64, |hash, &c| {
        u64::from(c)
            .wrapping_add(hash << 6)
            .wrapping_add(hash << 16)
            .wrapping_sub(hash)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    count: u64,
}

impl Entry {
    /// Outcome as sampled: qubit 0 first.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Outcome in report order, highest qubit first.
    pub fn display_key(&self) -> String {
        self.key.chars().rev().collect()
    }
}

/// One line of a report, with the outcome already in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeCount {
    pub outcome: String,
    pub count: u64,
}

#[derive(Debug)]
pub struct MeasurementHistogram {
    buckets: Vec<Vec<Entry>>,
    len: usize,
}

impl MeasurementHistogram {
    /// Creates a table with `buckets` chains (at least one).
    pub fn new(buckets: usize) -> Self {
        Self {
            buckets: (0..buckets.max(1)).map(|_| Vec::new()).collect(),
            len: 0,
        }
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.iter().map(Entry::count).sum()
    }

    fn bucket_of(&self, key: &str) -> usize {
        (outcome_hash(key.as_bytes()) % self.buckets.len() as u64) as usize
    }

    /// Increments the count of `key`, inserting it with count 1 if new.
    /// Returns the updated count.
    pub fn lookup_or_insert(&mut self, key: &str) -> u64 {
        let index = self.bucket_of(key);
        let chain = &mut self.buckets[index];
        if let Some(entry) = chain.iter_mut().find(|e| e.key == key) {
            entry.count += 1;
            return entry.count;
        }

        chain.push(Entry {
            key: key.to_owned(),
            count: 1,
        });
        self.len += 1;
        if self.len > AVG_LEN_MAX * self.buckets.len() {
            self.resize(self.len * RESIZE_COEF);
        }
        1
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.buckets[self.bucket_of(key)]
            .iter()
            .find(|e| e.key == key)
            .map(Entry::count)
    }

    /// Moves every entry into a fresh array of `new_size` chains, keeping
    /// the relative order of entries that land in the same chain.
    fn resize(&mut self, new_size: usize) {
        debug_assert!(new_size > 0);
        let mut buckets: Vec<Vec<Entry>> = (0..new_size).map(|_| Vec::new()).collect();
        for entry in self.buckets.drain(..).flatten() {
            let index = (outcome_hash(entry.key.as_bytes()) % new_size as u64) as usize;
            buckets[index].push(entry);
        }
        self.buckets = buckets;
    }

    /// Entries in bucket-then-chain order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.buckets.iter().flatten()
    }

    pub fn outcomes(&self) -> Vec<OutcomeCount> {
        self.iter()
            .map(|e| OutcomeCount {
                outcome: e.display_key(),
                count: e.count,
            })
            .collect()
    }

    /// Writes the `Sampled results:` report, one entry per line.
    pub fn print_all<W: Write>(&self, output: &mut W) -> io::Result<()> {
        writeln!(output, "Sampled results:")?;
        for entry in self.iter() {
            writeln!(output, "    '{}'    {}", entry.display_key(), entry.count)?;
        }
        Ok(())
    }

    /// Drops every entry but keeps the bucket array.
    pub fn clear(&mut self) {
        for chain in &mut self.buckets {
            chain.clear();
        }
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_reference_values() {
        assert_eq!(outcome_hash(b""), 0);
        assert_eq!(outcome_hash(b"0"), 48);
        // 49 + (48 << 6) + (48 << 16) - 48
        assert_eq!(outcome_hash(b"01"), 49 + 3072 + 3_145_728 - 48);
    }

    #[test]
    fn repeated_key_keeps_one_entry() {
        let mut h = MeasurementHistogram::new(4);
        for i in 1..=10 {
            assert_eq!(h.lookup_or_insert("101"), i);
        }
        assert_eq!(h.len(), 1);
        assert_eq!(h.get("101"), Some(10));
        assert_eq!(h.get("010"), None);
    }

    #[test]
    fn grows_to_keep_chains_short() {
        let mut h = MeasurementHistogram::new(1);
        for i in 0..200u32 {
            h.lookup_or_insert(&format!("{:08b}", i));
            assert!(h.len() <= AVG_LEN_MAX * h.bucket_count());
        }
        assert_eq!(h.len(), 200);
        assert_eq!(h.total(), 200);
        // the first resize happens at 3 entries over 1 bucket
        assert!(h.bucket_count() >= 100);
    }

    #[test]
    fn entries_survive_resizing() {
        let mut h = MeasurementHistogram::new(1);
        let keys: Vec<String> = (0..64u32).map(|i| format!("{:06b}", i)).collect();
        for key in &keys {
            h.lookup_or_insert(key);
        }
        for key in &keys {
            assert_eq!(h.lookup_or_insert(key), 2);
        }
        assert_eq!(h.len(), keys.len());
        assert_eq!(h.total(), 128);
    }

    #[test]
    fn zero_buckets_is_clamped() {
        let mut h = MeasurementHistogram::new(0);
        assert_eq!(h.bucket_count(), 1);
        h.lookup_or_insert("");
        assert_eq!(h.get(""), Some(1));
    }

    #[test]
    fn report_reverses_keys() {
        let mut h = MeasurementHistogram::new(1);
        h.lookup_or_insert("001");
        h.lookup_or_insert("001");
        let mut out = Vec::new();
        h.print_all(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Sampled results:\n    '100'    2\n");
    }

    #[test]
    fn report_follows_bucket_order() {
        let mut h = MeasurementHistogram::new(16);
        for key in ["11", "00", "10", "01"] {
            h.lookup_or_insert(key);
        }
        let mut expected: Vec<(usize, &str)> = ["11", "00", "10", "01"]
            .iter()
            .map(|k| ((outcome_hash(k.as_bytes()) % 16) as usize, *k))
            .collect();
        // stable sort keeps insertion order inside a chain
        expected.sort_by_key(|(bucket, _)| *bucket);
        let order: Vec<&str> = h.iter().map(Entry::key).collect();
        let expected: Vec<&str> = expected.into_iter().map(|(_, k)| k).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn clear_empties_table() {
        let mut h = MeasurementHistogram::new(2);
        h.lookup_or_insert("0");
        h.lookup_or_insert("1");
        h.clear();
        assert!(h.is_empty());
        assert_eq!(h.iter().count(), 0);
        assert_eq!(h.bucket_count(), 2);
    }
}
