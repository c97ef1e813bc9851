//! Ordered, append-only list of waves shown to the user.

use std::collections::HashSet;
use wp_api_types::{WaveKey, WaveRecord};

#[derive(Debug, Clone, Default)]
pub struct WaveList {
    records: Vec<WaveRecord>,
    keys: HashSet<WaveKey>,
}

impl WaveList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list, e.g. after a fresh `getAllWaves()`.
    pub fn replace_all(&mut self, records: Vec<WaveRecord>) {
        self.keys = records.iter().map(WaveRecord::key).collect();
        self.records = records;
    }

    /// Append unconditionally. The same wave appended twice is listed twice.
    pub fn append(&mut self, record: WaveRecord) {
        self.keys.insert(record.key());
        self.records.push(record);
    }

    /// Append unless a wave with the same key is already listed.
    pub fn append_unique(&mut self, record: WaveRecord) -> bool {
        if !self.keys.insert(record.key()) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn contains(&self, record: &WaveRecord) -> bool {
        self.keys.contains(&record.key())
    }

    pub fn records(&self) -> &[WaveRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: u64) -> WaveRecord {
        WaveRecord::new(format!("0x{n:040x}"), 1_700_000_000 + n, format!("wave {n}"))
    }

    #[test]
    fn appends_grow_by_count_and_keep_order() {
        let mut list = WaveList::new();
        list.replace_all(vec![wave(0), wave(1)]);
        let before = list.len();

        let appended: Vec<WaveRecord> = (2..7).map(wave).collect();
        for record in appended.clone() {
            list.append(record);
        }

        assert_eq!(list.len(), before + appended.len());
        assert_eq!(&list.records()[before..], appended.as_slice());
    }

    #[test]
    fn plain_append_keeps_duplicates() {
        let mut list = WaveList::new();
        list.append(wave(1));
        list.append(wave(1));

        assert_eq!(list.len(), 2);
    }

    #[test]
    fn replace_all_without_appends_equals_input() {
        let mut list = WaveList::new();
        list.append(wave(9));

        let records = vec![wave(3), wave(1), wave(2)];
        list.replace_all(records.clone());

        assert_eq!(list.records(), records.as_slice());
    }

    #[test]
    fn append_unique_skips_listed_waves() {
        let mut list = WaveList::new();
        list.replace_all(vec![wave(1)]);

        assert!(!list.append_unique(wave(1)));
        assert!(list.append_unique(wave(2)));
        assert_eq!(list.records(), &[wave(1), wave(2)]);
    }

    #[test]
    fn replace_all_forgets_previous_keys() {
        let mut list = WaveList::new();
        list.append(wave(1));
        list.replace_all(vec![wave(2)]);

        assert!(!list.contains(&wave(1)));
        assert!(list.append_unique(wave(1)));
    }
}
