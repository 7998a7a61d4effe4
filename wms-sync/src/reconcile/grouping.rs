//! Grouping and batching
//!
//! Records sharing material, batch, movement type and storage location post
//! together. Groups keep first-seen order, members keep input order.

use shared::models::PendingTransactionRecord;
use std::collections::HashMap;
use std::fmt;

/// Largest number of items sent in one ERP request
pub const MAX_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub material: String,
    pub batch: String,
    pub movement_type: String,
    pub storage_location: String,
}

impl GroupKey {
    pub fn of(record: &PendingTransactionRecord) -> Self {
        let field = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or_default().to_string();
        Self {
            material: field(&record.material),
            batch: field(&record.batch),
            movement_type: field(&record.movement_type),
            storage_location: field(&record.storage_location),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.material, self.batch, self.movement_type, self.storage_location
        )
    }
}

#[derive(Debug, Clone)]
pub struct RecordGroup {
    pub key: GroupKey,
    pub records: Vec<PendingTransactionRecord>,
}

/// A slice of a group small enough for one request
#[derive(Debug)]
pub struct Batch<'a> {
    pub key: &'a GroupKey,
    /// 1-based position within the group
    pub index: usize,
    pub total: usize,
    pub records: &'a [PendingTransactionRecord],
}

impl RecordGroup {
    /// Members sliced into batches of at most `size` (0 is treated as 1)
    pub fn batches(&self, size: usize) -> Vec<Batch<'_>> {
        let chunks: Vec<_> = self.records.chunks(size.max(1)).collect();
        let total = chunks.len();
        chunks
            .into_iter()
            .enumerate()
            .map(|(i, records)| Batch {
                key: &self.key,
                index: i + 1,
                total,
                records,
            })
            .collect()
    }
}

pub fn group_records(records: Vec<PendingTransactionRecord>) -> Vec<RecordGroup> {
    let mut groups: Vec<RecordGroup> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for record in records {
        let key = GroupKey::of(&record);
        match index.get(&key) {
            Some(&i) => groups[i].records.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(RecordGroup {
                    key,
                    records: vec![record],
                });
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::ModuleKind;

    fn record(id: i64, material: &str, batch: &str) -> PendingTransactionRecord {
        PendingTransactionRecord {
            log_id: Some(id),
            material: Some(material.into()),
            batch: Some(batch.into()),
            movement_type: Some("321".into()),
            storage_location: None,
            quantity: Decimal::ONE,
            ..PendingTransactionRecord::new(ModuleKind::Quality)
        }
    }

    fn ids(group: &RecordGroup) -> Vec<i64> {
        group.records.iter().filter_map(|r| r.log_id).collect()
    }

    #[test]
    fn test_key_uses_empty_for_absent_fields() {
        let key = GroupKey::of(&record(1, "M1", "B1"));
        assert_eq!(key.to_string(), "M1|B1|321|");
    }

    #[test]
    fn test_three_plus_one_split() {
        let groups = group_records(vec![
            record(1, "M1", "B1"),
            record(2, "M1", "B1"),
            record(3, "M2", "B1"),
            record(4, "M1", "B1"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(ids(&groups[0]), vec![1, 2, 4]);
        assert_eq!(ids(&groups[1]), vec![3]);
        assert_eq!(groups[0].batches(MAX_BATCH_SIZE).len(), 1);
    }

    #[test]
    fn test_membership_independent_of_input_order() {
        let forward = vec![
            record(1, "M1", "B1"),
            record(2, "M2", "B1"),
            record(3, "M1", "B1"),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let membership = |groups: Vec<RecordGroup>| {
            let mut sets: Vec<(String, Vec<i64>)> = groups
                .iter()
                .map(|g| {
                    let mut ids = ids(g);
                    ids.sort();
                    (g.key.to_string(), ids)
                })
                .collect();
            sets.sort();
            sets
        };
        assert_eq!(
            membership(group_records(forward)),
            membership(group_records(reversed))
        );
    }

    #[test]
    fn test_batches_are_ceil_n_over_size_in_order() {
        let records: Vec<_> = (1..=120).map(|i| record(i, "M1", "B1")).collect();
        let groups = group_records(records);
        let batches = groups[0].batches(MAX_BATCH_SIZE);

        let sizes: Vec<_> = batches.iter().map(|b| b.records.len()).collect();
        assert_eq!(sizes, vec![50, 50, 20]);
        assert_eq!(batches[2].index, 3);
        assert_eq!(batches[2].total, 3);
        assert_eq!(batches[1].records[0].log_id, Some(51));
        assert_eq!(batches[2].records[19].log_id, Some(120));
    }
}
