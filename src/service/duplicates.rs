use crate::models::{RecordColumns, Table};
use indexmap::IndexMap;

/// 重复检测键 (invoice_number, part_number), 空值同样参与比较
pub type DuplicateKey = (Option<String>, Option<String>);

/// 标记所有重复组成员 (组内全部行, 而非仅后出现的行)
pub fn flag_duplicates(table: &Table, columns: &RecordColumns) -> Vec<bool> {
    let keys: Vec<DuplicateKey> = table
        .rows
        .iter()
        .map(|cells| columns.duplicate_key(cells))
        .collect();

    let mut counts: IndexMap<&DuplicateKey, usize> = IndexMap::with_capacity(keys.len());
    for key in &keys {
        *counts.entry(key).or_insert(0) += 1;
    }

    keys.iter()
        .map(|key| counts.get(key).is_some_and(|&n| n >= 2))
        .collect()
}
