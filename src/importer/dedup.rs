// ==========================================
// Syngo 导入引擎 - 重复记录处理
// ==========================================
// 业务主键: ACC（有值时）；否则 (MPI, 操作开始日期)
// 策略: 后写入者覆盖先写入者（last-write-wins）
// 输出顺序: 按幸存记录的写入序号排序；调用方不得依赖顺序
// ==========================================

use crate::domain::procedure::ProcedureRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// DedupKey - 去重主键
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DedupKey {
    Accession(i64),
    Fallback {
        patient_index: Option<i64>,
        procedure_date: Option<NaiveDate>,
    },
}

impl ProcedureRecord {
    /// 去重主键
    pub fn dedup_key(&self) -> DedupKey {
        match self.accession_number {
            Some(acc) => DedupKey::Accession(acc),
            None => DedupKey::Fallback {
                patient_index: self.patient_index,
                procedure_date: self.procedure_start.date,
            },
        }
    }
}

/// 按业务主键去重
///
/// # 参数
/// - records: 按写入顺序排列（多文件时为调用方给定的文件顺序拼接）
///
/// # 返回
/// - 每个主键仅保留最后写入的一条
pub fn deduplicate(records: Vec<ProcedureRecord>) -> Vec<ProcedureRecord> {
    let mut table: HashMap<DedupKey, (usize, ProcedureRecord)> = HashMap::with_capacity(records.len());

    for (idx, record) in records.into_iter().enumerate() {
        table.insert(record.dedup_key(), (idx, record));
    }

    let mut survivors: Vec<(usize, ProcedureRecord)> = table.into_values().collect();
    survivors.sort_by_key(|(idx, _)| *idx);
    survivors.into_iter().map(|(_, record)| record).collect()
}

/// 检测重复主键
///
/// # 返回
/// - Vec<(写入序号, 主键)>: 被后续记录覆盖的记录（不包括最后一次出现）
pub fn detect_duplicates(records: &[ProcedureRecord]) -> Vec<(usize, DedupKey)> {
    let mut last_occurrence: HashMap<DedupKey, usize> = HashMap::new();
    let mut overwritten = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        let key = record.dedup_key();
        if let Some(previous) = last_occurrence.insert(key, idx) {
            overwritten.push((previous, key));
        }
    }

    overwritten.sort_by_key(|(idx, _)| *idx);
    overwritten
}
