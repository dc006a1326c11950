// ==========================================
// Syngo 导入引擎 - 列解析器
// ==========================================
// 职责: 表头行 → 标准字段的列位置（ColumnMap）
// 规则: 标准列按列标题精确匹配（区分大小写）
// 规则: 计费代码优先聚合列 CPTs，否则取 CPT1 起连续的 CPT* 列
// ==========================================

use crate::domain::types::Field;
use std::collections::HashMap;
use thiserror::Error;

/// 计费代码聚合列之外的首列
pub const FIRST_CODE_COLUMN: &str = "CPT1";
/// 计费代码多列的公共前缀
pub const CODE_COLUMN_PREFIX: &str = "CPT";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnResolveError {
    #[error("找不到列标题 '{0}'")]
    MissingColumn(&'static str),

    #[error("找不到列标题 '{first}' 或 '{aggregate}'")]
    MissingBillingCodes {
        first: &'static str,
        aggregate: &'static str,
    },
}

/// 单个标准字段对应的列位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSlot {
    Single(usize),
    /// 仅用于计费代码多列
    Run(Vec<usize>),
}

// ==========================================
// ColumnMap - 标准字段 → 列位置
// ==========================================
// 生命周期: 单个文件的一次解析
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    slots: HashMap<Field, ColumnSlot>,
}

impl ColumnMap {
    /// 根据表头行构建 ColumnMap
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self, ColumnResolveError> {
        let headers: Vec<&str> = headers.iter().map(|h| h.as_ref()).collect();
        let position = |label: &str| headers.iter().position(|h| *h == label);

        let mut slots = HashMap::with_capacity(Field::ALL.len());
        for field in Field::ALL {
            if field == Field::BillingCodes {
                continue;
            }
            let col = position(field.label()).ok_or(ColumnResolveError::MissingColumn(field.label()))?;
            slots.insert(field, ColumnSlot::Single(col));
        }

        let codes = match position(Field::BillingCodes.label()) {
            Some(col) => ColumnSlot::Single(col),
            None => {
                let first = position(FIRST_CODE_COLUMN).ok_or(
                    ColumnResolveError::MissingBillingCodes {
                        first: FIRST_CODE_COLUMN,
                        aggregate: Field::BillingCodes.label(),
                    },
                )?;
                let run: Vec<usize> = headers[first..]
                    .iter()
                    .take_while(|h| h.starts_with(CODE_COLUMN_PREFIX))
                    .enumerate()
                    .map(|(offset, _)| first + offset)
                    .collect();
                ColumnSlot::Run(run)
            }
        };
        slots.insert(Field::BillingCodes, codes);

        Ok(Self { slots })
    }

    /// 标准字段的列位置（resolve 保证每个字段都有）
    pub fn slot(&self, field: Field) -> Option<&ColumnSlot> {
        self.slots.get(&field)
    }

    /// 计费代码是否来自多列
    pub fn has_split_codes(&self) -> bool {
        matches!(self.slot(Field::BillingCodes), Some(ColumnSlot::Run(_)))
    }
}
