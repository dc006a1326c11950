// ==========================================
// Syngo 导入引擎 - 原始单元格值
// ==========================================
// 用途: 文件解析 → 记录构造之间的中间值
// 生命周期: 仅在单条记录构造期间
// ==========================================

use crate::domain::types::Field;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// CodeSource - 计费代码来源
// ==========================================
// 由调用方（解析器）决定是单列还是多列
#[derive(Debug, Clone, PartialEq)]
pub enum CodeSource {
    /// 单个逗号分隔字符串（聚合列 CPTs）
    Delimited(String),
    /// 已拆分的代码序列（CPT1、CPT2 ... 多列）
    Split(Vec<String>),
}

// ==========================================
// RawValue - 未定型的单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Empty,
    Int(i64),
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Codes(CodeSource),
}

impl RawValue {
    /// 文本构造（空白 → Empty）
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            RawValue::Empty
        } else {
            RawValue::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawValue::Empty)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Empty => Ok(()),
            RawValue::Int(v) => write!(f, "{}", v),
            RawValue::Number(v) => write!(f, "{}", v),
            RawValue::Text(v) => f.write_str(v),
            RawValue::Bool(v) => write!(f, "{}", if *v { "TRUE" } else { "FALSE" }),
            RawValue::Date(v) => write!(f, "{}", v),
            RawValue::Time(v) => write!(f, "{}", v),
            RawValue::DateTime(v) => write!(f, "{}", v),
            RawValue::Codes(CodeSource::Delimited(v)) => f.write_str(v),
            RawValue::Codes(CodeSource::Split(v)) => f.write_str(&v.join(",")),
        }
    }
}

/// 标准字段 → 原始值
pub type FieldValues = HashMap<Field, RawValue>;
