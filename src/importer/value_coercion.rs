// ==========================================
// Syngo 导入引擎 - 单元格值类型转换
// ==========================================
// 职责: 原始值 → 整数/浮点/文本/日期/时间/计费代码列表
// 职责: Excel 日期序号 ↔ 日历日期（1900 / 1904 纪元）
// 红线: 整数/浮点转换失败必须报错；日期/时间失败返回可区分的错误，
//       是否容忍由调用方决定
// ==========================================

use crate::domain::raw_value::{CodeSource, RawValue};
use crate::domain::types::{DateMode, Field, FieldClass};
use crate::importer::error::{ImportError, ImportResult};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;

const SECONDS_PER_DAY: u32 = 86_400;

/// 1900 纪元下不可表示的最小天数（>= 10000-01-01）
const XLDAYS_TOO_LARGE_1900: i64 = 2_958_466;
/// 1904 纪元相对 1900 纪元少 1462 天
const XLDAYS_TOO_LARGE_1904: i64 = XLDAYS_TOO_LARGE_1900 - 1_462;

/// 1900 纪元下序号 < 61 的日期有歧义（虚构的 1900-02-29）
const AMBIGUOUS_1900_LIMIT: i64 = 61;

// ==========================================
// DateCoercionError - 日期/时间转换失败原因
// ==========================================
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DateCoercionError {
    #[error("日期序号为负数: {0}")]
    Negative(f64),

    #[error("1900 纪元下日期序号 {0} 有歧义（早于 1900-03-01）")]
    Ambiguous(f64),

    #[error("日期序号超出可表示范围: {0}")]
    TooLarge(f64),

    #[error("日期序号 {0} 只包含时间部分")]
    NoDatePart(f64),

    #[error("不支持的日期/时间编码: {0}")]
    Unsupported(String),
}

/// 日期序号拆分结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialParts {
    /// 序号整数部分为 0 时没有日期部分
    pub date: Option<NaiveDate>,
    pub time: NaiveTime,
}

fn epoch(mode: DateMode) -> NaiveDate {
    match mode {
        DateMode::Windows1900 => NaiveDate::from_ymd_opt(1899, 12, 30),
        DateMode::Mac1904 => NaiveDate::from_ymd_opt(1904, 1, 1),
    }
    .unwrap_or(NaiveDate::MIN)
}

fn too_large_limit(mode: DateMode) -> i64 {
    match mode {
        DateMode::Windows1900 => XLDAYS_TOO_LARGE_1900,
        DateMode::Mac1904 => XLDAYS_TOO_LARGE_1904,
    }
}

/// 将 Excel 日期序号拆分为日期与时间
///
/// # 规则
/// - 0 → 仅时间 00:00:00
/// - 负数 → Negative
/// - 小数部分四舍五入到秒，满 86400 秒进位到下一天
/// - 1900 纪元下 1..=60 → Ambiguous
pub fn serial_to_parts(serial: f64, mode: DateMode) -> Result<SerialParts, DateCoercionError> {
    if !serial.is_finite() {
        return Err(DateCoercionError::Unsupported(serial.to_string()));
    }
    if serial < 0.0 {
        return Err(DateCoercionError::Negative(serial));
    }

    let limit = too_large_limit(mode);
    let whole = serial.trunc();
    if whole >= limit as f64 {
        return Err(DateCoercionError::TooLarge(serial));
    }

    let mut days = whole as i64;
    let mut seconds = ((serial - whole) * SECONDS_PER_DAY as f64).round() as u32;
    if seconds >= SECONDS_PER_DAY {
        seconds = 0;
        days += 1;
    }
    if days >= limit {
        return Err(DateCoercionError::TooLarge(serial));
    }

    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
        .ok_or(DateCoercionError::Unsupported(serial.to_string()))?;

    if days == 0 {
        return Ok(SerialParts { date: None, time });
    }
    if mode == DateMode::Windows1900 && days < AMBIGUOUS_1900_LIMIT {
        return Err(DateCoercionError::Ambiguous(serial));
    }

    let date = epoch(mode)
        .checked_add_days(Days::new(days as u64))
        .ok_or(DateCoercionError::TooLarge(serial))?;

    Ok(SerialParts {
        date: Some(date),
        time,
    })
}

/// 日历日期 → 日期序号
pub fn date_to_serial(date: NaiveDate, mode: DateMode) -> f64 {
    date.signed_duration_since(epoch(mode)).num_days() as f64
}

/// 时刻 → 一天内的小数
pub fn time_to_fraction(time: NaiveTime) -> f64 {
    time.num_seconds_from_midnight() as f64 / SECONDS_PER_DAY as f64
}

/// 日期时间 → 日期序号（含小数部分）
pub fn datetime_to_serial(datetime: NaiveDateTime, mode: DateMode) -> f64 {
    date_to_serial(datetime.date(), mode) + time_to_fraction(datetime.time())
}

fn conversion_error(field: Field, value: &RawValue, expected: FieldClass) -> ImportError {
    ImportError::TypeConversion {
        field: field.label().to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

/// 数值渲染（整数值不带 .0）
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// ==========================================
// 标量字段
// ==========================================

/// 整数字段（空 → None，非数字 → 错误）
pub fn coerce_int(field: Field, value: &RawValue) -> ImportResult<Option<i64>> {
    match value {
        RawValue::Empty => Ok(None),
        RawValue::Int(v) => Ok(Some(*v)),
        RawValue::Number(v) if v.is_finite() && v.abs() < i64::MAX as f64 => {
            Ok(Some(v.trunc() as i64))
        }
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<i64>()
                .map(Some)
                .map_err(|_| conversion_error(field, value, FieldClass::Integer))
        }
        _ => Err(conversion_error(field, value, FieldClass::Integer)),
    }
}

/// 浮点字段（空 → None，非数字 → 错误）
pub fn coerce_float(field: Field, value: &RawValue) -> ImportResult<Option<f64>> {
    match value {
        RawValue::Empty => Ok(None),
        RawValue::Int(v) => Ok(Some(*v as f64)),
        RawValue::Number(v) => Ok(Some(*v)),
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| conversion_error(field, value, FieldClass::Float))
        }
        _ => Err(conversion_error(field, value, FieldClass::Float)),
    }
}

/// 文本字段（空或纯空白 → None，其余原样）
pub fn coerce_text(value: &RawValue) -> Option<String> {
    match value {
        RawValue::Empty => None,
        RawValue::Text(s) if s.trim().is_empty() => None,
        RawValue::Text(s) => Some(s.clone()),
        RawValue::Number(v) => Some(format_number(*v)),
        other => Some(other.to_string()),
    }
}

// ==========================================
// 日期 / 时间字段
// ==========================================

const HUMAN_DATE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%Y%m%d"];
const HUMAN_DATETIME_FORMATS: [&str; 3] =
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M:%S"];

fn parse_human_date(value: &str) -> Option<NaiveDate> {
    HUMAN_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            HUMAN_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// 日期字段
///
/// # 返回
/// - Ok(None): 空值
/// - Err: 无法表示的序号或不支持的编码（调用方决定是否容忍）
pub fn coerce_date(value: &RawValue, mode: DateMode) -> Result<Option<NaiveDate>, DateCoercionError> {
    match value {
        RawValue::Empty => Ok(None),
        RawValue::Date(d) => Ok(Some(*d)),
        RawValue::DateTime(dt) => Ok(Some(dt.date())),
        RawValue::Int(v) => date_from_serial(*v as f64, mode),
        RawValue::Number(v) => date_from_serial(*v, mode),
        RawValue::Text(s) if s.trim().is_empty() => Ok(None),
        RawValue::Text(s) => parse_human_date(s.trim())
            .map(Some)
            .ok_or_else(|| DateCoercionError::Unsupported(s.clone())),
        other => Err(DateCoercionError::Unsupported(other.to_string())),
    }
}

fn date_from_serial(serial: f64, mode: DateMode) -> Result<Option<NaiveDate>, DateCoercionError> {
    serial_to_parts(serial, mode)?
        .date
        .map(Some)
        .ok_or(DateCoercionError::NoDatePart(serial))
}

/// 时间字段（数值取一天内的小数部分；文本不支持）
pub fn coerce_time(value: &RawValue, mode: DateMode) -> Result<Option<NaiveTime>, DateCoercionError> {
    match value {
        RawValue::Empty => Ok(None),
        RawValue::Time(t) => Ok(Some(*t)),
        RawValue::DateTime(dt) => Ok(Some(dt.time())),
        RawValue::Int(v) => Ok(Some(serial_to_parts(*v as f64, mode)?.time)),
        RawValue::Number(v) => Ok(Some(serial_to_parts(*v, mode)?.time)),
        other => Err(DateCoercionError::Unsupported(other.to_string())),
    }
}

// ==========================================
// 计费代码
// ==========================================

/// 标准化单个计费代码（幂等）
///
/// TRIM → 去掉纯数字代码的 ".0" 后缀 → UPPER
pub fn normalize_code(code: &str) -> String {
    let trimmed = code.trim();
    let stripped = match trimmed.strip_suffix(".0") {
        Some(head) if !head.is_empty() && head.bytes().all(|b| b.is_ascii_digit()) => head,
        _ => trimmed,
    };
    stripped.to_uppercase()
}

/// 计费代码列表（丢弃空段，逐个标准化）
pub fn coerce_codes(source: &CodeSource) -> Vec<String> {
    let segments: Vec<&str> = match source {
        CodeSource::Delimited(s) => s.split(',').collect(),
        CodeSource::Split(codes) => codes.iter().map(String::as_str).collect(),
    };

    segments
        .into_iter()
        .filter(|c| !c.is_empty())
        .map(normalize_code)
        .filter(|c| !c.is_empty())
        .collect()
}
