// ==========================================
// Syngo 导入引擎 - 领域类型定义
// ==========================================
// 职责: 标准字段、字段类别、日期纪元模式
// 红线: 标准列名区分大小写，与 Syngo 导出原样一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 日期纪元模式 (Date Mode)
// ==========================================
// 每个工作簿一个，打开后不再变化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateMode {
    /// 1900 纪元（序号 1 = 1900-01-01，含虚构的 1900-02-29）
    #[default]
    Windows1900,
    /// 1904 纪元（序号 0 = 1904-01-01）
    Mac1904,
}

impl DateMode {
    /// 从配置值解析（"1900" / "1904"）
    pub fn from_config_value(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "1900" | "WINDOWS1900" | "WINDOWS_1900" | "0" => Some(DateMode::Windows1900),
            "1904" | "MAC1904" | "MAC_1904" | "1" => Some(DateMode::Mac1904),
            _ => None,
        }
    }
}

impl fmt::Display for DateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateMode::Windows1900 => write!(f, "1900"),
            DateMode::Mac1904 => write!(f, "1904"),
        }
    }
}

// ==========================================
// 字段类别 (Field Class)
// ==========================================
// 决定每个标准字段走哪条类型转换路径
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    Integer,
    Float,
    Text,
    Date,
    Time,
    BillingCodes,
}

impl fmt::Display for FieldClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldClass::Integer => write!(f, "整数"),
            FieldClass::Float => write!(f, "浮点数"),
            FieldClass::Text => write!(f, "文本"),
            FieldClass::Date => write!(f, "日期"),
            FieldClass::Time => write!(f, "时间"),
            FieldClass::BillingCodes => write!(f, "计费代码列表"),
        }
    }
}

// ==========================================
// 标准字段 (Canonical Field)
// ==========================================
// 顺序 = 写出时的标准表头顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    PatientIndex,
    MedicalRecordNumber,
    ReadingRadiologist1,
    ReadingRadiologist2,
    AccessionNumber,
    DateOfBirth,
    ProcedureStartDate,
    ProcedureStartTime,
    ProcedureEndDate,
    ProcedureEndTime,
    ReportReadDate,
    ReportReadTime,
    ReportSignDate,
    ReportSignTime,
    ReportAddDate,
    ReportAddTime,
    Technologist,
    Location,
    Department,
    FluoroscopyTime,
    KermaAir,
    KermaAreaProduct,
    ImageCount,
    DoseLengthProduct,
    CtDoseIndex,
    BillingCodes,
}

impl Field {
    /// 全部标准字段（标准表头顺序）
    pub const ALL: [Field; 26] = [
        Field::PatientIndex,
        Field::MedicalRecordNumber,
        Field::ReadingRadiologist1,
        Field::ReadingRadiologist2,
        Field::AccessionNumber,
        Field::DateOfBirth,
        Field::ProcedureStartDate,
        Field::ProcedureStartTime,
        Field::ProcedureEndDate,
        Field::ProcedureEndTime,
        Field::ReportReadDate,
        Field::ReportReadTime,
        Field::ReportSignDate,
        Field::ReportSignTime,
        Field::ReportAddDate,
        Field::ReportAddTime,
        Field::Technologist,
        Field::Location,
        Field::Department,
        Field::FluoroscopyTime,
        Field::KermaAir,
        Field::KermaAreaProduct,
        Field::ImageCount,
        Field::DoseLengthProduct,
        Field::CtDoseIndex,
        Field::BillingCodes,
    ];

    /// Syngo 导出中的列标题
    pub fn label(self) -> &'static str {
        match self {
            Field::PatientIndex => "MPI",
            Field::MedicalRecordNumber => "MRN",
            Field::ReadingRadiologist1 => "RAD1",
            Field::ReadingRadiologist2 => "RAD2",
            Field::AccessionNumber => "ACC",
            Field::DateOfBirth => "DOB",
            Field::ProcedureStartDate => "DOS Start",
            Field::ProcedureStartTime => "DOS Time",
            Field::ProcedureEndDate => "End DATE",
            Field::ProcedureEndTime => "End Time",
            Field::ReportReadDate => "READ DATE",
            Field::ReportReadTime => "Read Time",
            Field::ReportSignDate => "SIGN DATE",
            Field::ReportSignTime => "Sign Time",
            Field::ReportAddDate => "ADD DATE",
            Field::ReportAddTime => "Add Time",
            Field::Technologist => "TECH",
            Field::Location => "LOCATION",
            Field::Department => "DEPT",
            Field::FluoroscopyTime => "FLUORO",
            Field::KermaAir => "KAR",
            Field::KermaAreaProduct => "KAP",
            Field::ImageCount => "Ima",
            Field::DoseLengthProduct => "DLP",
            Field::CtDoseIndex => "CTDI",
            Field::BillingCodes => "CPTs",
        }
    }

    /// 按列标题精确查找（区分大小写）
    pub fn from_label(label: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.label() == label)
    }

    pub fn class(self) -> FieldClass {
        match self {
            Field::PatientIndex | Field::MedicalRecordNumber | Field::AccessionNumber => {
                FieldClass::Integer
            }
            Field::ReadingRadiologist1
            | Field::ReadingRadiologist2
            | Field::Technologist
            | Field::Location
            | Field::Department => FieldClass::Text,
            Field::FluoroscopyTime
            | Field::KermaAir
            | Field::KermaAreaProduct
            | Field::ImageCount
            | Field::DoseLengthProduct
            | Field::CtDoseIndex => FieldClass::Float,
            Field::DateOfBirth
            | Field::ProcedureStartDate
            | Field::ProcedureEndDate
            | Field::ReportReadDate
            | Field::ReportSignDate
            | Field::ReportAddDate => FieldClass::Date,
            Field::ProcedureStartTime
            | Field::ProcedureEndTime
            | Field::ReportReadTime
            | Field::ReportSignTime
            | Field::ReportAddTime => FieldClass::Time,
            Field::BillingCodes => FieldClass::BillingCodes,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ==========================================
// 日期+时间配对 (Timestamp Pair)
// ==========================================
// 五组配对字段，组合时间戳列标题取时间列标题的首个单词
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampPair {
    ProcedureStart,
    ProcedureEnd,
    ReportRead,
    ReportSign,
    ReportAdd,
}

impl TimestampPair {
    pub const ALL: [TimestampPair; 5] = [
        TimestampPair::ProcedureStart,
        TimestampPair::ProcedureEnd,
        TimestampPair::ReportRead,
        TimestampPair::ReportSign,
        TimestampPair::ReportAdd,
    ];

    /// (日期字段, 时间字段)
    pub fn fields(self) -> (Field, Field) {
        match self {
            TimestampPair::ProcedureStart => (Field::ProcedureStartDate, Field::ProcedureStartTime),
            TimestampPair::ProcedureEnd => (Field::ProcedureEndDate, Field::ProcedureEndTime),
            TimestampPair::ReportRead => (Field::ReportReadDate, Field::ReportReadTime),
            TimestampPair::ReportSign => (Field::ReportSignDate, Field::ReportSignTime),
            TimestampPair::ReportAdd => (Field::ReportAddDate, Field::ReportAddTime),
        }
    }

    /// 组合时间戳列标题
    pub fn combined_label(self) -> &'static str {
        match self {
            TimestampPair::ProcedureStart => "DOS",
            TimestampPair::ProcedureEnd => "End",
            TimestampPair::ReportRead => "Read",
            TimestampPair::ReportSign => "Sign",
            TimestampPair::ReportAdd => "Add",
        }
    }
}
