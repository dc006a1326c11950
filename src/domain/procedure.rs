// ==========================================
// Syngo 导入引擎 - 操作记录领域模型
// ==========================================
// 用途: 一次影像操作（Syngo 导出中的一行）
// 红线: 构造后不可变；占位字符串不得进入已定型字段
// 红线: 组合时间戳存在 ⇔ 日期与时间都存在
// ==========================================

use crate::domain::raw_value::{CodeSource, FieldValues, RawValue};
use crate::domain::types::{DateMode, Field, TimestampPair};
use crate::importer::column_resolver::{ColumnMap, ColumnSlot};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::value_coercion::{
    coerce_codes, coerce_date, coerce_float, coerce_int, coerce_text, coerce_time,
    DateCoercionError,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ==========================================
// DateTimePair - 日期 + 时间配对
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateTimePair {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

impl DateTimePair {
    pub fn new(date: Option<NaiveDate>, time: Option<NaiveTime>) -> Self {
        Self { date, time }
    }

    /// 组合时间戳（两部分都存在时才有值）
    pub fn combined(&self) -> Option<NaiveDateTime> {
        match (self.date, self.time) {
            (Some(date), Some(time)) => Some(date.and_time(time)),
            _ => None,
        }
    }
}

// ==========================================
// ProcedureRecord - 影像操作记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcedureRecord {
    // ===== 标识 =====
    pub patient_index: Option<i64>,          // MPI
    pub medical_record_number: Option<i64>,  // MRN
    pub accession_number: Option<i64>,       // ACC

    // ===== 人员与科室 =====
    pub reading_radiologist_1: Option<String>, // RAD1
    pub reading_radiologist_2: Option<String>, // RAD2
    pub technologist: Option<String>,          // TECH
    pub location: Option<String>,              // LOCATION
    pub department: Option<String>,            // DEPT

    // ===== 剂量指标 =====
    pub fluoroscopy_time: Option<f64>,    // FLUORO
    pub kerma_air: Option<f64>,           // KAR
    pub kerma_area_product: Option<f64>,  // KAP
    pub image_count: Option<f64>,         // Ima
    pub dose_length_product: Option<f64>, // DLP
    pub ct_dose_index: Option<f64>,       // CTDI

    // ===== 日期时间 =====
    pub date_of_birth: Option<NaiveDate>, // DOB
    pub procedure_start: DateTimePair,    // DOS Start / DOS Time
    pub procedure_end: DateTimePair,      // End DATE / End Time
    pub report_read: DateTimePair,        // READ DATE / Read Time
    pub report_sign: DateTimePair,        // SIGN DATE / Sign Time
    pub report_add: DateTimePair,         // ADD DATE / Add Time

    // ===== 计费代码 =====
    pub billing_codes: Vec<String>, // CPTs（已标准化，不含空串）
}

/// 写出用的已定型单元格
#[derive(Debug, Clone, PartialEq)]
pub enum OutputCell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl From<Option<i64>> for OutputCell {
    fn from(v: Option<i64>) -> Self {
        v.map_or(OutputCell::Empty, OutputCell::Int)
    }
}

impl From<Option<f64>> for OutputCell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(OutputCell::Empty, OutputCell::Float)
    }
}

impl From<Option<String>> for OutputCell {
    fn from(v: Option<String>) -> Self {
        v.map_or(OutputCell::Empty, OutputCell::Text)
    }
}

impl From<Option<NaiveDate>> for OutputCell {
    fn from(v: Option<NaiveDate>) -> Self {
        v.map_or(OutputCell::Empty, OutputCell::Date)
    }
}

impl From<Option<NaiveTime>> for OutputCell {
    fn from(v: Option<NaiveTime>) -> Self {
        v.map_or(OutputCell::Empty, OutputCell::Time)
    }
}

impl From<Option<NaiveDateTime>> for OutputCell {
    fn from(v: Option<NaiveDateTime>) -> Self {
        v.map_or(OutputCell::Empty, OutputCell::DateTime)
    }
}

/// 日期/时间转换失败时按 None 处理（仅限日期时间类字段）
fn tolerate<T>(field: Field, result: Result<Option<T>, DateCoercionError>) -> Option<T> {
    result.unwrap_or_else(|reason| {
        debug!(field = %field, reason = %reason, "日期/时间无法解析，按空值处理");
        None
    })
}

impl ProcedureRecord {
    // ==========================================
    // 构造路径 1: 字段映射
    // ==========================================

    /// 从标准字段映射构造
    ///
    /// # 参数
    /// - fields: 每个标准字段都必须有值（空值用 RawValue::Empty）
    ///
    /// # 说明
    /// - 数值型日期序号按默认纪元（1900）解释
    /// - 计费代码必须是 RawValue::Codes 或 RawValue::Empty
    pub fn from_fields(fields: &FieldValues) -> ImportResult<Self> {
        Self::build(fields, DateMode::default())
    }

    // ==========================================
    // 构造路径 2: 行 + 列映射 + 纪元
    // ==========================================

    /// 从工作表一行构造
    ///
    /// # 参数
    /// - row: 整行原始值（越界列按空值处理）
    /// - columns: 该文件的 ColumnMap
    /// - date_mode: 该工作簿的纪元模式
    pub fn from_row(row: &[RawValue], columns: &ColumnMap, date_mode: DateMode) -> ImportResult<Self> {
        let cell = |idx: usize| row.get(idx).cloned().unwrap_or(RawValue::Empty);

        let mut fields = FieldValues::with_capacity(Field::ALL.len());
        for field in Field::ALL {
            let slot = columns
                .slot(field)
                .ok_or_else(|| ImportError::MissingField(field.label().to_string()))?;

            let value = match (field, slot) {
                (Field::BillingCodes, ColumnSlot::Single(idx)) => match cell(*idx) {
                    RawValue::Empty => RawValue::Empty,
                    RawValue::Codes(source) => RawValue::Codes(source),
                    other => RawValue::Codes(CodeSource::Delimited(code_text(&other))),
                },
                (Field::BillingCodes, ColumnSlot::Run(indices)) => RawValue::Codes(CodeSource::Split(
                    indices.iter().map(|idx| code_text(&cell(*idx))).collect(),
                )),
                (_, ColumnSlot::Single(idx)) => cell(*idx),
                (_, ColumnSlot::Run(_)) => {
                    return Err(ImportError::InternalError(format!(
                        "字段 {} 不允许映射到多列",
                        field
                    )))
                }
            };
            fields.insert(field, value);
        }

        Self::build(&fields, date_mode)
    }

    fn build(fields: &FieldValues, date_mode: DateMode) -> ImportResult<Self> {
        let get = |field: Field| {
            fields
                .get(&field)
                .ok_or_else(|| ImportError::MissingField(field.label().to_string()))
        };
        let int = |field: Field| get(field).and_then(|v| coerce_int(field, v));
        let float = |field: Field| get(field).and_then(|v| coerce_float(field, v));
        let text = |field: Field| get(field).map(coerce_text);
        let date = |field: Field| get(field).map(|v| tolerate(field, coerce_date(v, date_mode)));
        let pair = |pair: TimestampPair| -> ImportResult<DateTimePair> {
            let (date_field, time_field) = pair.fields();
            let time_value = get(time_field)?;
            Ok(DateTimePair::new(
                date(date_field)?,
                tolerate(time_field, coerce_time(time_value, date_mode)),
            ))
        };

        let billing_codes = match get(Field::BillingCodes)? {
            RawValue::Empty => Vec::new(),
            RawValue::Codes(source) => coerce_codes(source),
            other => {
                return Err(ImportError::TypeConversion {
                    field: Field::BillingCodes.label().to_string(),
                    value: other.to_string(),
                    expected: Field::BillingCodes.class().to_string(),
                })
            }
        };

        Ok(Self {
            patient_index: int(Field::PatientIndex)?,
            medical_record_number: int(Field::MedicalRecordNumber)?,
            accession_number: int(Field::AccessionNumber)?,

            reading_radiologist_1: text(Field::ReadingRadiologist1)?,
            reading_radiologist_2: text(Field::ReadingRadiologist2)?,
            technologist: text(Field::Technologist)?,
            location: text(Field::Location)?,
            department: text(Field::Department)?,

            fluoroscopy_time: float(Field::FluoroscopyTime)?,
            kerma_air: float(Field::KermaAir)?,
            kerma_area_product: float(Field::KermaAreaProduct)?,
            image_count: float(Field::ImageCount)?,
            dose_length_product: float(Field::DoseLengthProduct)?,
            ct_dose_index: float(Field::CtDoseIndex)?,

            date_of_birth: date(Field::DateOfBirth)?,
            procedure_start: pair(TimestampPair::ProcedureStart)?,
            procedure_end: pair(TimestampPair::ProcedureEnd)?,
            report_read: pair(TimestampPair::ReportRead)?,
            report_sign: pair(TimestampPair::ReportSign)?,
            report_add: pair(TimestampPair::ReportAdd)?,

            billing_codes,
        })
    }

    // ==========================================
    // 访问器
    // ==========================================

    pub fn pair(&self, pair: TimestampPair) -> &DateTimePair {
        match pair {
            TimestampPair::ProcedureStart => &self.procedure_start,
            TimestampPair::ProcedureEnd => &self.procedure_end,
            TimestampPair::ReportRead => &self.report_read,
            TimestampPair::ReportSign => &self.report_sign,
            TimestampPair::ReportAdd => &self.report_add,
        }
    }

    /// 操作开始时间
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.procedure_start.combined()
    }

    /// 操作结束时间
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.procedure_end.combined()
    }

    /// 计费代码（逗号连接，保持原顺序）
    pub fn billing_codes_joined(&self) -> String {
        self.billing_codes.join(",")
    }

    /// 计费代码（排序后逗号连接，用于按代码组合归类）
    pub fn billing_codes_sorted(&self) -> String {
        let mut codes: Vec<&str> = self.billing_codes.iter().map(String::as_str).collect();
        codes.sort_unstable();
        codes.join(",")
    }

    /// 单个标准字段的写出值
    pub fn cell(&self, field: Field) -> OutputCell {
        match field {
            Field::PatientIndex => self.patient_index.into(),
            Field::MedicalRecordNumber => self.medical_record_number.into(),
            Field::AccessionNumber => self.accession_number.into(),
            Field::ReadingRadiologist1 => self.reading_radiologist_1.clone().into(),
            Field::ReadingRadiologist2 => self.reading_radiologist_2.clone().into(),
            Field::Technologist => self.technologist.clone().into(),
            Field::Location => self.location.clone().into(),
            Field::Department => self.department.clone().into(),
            Field::FluoroscopyTime => self.fluoroscopy_time.into(),
            Field::KermaAir => self.kerma_air.into(),
            Field::KermaAreaProduct => self.kerma_area_product.into(),
            Field::ImageCount => self.image_count.into(),
            Field::DoseLengthProduct => self.dose_length_product.into(),
            Field::CtDoseIndex => self.ct_dose_index.into(),
            Field::DateOfBirth => self.date_of_birth.into(),
            Field::ProcedureStartDate => self.procedure_start.date.into(),
            Field::ProcedureStartTime => self.procedure_start.time.into(),
            Field::ProcedureEndDate => self.procedure_end.date.into(),
            Field::ProcedureEndTime => self.procedure_end.time.into(),
            Field::ReportReadDate => self.report_read.date.into(),
            Field::ReportReadTime => self.report_read.time.into(),
            Field::ReportSignDate => self.report_sign.date.into(),
            Field::ReportSignTime => self.report_sign.time.into(),
            Field::ReportAddDate => self.report_add.date.into(),
            Field::ReportAddTime => self.report_add.time.into(),
            Field::BillingCodes if self.billing_codes.is_empty() => OutputCell::Empty,
            Field::BillingCodes => OutputCell::Text(self.billing_codes_joined()),
        }
    }

    /// 标准表头（可选追加组合时间戳列）
    pub fn heading_list(include_timestamps: bool) -> Vec<&'static str> {
        let mut headings: Vec<&'static str> = Field::ALL.iter().map(|f| f.label()).collect();
        if include_timestamps {
            headings.extend(TimestampPair::ALL.iter().map(|p| p.combined_label()));
        }
        headings
    }

    /// 一行写出值，与 heading_list 顺序一致
    pub fn data_list(&self, include_timestamps: bool) -> Vec<OutputCell> {
        let mut cells: Vec<OutputCell> = Field::ALL.iter().map(|f| self.cell(*f)).collect();
        if include_timestamps {
            cells.extend(TimestampPair::ALL.iter().map(|p| self.pair(*p).combined().into()));
        }
        cells
    }
}

/// 计费代码单元格 → 文本（数值不带 .0）
fn code_text(value: &RawValue) -> String {
    coerce_text(value).unwrap_or_default()
}
