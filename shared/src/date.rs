//! 时间类型模块
//!
//! - `Timestamp`: 可序列化的毫秒时间戳，用于本地存储中的更新时间
//! - `AppointmentSlot`: 预约表单中 `fecha` + `hora` 的校验与解析

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =========================================================
// Timestamp - 可传输的时间戳类型
// =========================================================

/// 毫秒时间戳
///
/// 内部存储为 `i64`，表示自 Unix 纪元以来的毫秒数
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    #[inline]
    pub const fn new(ms: i64) -> Self {
        Self(ms)
    }

    /// 当前时间
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }
}

// =========================================================
// AppointmentSlot - 预约时间段
// =========================================================

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// 表单校验失败的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    InvalidDate,
    InvalidTime,
    InPast,
}

impl fmt::Display for SlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotError::InvalidDate => write!(f, "Fecha inválida (formato AAAA-MM-DD)"),
            SlotError::InvalidTime => write!(f, "Hora inválida (formato HH:MM)"),
            SlotError::InPast => write!(f, "La cita debe ser en una fecha futura"),
        }
    }
}

impl std::error::Error for SlotError {}

/// 预约的日期与时间
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AppointmentSlot(NaiveDateTime);

impl AppointmentSlot {
    /// 解析 `fecha`（`YYYY-MM-DD`）与 `hora`（`HH:MM`）
    ///
    /// `<input type="time">` 在部分浏览器里会带秒，这里一并接受。
    pub fn parse(fecha: &str, hora: &str) -> Result<Self, SlotError> {
        let date = NaiveDate::parse_from_str(fecha.trim(), DATE_FORMAT)
            .map_err(|_| SlotError::InvalidDate)?;
        let hora = hora.trim();
        let time = NaiveTime::parse_from_str(hora, TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(hora, "%H:%M:%S"))
            .map_err(|_| SlotError::InvalidTime)?;
        Ok(Self(date.and_time(time)))
    }

    /// 解析并要求晚于 `now`
    pub fn parse_future(fecha: &str, hora: &str, now: NaiveDateTime) -> Result<Self, SlotError> {
        let slot = Self::parse(fecha, hora)?;
        if slot.0 <= now {
            return Err(SlotError::InPast);
        }
        Ok(slot)
    }

    pub fn fecha(&self) -> String {
        self.0.format(DATE_FORMAT).to_string()
    }

    pub fn hora(&self) -> String {
        self.0.format(TIME_FORMAT).to_string()
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }
}
