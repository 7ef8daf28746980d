//! 管理端页面（需要管理员会话）

pub mod appointments;
pub mod patient_detail;
pub mod patients;
pub mod stats;
