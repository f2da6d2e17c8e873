//! 登录与采集接口的稳定 DTO 契约。

use serde::{Deserialize, Serialize, Serializer};

/// 登录请求体。
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 登录响应体：token 位于 `data` 字段。
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub data: Option<String>,
}

/// 单条上报值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementDto {
    pub value: f64,
    pub timestamp: String,
}

/// 采集接口请求体（每个参数一次）。
///
/// 字段命名混用 camelCase 与 snake_case，与接收端保持一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectPayload {
    pub measurements: Vec<MeasurementDto>,
    pub name: String,
    #[serde(rename = "hostDevice")]
    pub host_device: i64,
    pub device: i64,
    /// 整数值按整数上报（`12` 而非 `12.0`）。
    #[serde(serialize_with = "serialize_log")]
    pub log: f64,
    pub point: String,
    pub id_equipment: i64,
    pub id_parameter: i64,
    /// 与 `name` 相同。
    pub measurement: String,
}

fn serialize_log<S: Serializer>(log: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let log = *log;
    if log.fract() == 0.0 && log.abs() < i64::MAX as f64 {
        serializer.serialize_i64(log as i64)
    } else {
        serializer.serialize_f64(log)
    }
}
