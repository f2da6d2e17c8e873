//! 上报批处理：把一个参数的全部采样组装成一个请求体并 POST 到采集接口。
//!
//! 不做去重：同样的数据上报两次就是两次独立请求，由接收端决定如何处理重复。

use api_contract::{CollectPayload, MeasurementDto};
use async_trait::async_trait;
use domain::{Parameter, Reading, SessionToken, TimestampFormat};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

/// 上报错误（参数级，不重试，不影响其他参数）。
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("delivery failed: status {status}, body {body}")]
    Delivery { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
}

/// 上报结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub status: u16,
    pub sent: usize,
}

/// 上报参数。
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    pub collect_url: String,
    /// 唯一视为成功的状态码。
    pub success_status: u16,
    pub timestamp_format: TimestampFormat,
}

/// 上报器抽象。调用方保证 `readings` 非空。
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(
        &self,
        readings: &[Reading],
        parameter: &Parameter,
        token: &SessionToken,
    ) -> Result<UploadResult, UploadError>;
}

/// 组装采集请求体；`measurement` 字段与 `name` 相同。
pub fn build_payload(
    readings: &[Reading],
    parameter: &Parameter,
    format: TimestampFormat,
) -> CollectPayload {
    let destination = &parameter.destination;
    CollectPayload {
        measurements: readings
            .iter()
            .map(|reading| MeasurementDto {
                value: reading.value,
                timestamp: format.format(&reading.timestamp),
            })
            .collect(),
        name: parameter.name.clone(),
        host_device: destination.host_device,
        device: destination.device,
        log: destination.log,
        point: destination.point.clone(),
        id_equipment: destination.id_equipment,
        id_parameter: parameter.id_parameter,
        measurement: parameter.name.clone(),
    }
}

/// 基于 HTTP 的上报实现。
pub struct HttpUploader {
    client: reqwest::Client,
    config: UploaderConfig,
}

impl HttpUploader {
    pub fn new(client: reqwest::Client, config: UploaderConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(
        &self,
        readings: &[Reading],
        parameter: &Parameter,
        token: &SessionToken,
    ) -> Result<UploadResult, UploadError> {
        let payload = build_payload(readings, parameter, self.config.timestamp_format);
        debug!(
            id_parameter = parameter.id_parameter,
            records = payload.measurements.len(),
            "posting payload"
        );
        let response = self
            .client
            .post(&self.config.collect_url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", token.as_str()))
            .json(&payload)
            .send()
            .await
            .map_err(|err| UploadError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        if status != self.config.success_status {
            let body = response
                .text()
                .await
                .unwrap_or_else(|err| format!("<unreadable body: {err}>"));
            return Err(UploadError::Delivery { status, body });
        }
        Ok(UploadResult {
            status,
            sent: payload.measurements.len(),
        })
    }
}
