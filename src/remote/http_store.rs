// ==========================================
// TruckFlow 运输台账 - HTTP 远程存储
// ==========================================
// 协议: 单一入口 URL，GET 读取（?action=...），POST 写入（JSON 正文）
// 说明: POST 以 text/plain 发送，服务端读取原始正文
// 超时: 每次请求受 request_timeout 约束，超时视为传输错误
// ==========================================

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::AppConfig;
use crate::domain::{DashboardData, DateFilter, EntityCategory, EntryPayload, EntryRef};
use crate::remote::error::{RemoteError, RemoteResult};
use crate::remote::store::{
    BatchReceipt, BatchStatus, CatalogLists, CreateStatus, RemoteStatus, RemoteStore,
};

// ==========================================
// 响应结构
// ==========================================

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: RemoteStatus,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    status: RemoteStatus,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    partners: Vec<String>,
    #[serde(default)]
    locations: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsedPartnersResponse {
    status: RemoteStatus,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    used_partners: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DataResponse {
    status: RemoteStatus,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    data: DashboardData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchResponse {
    status: RemoteStatus,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    saved_count: Option<usize>,
}

// ==========================================
// HttpRemoteStore
// ==========================================
pub struct HttpRemoteStore {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpRemoteStore {
    /// 创建 HTTP 远程存储
    ///
    /// # 参数
    /// - endpoint: 接口地址
    /// - timeout: 单次请求超时
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(format!("HTTP 客户端初始化失败: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    /// 从应用配置创建
    pub fn from_config(config: &AppConfig) -> RemoteResult<Self> {
        Self::new(config.endpoint_url.clone(), config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_error(&self, err: reqwest::Error) -> RemoteError {
        if err.is_timeout() {
            RemoteError::Timeout(self.timeout)
        } else {
            RemoteError::Transport(err.to_string())
        }
    }

    async fn get<R: DeserializeOwned>(&self, query: &[(&str, String)]) -> RemoteResult<R> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_send_error(e))?;
        decode_response(status, &text)
    }

    async fn post<R: DeserializeOwned>(&self, body: &serde_json::Value) -> RemoteResult<R> {
        let payload =
            serde_json::to_string(body).map_err(|e| RemoteError::Decode(e.to_string()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(payload)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_send_error(e))?;
        decode_response(status, &text)
    }
}

/// 解析 HTTP 响应正文
///
/// 非 2xx 状态返回 HttpStatus；正文不是预期 JSON 返回 Decode。
fn decode_response<R: DeserializeOwned>(status: StatusCode, text: &str) -> RemoteResult<R> {
    if !status.is_success() {
        return Err(RemoteError::HttpStatus {
            status: status.as_u16(),
            body: text.chars().take(200).collect(),
        });
    }
    serde_json::from_str(text).map_err(|e| RemoteError::Decode(e.to_string()))
}

fn interpret_create(resp: StatusResponse) -> RemoteResult<CreateStatus> {
    match resp.status {
        RemoteStatus::Success => Ok(CreateStatus::Created),
        RemoteStatus::Exists => Ok(CreateStatus::AlreadyExists),
        _ => Err(RemoteError::logic(resp.message)),
    }
}

fn interpret_batch(resp: BatchResponse, submitted: usize) -> RemoteResult<BatchReceipt> {
    match resp.status {
        RemoteStatus::Success => Ok(BatchReceipt {
            status: BatchStatus::Success,
            saved_count: resp.saved_count.unwrap_or(submitted),
        }),
        RemoteStatus::Partial => Ok(BatchReceipt {
            status: BatchStatus::Partial,
            saved_count: resp.saved_count.unwrap_or(0),
        }),
        _ => Err(RemoteError::logic(resp.message)),
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    #[instrument(skip(self))]
    async fn get_partners_and_locations(&self) -> RemoteResult<CatalogLists> {
        let resp: CatalogResponse = self
            .get(&[("action", "getPartnersAndLocations".to_string())])
            .await?;
        resp.status.require_success(resp.message)?;
        debug!(
            partners = resp.partners.len(),
            locations = resp.locations.len(),
            "目录已加载"
        );
        Ok(CatalogLists {
            partners: resp.partners,
            locations: resp.locations,
        })
    }

    #[instrument(skip(self))]
    async fn get_used_partners_for_date(&self, date: NaiveDate) -> RemoteResult<Vec<String>> {
        let resp: UsedPartnersResponse = self
            .get(&[
                ("action", "getUsedPartnersForDate".to_string()),
                ("date", date.format("%Y-%m-%d").to_string()),
            ])
            .await?;
        resp.status.require_success(resp.message)?;
        Ok(resp.used_partners)
    }

    #[instrument(skip(self))]
    async fn get_data(&self, filter: &DateFilter) -> RemoteResult<DashboardData> {
        let mut query = vec![
            ("action", "getData".to_string()),
            ("filter", filter.as_str().to_string()),
        ];
        if let Some((start, end)) = filter.range() {
            query.push(("start", start.format("%Y-%m-%d").to_string()));
            query.push(("end", end.format("%Y-%m-%d").to_string()));
        }

        let resp: DataResponse = self.get(&query).await?;
        resp.status.require_success(resp.message)?;
        Ok(resp.data)
    }

    #[instrument(skip(self))]
    async fn create_entity(
        &self,
        category: EntityCategory,
        name: &str,
    ) -> RemoteResult<CreateStatus> {
        let resp: StatusResponse = self
            .post(&json!({ "action": category.add_action(), "name": name }))
            .await?;
        interpret_create(resp)
    }

    #[instrument(skip(self))]
    async fn delete_entity(&self, category: EntityCategory, name: &str) -> RemoteResult<()> {
        let resp: StatusResponse = self
            .post(&json!({ "action": category.delete_action(), "name": name }))
            .await?;
        resp.status.require_success(resp.message)
    }

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn add_entries(&self, entries: &[EntryPayload]) -> RemoteResult<BatchReceipt> {
        let resp: BatchResponse = self
            .post(&json!({ "action": "addEntries", "entries": entries }))
            .await?;
        interpret_batch(resp, entries.len())
    }

    #[instrument(skip(self, entry))]
    async fn update_entry(&self, entry_ref: &EntryRef, entry: &EntryPayload) -> RemoteResult<()> {
        let resp: StatusResponse = self
            .post(&json!({ "action": "updateEntry", "rowNumber": entry_ref, "entry": entry }))
            .await?;
        resp.status.require_success(resp.message)
    }

    #[instrument(skip(self))]
    async fn delete_entry(&self, entry_ref: &EntryRef) -> RemoteResult<()> {
        let resp: StatusResponse = self
            .post(&json!({ "action": "deleteEntry", "rowNumber": entry_ref }))
            .await?;
        resp.status.require_success(resp.message)
    }
}
