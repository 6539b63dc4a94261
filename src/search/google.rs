use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SearchConfig;
use crate::error::CaseWriterError;
use crate::search::SearchBackend;
use crate::types::source::SearchHit;

/// Google Programmable Search客户端
#[derive(Clone, Debug)]
pub struct GoogleSearchClient {
    http: reqwest::Client,
    api_key: String,
    engine_id: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleSearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self, CaseWriterError> {
        if config.api_key.trim().is_empty() || config.engine_id.trim().is_empty() {
            return Err(CaseWriterError::Configuration(
                "搜索后端缺少 api_key 或 engine_id".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CaseWriterError::Configuration(format!("无法构建HTTP客户端: {}", e)))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            engine_id: config.engine_id.clone(),
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl SearchBackend for GoogleSearchClient {
    async fn search(&self, query: &str, cap: usize) -> Result<Vec<SearchHit>, CaseWriterError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.clone()),
                ("cx", self.engine_id.clone()),
                ("q", query.to_string()),
                ("num", cap.to_string()),
            ])
            .send()
            .await
            .map_err(|e| CaseWriterError::Transport(format!("搜索请求失败: {}", e)))?;

        if !response.status().is_success() {
            return Err(CaseWriterError::Transport(format!(
                "搜索后端返回异常状态: {}",
                response.status()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| CaseWriterError::Transport(format!("搜索响应解析失败: {}", e)))?;

        // items缺省即零结果，合法
        Ok(body
            .items
            .into_iter()
            .take(cap)
            .map(|item| SearchHit {
                url: item.link,
                title: item.title,
                snippet: item.snippet,
            })
            .collect())
    }
}
