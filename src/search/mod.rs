//! 搜索后端边界
//!
//! 零结果是合法响应而非错误；只有传输级失败（网络、状态码、响应不可解析）
//! 才以可重试的传输错误向调用方传播。

pub mod google;

use async_trait::async_trait;

use crate::error::CaseWriterError;
use crate::types::source::SearchHit;

/// 搜索后端统一接口
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// 执行单条查询，返回不超过cap条的命中结果
    async fn search(&self, query: &str, cap: usize) -> Result<Vec<SearchHit>, CaseWriterError>;
}
