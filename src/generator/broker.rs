use std::sync::Arc;

use crate::error::CaseWriterError;
use crate::generator::context::GeneratorContext;
use crate::search::SearchBackend;
use crate::types::source::{SourcePool, SourceRecord};
use crate::utils::retry::{RetryPolicy, retry_with_backoff};

/// 来源代理，向搜索后端发出查询批次，规范化并去重合入共享来源池
///
/// 传输级失败在此处按策略重试，重试耗尽后向调用方传播；所有查询都
/// 零结果不是错误。合入是幂等的：调用方在错误后重发同一批查询时，
/// 已合入的来源不会重复。
pub struct SourceBroker {
    search: Arc<dyn SearchBackend>,
    results_per_query: usize,
    retry: RetryPolicy,
}

impl SourceBroker {
    pub fn new(search: Arc<dyn SearchBackend>, results_per_query: usize, retry: RetryPolicy) -> Self {
        Self {
            search,
            results_per_query,
            retry,
        }
    }

    pub fn from_context(context: &GeneratorContext) -> Self {
        Self::new(
            context.search.clone(),
            context.config.search.results_per_query,
            context.retry_policy(),
        )
    }

    /// 执行一批查询并合入来源池，返回本次调用新增的记录
    ///
    /// 返回空集表示本批查询没有带来新信息（零结果或全部重复），
    /// 调用方据此判断收益递减。
    pub async fn search_into_pool(
        &self,
        queries: &[String],
        pool: &mut SourcePool,
    ) -> Result<Vec<SourceRecord>, CaseWriterError> {
        let mut newly_added = Vec::new();

        for query in queries {
            println!("🔍 正在检索: \"{}\"", query);

            let hits = retry_with_backoff(&self.retry, &format!("search[{}]", query), || async {
                self.search.search(query, self.results_per_query).await
            })
            .await?;

            for hit in hits {
                if let Some(record) = pool.insert(hit, query) {
                    newly_added.push(record);
                }
            }
        }

        if newly_added.is_empty() {
            println!("   ⚠️ 本批查询未发现新来源");
        } else {
            println!("   ✓ 新增 {} 条来源", newly_added.len());
        }

        Ok(newly_added)
    }
}
