use std::future::Future;
use std::time::Duration;

use crate::error::CaseWriterError;

/// 有界指数退避重试策略
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 总尝试次数（含首次）
    pub attempts: u32,

    /// 首次重试前的等待间隔
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            attempts,
            base_delay: Duration::from_millis(base_delay_ms),
        }
    }

    /// 第attempt次失败后的等待间隔：base * 2^attempt
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// 通用重试逻辑，用于处理外部调用的重试机制
///
/// 只有可重试（传输类）错误会触发重试，其余错误立即传播。
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    log_tag: &str,
    operation: F,
) -> Result<T, CaseWriterError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, CaseWriterError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(err) if err.is_retryable() && attempt + 1 < policy.attempts => {
                eprintln!(
                    "❌ [{}] 调用出错，重试中 (第 {} / {} 次尝试): {}",
                    log_tag,
                    attempt + 1,
                    policy.attempts,
                    err
                );
                tokio::time::sleep(policy.backoff_delay(attempt)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
