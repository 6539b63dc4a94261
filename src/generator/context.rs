use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::llm::GenerationBackend;
use crate::memory::Memory;
use crate::search::SearchBackend;
use crate::utils::retry::RetryPolicy;

/// Memory作用域
pub struct MemoryScope;

impl MemoryScope {
    pub const PROCESS: &'static str = "process";
    pub const DOCUMENT: &'static str = "document";
}

/// 作用域内的预定义键
pub struct ScopedKeys;

impl ScopedKeys {
    pub const SEED_QUERIES: &'static str = "seed_queries";
    pub const SEED_SOURCE_COUNT: &'static str = "seed_source_count";
    pub const FINAL_DOCUMENT: &'static str = "final_document";
}

/// 生成器上下文，单次运行独占，不跨运行共享
#[derive(Clone)]
pub struct GeneratorContext {
    /// 生成后端，用于与AI通信
    pub generation: Arc<dyn GenerationBackend>,

    /// 搜索后端
    pub search: Arc<dyn SearchBackend>,

    /// 配置
    pub config: Config,

    /// 运行过程记忆
    pub memory: Arc<RwLock<Memory>>,

    /// 协作式取消标记，仅在章节边界检查
    cancelled: Arc<AtomicBool>,
}

impl GeneratorContext {
    /// 创建新的生成器上下文
    pub fn new(
        config: Config,
        generation: Arc<dyn GenerationBackend>,
        search: Arc<dyn SearchBackend>,
    ) -> Self {
        Self {
            generation,
            search,
            config,
            memory: Arc::new(RwLock::new(Memory::new())),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 外部调用的统一重试策略
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.config.generation.retry_attempts,
            self.config.generation.retry_base_delay_ms,
        )
    }

    /// 存储数据到 Memory
    pub async fn store_to_memory<T>(&self, scope: &str, key: &str, data: T) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        let mut memory = self.memory.write().await;
        memory.store(scope, key, data)
    }

    /// 从 Memory 获取数据
    pub async fn get_from_memory<T>(&self, scope: &str, key: &str) -> Option<T>
    where
        T: for<'a> Deserialize<'a> + Send + Sync,
    {
        let memory = self.memory.read().await;
        memory.get(scope, key)
    }

    /// 请求在下一个章节边界取消运行
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
