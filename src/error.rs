use thiserror::Error;

/// 案例生成核心错误分类
///
/// 传播策略：传输类错误在发生处通过有界退避重试消化，重试耗尽后升级为
/// 章节级失败；章节级失败被装配器收容为占位章节；只有全部章节失败或
/// 初始调研阶段不可恢复时才向上传播运行级失败。
#[derive(Debug, Error)]
pub enum CaseWriterError {
    /// 配置错误，请求或人设必填字段缺失，在任何外部调用发起之前失败
    #[error("配置错误: {0}")]
    Configuration(String),

    /// 传输类错误，搜索或生成后端的调用失败（限流、网络、响应不可解析），可重试
    #[error("传输错误: {0}")]
    Transport(String),

    /// 章节级失败，单个章节重试耗尽，由装配器记录占位章节后继续
    #[error("章节 [{section}] 生成失败: {reason}")]
    SectionFailure { section: String, reason: String },

    /// 运行级失败，全部章节失败，或初始调研阶段重试耗尽
    #[error("运行失败: {0}")]
    RunFailure(String),
}

impl CaseWriterError {
    /// 传输类错误允许在发生处重试，其余类别直接向上传播
    pub fn is_retryable(&self) -> bool {
        matches!(self, CaseWriterError::Transport(_))
    }
}
