//! 生成后端边界
//!
//! 后端的响应解析契约由结构化提取承担：ASSESS返回充分性判断与补充查询，
//! WRITE返回正文与引用列表。提取失败（响应不可解析）与网络失败同属
//! 可重试的传输类错误，重试策略由编排层控制，这里的调用均为单次。

pub mod client;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::CaseWriterError;

/// ASSESS阶段的结构化产出
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssessDecision {
    /// 当前来源池是否足以支撑本章节写作
    pub sufficient: bool,

    /// 依据不足时的补充检索查询，充分时应为空
    #[serde(default)]
    pub queries: Vec<String>,
}

/// WRITE阶段的结构化产出
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SectionComposition {
    /// 章节正文（Markdown）
    pub content: String,

    /// 支撑正文事实性论断的来源url列表
    #[serde(default)]
    pub citations: Vec<String>,
}

/// 生成后端统一接口
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// 评估当前依据是否充分，不足时给出补充检索查询（ASSESS）
    async fn assess(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<AssessDecision, CaseWriterError>;

    /// 综合来源池写出章节正文并标注引用（WRITE）
    async fn compose(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<SectionComposition, CaseWriterError>;

    /// 后端模型标识，用于导出文档的免责声明
    fn model_name(&self) -> String;
}
