//! LLM客户端 - 提供统一的LLM服务接口

use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::CaseWriterError;
use crate::llm::{AssessDecision, GenerationBackend, SectionComposition};

mod providers;

use providers::ProviderClient;

/// LLM客户端 - 生成后端的生产实现
#[derive(Clone)]
pub struct LLMClient {
    config: Config,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: Config) -> Result<Self> {
        let client = ProviderClient::new(&config.llm)?;
        Ok(Self { client, config })
    }

    /// 检查模型连接和功能是否正常
    pub async fn check_connection(&self) -> Result<()> {
        println!("🔄 正在检查模型连接...");
        // 使用一个简单的prompt来测试连接
        match self
            .prompt("System: You are a helpful assistant.", "Hello")
            .await
        {
            Ok(_) => {
                println!("✅ 模型连接正常");
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ 模型连接失败: {}", e);
                Err(e)
            }
        }
    }

    /// 简化的单轮对话方法
    pub async fn prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let agent = self.client.create_agent(
            &self.config.llm.model_efficient,
            system_prompt,
            &self.config.llm,
        );
        agent.prompt(user_prompt).await
    }

    /// 结构化数据提取，单次调用，重试由编排层负责
    async fn extract<T>(&self, model: &str, system_prompt: &str, user_prompt: &str) -> Result<T>
    where
        T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
    {
        let extractor = self
            .client
            .create_extractor::<T>(model, system_prompt, &self.config.llm);
        extractor.extract(user_prompt).await
    }
}

#[async_trait]
impl GenerationBackend for LLMClient {
    /// ASSESS使用高能效模型
    async fn assess(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<AssessDecision, CaseWriterError> {
        self.extract::<AssessDecision>(&self.config.llm.model_efficient, system_prompt, user_prompt)
            .await
            .map_err(|e| CaseWriterError::Transport(format!("ASSESS调用失败: {}", e)))
    }

    /// WRITE使用高质量模型
    async fn compose(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<SectionComposition, CaseWriterError> {
        self.extract::<SectionComposition>(
            &self.config.llm.model_powerful,
            system_prompt,
            user_prompt,
        )
        .await
        .map_err(|e| CaseWriterError::Transport(format!("WRITE调用失败: {}", e)))
    }

    fn model_name(&self) -> String {
        self.config.llm.model_powerful.clone()
    }
}
