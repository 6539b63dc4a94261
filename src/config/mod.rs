use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use crate::types::request::CaseStudyRequest;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Gemini => write!(f, "gemini"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "gemini" => Ok(LLMProvider::Gemini),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 案例生成请求（讲师参数 + 学生参数）
    pub request: CaseStudyRequest,

    /// 输出路径
    pub output_path: PathBuf,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 搜索后端配置
    pub search: SearchConfig,

    /// 编排循环配置
    pub generation: GenerationConfig,

    /// 跳过启动时的模型连接检查
    pub skip_connection_check: bool,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 高能效模型，优先用于ASSESS等常规推理任务
    pub model_efficient: String,

    /// 高质量模型，优先用于章节正文综合等复杂推理任务
    pub model_powerful: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 超时时间（秒）
    pub timeout_seconds: u64,
}

/// 搜索后端配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// 搜索API KEY
    pub api_key: String,

    /// Programmable Search引擎ID
    pub engine_id: String,

    /// 搜索API地址
    pub endpoint: String,

    /// 每条查询的结果数上限
    pub results_per_query: usize,

    /// 超时时间（秒）
    pub timeout_seconds: u64,
}

/// 编排循环配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GenerationConfig {
    /// 每章节ASSESS/SEARCH轮次上限，保证循环终止
    pub max_assess_rounds: usize,

    /// 每类外部调用的重试次数
    pub retry_attempts: u32,

    /// 指数退避的初始间隔（毫秒）
    pub retry_base_delay_ms: u64,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request: CaseStudyRequest::default(),
            output_path: PathBuf::from("./casewriter.out"),
            llm: LLMConfig::default(),
            search: SearchConfig::default(),
            generation: GenerationConfig::default(),
            skip_connection_check: false,
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("CASEWRITER_LLM_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api-inference.modelscope.cn/v1"),
            model_efficient: String::from("Qwen/Qwen3-Next-80B-A3B-Instruct"),
            model_powerful: String::from("Qwen/Qwen3-235B-A22B-Instruct-2507"),
            max_tokens: 131072,
            temperature: 0.1,
            timeout_seconds: 300,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("CASEWRITER_SEARCH_API_KEY").unwrap_or_default(),
            engine_id: std::env::var("CASEWRITER_SEARCH_ENGINE_ID").unwrap_or_default(),
            endpoint: String::from("https://customsearch.googleapis.com/customsearch/v1"),
            results_per_query: 3,
            timeout_seconds: 30,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_assess_rounds: 2,
            retry_attempts: 3,
            retry_base_delay_ms: 500,
        }
    }
}
