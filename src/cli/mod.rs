use crate::config::{Config, LLMProvider};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// casewriter-rs - 由Rust与AI驱动的个性化案例文档生成引擎
#[derive(Parser, Debug)]
#[command(name = "casewriter-rs")]
#[command(
    about = "AI-based case study writing engine. It performs grounded web research, lets an LLM decide per section what facts it still needs, and assembles a personalized, citation-backed case study document."
)]
#[command(author = "Sopaco")]
#[command(version)]
pub struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 输出路径
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// 公司名称（学生输入）
    #[arg(long)]
    pub company: Option<String>,

    /// 职位名称（学生输入）
    #[arg(long)]
    pub job_title: Option<String>,

    /// 学科领域（讲师输入）
    #[arg(long)]
    pub discipline: Option<String>,

    /// 目标读者群体（讲师输入）
    #[arg(long)]
    pub target_audience: Option<String>,

    /// 案例主题（讲师输入）
    #[arg(long)]
    pub case_topic: Option<String>,

    /// 教学目标（讲师输入）
    #[arg(long)]
    pub learning_objectives: Option<String>,

    /// 面向学生的思考题（讲师输入）
    #[arg(long)]
    pub student_questions: Option<String>,

    /// 高能效模型，优先用于ASSESS等常规推理任务
    #[arg(long)]
    pub model_efficient: Option<String>,

    /// 高质量模型，优先用于章节正文综合
    #[arg(long)]
    pub model_powerful: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// LLM Provider (openai, deepseek, anthropic, gemini, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 搜索API KEY
    #[arg(long)]
    pub search_api_key: Option<String>,

    /// Programmable Search引擎ID
    #[arg(long)]
    pub search_engine_id: Option<String>,

    /// 每条查询的结果数上限
    #[arg(long)]
    pub results_per_query: Option<usize>,

    /// 每章节ASSESS/SEARCH轮次上限
    #[arg(long)]
    pub max_assess_rounds: Option<usize>,

    /// 跳过启动时的模型连接检查
    #[arg(long)]
    pub skip_connection_check: bool,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// 将CLI参数转换为配置，CLI参数优先于配置文件
    pub fn into_config(self) -> Result<Config> {
        let mut config = if let Some(config_path) = &self.config {
            // 显式指定了配置文件路径，从该路径加载
            Config::from_file(config_path)
                .context(format!("无法读取配置文件 {:?}", config_path))?
        } else {
            // 尝试从默认位置加载
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("casewriter.toml");

            if default_config_path.exists() {
                Config::from_file(&default_config_path)
                    .context(format!("无法读取默认配置文件 {:?}", default_config_path))?
            } else {
                Config::default()
            }
        };

        if let Some(output_path) = self.output_path {
            config.output_path = output_path;
        }

        // 请求字段
        if let Some(company) = self.company {
            config.request.company_name = company;
        }
        if let Some(job_title) = self.job_title {
            config.request.job_title = job_title;
        }
        if let Some(discipline) = self.discipline {
            config.request.instructor.discipline = discipline;
        }
        if let Some(target_audience) = self.target_audience {
            config.request.instructor.target_audience = target_audience;
        }
        if let Some(case_topic) = self.case_topic {
            config.request.instructor.case_topic = case_topic;
        }
        if let Some(learning_objectives) = self.learning_objectives {
            config.request.instructor.learning_objectives = learning_objectives;
        }
        if let Some(student_questions) = self.student_questions {
            config.request.instructor.student_questions = student_questions;
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!("⚠️ 警告: 未知的provider: {}，使用默认provider", provider_str);
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model_efficient) = self.model_efficient {
            config.llm.model_efficient = model_efficient;
        }
        if let Some(model_powerful) = self.model_powerful {
            config.llm.model_powerful = model_powerful;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }

        // 覆盖搜索配置
        if let Some(search_api_key) = self.search_api_key {
            config.search.api_key = search_api_key;
        }
        if let Some(search_engine_id) = self.search_engine_id {
            config.search.engine_id = search_engine_id;
        }
        if let Some(results_per_query) = self.results_per_query {
            config.search.results_per_query = results_per_query;
        }

        // 编排配置
        if let Some(max_assess_rounds) = self.max_assess_rounds {
            config.generation.max_assess_rounds = max_assess_rounds;
        }

        config.skip_connection_check = self.skip_connection_check;
        config.verbose = self.verbose;

        Ok(config)
    }
}
