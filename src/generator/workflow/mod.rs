use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::generator::assembler::DocumentAssembler;
use crate::generator::context::GeneratorContext;
use crate::llm::client::LLMClient;
use crate::search::google::GoogleSearchClient;

/// 启动案例生成工作流
pub async fn launch(config: &Config) -> Result<()> {
    let llm_client = LLMClient::new(config.clone())?;

    // 启动时检查模型连接
    if !config.skip_connection_check {
        llm_client.check_connection().await?;
    }

    let search_client = GoogleSearchClient::new(&config.search)?;

    let context = GeneratorContext::new(
        config.clone(),
        Arc::new(llm_client),
        Arc::new(search_client),
    );

    let document = DocumentAssembler::generate(&context).await?;
    crate::generator::outlet::save(&context, &document).await?;

    Ok(())
}
