use std::collections::HashSet;

use chrono::Utc;

use crate::error::CaseWriterError;
use crate::generator::broker::SourceBroker;
use crate::generator::context::{GeneratorContext, MemoryScope, ScopedKeys};
use crate::generator::persona::PersonaContext;
use crate::generator::writer::SectionWriter;
use crate::types::document::CaseStudyDocument;
use crate::types::section::{SectionDraft, default_sections};
use crate::types::source::{SourcePool, SourceRecord};

/// 文档装配器，驱动整个生成运行
///
/// 流程：校验请求、构建人设、初始调研播种来源池、按序号逐章节写作、
/// 合并参考文献并构建最终文档。单个章节失败降级为占位章节，全部章节
/// 失败才升级为运行级失败。
pub struct DocumentAssembler;

impl DocumentAssembler {
    pub async fn generate(context: &GeneratorContext) -> Result<CaseStudyDocument, CaseWriterError> {
        let request = &context.config.request;
        request.validate()?;
        let persona = PersonaContext::from_request(request)?;

        let broker = SourceBroker::from_context(context);
        let mut pool = SourcePool::new();

        println!("🔄 初始调研: 为来源池播种...");
        let seed_queries = request.seed_queries();
        if context.config.verbose {
            for query in &seed_queries {
                println!("   - {}", query);
            }
        }
        broker
            .search_into_pool(&seed_queries, &mut pool)
            .await
            .map_err(|err| CaseWriterError::RunFailure(format!("初始调研失败: {}", err)))?;
        println!("✅ 初始调研完成，来源池共 {} 条来源", pool.len());

        // 过程记录失败不影响生成本身
        if let Err(err) = context
            .store_to_memory(MemoryScope::PROCESS, ScopedKeys::SEED_QUERIES, &seed_queries)
            .await
        {
            eprintln!("⚠️ 记录初始查询失败: {}", err);
        }
        if let Err(err) = context
            .store_to_memory(MemoryScope::PROCESS, ScopedKeys::SEED_SOURCE_COUNT, pool.len())
            .await
        {
            eprintln!("⚠️ 记录初始来源数失败: {}", err);
        }

        let writer = SectionWriter::new(
            context.generation.clone(),
            persona,
            context.retry_policy(),
            context.config.generation.max_assess_rounds,
            request,
        );

        let template = default_sections();
        let total = template.len();
        let mut sections: Vec<SectionDraft> = Vec::with_capacity(total);
        let mut preceding = String::new();
        let mut degraded = false;

        for spec in &template {
            if context.is_cancelled() {
                return Err(CaseWriterError::RunFailure("运行已在章节边界被取消".to_string()));
            }

            println!("🔄 [{}/{}] 章节: {}", spec.ordinal + 1, total, spec.name);
            match writer.write_section(spec, &broker, &mut pool, &preceding).await {
                Ok(draft) => {
                    if !preceding.is_empty() {
                        preceding.push_str("\n\n");
                    }
                    preceding.push_str(&format!("## {}\n{}", draft.name, draft.content));
                    sections.push(draft);
                }
                Err(err) => {
                    eprintln!("❌ 章节 {} 生成失败: {}", spec.name, err);
                    degraded = true;
                    sections.push(SectionDraft::failed(spec, &err.to_string()));
                }
            }
        }

        if sections.iter().all(|draft| draft.is_failed()) {
            return Err(CaseWriterError::RunFailure("全部章节生成失败".to_string()));
        }

        let bibliography = Self::consolidate_bibliography(&sections, &pool);

        let document = CaseStudyDocument {
            company_name: request.company_name.clone(),
            job_title: request.job_title.clone(),
            case_topic: request.instructor.case_topic.clone(),
            model_name: context.generation.model_name(),
            sections,
            bibliography,
            degraded,
            generated_at: Utc::now(),
        };

        if let Err(err) = context
            .store_to_memory(MemoryScope::DOCUMENT, ScopedKeys::FINAL_DOCUMENT, &document)
            .await
        {
            eprintln!("⚠️ 记录最终文档失败: {}", err);
        }

        if degraded {
            println!("⚠️ 降级运行: 部分章节未能生成");
        }
        println!("✅ 文档装配完成，参考文献 {} 条", document.bibliography.len());

        Ok(document)
    }

    /// 按引用首次出现顺序合并全文档参考文献，跨章节去重
    fn consolidate_bibliography(
        sections: &[SectionDraft],
        pool: &SourcePool,
    ) -> Vec<SourceRecord> {
        let mut bibliography = Vec::new();
        let mut cited: HashSet<String> = HashSet::new();
        for draft in sections {
            for url in &draft.citations {
                if cited.insert(url.clone()) {
                    if let Some(record) = pool.get(url) {
                        bibliography.push(record.clone());
                    }
                }
            }
        }
        bibliography
    }
}
