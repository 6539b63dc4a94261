use anyhow::Result;
use std::fs;

use crate::generator::context::{GeneratorContext, MemoryScope, ScopedKeys};
use crate::types::document::CaseStudyDocument;
use crate::types::section::SectionStatus;

/// 保存文档与过程报告
pub async fn save(context: &GeneratorContext, document: &CaseStudyDocument) -> Result<()> {
    let outlet = DiskOutlet::new("case_study.md", "generation_process.md");
    outlet.save(context, document).await
}

pub trait Outlet {
    async fn save(&self, context: &GeneratorContext, document: &CaseStudyDocument) -> Result<()>;
}

/// 磁盘落盘出口：正文与过程报告各一个Markdown文件
pub struct DiskOutlet {
    document_filename: String,
    report_filename: String,
}

impl DiskOutlet {
    pub fn new(document_filename: &str, report_filename: &str) -> Self {
        Self {
            document_filename: document_filename.to_string(),
            report_filename: report_filename.to_string(),
        }
    }

    /// 汇总运行过程细节，正文保持确定性，时间戳等只进报告
    async fn build_process_report(
        &self,
        context: &GeneratorContext,
        document: &CaseStudyDocument,
    ) -> String {
        let mut report = String::new();

        report.push_str("# Generation Process Report\n\n");
        report.push_str(&format!(
            "- Generated at: {}\n",
            document.generated_at.to_rfc3339()
        ));
        report.push_str(&format!("- Model: {}\n", document.model_name));
        report.push_str(&format!("- Company: {}\n", document.company_name));
        report.push_str(&format!("- Topic: {}\n", document.case_topic));
        report.push_str(&format!(
            "- Degraded run: {}\n",
            if document.degraded { "yes" } else { "no" }
        ));

        report.push_str("\n## Seed Research\n\n");
        let seed_queries: Vec<String> = context
            .get_from_memory(MemoryScope::PROCESS, ScopedKeys::SEED_QUERIES)
            .await
            .unwrap_or_default();
        for query in &seed_queries {
            report.push_str(&format!("- `{}`\n", query));
        }
        if let Some(count) = context
            .get_from_memory::<usize>(MemoryScope::PROCESS, ScopedKeys::SEED_SOURCE_COUNT)
            .await
        {
            report.push_str(&format!("\nInitial source pool size: {}\n", count));
        }

        report.push_str("\n## Sections\n");
        for draft in &document.sections {
            report.push_str(&format!("\n### {}. {}\n\n", draft.ordinal + 1, draft.name));
            report.push_str(&format!(
                "- Status: {}\n",
                match draft.status {
                    SectionStatus::Completed => "completed",
                    SectionStatus::Failed => "failed",
                }
            ));
            if !draft.query_log.is_empty() {
                report.push_str("- Queries:\n");
                for query in &draft.query_log {
                    report.push_str(&format!("  - `{}`\n", query));
                }
            }
            if !draft.citations.is_empty() {
                report.push_str(&format!("- Citations: {}\n", draft.citations.len()));
            }
            for warning in &draft.warnings {
                report.push_str(&format!("- ⚠️ {}\n", warning));
            }
        }

        report.push_str(&format!(
            "\n## Bibliography\n\nConsolidated references: {}\n",
            document.bibliography.len()
        ));

        report
    }
}

impl Outlet for DiskOutlet {
    async fn save(&self, context: &GeneratorContext, document: &CaseStudyDocument) -> Result<()> {
        println!("\n🖊️ 文档存储中...");

        let output_dir = &context.config.output_path;
        if output_dir.exists() {
            fs::remove_dir_all(output_dir)?;
        }
        fs::create_dir_all(output_dir)?;

        let document_path = output_dir.join(&self.document_filename);
        fs::write(&document_path, document.to_markdown())?;
        println!("💾 已保存文档: {}", document_path.display());

        let report_path = output_dir.join(&self.report_filename);
        let report = self.build_process_report(context, document).await;
        fs::write(&report_path, report)?;
        println!("💾 已保存过程报告: {}", report_path.display());

        println!("💾 文档保存完成，输出目录: {}", output_dir.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::config::Config;
    use crate::error::CaseWriterError;
    use crate::llm::{AssessDecision, GenerationBackend, SectionComposition};
    use crate::search::SearchBackend;
    use crate::types::section::{SectionDraft, default_sections};
    use crate::types::source::SearchHit;

    struct NoopBackend;

    #[async_trait]
    impl GenerationBackend for NoopBackend {
        async fn assess(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
        ) -> Result<AssessDecision, CaseWriterError> {
            Ok(AssessDecision {
                sufficient: true,
                queries: vec![],
            })
        }

        async fn compose(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
        ) -> Result<SectionComposition, CaseWriterError> {
            Ok(SectionComposition {
                content: String::new(),
                citations: vec![],
            })
        }

        fn model_name(&self) -> String {
            "noop".to_string()
        }
    }

    struct NoopSearch;

    #[async_trait]
    impl SearchBackend for NoopSearch {
        async fn search(
            &self,
            _query: &str,
            _cap: usize,
        ) -> Result<Vec<SearchHit>, CaseWriterError> {
            Ok(vec![])
        }
    }

    fn context_with_output(output_dir: &std::path::Path) -> GeneratorContext {
        let mut config = Config::default();
        config.output_path = output_dir.to_path_buf();
        GeneratorContext::new(config, Arc::new(NoopBackend), Arc::new(NoopSearch))
    }

    fn document() -> CaseStudyDocument {
        let mut draft = SectionDraft {
            name: "Introduction".to_string(),
            ordinal: 0,
            content: "body".to_string(),
            citations: vec!["https://example.com/a".to_string()],
            query_log: vec!["apple market entry".to_string()],
            warnings: vec![],
            status: crate::types::section::SectionStatus::Completed,
        };
        draft.warnings.push("引用完整性警告: 测试".to_string());
        CaseStudyDocument {
            company_name: "Apple".to_string(),
            job_title: "Head of Global Strategy".to_string(),
            case_topic: "Market entry".to_string(),
            model_name: "test-model".to_string(),
            sections: vec![draft, SectionDraft::failed(&default_sections()[1], "down")],
            bibliography: vec![],
            degraded: true,
            generated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_writes_document_and_report() {
        let dir = TempDir::new().unwrap();
        let output_dir = dir.path().join("out");
        let context = context_with_output(&output_dir);
        context
            .store_to_memory(
                MemoryScope::PROCESS,
                ScopedKeys::SEED_QUERIES,
                vec!["q1".to_string(), "q2".to_string()],
            )
            .await
            .unwrap();
        context
            .store_to_memory(MemoryScope::PROCESS, ScopedKeys::SEED_SOURCE_COUNT, 5usize)
            .await
            .unwrap();

        save(&context, &document()).await.unwrap();

        let markdown = std::fs::read_to_string(output_dir.join("case_study.md")).unwrap();
        assert!(markdown.contains("# Case Study: Market entry for Apple"));

        let report = std::fs::read_to_string(output_dir.join("generation_process.md")).unwrap();
        assert!(report.contains("Degraded run: yes"));
        assert!(report.contains("`q1`"));
        assert!(report.contains("Initial source pool size: 5"));
        assert!(report.contains("### 1. Introduction"));
        assert!(report.contains("Status: failed"));
        assert!(report.contains("引用完整性警告"));
    }

    #[tokio::test]
    async fn test_save_replaces_existing_output_dir() {
        let dir = TempDir::new().unwrap();
        let output_dir = dir.path().join("out");
        std::fs::create_dir_all(&output_dir).unwrap();
        std::fs::write(output_dir.join("stale.md"), "old").unwrap();
        let context = context_with_output(&output_dir);

        save(&context, &document()).await.unwrap();

        assert!(!output_dir.join("stale.md").exists());
        assert!(output_dir.join("case_study.md").exists());
    }
}
