use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use casewriter_rs::config::Config;
use casewriter_rs::error::CaseWriterError;
use casewriter_rs::generator::assembler::DocumentAssembler;
use casewriter_rs::generator::context::GeneratorContext;
use casewriter_rs::generator::outlet;
use casewriter_rs::llm::{AssessDecision, GenerationBackend, SectionComposition};
use casewriter_rs::search::SearchBackend;
use casewriter_rs::types::request::{CaseStudyRequest, InstructorParams};
use casewriter_rs::types::source::SearchHit;

/// 构建一份完整的测试配置，重试间隔压到最短
fn test_config() -> Config {
    let mut config = Config::default();
    config.request = CaseStudyRequest {
        company_name: "Apple".to_string(),
        job_title: "Head of Global Strategy".to_string(),
        instructor: InstructorParams {
            discipline: "Business Strategy".to_string(),
            target_audience: "MBA Students".to_string(),
            case_topic: "How to break into a new market".to_string(),
            learning_objectives: "Apply Porter's Five Forces".to_string(),
            student_questions: String::new(),
        },
    };
    config.generation.retry_attempts = 2;
    config.generation.retry_base_delay_ms = 1;
    config.generation.max_assess_rounds = 2;
    config.search.results_per_query = 3;
    config
}

/// 生成桩：评估始终认为依据充分，正文引用来源池中的已知url
struct CitingBackend {
    citations: Vec<String>,
    failing_section: Option<&'static str>,
    fail_everything: bool,
    last_write_prompt: Mutex<String>,
}

impl CitingBackend {
    fn citing(urls: &[&str]) -> Self {
        Self {
            citations: urls.iter().map(|url| url.to_string()).collect(),
            failing_section: None,
            fail_everything: false,
            last_write_prompt: Mutex::new(String::new()),
        }
    }

    fn failing_on_section(section: &'static str, urls: &[&str]) -> Self {
        Self {
            citations: urls.iter().map(|url| url.to_string()).collect(),
            failing_section: Some(section),
            fail_everything: false,
            last_write_prompt: Mutex::new(String::new()),
        }
    }

    fn broken() -> Self {
        Self {
            citations: vec![],
            failing_section: None,
            fail_everything: true,
            last_write_prompt: Mutex::new(String::new()),
        }
    }
}

#[async_trait]
impl GenerationBackend for CitingBackend {
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
        user_prompt: &str,
    ) -> Result<SectionComposition, CaseWriterError> {
        *self.last_write_prompt.lock().unwrap() = user_prompt.to_string();
        if self.fail_everything {
            return Err(CaseWriterError::Transport("backend down".to_string()));
        }
        if let Some(section) = self.failing_section {
            if user_prompt.contains(&format!("'{}'", section)) {
                return Err(CaseWriterError::Transport("backend down".to_string()));
            }
        }
        Ok(SectionComposition {
            content: "Deterministic section body.".to_string(),
            citations: self.citations.clone(),
        })
    }

    fn model_name(&self) -> String {
        "integration-model".to_string()
    }
}

/// 生成桩：永远报告依据不足，用于验证迭代上限
struct InsatiableBackend {
    assess_calls: AtomicUsize,
}

#[async_trait]
impl GenerationBackend for InsatiableBackend {
    async fn assess(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<AssessDecision, CaseWriterError> {
        let call = self.assess_calls.fetch_add(1, Ordering::SeqCst);
        Ok(AssessDecision {
            sufficient: false,
            queries: vec![format!("insatiable query {}", call)],
        })
    }

    async fn compose(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<SectionComposition, CaseWriterError> {
        Ok(SectionComposition {
            content: "body".to_string(),
            citations: vec![],
        })
    }

    fn model_name(&self) -> String {
        "insatiable-model".to_string()
    }
}

/// 搜索桩：固定返回同一组来源，并记录全部查询
struct FixedSearch {
    hits: Vec<SearchHit>,
    calls: Mutex<Vec<String>>,
}

impl FixedSearch {
    fn with_urls(urls: &[&str]) -> Self {
        Self {
            hits: urls
                .iter()
                .map(|url| SearchHit {
                    url: url.to_string(),
                    title: format!("title of {}", url),
                    snippet: "snippet".to_string(),
                })
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn barren() -> Self {
        Self {
            hits: vec![],
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SearchBackend for FixedSearch {
    async fn search(&self, query: &str, cap: usize) -> Result<Vec<SearchHit>, CaseWriterError> {
        self.calls.lock().unwrap().push(query.to_string());
        Ok(self.hits.iter().take(cap).cloned().collect())
    }
}

/// 搜索桩：每次调用返回一条新url，用于喂饱迭代上限测试
struct GrowingSearch {
    counter: AtomicUsize,
}

#[async_trait]
impl SearchBackend for GrowingSearch {
    async fn search(&self, _query: &str, _cap: usize) -> Result<Vec<SearchHit>, CaseWriterError> {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(vec![SearchHit {
            url: format!("https://growing.example.com/{}", id),
            title: format!("doc {}", id),
            snippet: "snippet".to_string(),
        }])
    }
}

fn context(
    generation: Arc<dyn GenerationBackend>,
    search: Arc<dyn SearchBackend>,
    output_dir: Option<&std::path::Path>,
) -> GeneratorContext {
    let mut config = test_config();
    if let Some(dir) = output_dir {
        config.output_path = dir.to_path_buf();
    }
    GeneratorContext::new(config, generation, search)
}

#[tokio::test]
async fn test_end_to_end_run_exports_document_and_report() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("out");
    let backend = Arc::new(CitingBackend::citing(&["https://news.example.com/apple"]));
    let context = context(
        backend.clone(),
        Arc::new(FixedSearch::with_urls(&[
            "https://news.example.com/apple",
            "https://reports.example.com/q3",
        ])),
        Some(&output_dir),
    );

    let document = DocumentAssembler::generate(&context).await.unwrap();
    outlet::save(&context, &document).await.unwrap();

    // 讲师的教学目标贯穿到写作调用
    assert!(
        backend
            .last_write_prompt
            .lock()
            .unwrap()
            .contains("Apply Porter's Five Forces")
    );

    let markdown = std::fs::read_to_string(output_dir.join("case_study.md")).unwrap();
    assert!(markdown.starts_with("# Case Study: How to break into a new market for Apple"));
    assert!(markdown.contains("integration-model"));
    assert!(markdown.contains("## Introduction"));
    assert!(markdown.contains("## Conclusion"));
    assert!(markdown.contains("[title of https://news.example.com/apple](https://news.example.com/apple)"));

    let report = std::fs::read_to_string(output_dir.join("generation_process.md")).unwrap();
    assert!(report.contains("Degraded run: no"));
    assert!(report.contains("Initial source pool size: 2"));
}

#[tokio::test]
async fn test_sections_come_back_in_template_order() {
    let context = context(
        Arc::new(CitingBackend::citing(&[])),
        Arc::new(FixedSearch::with_urls(&["https://a.example.com/x"])),
        None,
    );

    let document = DocumentAssembler::generate(&context).await.unwrap();

    assert_eq!(document.sections.len(), 7);
    for (index, draft) in document.sections.iter().enumerate() {
        assert_eq!(draft.ordinal, index);
    }
    assert_eq!(document.sections[0].name, "Introduction");
    assert_eq!(document.sections[6].name, "Conclusion");
}

#[tokio::test]
async fn test_bibliography_has_no_dangling_or_duplicate_entries() {
    // 正文引用一条真实来源和一条池外来源
    let context = context(
        Arc::new(CitingBackend::citing(&[
            "https://news.example.com/apple",
            "https://fabricated.example.org/ghost",
        ])),
        Arc::new(FixedSearch::with_urls(&["https://news.example.com/apple"])),
        None,
    );

    let document = DocumentAssembler::generate(&context).await.unwrap();

    // 池外引用被丢弃，真实引用跨7个章节只合并为一条
    assert_eq!(document.bibliography.len(), 1);
    assert_eq!(document.bibliography[0].url, "https://news.example.com/apple");
    let markdown = document.to_markdown();
    assert!(!markdown.contains("fabricated.example.org"));
    // 每个章节都记录了引用完整性警告
    assert_eq!(document.warnings().len(), 7);
}

#[tokio::test]
async fn test_repeated_runs_are_structurally_identical() {
    let first = DocumentAssembler::generate(&context(
        Arc::new(CitingBackend::citing(&["https://news.example.com/apple"])),
        Arc::new(FixedSearch::with_urls(&["https://news.example.com/apple"])),
        None,
    ))
    .await
    .unwrap();
    let second = DocumentAssembler::generate(&context(
        Arc::new(CitingBackend::citing(&["https://news.example.com/apple"])),
        Arc::new(FixedSearch::with_urls(&["https://news.example.com/apple"])),
        None,
    ))
    .await
    .unwrap();

    // 时间戳只进过程报告，正文逐字节一致
    assert_eq!(first.to_markdown(), second.to_markdown());
}

#[tokio::test]
async fn test_search_rounds_are_bounded_per_section() {
    let backend = Arc::new(InsatiableBackend {
        assess_calls: AtomicUsize::new(0),
    });
    let context = context(backend.clone(), Arc::new(GrowingSearch {
        counter: AtomicUsize::new(0),
    }), None);

    let document = DocumentAssembler::generate(&context).await.unwrap();

    // 每章节最多2轮检索，每轮1条查询
    for draft in &document.sections {
        assert!(draft.query_log.len() <= 2);
    }
    // 每章节评估调用数为轮次上限+1
    assert_eq!(backend.assess_calls.load(Ordering::SeqCst), 7 * 3);
}

#[tokio::test]
async fn test_single_failing_section_degrades_run() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("out");
    let context = context(
        Arc::new(CitingBackend::failing_on_section(
            "Analysis of Strategic Decisions",
            &[],
        )),
        Arc::new(FixedSearch::with_urls(&["https://a.example.com/x"])),
        Some(&output_dir),
    );

    let document = DocumentAssembler::generate(&context).await.unwrap();

    assert!(document.degraded);
    assert_eq!(document.sections.len(), 7);
    let failed: Vec<_> = document
        .sections
        .iter()
        .filter(|draft| draft.is_failed())
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].name, "Analysis of Strategic Decisions");
    assert_eq!(failed[0].ordinal, 2);

    outlet::save(&context, &document).await.unwrap();
    let markdown = std::fs::read_to_string(output_dir.join("case_study.md")).unwrap();
    assert!(markdown.contains("marked as failed"));
    assert!(markdown.contains("本章节生成失败"));
}

#[tokio::test]
async fn test_total_generation_failure_is_run_failure() {
    let context = context(
        Arc::new(CitingBackend::broken()),
        Arc::new(FixedSearch::with_urls(&["https://a.example.com/x"])),
        None,
    );

    let err = DocumentAssembler::generate(&context).await.unwrap_err();

    assert!(matches!(err, CaseWriterError::RunFailure(_)));
}

#[tokio::test]
async fn test_zero_result_world_still_produces_document() {
    let search = Arc::new(FixedSearch::barren());
    let context = context(
        Arc::new(CitingBackend::citing(&[])),
        search.clone(),
        None,
    );

    let document = DocumentAssembler::generate(&context).await.unwrap();

    assert!(!document.degraded);
    assert!(document.bibliography.is_empty());
    assert!(document.to_markdown().contains("No sources were cited"));
    // 播种的4条查询仍然全部发出
    assert_eq!(search.calls.lock().unwrap().len(), 4);
}
