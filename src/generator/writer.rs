use std::sync::Arc;

use crate::error::CaseWriterError;
use crate::generator::broker::SourceBroker;
use crate::generator::persona::PersonaContext;
use crate::llm::GenerationBackend;
use crate::types::request::CaseStudyRequest;
use crate::types::section::{SectionDraft, SectionSpec, SectionStatus};
use crate::types::source::SourcePool;
use crate::utils::retry::{RetryPolicy, retry_with_backoff};

/// 每轮ASSESS允许带出的补充查询上限
const MAX_FOLLOWUP_QUERIES: usize = 2;

/// 章节写作状态机的状态
///
/// 合法迁移：ASSESS → SEARCH → ASSESS|WRITE。SEARCH轮次有上限，
/// 上限到达后无条件进入WRITE，保证循环终止；WRITE写出正文后定稿。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Assess,
    Search,
    Write,
}

/// 有据章节写作器
///
/// 对单个章节执行评估-检索-写作循环：先让生成后端判断现有来源池是否
/// 足以支撑写作，不足则按其给出的查询补充检索，充分（或轮次耗尽）后
/// 综合全部来源写出正文并校验引用完整性。教学目标与思考题注入每一次
/// 评估与写作调用，使检索与正文始终服务于讲师设定的教学意图。
pub struct SectionWriter {
    generation: Arc<dyn GenerationBackend>,
    persona: PersonaContext,
    retry: RetryPolicy,
    max_assess_rounds: usize,
    learning_objectives: String,
    student_questions: String,
}

impl SectionWriter {
    pub fn new(
        generation: Arc<dyn GenerationBackend>,
        persona: PersonaContext,
        retry: RetryPolicy,
        max_assess_rounds: usize,
        request: &CaseStudyRequest,
    ) -> Self {
        Self {
            generation,
            persona,
            retry,
            max_assess_rounds,
            learning_objectives: request.instructor.learning_objectives.clone(),
            student_questions: request.instructor.student_questions.clone(),
        }
    }

    /// 写作单个章节，返回定稿草稿；重试耗尽的传输错误升级为章节级失败
    pub async fn write_section(
        &self,
        spec: &SectionSpec,
        broker: &SourceBroker,
        pool: &mut SourcePool,
        preceding: &str,
    ) -> Result<SectionDraft, CaseWriterError> {
        println!("🤖 [{}] 评估现有依据...", spec.name);

        let mut query_log: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();
        let mut rounds = 0usize;
        let mut pending_queries: Vec<String> = Vec::new();
        let mut state = WriterState::Assess;

        loop {
            state = match state {
                WriterState::Assess => {
                    let user_prompt = self.assess_prompt(spec, pool, preceding);
                    let decision =
                        retry_with_backoff(&self.retry, &format!("ASSESS[{}]", spec.name), || async {
                            self.generation
                                .assess(self.persona.directive(), &user_prompt)
                                .await
                        })
                        .await
                        .map_err(|err| self.section_failure(spec, err))?;

                    if decision.sufficient || decision.queries.is_empty() {
                        WriterState::Write
                    } else if rounds >= self.max_assess_rounds {
                        // 轮次耗尽，带着现有依据进入写作
                        WriterState::Write
                    } else {
                        pending_queries = decision.queries;
                        pending_queries.truncate(MAX_FOLLOWUP_QUERIES);
                        WriterState::Search
                    }
                }
                WriterState::Search => {
                    rounds += 1;
                    query_log.extend(pending_queries.iter().cloned());

                    let added = broker
                        .search_into_pool(&pending_queries, pool)
                        .await
                        .map_err(|err| self.section_failure(spec, err))?;
                    pending_queries.clear();

                    // 没有新来源时再评估不会改变结论，直接进入写作
                    if added.is_empty() {
                        WriterState::Write
                    } else {
                        WriterState::Assess
                    }
                }
                WriterState::Write => break,
            };
        }

        let user_prompt = self.write_prompt(spec, pool, preceding);
        let composition =
            retry_with_backoff(&self.retry, &format!("WRITE[{}]", spec.name), || async {
                self.generation
                    .compose(self.persona.directive(), &user_prompt)
                    .await
            })
            .await
            .map_err(|err| self.section_failure(spec, err))?;

        // 引用完整性校验：定稿时每条引用都必须存在于来源池中
        let mut citations: Vec<String> = Vec::new();
        for raw_url in &composition.citations {
            let normalized = SourcePool::normalize_url(raw_url);
            if pool.contains_url(&normalized) {
                if !citations.contains(&normalized) {
                    citations.push(normalized);
                }
            } else {
                let warning = format!(
                    "引用完整性警告: 来源池中不存在 {}，该引用已丢弃",
                    raw_url
                );
                eprintln!("⚠️ [{}] {}", spec.name, warning);
                warnings.push(warning);
            }
        }

        println!(
            "✅ [{}] 章节完成，引用 {} 条来源",
            spec.name,
            citations.len()
        );

        Ok(SectionDraft {
            name: spec.name.clone(),
            ordinal: spec.ordinal,
            content: composition.content,
            citations,
            query_log,
            warnings,
            status: SectionStatus::Completed,
        })
    }

    fn section_failure(&self, spec: &SectionSpec, err: CaseWriterError) -> CaseWriterError {
        CaseWriterError::SectionFailure {
            section: spec.name.clone(),
            reason: err.to_string(),
        }
    }

    /// 教学意图提示块，注入每一次评估与写作调用
    fn teaching_goals(&self) -> String {
        let mut goals = format!(
            "The case study must achieve the following learning objectives: {}",
            self.learning_objectives
        );
        if !self.student_questions.trim().is_empty() {
            goals.push_str(&format!(
                "\nThe students must be able to answer the following questions after reading it: {}",
                self.student_questions
            ));
        }
        goals
    }

    fn assess_prompt(&self, spec: &SectionSpec, pool: &SourcePool, preceding: &str) -> String {
        format!(
            "I am about to write the '{}' section of a case study.\n\
             My instructions for this section are: {}\n\n\
             {}\n\n\
             The sources gathered so far are:\n---\n{}\n---\n\n\
             The context from previous sections is: {}\n\n\
             Do I need more specific, real-time information to write this section comprehensively? \
             Set `sufficient` to true when the gathered sources already support the section. \
             Otherwise set `sufficient` to false and provide up to {} targeted web search queries in `queries`.",
            spec.name,
            spec.requirements,
            self.teaching_goals(),
            pool.format_for_prompt(),
            if preceding.is_empty() { "None" } else { preceding },
            MAX_FOLLOWUP_QUERIES,
        )
    }

    fn write_prompt(&self, spec: &SectionSpec, pool: &SourcePool, preceding: &str) -> String {
        let grounding_instruction = if pool.is_empty() {
            "No sources are available. Clearly flag any claim you cannot support as [unverified] \
             instead of inventing citations, and leave `citations` empty."
        } else {
            "Only cite URLs that appear in the source list above; list in `citations` the exact \
             URLs that support factual claims in your text."
        };

        format!(
            "In your defined role, please write out all details of the section '{}'.\n\
             The specific requirements for this section are: {}\n\n\
             {}\n\n\
             Use these gathered sources to ground your writing:\n---\n{}\n---\n\n\
             Please make sure to take into consideration the content of the preceding parts of \
             the case study: {}\n\n\
             IMPORTANT: Write ONLY the content for the section itself. Do not add meta-commentary. {}",
            spec.name,
            spec.requirements,
            self.teaching_goals(),
            pool.format_for_prompt(),
            if preceding.is_empty() { "None" } else { preceding },
            grounding_instruction,
        )
    }
}
