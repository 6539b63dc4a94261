use serde::{Deserialize, Serialize};

/// 章节规格，由文档模板静态定义，不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSpec {
    /// 章节名称
    pub name: String,

    /// 章节在文档中的序号位置，从0开始
    pub ordinal: usize,

    /// 本章节的写作要求说明
    pub requirements: String,
}

/// 章节完成状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionStatus {
    /// 正常完成
    Completed,
    /// 重试耗尽后记录的占位章节
    Failed,
}

/// 章节草稿，由章节写作器产出，归还后由文档装配器持有
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDraft {
    pub name: String,

    pub ordinal: usize,

    /// 生成的章节正文（Markdown）
    pub content: String,

    /// 实际支撑正文的来源url，必须是来源池的子集
    pub citations: Vec<String>,

    /// 写作本章节期间发出的检索查询，按发出顺序记录
    pub query_log: Vec<String>,

    /// 引用完整性等非致命问题的记录
    pub warnings: Vec<String>,

    pub status: SectionStatus,
}

impl SectionDraft {
    /// 为失败章节构造占位草稿
    pub fn failed(spec: &SectionSpec, reason: &str) -> Self {
        Self {
            name: spec.name.clone(),
            ordinal: spec.ordinal,
            content: format!("> ⚠️ 本章节生成失败，未包含在最终文档中。原因: {}", reason),
            citations: Vec::new(),
            query_log: Vec::new(),
            warnings: vec![format!("章节生成失败: {}", reason)],
            status: SectionStatus::Failed,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == SectionStatus::Failed
    }
}

/// 内置的案例文档章节模板，按序号排列
pub fn default_sections() -> Vec<SectionSpec> {
    let sections = [
        (
            "Introduction",
            "Background Information: Provide a brief introduction to the company or brand featured in the case study.\nIndustry Context: Describe the industry landscape and the market conditions at the time of the case study.\nPurpose of the Case Study: Clarify the educational objectives and what students should aim to learn from this case study.",
        ),
        (
            "Case Study Narrative",
            "Company Overview: Detail the company's history, mission, and market position prior to the implementation of the strategy being studied.\nStrategic Assessment: Outline specific challenges or opportunities for the company.",
        ),
        (
            "Analysis of Strategic Decisions",
            "Strategic Decision-Making Process: Delve into how decisions were made, including the data and market research used.\nImplementation Challenges: Describe any obstacles encountered during the implementation of the strategy and how they were overcome.\nOutcomes and Performance: Short-Term Results (analyze immediate effects) and Long-Term Impact (assess long-term effects).",
        ),
        (
            "Critical Discussion",
            "Discussion Points: Provide key points for students to consider, fostering critical thinking about strategic choices made by the company.\nAlternative Strategies: Propose alternative strategies that could have been considered, encouraging students to think about different approaches.\nLessons Learned: Highlight key takeaways and lessons learned from the case study.",
        ),
        (
            "Reflection and Application",
            "Reflective Questions: Pose thought-provoking questions to help students apply the insights from the case study to their own or other business contexts.\nHow could these strategies be applied in different industries?\nWhat would you have done differently if you were in charge?",
        ),
        (
            "Supplementary Materials",
            "Data Sources: Include data sources, as found online.\nFurther Readings: Suggest additional resources for students who wish to explore related topics in more depth.",
        ),
        (
            "Conclusion",
            "Recap: Summarize the main insights and the educational value of the case study.\nNext Steps: Encourage further exploration of the concepts learned and how they tie into the upcoming course material.",
        ),
    ];

    sections
        .into_iter()
        .enumerate()
        .map(|(ordinal, (name, requirements))| SectionSpec {
            name: name.to_string(),
            ordinal,
            requirements: requirements.to_string(),
        })
        .collect()
}
