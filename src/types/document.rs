use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::section::SectionDraft;
use crate::types::source::SourceRecord;

/// 最终案例文档，由文档装配器一次性构建，装配完成后不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseStudyDocument {
    /// 公司名称（请求元数据）
    pub company_name: String,

    /// 职位名称（请求元数据）
    pub job_title: String,

    /// 案例主题（请求元数据）
    pub case_topic: String,

    /// 生成所用的后端模型标识，用于免责声明
    pub model_name: String,

    /// 章节草稿，严格按SectionSpec序号排列
    pub sections: Vec<SectionDraft>,

    /// 合并后的参考文献，只含实际被引用过的来源，按首次引用顺序排列
    pub bibliography: Vec<SourceRecord>,

    /// 是否为降级运行（存在失败占位章节）
    pub degraded: bool,

    pub generated_at: DateTime<Utc>,
}

impl CaseStudyDocument {
    /// 序列化为单一Markdown文档
    ///
    /// 给定相同的章节与参考文献，输出逐字节一致。时间戳等运行信息
    /// 只出现在过程报告中，不进入正文。
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "# Case Study: {} for {}\n\n",
            self.case_topic, self.company_name
        ));
        output.push_str(&format!(
            "**_Disclaimer: This case study was written by {} and may contain hallucinations._**\n\n",
            self.model_name
        ));
        if self.degraded {
            output.push_str("**_Note: one or more sections could not be generated and are marked as failed below._**\n\n");
        }
        output.push_str("---\n\n");

        let body: Vec<String> = self
            .sections
            .iter()
            .map(|draft| format!("## {}\n{}", draft.name, draft.content))
            .collect();
        output.push_str(&body.join("\n\n---\n\n"));

        output.push_str("\n\n---\n\n## References\n\n");
        if self.bibliography.is_empty() {
            output.push_str("_No sources were cited in this document._\n");
        } else {
            for (index, record) in self.bibliography.iter().enumerate() {
                output.push_str(&format!(
                    "{}. [{}]({})\n",
                    index + 1,
                    if record.title.is_empty() {
                        &record.url
                    } else {
                        &record.title
                    },
                    record.url
                ));
            }
        }

        output
    }

    /// 汇总全文档的非致命警告，用于过程报告
    pub fn warnings(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|draft| {
                draft
                    .warnings
                    .iter()
                    .map(|warning| format!("[{}] {}", draft.name, warning))
            })
            .collect()
    }
}
