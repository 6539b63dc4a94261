use serde::{Deserialize, Serialize};

use crate::error::CaseWriterError;

/// 讲师定义的教学参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstructorParams {
    /// 学科领域
    pub discipline: String,

    /// 目标读者群体
    pub target_audience: String,

    /// 案例主题
    pub case_topic: String,

    /// 教学目标
    pub learning_objectives: String,

    /// 面向学生的思考题
    #[serde(default)]
    pub student_questions: String,
}

/// 案例生成请求，由讲师参数与学生参数两部分组成，运行开始后不可变
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseStudyRequest {
    /// 公司名称（学生输入）
    pub company_name: String,

    /// 职位名称（学生输入）
    pub job_title: String,

    /// 讲师参数
    pub instructor: InstructorParams,
}

impl CaseStudyRequest {
    /// 校验必填字段，在任何外部调用发起之前执行
    pub fn validate(&self) -> Result<(), CaseWriterError> {
        let mut missing = Vec::new();

        if self.company_name.trim().is_empty() {
            missing.push("company_name");
        }
        if self.job_title.trim().is_empty() {
            missing.push("job_title");
        }
        if self.instructor.discipline.trim().is_empty() {
            missing.push("discipline");
        }
        if self.instructor.target_audience.trim().is_empty() {
            missing.push("target_audience");
        }
        if self.instructor.case_topic.trim().is_empty() {
            missing.push("case_topic");
        }
        if self.instructor.learning_objectives.trim().is_empty() {
            missing.push("learning_objectives");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CaseWriterError::Configuration(format!(
                "请求缺少必填字段: {}",
                missing.join(", ")
            )))
        }
    }

    /// 推导初始广域检索查询，用于为来源池播种
    pub fn seed_queries(&self) -> Vec<String> {
        let company = &self.company_name;
        let topic = &self.instructor.case_topic;
        vec![
            format!("{} {}", company, topic),
            format!("financial reports of {} in the context of {}", company, topic),
            format!("performance analysis of {} in the context of {}", company, topic),
            format!(
                "strategic challenges and opportunities of {} in the context of {}",
                company, topic
            ),
        ]
    }
}
