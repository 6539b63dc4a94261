use crate::error::CaseWriterError;
use crate::types::request::CaseStudyRequest;

/// 人设上下文，运行开始时从请求构建一次，整个运行期间只读，
/// 注入每一次生成调用以保持跨章节的语气与视角一致
#[derive(Debug, Clone)]
pub struct PersonaContext {
    directive: String,
}

impl PersonaContext {
    /// 从请求构建人设，必填字段缺失时立即失败
    pub fn from_request(request: &CaseStudyRequest) -> Result<Self, CaseWriterError> {
        let discipline = request.instructor.discipline.trim();
        let audience = request.instructor.target_audience.trim();
        let job_title = request.job_title.trim();
        let company = request.company_name.trim();

        if discipline.is_empty() || audience.is_empty() || job_title.is_empty() || company.is_empty()
        {
            return Err(CaseWriterError::Configuration(
                "人设构建失败: discipline、target_audience、job_title、company_name 均为必填".to_string(),
            ));
        }

        let directive = format!(
            "Your role: You are a deep expert in {discipline} with over 10 years of experience as {job_title} at {company}.\n\n\
             Your personality: You are extroverted, joyful and kind. You are a deeply analytical thinker, above average creative, and you always think outside of the box to find unconventional, yet effective solutions to problems.\n\n\
             Your expertise: You have over 10 years of experience as {job_title} at {company}. You have taught case studies at ivy league business schools for over 5 years. You also have over 5 years of experience in writing highly engaging and meaningful case studies for {audience} in top tier business schools.\n\n\
             Your writing style: When writing case studies for {audience} at top tier business schools, you adhere to the best practices of such quality case studies, but you add your own talent as an experienced storyteller to it. Your defining quality as a case study writer is that you write in such a way that the cases become particularly realistic and captivating for the students. You also build in many engaging elements which increase the completion rate significantly. Finally, you write based on high quality sources, which you rigorously cite throughout the document."
        );

        Ok(Self { directive })
    }

    /// 注入每次生成调用的系统提示词
    pub fn directive(&self) -> &str {
        &self.directive
    }
}
