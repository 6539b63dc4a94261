use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 搜索后端边界的原始命中条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// 引用来源记录，创建后只读，按规范化url唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// 规范化后的url，去重键
    pub url: String,

    pub title: String,

    pub snippet: String,

    /// 首次引入该来源的检索查询，仅记录首次插入时的出处
    pub origin_query: String,
}

/// 运行内共享的来源池，仅追加，按规范化url去重
///
/// 插入顺序与正确性无关，仅由装配器在构建参考文献时用于保持首次出现顺序。
#[derive(Debug, Clone, Default)]
pub struct SourcePool {
    records: Vec<SourceRecord>,
    seen: HashSet<String>,
}

impl SourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// url规范化：统一scheme与host为小写、去掉fragment与末尾斜杠
    pub fn normalize_url(url: &str) -> String {
        let url = url.trim();
        let url = url.split('#').next().unwrap_or(url);
        let (scheme, rest) = match url.split_once("://") {
            Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
            None => ("https".to_string(), url),
        };
        let (host, path) = match rest.split_once('/') {
            Some((host, path)) => (host.to_ascii_lowercase(), format!("/{}", path)),
            None => (rest.to_ascii_lowercase(), String::new()),
        };
        format!("{}://{}{}", scheme, host, path.trim_end_matches('/'))
    }

    /// 合并一条命中，若为新来源返回其记录，已存在则返回None
    pub fn insert(&mut self, hit: SearchHit, origin_query: &str) -> Option<SourceRecord> {
        if hit.url.trim().is_empty() {
            return None;
        }
        let normalized = Self::normalize_url(&hit.url);
        if !self.seen.insert(normalized.clone()) {
            return None;
        }
        let record = SourceRecord {
            url: normalized,
            title: hit.title,
            snippet: hit.snippet,
            origin_query: origin_query.to_string(),
        };
        self.records.push(record.clone());
        Some(record)
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.seen.contains(&Self::normalize_url(url))
    }

    pub fn records(&self) -> &[SourceRecord] {
        &self.records
    }

    pub fn get(&self, url: &str) -> Option<&SourceRecord> {
        let normalized = Self::normalize_url(url);
        self.records.iter().find(|record| record.url == normalized)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 将池内容格式化为提示词中的调研材料部分
    pub fn format_for_prompt(&self) -> String {
        if self.records.is_empty() {
            return "（暂无检索到的来源）".to_string();
        }
        let mut content = String::new();
        for record in &self.records {
            content.push_str(&format!(
                "- Title: {}\n  URL: {}\n  Snippet: {}\n",
                record.title, record.url, record.snippet
            ));
        }
        content
    }
}
