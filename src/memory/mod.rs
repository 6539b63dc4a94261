use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// 运行级过程记忆，按scope:key存放生成过程的中间产物，供过程报告导出
///
/// 生命周期与单次文档生成运行一致，不跨运行持久化。
#[derive(Debug, Default)]
pub struct Memory {
    data: HashMap<String, Value>,
    last_updated: Option<DateTime<Utc>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 存储数据到指定作用域和键
    pub fn store<T>(&mut self, scope: &str, key: &str, data: T) -> Result<()>
    where
        T: Serialize,
    {
        let full_key = format!("{}:{}", scope, key);
        let serialized = serde_json::to_value(data)?;
        self.last_updated = Some(Utc::now());
        self.data.insert(full_key, serialized);
        Ok(())
    }

    /// 从指定作用域和键获取数据
    pub fn get<T>(&self, scope: &str, key: &str) -> Option<T>
    where
        T: for<'a> Deserialize<'a>,
    {
        let full_key = format!("{}:{}", scope, key);
        self.data
            .get(&full_key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// 检查是否存在指定数据
    pub fn has_data(&self, scope: &str, key: &str) -> bool {
        self.data.contains_key(&format!("{}:{}", scope, key))
    }

    /// 列出指定作用域的所有键
    pub fn list_keys(&self, scope: &str) -> Vec<String> {
        let prefix = format!("{}:", scope);
        let mut keys: Vec<String> = self
            .data
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .map(|key| key[prefix.len()..].to_string())
            .collect();
        keys.sort();
        keys
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }
}
