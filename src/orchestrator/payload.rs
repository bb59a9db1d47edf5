//! 生成载荷构建
//!
//! 提示词内容本身是外部协作方的领域，这里只定义构建接口
//! 与一个默认实现，把单元的页面文本和配额拼进请求体。

use serde_json::{json, Value};

use crate::models::{PageText, WorkUnit};

/// 载荷构建器
///
/// 由调用方注入，编排器对载荷内容保持不透明。
pub trait PayloadBuilder: Send + Sync {
    /// 为一个工作单元构建后端可消费的载荷
    ///
    /// `sequence` 是单元在批次内的 1 起始序号，后端必须在结果中原样回传。
    fn build(&self, unit: &WorkUnit, sequence: usize, pages: &PageText) -> Value;
}

/// 默认的测验提示词构建器
pub struct QuizPromptBuilder {
    model_id: String,
}

impl QuizPromptBuilder {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
        }
    }
}

impl Default for QuizPromptBuilder {
    fn default() -> Self {
        Self::new("anthropic.claude-3-haiku-20240307-v1:0")
    }
}

impl PayloadBuilder for QuizPromptBuilder {
    fn build(&self, unit: &WorkUnit, sequence: usize, pages: &PageText) -> Value {
        let source_text = pages.join_pages(&unit.referenced_pages);

        json!({
            "modelId": self.model_id,
            "sequence": sequence,
            "body": {
                "max_tokens": 1000,
                "system": "你是一名教育领域的 AI 助教。请分析提供的讲义内容，生成能够评估学生理解程度的测验题。",
                "messages": [{
                    "role": "user",
                    "content": [{
                        "type": "text",
                        "text": format!(
                            "请根据以下内容生成 {} 道题目，以 JSON 格式返回 {{\"quiz\": [...]}}:\n\n{}",
                            unit.quota, source_text
                        ),
                    }],
                }],
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_carries_quota_and_pages() {
        let pages = PageText::new(vec!["第一页内容".to_string(), "第二页内容".to_string()]);
        let unit = WorkUnit::new(vec![1, 2], 2);

        let payload = QuizPromptBuilder::default().build(&unit, 1, &pages);

        assert_eq!(payload["sequence"], 1);
        let text = payload["body"]["messages"][0]["content"][0]["text"]
            .as_str()
            .unwrap();
        assert!(text.contains("2 道题目"));
        assert!(text.contains("第一页内容"));
        assert!(text.contains("第二页内容"));
    }
}
