//! 生成文本解析工具
//!
//! 后端回传的是自由格式文本，这里负责抠出 JSON 并做结构校验。
//! 校验失败的结果直接丢弃（单条失败不致命，由调用方按缺失处理）。

use tracing::warn;

use crate::models::ProblemSet;

/// 从原始文本中截取最外层的 JSON 对象
///
/// 取第一个 `{` 到最后一个 `}` 之间的内容；找不到配对时返回 `None`。
pub fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

/// 解析并校验一条生成结果的题目集合
///
/// 结构校验规则：
/// - 必须能抠出合法 JSON 并反序列化为题目集合
/// - 题目列表非空
/// - 首题选项数不超过 4（超出视为后端输出失控，整条丢弃）
pub fn parse_generated_problem_set(generated_text: &str) -> Option<ProblemSet> {
    let extracted = extract_json(generated_text)?;

    let parsed: ProblemSet = match serde_json::from_str(extracted) {
        Ok(p) => p,
        Err(e) => {
            warn!("生成结果反序列化失败，丢弃: {}", e);
            return None;
        }
    };

    if parsed.quiz.is_empty() {
        warn!("生成结果不含任何题目，丢弃");
        return None;
    }

    if parsed.quiz[0].selections.len() > 4 {
        warn!(
            "首题选项数异常 ({} 个)，丢弃",
            parsed.quiz[0].selections.len()
        );
        return None;
    }

    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz_json(selection_count: usize) -> String {
        let selections: Vec<_> = (0..selection_count)
            .map(|i| {
                serde_json::json!({
                    "content": format!("选项 {}", i + 1),
                    "correct": i == 0,
                })
            })
            .collect();
        serde_json::json!({
            "quiz": [{
                "number": 1,
                "title": "中国的首都是哪里？",
                "selections": selections,
                "explanation": "北京是中国的首都。",
            }]
        })
        .to_string()
    }

    #[test]
    fn test_extract_json_strips_surrounding_text() {
        assert_eq!(
            extract_json("以下是生成结果：{\"quiz\": []} 以上。"),
            Some("{\"quiz\": []}")
        );
        assert_eq!(extract_json("没有任何大括号"), None);
        assert_eq!(extract_json("} 顺序颠倒 {"), None);
    }

    #[test]
    fn test_parse_valid_problem_set() {
        let text = format!("模型输出前缀 {} 后缀", quiz_json(4));
        let parsed = parse_generated_problem_set(&text).unwrap();
        assert_eq!(parsed.quiz.len(), 1);
        assert_eq!(parsed.quiz[0].selections.len(), 4);
    }

    #[test]
    fn test_reject_too_many_selections() {
        assert!(parse_generated_problem_set(&quiz_json(5)).is_none());
    }

    #[test]
    fn test_reject_empty_quiz() {
        assert!(parse_generated_problem_set("{\"quiz\": []}").is_none());
    }

    #[test]
    fn test_reject_malformed_text() {
        assert!(parse_generated_problem_set("完全不是 JSON").is_none());
        assert!(parse_generated_problem_set("{\"别的字段\": 1}").is_none());
    }
}
