//! 核心数据模型 - 题目与请求/响应 DTO

use serde::{Deserialize, Serialize};

/// 后端回传的单条生成结果
///
/// 通过通知频道投递，消息体为 `{"sequence": int, "generated_text": string}`。
/// 投递语义为"至多近似一次"：可能重复、可能丢失，靠 sequence 去重与关联。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedResult {
    pub sequence: usize,
    pub generated_text: String,
}

/// 选择肢
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    /// 选项内容
    pub content: String,
    /// 是否为正确答案
    pub correct: bool,
}

/// 单个题目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    /// 题目编号（最终响应中会重新按 1..N 编号）
    pub number: usize,
    /// 题干
    pub title: String,
    /// 选项列表
    pub selections: Vec<Selection>,
    /// 解析
    pub explanation: String,
    /// 题目来源页码（由工作单元的引用页回填）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_pages: Vec<usize>,
}

/// 后端生成文本解析出的题目集合
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemSet {
    pub quiz: Vec<Problem>,
}

/// 生成接口请求体
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// 源文档地址
    pub uploaded_url: String,
    /// 期望生成的题目数量
    pub quiz_count: usize,
    /// 选中的页码（1 起始），为空表示全部页面
    #[serde(default)]
    pub selected_pages: Vec<usize>,
}

/// 生成接口响应体
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub title: String,
    pub problems: Vec<Problem>,
}
