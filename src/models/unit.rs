//! 核心数据模型 - 工作单元相关
//!
//! 定义分片与扇出/扇入协调所需的基础类型：
//! - `PageText` - 外部提取器产出的只读页面文本（1 起始索引）
//! - `WorkUnit` - 一个生成请求对应的页面集合与题目配额
//! - `BatchId` - 每次编排调用的唯一批次标识
//! - `RequestKey` - 批次内单元的存储键（`{batch_id}:{sequence}`）

use std::fmt;

use uuid::Uuid;

/// 页面文本集合
///
/// 由外部文档提取器产出，之后只读。页码从 1 开始。
#[derive(Debug, Clone)]
pub struct PageText {
    pages: Vec<String>,
}

impl PageText {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// 页面总数
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 按 1 起始页码取页面文本
    pub fn get(&self, page_no: usize) -> Option<&str> {
        if page_no == 0 {
            return None;
        }
        self.pages.get(page_no - 1).map(|s| s.as_str())
    }

    /// 拼接一组页面的文本（用于构建提示词）
    pub fn join_pages(&self, page_nos: &[usize]) -> String {
        page_nos
            .iter()
            .filter_map(|&p| self.get(p))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// 工作单元
///
/// 一个单元对应一次后端生成调用：
/// - `referenced_pages`: 引用的页码（有序、去重、均在 `[1, page_count]` 内）
/// - `quota`: 该单元需要生成的题目数量（恒为正）
///
/// 不变量：一个批次内所有单元的 quota 之和等于请求的题目总数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub referenced_pages: Vec<usize>,
    pub quota: usize,
}

impl WorkUnit {
    pub fn new(referenced_pages: Vec<usize>, quota: usize) -> Self {
        Self {
            referenced_pages,
            quota,
        }
    }
}

/// 批次标识
///
/// 每次编排调用生成一个全新的随机标识，绝不复用。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchId(Uuid);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 该批次的结果通知频道名
    pub fn notify_channel(&self) -> String {
        format!("notify:{}", self.0)
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 存储键
///
/// `sequence_index` 是单元在批次内的 1 起始位置，
/// 后端在结果消息中原样回传该序号用于关联。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestKey {
    pub batch_id: BatchId,
    pub sequence_index: usize,
}

impl RequestKey {
    pub fn new(batch_id: BatchId, sequence_index: usize) -> Self {
        Self {
            batch_id,
            sequence_index,
        }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.batch_id, self.sequence_index)
    }
}
