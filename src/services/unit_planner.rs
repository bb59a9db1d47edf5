//! 工作单元规划器 - 业务能力层
//!
//! ## 职责
//!
//! 把 `page_count` 个页面与目标题目数 `item_count` 切分为一组有序、
//! 有界的工作单元，每个单元持有自己的页面集合与题目配额。
//!
//! ## 流水线
//!
//! 1. **基础分配**：按页数与题目数的相对大小选择策略
//!    - 题目数 ≤ 页数：按比例把页面划分为连续区间，每个单元配额 1
//!    - 题目数 > 页数：把每道题映射到所属页面，按页累计配额
//! 2. **压缩**：单元数超过 `max_units` 时，把相邻单元合并为恰好
//!    `max_units` 个连续分组
//! 3. **配额封顶**：配额超过 `quota_cap` 的单元拆分为多个相邻单元，
//!    限制单次后端调用的工作量
//!
//! ## 保证
//!
//! - 确定性：相同输入永远得到相同输出，无任何随机性
//! - 配额守恒：所有单元的配额之和恒等于 `item_count`
//! - 基础分配阶段页面全覆盖：各单元页面集合互不相交，并集为 `1..=page_count`

use crate::error::{AppError, AppResult};
use crate::models::WorkUnit;

/// 工作单元规划器
///
/// 纯计算组件，不持有任何资源。
#[derive(Debug, Clone)]
pub struct UnitPlanner {
    max_units: usize,
    quota_cap: usize,
}

impl UnitPlanner {
    pub fn new(max_units: usize, quota_cap: usize) -> Self {
        Self {
            max_units,
            quota_cap,
        }
    }

    /// 规划一个批次的工作单元
    ///
    /// # 参数
    /// - `page_count`: 文档页数（必须为正）
    /// - `item_count`: 目标题目数（必须为正）
    ///
    /// # 返回
    /// 有序的工作单元列表；配额之和等于 `item_count`。
    pub fn plan(&self, page_count: usize, item_count: usize) -> AppResult<Vec<WorkUnit>> {
        let units = self.plan_uncapped(page_count, item_count)?;
        Ok(cap_quota(units, self.quota_cap))
    }

    /// 基础分配 + 压缩（不含配额封顶）
    fn plan_uncapped(&self, page_count: usize, item_count: usize) -> AppResult<Vec<WorkUnit>> {
        if page_count == 0 {
            return Err(AppError::InvalidInput("页数必须为正".to_string()));
        }
        if item_count == 0 {
            return Err(AppError::InvalidInput("题目数必须为正".to_string()));
        }
        if self.max_units == 0 {
            return Err(AppError::InvalidInput("max_units 必须为正".to_string()));
        }

        let base = if item_count <= page_count {
            assign_page_ranges(page_count, item_count)
        } else {
            assign_per_page_quota(page_count, item_count)
        };

        if base.len() > self.max_units {
            Ok(compress(base, self.max_units))
        } else {
            Ok(base)
        }
    }
}

/// 题目数 ≤ 页数：按比例划分连续页面区间
///
/// 单元 i 的区间为 `(ceil(i·pc/ic), ceil((i+1)·pc/ic)]`，
/// 区间互不相交且覆盖全部页面；每个单元配额 1。
fn assign_page_ranges(page_count: usize, item_count: usize) -> Vec<WorkUnit> {
    let boundary = |i: usize| (i * page_count).div_ceil(item_count);

    (0..item_count)
        .map(|i| {
            let pages: Vec<usize> = (boundary(i) + 1..=boundary(i + 1)).collect();
            WorkUnit::new(pages, 1)
        })
        .collect()
}

/// 题目数 > 页数：把每道题映射到所属页面并按页累计配额
///
/// 第 k 道题（0 起始）归属页面 `floor(k·pc/ic)+1`（钳制到 `pc`），
/// 每个出现过的页面产出一个单元，配额为落在该页的题目数。
fn assign_per_page_quota(page_count: usize, item_count: usize) -> Vec<WorkUnit> {
    let mut counters = vec![0usize; page_count + 1];
    for k in 0..item_count {
        let page = (k * page_count / item_count + 1).min(page_count);
        counters[page] += 1;
    }

    (1..=page_count)
        .filter(|&p| counters[p] > 0)
        .map(|p| WorkUnit::new(vec![p], counters[p]))
        .collect()
}

/// 把 n 个单元合并为恰好 max_units 个连续分组
///
/// 分组大小为 `floor(n/m)`，前 `n mod m` 组各多分一个。
/// 合并单元的配额为成员配额之和，页面集合为成员页面的有序去重并集。
fn compress(units: Vec<WorkUnit>, max_units: usize) -> Vec<WorkUnit> {
    let n = units.len();
    let base_size = n / max_units;
    let extra = n % max_units;

    let mut merged = Vec::with_capacity(max_units);
    let mut iter = units.into_iter();

    for group in 0..max_units {
        let size = base_size + if group < extra { 1 } else { 0 };
        let mut quota = 0;
        let mut pages = Vec::new();
        for unit in iter.by_ref().take(size) {
            quota += unit.quota;
            pages.extend(unit.referenced_pages);
        }
        pages.sort_unstable();
        pages.dedup();
        merged.push(WorkUnit::new(pages, quota));
    }

    merged
}

/// 配额封顶：拆分配额超过上限的单元
///
/// 纯后处理，产出全新列表（不在迭代中原地改动）。
/// 拆出的单元按顺序相邻插入，各自沿用原单元的页面集合，
/// 配额总量保持不变。`cap == 0` 表示不封顶。
fn cap_quota(units: Vec<WorkUnit>, cap: usize) -> Vec<WorkUnit> {
    if cap == 0 {
        return units;
    }

    let mut capped = Vec::with_capacity(units.len());
    for unit in units {
        if unit.quota <= cap {
            capped.push(unit);
            continue;
        }

        let mut remaining = unit.quota;
        while remaining > 0 {
            let piece = remaining.min(cap);
            capped.push(WorkUnit::new(unit.referenced_pages.clone(), piece));
            remaining -= piece;
        }
    }
    capped
}
