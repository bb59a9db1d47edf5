//! 文档提取 - 基础设施层
//!
//! 文档解析本身是外部协作方的职责，这里只定义接口与一个
//! 纯文本的默认实现（按换页符切页），供服务端到端跑通。

use async_trait::async_trait;

use crate::error::{AppResult, ExtractError};
use crate::models::PageText;

/// 文档提取器
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// 下载并提取文档的页面文本
    ///
    /// `selected_pages` 非空时只保留这些页（1 起始，越界页码忽略），
    /// 为空时返回全部页面。
    async fn extract(&self, url: &str, selected_pages: &[usize]) -> AppResult<PageText>;
}

/// 纯文本提取器
///
/// GET 源地址，按换页符（`\x0c`）切分页面。
pub struct HttpTextExtractor {
    client: reqwest::Client,
}

impl HttpTextExtractor {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentExtractor for HttpTextExtractor {
    async fn extract(&self, url: &str, selected_pages: &[usize]) -> AppResult<PageText> {
        let text = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ExtractError::FetchFailed {
                url: url.to_string(),
                source: Box::new(e),
            })?
            .text()
            .await
            .map_err(|e| ExtractError::FetchFailed {
                url: url.to_string(),
                source: Box::new(e),
            })?;

        let all_pages: Vec<String> = text.split('\x0c').map(|p| p.to_string()).collect();
        if all_pages.iter().all(|p| p.trim().is_empty()) {
            return Err(ExtractError::EmptyContent {
                url: url.to_string(),
            }
            .into());
        }

        let pages = if selected_pages.is_empty() {
            all_pages
        } else {
            selected_pages
                .iter()
                .filter(|&&p| p >= 1 && p <= all_pages.len())
                .map(|&p| all_pages[p - 1].clone())
                .collect()
        };

        Ok(PageText::new(pages))
    }
}
