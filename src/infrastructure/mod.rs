//! 基础设施层（Infrastructure Layer）
//!
//! 持有对外部系统的访问能力，只暴露接口：
//! - `request_store` - 请求载荷的时限性持久化
//! - `dispatcher` - 触发后端处理（直连 / 分批入队）
//! - `notify` - 结果通知频道的有界等待抽象
//! - `extractor` - 文档文本提取（外部协作方接口）

pub mod dispatcher;
pub mod extractor;
pub mod notify;
pub mod request_store;

pub use dispatcher::{
    DispatchMode, DispatchTransport, Dispatcher, HttpDispatchTransport, QueueEntry,
    QUEUE_BATCH_SIZE,
};
pub use extractor::{DocumentExtractor, HttpTextExtractor};
pub use notify::{InMemoryNotifyHub, NotifyChannel, Subscription};
pub use request_store::{HttpRequestStore, MemoryRequestStore, RequestStore};
