//! HTTP 接口层
//!
//! 两个端点：
//! - `POST /generation` - 接收源文档与目标题目数，返回重组后的题目列表
//! - `POST /internal/notify/{batch_id}` - 后端回传结果的发布桥接
//!
//! 错误到状态码的映射：400 非法输入，429 限流或收集超时，
//! 502 存储/调度失败。

pub mod generate;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use crate::error::AppError;
use crate::infrastructure::{DocumentExtractor, NotifyChannel};
use crate::orchestrator::QuizOrchestrator;

/// 接口层共享状态
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<QuizOrchestrator>,
    pub extractor: Arc<dyn DocumentExtractor>,
    pub notify: Arc<dyn NotifyChannel>,
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generation", post(generate::generate))
        .route("/internal/notify/:batch_id", post(generate::notify_result))
        .with_state(state)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!("❌ 请求失败: {}", self);
        } else {
            tracing::warn!("⚠️ 请求被拒绝: {}", self);
        }

        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}
