//! 生成端点与通知桥接

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, info};

use crate::api::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{GenerateRequest, GenerateResponse};

/// `POST /generation`
///
/// 提取文档页面后交给编排器完成整个扇出/扇入流程。
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> AppResult<Json<GenerateResponse>> {
    if request.quiz_count == 0 {
        return Err(AppError::InvalidInput("题目数必须为正".to_string()));
    }

    info!(
        "📥 收到生成请求: {} 题, 源: {}",
        request.quiz_count, request.uploaded_url
    );

    let pages = state
        .extractor
        .extract(&request.uploaded_url, &request.selected_pages)
        .await?;

    let response = state
        .orchestrator
        .generate(&pages, request.quiz_count)
        .await?;

    info!("📤 返回 {} 道题目", response.problems.len());
    Ok(Json(response))
}

/// `POST /internal/notify/{batch_id}`
///
/// 后端完成一个单元后，把结果消息体发到这里，
/// 由进程内通知枢纽广播给对应批次的收集器。
pub async fn notify_result(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
    body: String,
) -> StatusCode {
    let channel = format!("notify:{}", batch_id);
    let delivered = state.notify.publish(&channel, body).await;
    debug!("通知转发: {} → {} 个订阅者", channel, delivered);

    // 没有订阅者说明批次已结束（收齐或超时），消息按无害丢弃处理
    StatusCode::NO_CONTENT
}
