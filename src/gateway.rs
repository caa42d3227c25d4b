//! HTTPゲートウェイ
//!
//! POST /api/analyze → 入力検証 → 解析パイプライン → JSON応答。
//! 検証エラーは400（LLMは呼ばない）、上流・抽出・パースの失敗は500。
//! GET /health でプロバイダ一覧を返す。

use crate::ai_provider::AiProvider;
use crate::analyzer::{run_analysis, AnalysisRequest};
use crate::error::Result;
use crate::llm::CompletionClient;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use gsc_intent_common::QueryRow;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

/// 検証済みの解析リクエスト
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub queries: Vec<QueryRow>,
    pub provider: AiProvider,
    pub api_key: String,
    pub brand: Option<String>,
    pub sector: Option<String>,
}

#[derive(Clone)]
pub struct GatewayState {
    pub client: Arc<dyn CompletionClient>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub providers: Vec<&'static str>,
}

/// リクエスト本文を検証
///
/// 判定順: queries → provider → apiKey（存在） → apiKey（形式）。
/// 最初に失敗した項目のメッセージを返す。
pub fn validate_analyze_request(body: &Value) -> std::result::Result<ValidatedRequest, String> {
    let queries = body
        .get("queries")
        .filter(|q| q.is_array())
        .and_then(|q| serde_json::from_value::<Vec<QueryRow>>(q.clone()).ok())
        .ok_or_else(|| "Invalid queries format".to_string())?;

    let provider = body
        .get("provider")
        .and_then(Value::as_str)
        .and_then(AiProvider::from_wire)
        .ok_or_else(|| "Invalid or missing provider".to_string())?;

    let api_key = body
        .get("apiKey")
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| "Invalid or missing API key".to_string())?;

    provider.validate_key(api_key).map_err(|e| e.to_string())?;

    let optional_text = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Ok(ValidatedRequest {
        queries,
        provider,
        api_key: api_key.to_string(),
        brand: optional_text("brand"),
        sector: optional_text("sector"),
    })
}

fn error_response(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

async fn handle_analyze(
    State(state): State<GatewayState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "リクエスト本文を読めません");
            return error_response(
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid request body", "details": rejection.body_text() }),
            );
        }
    };

    let request = match validate_analyze_request(&body) {
        Ok(request) => request,
        Err(message) => {
            tracing::warn!(error = %message, "入力検証エラー");
            return error_response(StatusCode::BAD_REQUEST, json!({ "error": message }));
        }
    };

    tracing::info!(
        provider = %request.provider,
        queries = request.queries.len(),
        "解析リクエスト受付"
    );

    let outcome = run_analysis(
        state.client.as_ref(),
        AnalysisRequest {
            provider: request.provider,
            api_key: &request.api_key,
            queries: &request.queries,
            brand: request.brand.as_deref(),
            sector: request.sector.as_deref(),
        },
    )
    .await;

    match outcome {
        Ok(outcome) => Json(json!({
            "analysis": outcome.raw,
            "classifiedQueries": outcome.classified,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "解析に失敗");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to analyze queries", "details": e.to_string() }),
            )
        }
    }
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        providers: AiProvider::ALL.iter().map(|p| p.wire_name()).collect(),
    })
}

/// ルーター生成
pub fn router(client: Arc<dyn CompletionClient>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/analyze", post(handle_analyze))
        .with_state(GatewayState { client })
}

/// サーバー起動（Ctrl+C / SIGTERM で処理中のリクエストを終えてから停止）
pub async fn run_http(client: Arc<dyn CompletionClient>, bind_addr: &str) -> Result<()> {
    let app = router(client);
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("gateway listening on {} (Ctrl+C/SIGTERM to stop)", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERMを監視できません（Ctrl+Cのみ）");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
