//! # HTTP 服务模块
//!
//! 基于 `axum` 暴露与命令行等价的嵌入/提取能力。
//! 服务进程启动时固定一组协议参数 (通道、标记、编码)，所有请求共用；
//! 客户端通过 multipart 表单上传图像与消息。

use anyhow::Context;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::bits::TextEncoding;
use crate::constants::MAX_UPLOAD_BYTES;
use crate::image_io::{load_image_from_bytes, to_png_bytes};
use crate::marker::Marker;
use crate::steganography::{Channel, decode, encode};

/// 服务各端点共享的协议参数，在启动时由命令行固定。
pub struct AppState {
    /// 承载隐藏比特的颜色通道。
    pub channel: Channel,
    /// 嵌入与提取两端约定的结束标记。
    pub marker: Marker,
    /// 文本与字节之间的映射策略。
    pub encoding: TextEncoding,
}

/// 提取成功时返回的 JSON 载荷。
#[derive(Serialize)]
struct DecodeResponse {
    message: String,
}

/// 出错时返回的 JSON 载荷。
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// 图像中不存在结束标记时返回的占位文案，此情况按成功响应处理。
const NO_MESSAGE_NOTICE: &str = "No hidden message was found in this image.";

/// 构造统一格式的错误响应。
fn error_response(
    status: StatusCode,
    error: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// 在指定端口上启动 HTTP API 服务并一直运行。
///
/// # Errors
///
/// 监听端口被占用或服务意外退出时返回错误。
pub async fn serve(port: u16, state: AppState) -> anyhow::Result<()> {
    let addr = format!("127.0.0.1:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Unable to listen on {addr}"))?;

    info!("steganography API listening on http://{addr}");

    axum::serve(listener, router(Arc::new(state)))
        .await
        .context("The HTTP server exited unexpectedly")?;

    Ok(())
}

/// 组装服务的路由表。
///
/// CORS 放开到任意来源，便于浏览器前端直接调用；
/// 请求体上限由 [`MAX_UPLOAD_BYTES`] 控制。
fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/encode", post(encode_handler))
        .route("/api/decode", post(decode_handler))
        .route("/api/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// `POST /api/encode`：把 multipart 表单里的消息嵌入上传的图像。
///
/// 表单需要 `image` (文件) 与 `message` (文本) 两个字段。
/// 成功时以附件形式返回嵌入后的 PNG 图像；
/// 字段缺失、图像不可解码或容量不足时返回 400。
async fn encode_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let mut image_bytes = None;
    let mut message = None;

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Malformed multipart request: {err}"),
        )
    })? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let bytes = field.bytes().await.map_err(|err| {
                    error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Unable to read the 'image' field: {err}"),
                    )
                })?;
                image_bytes = Some(bytes);
            }
            "message" => {
                let text = field.text().await.map_err(|err| {
                    error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Unable to read the 'message' field: {err}"),
                    )
                })?;
                message = Some(text);
            }
            _ => {}
        }
    }

    let (Some(image_bytes), Some(message)) = (image_bytes, message) else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Fields 'image' (file) and 'message' (text) are both required.",
        ));
    };

    let mut image = load_image_from_bytes(&image_bytes)
        .map_err(|err| error_response(StatusCode::BAD_REQUEST, err.to_string()))?;

    encode(
        &mut image,
        &message,
        state.channel,
        &state.marker,
        state.encoding,
    )
    .map_err(|err| {
        warn!("encode request rejected: {err}");
        error_response(StatusCode::BAD_REQUEST, err.to_string())
    })?;

    let png = to_png_bytes(&image)
        .map_err(|err| error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"encoded_image.png\"",
            ),
        ],
        png,
    ))
}

/// `POST /api/decode`：从上传的图像中提取隐藏的消息。
///
/// 表单需要 `image` (文件) 字段。提取结果以 JSON 返回；
/// 找不到结束标记时同样返回 200，消息字段为固定的提示文案。
async fn decode_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<DecodeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut image_bytes = None;

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Malformed multipart request: {err}"),
        )
    })? {
        let name = field.name().unwrap_or("").to_string();
        if name == "image" {
            let bytes = field.bytes().await.map_err(|err| {
                error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Unable to read the 'image' field: {err}"),
                )
            })?;
            image_bytes = Some(bytes);
        }
    }

    let Some(image_bytes) = image_bytes else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Field 'image' (file) is required.",
        ));
    };

    let image = load_image_from_bytes(&image_bytes)
        .map_err(|err| error_response(StatusCode::BAD_REQUEST, err.to_string()))?;

    let message = decode(&image, state.channel, &state.marker, state.encoding)
        .unwrap_or_else(|| NO_MESSAGE_NOTICE.to_string());

    Ok(Json(DecodeResponse { message }))
}

/// `GET /api/health`：供监控探活使用。
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "lsb-stash-api" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use image::{Rgba, RgbaImage};
    use tower::ServiceExt;

    const BOUNDARY: &str = "lsb-stash-test-boundary";

    /// 用默认协议参数 (蓝色通道、默认标记、UTF-8) 组装一张路由表
    fn test_router() -> Router {
        router(Arc::new(AppState {
            channel: Channel::Blue,
            marker: Marker::default(),
            encoding: TextEncoding::Utf8,
        }))
    }

    /// 手工拼一个 multipart 请求体；`fields` 中文件字段的值为 PNG 字节，
    /// 文本字段的值为 UTF-8 字节
    fn multipart_body(fields: &[(&str, bool, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for &(name, is_file, value) in fields {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            if is_file {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; \
                         filename=\"upload.png\"\r\nContent-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                );
            } else {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
            body.extend_from_slice(value);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_post(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request must build")
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .expect("body must be readable")
            .to_bytes()
            .to_vec()
    }

    /// 全字节为 255 的封面图：LSB 平面恒为 1，默认标记 (8 个零比特) 必然缺席
    fn saturated_cover_png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        to_png_bytes(&image).expect("cover image must encode")
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request must build"),
            )
            .await
            .expect("router must respond");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_bytes(response).await;
        let json: serde_json::Value = serde_json::from_slice(&body).expect("body must be JSON");
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn encode_without_message_field_is_rejected() {
        let body = multipart_body(&[("image", true, &saturated_cover_png(10, 10))]);
        let response = test_router()
            .oneshot(multipart_post("/api/encode", body))
            .await
            .expect("router must respond");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_bytes(response).await;
        let json: serde_json::Value = serde_json::from_slice(&body).expect("body must be JSON");
        assert!(json["error"].as_str().is_some_and(|e| e.contains("required")));
    }

    #[tokio::test]
    async fn decode_without_image_field_is_rejected() {
        let response = test_router()
            .oneshot(multipart_post("/api/decode", multipart_body(&[])))
            .await
            .expect("router must respond");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn encode_with_undecodable_image_is_rejected() {
        let body = multipart_body(&[
            ("image", true, b"definitely not an image"),
            ("message", false, b"hello"),
        ]);
        let response = test_router()
            .oneshot(multipart_post("/api/encode", body))
            .await
            .expect("router must respond");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    /// 2×2 图只有 4 比特容量，1000 个 'A' 需要 8008 比特；
    /// 响应必须是 400 且携带容量错误的展示文本
    #[tokio::test]
    async fn encode_over_capacity_is_rejected_with_error_display() {
        let message = "A".repeat(1000);
        let body = multipart_body(&[
            ("image", true, &saturated_cover_png(2, 2)),
            ("message", false, message.as_bytes()),
        ]);
        let response = test_router()
            .oneshot(multipart_post("/api/encode", body))
            .await
            .expect("router must respond");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_bytes(response).await;
        let json: serde_json::Value = serde_json::from_slice(&body).expect("body must be JSON");
        let error = json["error"].as_str().expect("error field must be a string");
        assert!(error.contains("8008"), "error should carry the required bit count: {error}");
    }

    /// 没有标记的图像走 200 成功分支，消息字段为固定提示文案
    #[tokio::test]
    async fn decode_without_marker_answers_notice() {
        let body = multipart_body(&[("image", true, &saturated_cover_png(20, 20))]);
        let response = test_router()
            .oneshot(multipart_post("/api/decode", body))
            .await
            .expect("router must respond");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_bytes(response).await;
        let json: serde_json::Value = serde_json::from_slice(&body).expect("body must be JSON");
        assert_eq!(json["message"], NO_MESSAGE_NOTICE);
    }

    /// 空消息字段照常接受：嵌入的是只含结束标记的载荷，
    /// 解码端据此还原出空字符串而不是"没有消息"
    #[tokio::test]
    async fn encode_accepts_empty_message() {
        let body = multipart_body(&[
            ("image", true, &saturated_cover_png(10, 10)),
            ("message", false, b""),
        ]);
        let response = test_router()
            .oneshot(multipart_post("/api/encode", body))
            .await
            .expect("router must respond");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn encode_then_decode_round_trip_over_http() {
        // 末字节须以 1 比特收尾，否则与默认全零标记提前碰撞
        let secret = "secret message 秘密!";
        let body = multipart_body(&[
            ("image", true, &saturated_cover_png(40, 40)),
            ("message", false, secret.as_bytes()),
        ]);
        let response = test_router()
            .oneshot(multipart_post("/api/encode", body))
            .await
            .expect("router must respond");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("image/png")
        );
        let encoded_png = body_bytes(response).await;

        let body = multipart_body(&[("image", true, &encoded_png)]);
        let response = test_router()
            .oneshot(multipart_post("/api/decode", body))
            .await
            .expect("router must respond");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_bytes(response).await;
        let json: serde_json::Value = serde_json::from_slice(&body).expect("body must be JSON");
        assert_eq!(json["message"], secret);
    }
}
