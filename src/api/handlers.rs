// HTTP handlers. Each extraction endpoint accepts repeated `doc_id` query
// parameters and answers with one result per requested id.

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::collections::BTreeMap;

use super::responses::{raw_document_result, ContentResult, HealthResponse, ImagesResult};
use super::router::AppState;
use crate::core::extraction::{fan_out, DocumentResults, ExtractionError};

pub const DOC_ID_PARAM: &str = "doc_id";

type ApiResult<T> = Result<Json<BTreeMap<String, T>>, (StatusCode, String)>;

pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /extract` - images only.
pub async fn extract_images(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<ImagesResult> {
    log_request(&method, &uri);
    let ids = requested_document_ids(&params)?;

    let service = state.extraction.clone();
    let results = fan_out(ids, move |id| {
        let service = service.clone();
        async move { service.extract_images(&id).await }
    })
    .await;

    Ok(Json(into_envelopes(results, ImagesResult::from)))
}

/// `GET /extract-full-content` - text and image blocks in document order.
pub async fn extract_full_content(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<ContentResult> {
    log_request(&method, &uri);
    let ids = requested_document_ids(&params)?;

    let service = state.extraction.clone();
    let results = fan_out(ids, move |id| {
        let service = service.clone();
        async move { service.extract_full_content(&id).await }
    })
    .await;

    Ok(Json(into_envelopes(results, ContentResult::from)))
}

/// `GET /extract-raw-document` - the document as Google returned it.
pub async fn extract_raw_document(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Value> {
    log_request(&method, &uri);
    let ids = requested_document_ids(&params)?;

    let service = state.extraction.clone();
    let results = fan_out(ids, move |id| {
        let service = service.clone();
        async move { service.extract_raw_document(&id).await }
    })
    .await;

    Ok(Json(into_envelopes(results, raw_document_result)))
}

fn log_request(method: &Method, uri: &Uri) {
    tracing::info!(
        method = %method,
        endpoint = uri.path(),
        query = uri.query().unwrap_or_default(),
        "Request received"
    );
}

/// Non-empty `doc_id` values in request order; rejects the request if none.
fn requested_document_ids(params: &[(String, String)]) -> Result<Vec<String>, (StatusCode, String)> {
    let ids: Vec<String> = params
        .iter()
        .filter(|(key, value)| key == DOC_ID_PARAM && !value.trim().is_empty())
        .map(|(_, value)| value.clone())
        .collect();

    if ids.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("The '{}' parameter is required", DOC_ID_PARAM),
        ));
    }
    Ok(ids)
}

fn into_envelopes<T, R, F>(results: DocumentResults<T>, envelope: F) -> BTreeMap<String, R>
where
    F: Fn(Result<T, ExtractionError>) -> R,
{
    results
        .into_iter()
        .map(|(id, result)| {
            if let Err(e) = &result {
                tracing::error!("Extraction failed for document {}: {}", id, e);
            }
            (id, envelope(result))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extraction::test_support::{EchoSink, StaticDocumentSource};
    use crate::core::extraction::ExtractionService;
    use serde_json::json;
    use std::sync::Arc;

    fn document_with_image(id: &str) -> Value {
        json!({
            "documentId": id,
            "title": "Doc",
            "body": { "content": [
                { "paragraph": { "elements": [
                    { "textRun": { "content": "Caption\n" } }
                ] } },
                { "paragraph": { "elements": [
                    { "inlineObjectElement": { "inlineObjectId": "kix.1" } }
                ] } }
            ] },
            "inlineObjects": {
                "kix.1": { "inlineObjectProperties": { "embeddedObject": {
                    "imageProperties": { "contentUri": "https://img/1" }
                } } }
            }
        })
    }

    fn state() -> AppState {
        let source = StaticDocumentSource::with(vec![
            ("doc1", document_with_image("doc1")),
            ("doc2", document_with_image("doc2")),
        ]);
        AppState::new(ExtractionService::new(Arc::new(source), Arc::new(EchoSink)))
    }

    fn query(ids: &[&str]) -> (Uri, Query<Vec<(String, String)>>) {
        let params: Vec<(String, String)> = ids
            .iter()
            .map(|id| (DOC_ID_PARAM.to_string(), id.to_string()))
            .collect();
        let uri: Uri = format!(
            "/test?{}",
            ids.iter()
                .map(|id| format!("{}={}", DOC_ID_PARAM, id))
                .collect::<Vec<_>>()
                .join("&")
        )
        .parse()
        .unwrap();
        (uri, Query(params))
    }

    #[tokio::test]
    async fn images_endpoint_mixes_success_and_error() {
        let (uri, params) = query(&["doc1", "unknown"]);

        let Json(body) = extract_images(State(state()), Method::GET, uri, params)
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({
                "doc1": {
                    "status": "success",
                    "images": [ { "url": "/images/doc1/imagem_1.png", "base64": "b64:https://img/1" } ]
                },
                "unknown": {
                    "status": "error",
                    "message": "Could not fetch document: document unknown not found"
                }
            })
        );
    }

    #[tokio::test]
    async fn full_content_endpoint_returns_blocks_per_document() {
        let (uri, params) = query(&["doc1", "doc2"]);

        let Json(body) = extract_full_content(State(state()), Method::GET, uri, params)
            .await
            .unwrap();
        let body = serde_json::to_value(body).unwrap();

        for id in ["doc1", "doc2"] {
            assert_eq!(body[id]["status"], "success");
            assert_eq!(
                body[id]["content"],
                json!([
                    { "type": "text", "content": "Caption" },
                    {
                        "type": "image",
                        "url": format!("/images/{}/imagem_1.png", id),
                        "base64": "b64:https://img/1"
                    }
                ])
            );
        }
    }

    #[tokio::test]
    async fn raw_endpoint_bypasses_flattening() {
        let (uri, params) = query(&["doc1", "bad/id"]);

        let Json(body) = extract_raw_document(State(state()), Method::GET, uri, params)
            .await
            .unwrap();

        assert_eq!(body["doc1"], document_with_image("doc1"));
        assert_eq!(body["bad/id"]["status"], "error");
    }

    #[tokio::test]
    async fn missing_doc_id_is_a_bad_request() {
        let uri: Uri = "/extract?other=1&doc_id=".parse().unwrap();
        let params = Query(vec![
            ("other".to_string(), "1".to_string()),
            (DOC_ID_PARAM.to_string(), String::new()),
        ]);

        let (status, message) = extract_images(State(state()), Method::GET, uri, params)
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains(DOC_ID_PARAM));
    }
}
