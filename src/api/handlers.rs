use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::models::{DocumentRequest, GenerationResult};

use super::error::{ApiError, ApiResult};
use super::state::ApiState;

/// Runs one generation request to completion and streams the document back
/// as an attachment. Input problems come back as 422, render failures as 500.
pub async fn generate(
    data: web::Json<DocumentRequest>,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let request = data.into_inner();
    let request_id = Uuid::new_v4();

    if let Err(message) = request.validate() {
        tracing::warn!(%request_id, "Rejected generation request: {}", message);
        return Err(ApiError::unprocessable_entity(message));
    }

    tracing::info!(
        %request_id,
        kind = ?request.kind,
        client = %request.client_name,
        items = request.items.len(),
        "Generating document"
    );

    match state.engine.generate(request).await {
        GenerationResult {
            success: true,
            data: Some(bytes),
            filename: Some(filename),
            mime_type: Some(mime_type),
            ..
        } => Ok(HttpResponse::Ok()
            .content_type(mime_type)
            .append_header((
                "Content-Disposition",
                format!("attachment; filename=\"{filename}\""),
            ))
            .body(bytes)),
        result => {
            let message = result.error.unwrap_or_else(|| "document generation failed".into());
            tracing::error!(%request_id, "Generation failed: {}", message);
            Err(ApiError::internal_server_error(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::configure_routes;
    use crate::api::state::AppConfig;
    use crate::engine::testutil::StubFetcher;
    use crate::engine::DocumentEngine;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use std::sync::Arc;

    fn test_state() -> web::Data<ApiState> {
        let engine = DocumentEngine::new(Arc::new(StubFetcher::empty()));
        web::Data::new(ApiState::with_engine(engine, AppConfig::default()))
    }

    fn workbook_payload() -> serde_json::Value {
        serde_json::json!({
            "kind": "budget_workbook",
            "clientName": "Casa Flores",
            "projectName": "Loft Makeover",
            "items": [{
                "type": "budget",
                "position": 1,
                "name": "Lounge chair",
                "category": "furniture",
                "room": "Living Room",
                "unitPrice": 420.0,
                "quantity": 2.0,
                "supplier": "Nordic Oak Co"
            }]
        })
    }

    #[actix_rt::test]
    async fn generate_streams_the_finished_workbook() {
        let app = test::init_service(
            App::new().app_data(test_state()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/documents/generate")
            .set_json(workbook_payload())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
        assert_eq!(
            content_type,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        let disposition =
            resp.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
        assert_eq!(disposition, "attachment; filename=\"budget-casa-flores.xlsx\"");

        let body = test::read_body(resp).await;
        assert!(body.starts_with(b"PK"));
    }

    #[actix_rt::test]
    async fn proposal_comes_back_as_pdf() {
        let app = test::init_service(
            App::new().app_data(test_state()).configure(configure_routes),
        )
        .await;

        let mut payload = workbook_payload();
        payload["kind"] = serde_json::json!("proposal");
        let req = test::TestRequest::post()
            .uri("/api/v1/documents/generate")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
        assert_eq!(content_type, "application/pdf");
        let body = test::read_body(resp).await;
        assert!(body.starts_with(b"%PDF"));
    }

    #[actix_rt::test]
    async fn blank_client_name_is_a_422() {
        let app = test::init_service(
            App::new().app_data(test_state()).configure(configure_routes),
        )
        .await;

        let mut payload = workbook_payload();
        payload["clientName"] = serde_json::json!("   ");
        let req = test::TestRequest::post()
            .uri("/api/v1/documents/generate")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("client name"));
    }

    #[actix_rt::test]
    async fn schedule_kind_without_schedule_is_a_422() {
        let app = test::init_service(
            App::new().app_data(test_state()).configure(configure_routes),
        )
        .await;

        let mut payload = workbook_payload();
        payload["kind"] = serde_json::json!("schedule_document");
        let req = test::TestRequest::post()
            .uri("/api/v1/documents/generate")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("schedule"));
    }

    #[actix_rt::test]
    async fn health_probe_answers() {
        let app = test::init_service(
            App::new().app_data(test_state()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
    }
}
