use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::services::asciidoc_service::AsciiDocResponse;
use crate::services::document_service::require_text;
use crate::state::AppState;
use crate::utils::AppError;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AsciiDocRequest {
    /// AsciiDoc source
    pub text: Option<String>,
}

/// POST /api/v1/asciidoc-to-html - Render AsciiDoc source
///
/// No sign-in needed. The converter's exit status, stdout and stderr are
/// passed through as `success`, `html` and `error_message`.
#[utoipa::path(
    post,
    path = "/api/v1/asciidoc-to-html",
    tag = "AsciiDoc",
    request_body = AsciiDocRequest,
    responses(
        (status = 200, description = "Converter result, or an error payload", body = AsciiDocResponse)
    )
)]
pub async fn asciidoc_to_html(
    state: web::Data<AppState>,
    request: web::Json<AsciiDocRequest>,
) -> Result<HttpResponse, AppError> {
    let text = require_text(request.text.as_deref(), &state.limits)?;

    log::info!("📄 POST /asciidoc-to-html - {} bytes", text.len());

    let response = state.converter.convert(text).await;
    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use crate::config::DocumentLimits;
    use crate::test_support::{test_app, test_state, test_state_with_limits, TEST_MAX_TEXT};
    use actix_web::test;
    use serde_json::{json, Value};

    fn escaped_body(unit: &str, count: usize) -> String {
        format!(r#"{{"text": "{}"}}"#, unit.repeat(count))
    }

    #[actix_web::test]
    async fn test_converter_output_passed_through() {
        let (state, _) = test_state();
        let app = test_app!(state);

        // The test converter is `cat`
        let req = test::TestRequest::post()
            .uri("/api/v1/asciidoc-to-html")
            .set_json(json!({"text": "= Title\n"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"success": true, "html": "= Title\n", "error_message": ""}));
    }

    #[actix_web::test]
    async fn test_text_at_limit_accepted() {
        let (state, _) = test_state();
        let app = test_app!(state);

        let text = "é".repeat(TEST_MAX_TEXT);
        let req = test::TestRequest::post()
            .uri("/api/v1/asciidoc-to-html")
            .set_json(json!({"text": text}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["html"], text.as_str());
    }

    #[actix_web::test]
    async fn test_escaped_text_at_limit_accepted() {
        let max = 20_000;
        let (state, _) = test_state_with_limits(DocumentLimits {
            max_source_text_size: max,
            max_title_size: 20,
        });
        let app = test_app!(state);

        // Each escape decodes to one character (a surrogate pair for the emoji)
        for unit in [r"\u6587", r"\uD83D\uDE00"] {
            let req = test::TestRequest::post()
                .uri("/api/v1/asciidoc-to-html")
                .insert_header(("content-type", "application/json"))
                .set_payload(escaped_body(unit, max))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["success"], true, "{} x {}", unit, max);
            assert_eq!(body["html"].as_str().unwrap().chars().count(), max);

            let req = test::TestRequest::post()
                .uri("/api/v1/asciidoc-to-html")
                .insert_header(("content-type", "application/json"))
                .set_payload(escaped_body(unit, max + 1))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body, json!({"success": false, "error_message": "Invalid request"}));
        }
    }

    #[actix_web::test]
    async fn test_bad_requests() {
        let (state, _) = test_state();
        let app = test_app!(state);

        let bodies = [
            json!({"text": "x".repeat(TEST_MAX_TEXT + 1)}),
            json!({}),
            json!({"text": null}),
            json!({"text": ["a"]}),
        ];
        for body in bodies {
            let req = test::TestRequest::post()
                .uri("/api/v1/asciidoc-to-html")
                .set_json(&body)
                .to_request();
            let res: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(res, json!({"success": false, "error_message": "Invalid request"}));
        }

        let req = test::TestRequest::post()
            .uri("/api/v1/asciidoc-to-html")
            .insert_header(("content-type", "text/plain"))
            .set_payload("= Title")
            .to_request();
        let res: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(res["error_message"], "Invalid request");
    }
}
