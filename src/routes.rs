use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{database, error::AppError, state};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    #[serde(default)]
    pub reg_no: Option<String>,
    #[serde(default)]
    pub verification_no: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDetails {
    pub reg_no: String,
    pub name: String,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub venue: Option<String>,
    pub verification_no: String,
}

pub async fn validate_handler(
    State(state): State<Arc<state::State>>,
    Json(payload): Json<ValidateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let reg_no = non_empty(payload.reg_no).ok_or(AppError::MissingInput)?;
    // codes are stored uppercased, match case-insensitively
    let verification_no = non_empty(payload.verification_no)
        .ok_or(AppError::MissingInput)?
        .to_uppercase();

    let row = database::find_registration(&state.db, &reg_no, &verification_no)
        .await?
        .ok_or(AppError::InvalidCombination)?;

    Ok(Json(json!({
        "success": true,
        "message": "Registration validated successfully",
        "data": RegistrationDetails {
            reg_no: row.reg_no,
            name: row.name,
            father_name: row.father_name,
            mother_name: row.mother_name,
            venue: row.venue,
            verification_no: row.verification_no,
        },
    })))
}

/// Debug listing of every record. Unauthenticated on purpose, the dataset is
/// a fixed handful of sample rows.
pub async fn registrations_handler(
    State(state): State<Arc<state::State>>,
) -> Result<impl IntoResponse, AppError> {
    let rows = database::list_registrations(&state.db).await?;

    Ok(Json(json!({
        "success": true,
        "data": rows,
    })))
}

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn endpoint_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Endpoint not found",
        })),
    )
}

fn non_empty(input: Option<String>) -> Option<String> {
    let trimmed = input?.trim().to_string();

    if trimmed.is_empty() { None } else { Some(trimmed) }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::{
        app,
        config::{Config, DEV_FALLBACK_SECRET},
        database::memory_pool,
        seed::seed,
        state::State,
    };

    async fn test_app() -> Router {
        let pool = memory_pool().await;
        seed(&pool, DEV_FALLBACK_SECRET).await.unwrap();

        let state = Arc::new(State {
            config: Config {
                port: 0,
                database_path: ":memory:".to_string(),
                secret: DEV_FALLBACK_SECRET.to_string(),
            },
            db: pool,
        });

        app(state)
    }

    async fn post_validate(app: Router, payload: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/validate")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_valid_pair_returns_record() {
        let app = test_app().await;

        let (status, body) = post_validate(
            app,
            json!({ "regNo": "12345678", "verificationNo": "642FEECB" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!("Registration validated successfully"));
        assert_eq!(body["data"]["regNo"], json!("12345678"));
        assert_eq!(body["data"]["name"], json!("Sohel Rahman"));
        assert_eq!(body["data"]["fatherName"], json!("Siddiqur Rahman"));
        assert_eq!(body["data"]["motherName"], json!("Hosne Ara Begu"));
        assert_eq!(body["data"]["venue"], json!("BUET, ECE Building, Room 233"));
        assert_eq!(body["data"]["verificationNo"], json!("642FEECB"));
    }

    #[tokio::test]
    async fn test_code_match_is_case_insensitive() {
        let app = test_app().await;

        let (status, body) = post_validate(
            app,
            json!({ "regNo": "12345678", "verificationNo": "642feecb" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
    }

    #[tokio::test]
    async fn test_surrounding_whitespace_is_ignored() {
        let app = test_app().await;

        let (status, body) = post_validate(
            app,
            json!({ "regNo": " 12345678 ", "verificationNo": " 642FEECB " }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["regNo"], json!("12345678"));
    }

    #[tokio::test]
    async fn test_no_match_is_generic_for_wrong_code_and_unknown_reg_no() {
        let wrong_code = post_validate(
            test_app().await,
            json!({ "regNo": "12345678", "verificationNo": "WRONGCOD" }),
        )
        .await;
        let unknown_reg = post_validate(
            test_app().await,
            json!({ "regNo": "00000000", "verificationNo": "642FEECB" }),
        )
        .await;

        assert_eq!(wrong_code.0, StatusCode::NOT_FOUND);
        // identical envelopes, nothing leaks which field was wrong
        assert_eq!(wrong_code, unknown_reg);
        assert_eq!(
            wrong_code.1["message"],
            json!("Invalid registration number or verification number")
        );
    }

    #[tokio::test]
    async fn test_missing_input_is_rejected() {
        for payload in [
            json!({}),
            json!({ "regNo": "12345678" }),
            json!({ "verificationNo": "642FEECB" }),
            json!({ "regNo": "", "verificationNo": "642FEECB" }),
            json!({ "regNo": "12345678", "verificationNo": "   " }),
        ] {
            let (status, body) = post_validate(test_app().await, payload).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["success"], json!(false));
            assert_eq!(
                body["message"],
                json!("Registration number and verification number are required")
            );
        }
    }

    #[tokio::test]
    async fn test_registrations_listing() {
        let (status, body) = get_json(test_app().await, "/api/registrations").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));

        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0]["regNo"], json!("11223344"));
        assert_eq!(rows[0]["name"], json!("Alice Smith"));
        assert_eq!(rows[0]["verificationNo"], json!("4F1E1C33"));
    }

    #[tokio::test]
    async fn test_health_reports_timestamp() {
        let (status, body) = get_json(test_app().await, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("OK"));

        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_unmatched_route_returns_json_404() {
        let (status, body) = get_json(test_app().await, "/api/missing").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Endpoint not found"));
    }
}
