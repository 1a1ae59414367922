pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::compliance::handlers as compliance;
use crate::errors::AppError;
use crate::ingestion::handlers as datasets;
use crate::simulation::handlers as simulation;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Dataset API
        .route("/api/v1/datasets/ingest", post(datasets::handle_ingest))
        .route("/api/v1/datasets/demo", get(datasets::handle_demo))
        // Simulation API
        .route("/api/v1/simulation", post(simulation::handle_simulate))
        // Compliance API
        .route("/api/v1/compliance/status", post(compliance::handle_status))
        .route("/api/v1/compliance/report", post(compliance::handle_report))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;

    const BOUNDARY: &str = "gridcarbon-test-boundary";
    const PLANT_CSV: &str = "Month;Year;Generation_MW;Gas_Consumption_m3;CO2_Emissions_tonns\n\
                             January;2021;1000;250000;400\n\
                             February;2021;1000,0;240000;380,5\n";

    fn app() -> Router {
        build_router(AppState::new(Config::default()))
    }

    fn multipart_request(filename: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/api/v1/datasets/ingest")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn single_record() -> Value {
        json!([{
            "month": "January",
            "year": 2022,
            "generation_mw": 1000.0,
            "gas_consumption_m3": 250000.0,
            "co2_emissions_tonnes": 400.0,
            "carbon_intensity": 400.0
        }])
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_ingest_upload() {
        let response = app()
            .oneshot(multipart_request("plant.csv", PLANT_CSV))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["row_count"], 2);
        assert_eq!(body["strategy"], "semicolon");
        assert_eq!(body["columns"][5], "Carbon_Intensity_kgCO2_MWh");
        assert_eq!(body["records"][1]["co2_emissions_tonnes"], 380.5);
    }

    #[tokio::test]
    async fn test_ingest_missing_column_details() {
        let csv = "Month;Generation_MW;Gas_Consumption_m3;CO2_Emissions_tonns\nMay;1;2;3\n";
        let response = app()
            .oneshot(multipart_request("plant.csv", csv))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = read_json(response).await;
        assert_eq!(body["error"]["code"], "MISSING_COLUMNS");
        assert_eq!(body["error"]["details"]["missing"], json!(["Year"]));
    }

    #[tokio::test]
    async fn test_ingest_rejects_unsupported_type() {
        let response = app()
            .oneshot(multipart_request("plant.xlsx", PLANT_CSV))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_simulate_reports_min_blend() {
        let request = json_request(
            "/api/v1/simulation",
            json!({ "records": single_record(), "blend_percent": 0 }),
        );
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["compliance"]["is_compliant"], false);
        assert_eq!(body["compliance"]["min_blend_for_compliance"], 13);
        assert_eq!(body["compliance"]["threshold"], 350.0);
        assert_eq!(body["compliance"]["status"], "non_compliant");
    }

    #[tokio::test]
    async fn test_simulate_rejects_out_of_range_blend() {
        let request = json_request(
            "/api/v1/simulation",
            json!({ "records": single_record(), "blend_percent": 101 }),
        );
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"]["code"], "BLEND_OUT_OF_RANGE");
    }

    #[tokio::test]
    async fn test_simulate_empty_records() {
        let request = json_request(
            "/api/v1/simulation",
            json!({ "records": [], "blend_percent": 10 }),
        );
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_simulate_rejects_negative_records() {
        let records = json!([
            {
                "month": "January", "year": 2022, "generation_mw": 1000.0,
                "gas_consumption_m3": 0.0, "co2_emissions_tonnes": -800.0,
                "carbon_intensity": -800.0
            },
            {
                "month": "February", "year": 2022, "generation_mw": -5.0,
                "gas_consumption_m3": -1.0, "co2_emissions_tonnes": 400.0,
                "carbon_intensity": 0.0
            }
        ]);
        for uri in ["/api/v1/simulation", "/api/v1/compliance/status", "/api/v1/compliance/report"] {
            let request = json_request(uri, json!({ "records": records, "blend_percent": 50 }));
            let response = app().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");

            let body = read_json(response).await;
            assert_eq!(body["error"]["code"], "INVALID_RECORD");
            assert_eq!(body["error"]["details"]["index"], 0);
        }
    }

    #[tokio::test]
    async fn test_status_with_custom_threshold() {
        let request = json_request(
            "/api/v1/compliance/status",
            json!({ "records": single_record(), "threshold": 400.0 }),
        );
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["is_compliant"], true);
        assert_eq!(body["min_blend_for_compliance"], 0);
    }

    #[tokio::test]
    async fn test_report_covers_three_regimes() {
        let request = json_request(
            "/api/v1/compliance/report",
            json!({ "records": single_record(), "blend_percent": 20, "facility": "Unit 2" }),
        );
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["facility"], "Unit 2");
        let regimes: Vec<&str> = body["regimes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["regime"].as_str().unwrap())
            .collect();
        assert_eq!(regimes, vec!["eu_ets", "csrd", "mrv"]);
        assert_eq!(body["metrics"]["blend_percent"], 20);
        assert_eq!(body["metrics"]["monthly_generation"], 1000.0);
        let ratio = body["metrics"]["efficiency_ratio"].as_f64().unwrap();
        assert!((ratio - 1000.0 / 320.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_demo_dataset() {
        let response = app()
            .oneshot(Request::get("/api/v1/datasets/demo").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["row_count"], 48);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = app()
            .oneshot(Request::get("/api/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
