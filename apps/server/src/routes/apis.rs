use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;

use kokoromi_monitor::MonitorService;
use kokoromi_monitor::database::models::{NewTarget, TargetFilter, TargetId, TargetPatch};

use crate::error::AppError;
use crate::response::ApiResponse;

macros_utils::routes! {
    route list_apis,
    route create_api,
    route update_api,
    route delete_api,
    route check_api,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    category: Option<String>,
}

#[get("/api/admin/apis")]
pub async fn list_apis(
    service: web::Data<MonitorService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = TargetFilter { category: query.into_inner().category, active: None };
    let targets = service.list_targets(&filter).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(targets)))
}

#[post("/api/admin/apis")]
pub async fn create_api(
    service: web::Data<MonitorService>,
    body: web::Json<NewTarget>,
) -> Result<HttpResponse, AppError> {
    let target = service.add_target(body.into_inner()).await?;

    Ok(HttpResponse::Created()
        .json(ApiResponse::data(target).with_message("API status created successfully")))
}

#[put("/api/admin/apis/{id}")]
pub async fn update_api(
    service: web::Data<MonitorService>,
    id: web::Path<TargetId>,
    body: web::Json<TargetPatch>,
) -> Result<HttpResponse, AppError> {
    let target = service.update_target(id.into_inner(), body.into_inner()).await?;

    Ok(HttpResponse::Ok()
        .json(ApiResponse::data(target).with_message("API status updated successfully")))
}

#[delete("/api/admin/apis/{id}")]
pub async fn delete_api(
    service: web::Data<MonitorService>,
    id: web::Path<TargetId>,
) -> Result<HttpResponse, AppError> {
    service.remove_target(id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("API status deleted successfully")))
}

/// Probe now, outside the schedule, and return the refreshed record
#[post("/api/admin/apis/{id}/check")]
pub async fn check_api(
    service: web::Data<MonitorService>,
    id: web::Path<TargetId>,
) -> Result<HttpResponse, AppError> {
    let target = service.check_target(id.into_inner()).await?;

    Ok(HttpResponse::Ok()
        .json(ApiResponse::data(target).with_message("API health check completed")))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    use kokoromi_monitor::ProbeOutcome;

    use crate::routes::testing::service;
    use crate::routes::{json_config, routes};

    macro_rules! app {
        ($service:expr) => {
            test::init_service(
                App::new().app_data($service.clone()).app_data(json_config()).configure(routes),
            )
            .await
        };
    }

    macro_rules! create {
        ($app:expr, $body:expr $(,)?) => {{
            let req = test::TestRequest::post().uri("/api/admin/apis").set_json($body).to_request();
            let resp = test::call_service($app, req).await;
            let status = resp.status();
            let body: Value = test::read_body_json(resp).await;
            (status, body)
        }};
    }

    #[actix_web::test]
    async fn test_create_returns_unknown_record() {
        let service = service(ProbeOutcome::up(12));
        let app = app!(service);

        let (status, body) = create!(
            &app,
            json!({
                "name": "Hi-Anime API",
                "url": "https://anime.test",
                "checkInterval": 300,
                "isActive": false
            }),
        );

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "unknown");
        assert_eq!(body["data"]["category"], "general");
        assert!(body["data"]["lastCheck"].is_null());
    }

    #[actix_web::test]
    async fn test_create_rejects_bad_input() {
        let service = service(ProbeOutcome::up(12));
        let app = app!(service);

        let (status, body) =
            create!(&app, json!({ "name": "X", "url": "https://x.test", "checkInterval": 5 }));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("at least 30"));

        let (status, _) = create!(&app, json!({ "name": "X", "url": "ftp://x.test" }));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/admin/apis")
            .insert_header(("content-type", "application/json"))
            .set_payload("{ not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_duplicate_name_conflicts() {
        let service = service(ProbeOutcome::up(12));
        let app = app!(service);

        let target = json!({ "name": "X", "url": "https://x.test", "isActive": false });
        assert_eq!(create!(&app, target.clone()).0, StatusCode::CREATED);

        let (status, body) = create!(&app, target);
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_update_and_delete() {
        let service = service(ProbeOutcome::up(12));
        let app = app!(service);

        let (_, body) = create!(&app, json!({ "name": "X", "url": "https://x.test" }));
        let id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(service.monitoring_status().await.active_monitors, 1);

        let req = test::TestRequest::put()
            .uri(&format!("/api/admin/apis/{id}"))
            .set_json(json!({ "isActive": false, "checkInterval": 60 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["isActive"], false);
        assert_eq!(body["data"]["checkInterval"], 60);
        assert_eq!(service.monitoring_status().await.active_monitors, 0);

        let delete =
            || test::TestRequest::delete().uri(&format!("/api/admin/apis/{id}")).to_request();
        assert_eq!(test::call_service(&app, delete()).await.status(), StatusCode::OK);
        assert_eq!(test::call_service(&app, delete()).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_update_missing_target() {
        let service = service(ProbeOutcome::up(12));
        let app = app!(service);

        let req = test::TestRequest::put()
            .uri("/api/admin/apis/404")
            .set_json(json!({ "name": "Y" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_manual_check_returns_refreshed_record() {
        let service = service(ProbeOutcome::warning(40, "HTTP 404: Not Found"));
        let app = app!(service);

        let (_, body) =
            create!(&app, json!({ "name": "X", "url": "https://x.test", "isActive": false }));
        let id = body["data"]["id"].as_i64().unwrap();

        let req =
            test::TestRequest::post().uri(&format!("/api/admin/apis/{id}/check")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["status"], "warning");
        assert_eq!(body["data"]["responseTime"], 40);
        assert_eq!(body["data"]["lastError"], "HTTP 404: Not Found");
        assert!(!body["data"]["lastCheck"].is_null());
    }

    #[actix_web::test]
    async fn test_list_filters_by_category() {
        let service = service(ProbeOutcome::up(12));
        let app = app!(service);

        create!(
            &app,
            json!({ "name": "a", "url": "https://a.test", "category": "anime", "isActive": false })
        );
        create!(&app, json!({ "name": "b", "url": "https://b.test", "isActive": false }));

        let req = test::TestRequest::get().uri("/api/admin/apis").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::get().uri("/api/admin/apis?category=anime").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let names: Vec<_> =
            body["data"].as_array().unwrap().iter().map(|t| t["name"].clone()).collect();
        assert_eq!(names, vec![json!("a")]);
    }
}
