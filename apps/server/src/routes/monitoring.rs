use actix_web::{HttpResponse, get, web};

use kokoromi_monitor::MonitorService;

use crate::error::AppError;
use crate::response::ApiResponse;

macros_utils::routes! {
    route monitoring_status,
    route dashboard_apis,
}

#[get("/api/admin/monitoring/status")]
pub async fn monitoring_status(service: web::Data<MonitorService>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::data(service.monitoring_status().await))
}

#[get("/api/admin/dashboard/apis")]
pub async fn dashboard_apis(service: web::Data<MonitorService>) -> Result<HttpResponse, AppError> {
    let stats = service.dashboard_stats().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(stats)))
}
