use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

pub async fn text_history(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.dashboard.require_login().await?;
    Ok(HttpResponse::Ok().json(state.dashboard.history.text_history()?))
}

pub async fn image_history(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.dashboard.require_login().await?;
    Ok(HttpResponse::Ok().json(state.dashboard.history.image_history()?))
}

pub async fn image_png(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.dashboard.require_login().await?;
    let id = path.into_inner();
    let bytes = state.dashboard.history.image_png(id)?;

    Ok(HttpResponse::Ok()
        .content_type("image/png")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"genora-image-{}.png\"", id),
        ))
        .body(bytes))
}

pub async fn usage(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.dashboard.require_login().await?;
    Ok(HttpResponse::Ok().json(state.dashboard.history.usage_stats()?))
}
