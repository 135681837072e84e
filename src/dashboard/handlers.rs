use actix_web::{web, HttpResponse};

use crate::dashboard::{ImageRequest, TextRequest};
use crate::error::AppError;
use crate::generation::IMAGE_TEMPLATES;
use crate::AppState;

pub async fn generate_text(
    req: web::Json<TextRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let record = state.dashboard.generate_text(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn generate_image(
    req: web::Json<ImageRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let record = state.dashboard.generate_image(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn image_templates() -> HttpResponse {
    HttpResponse::Ok().json(IMAGE_TEMPLATES)
}
