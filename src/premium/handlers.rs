use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::AppState;

pub async fn verify(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let credits = state.dashboard.verify_premium().await?;
    Ok(HttpResponse::Ok().json(credits))
}

pub async fn cancel(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let credits = state.dashboard.cancel_premium().await?;
    Ok(HttpResponse::Ok().json(credits))
}
