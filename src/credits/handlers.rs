use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::AppState;

pub async fn get_credits(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let credits = state.dashboard.credits().await?;
    Ok(HttpResponse::Ok().json(credits))
}
