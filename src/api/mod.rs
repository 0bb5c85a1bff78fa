use actix_web::{HttpResponse, Responder, get};
use serde_json::json;

pub mod attendance;
pub mod leave_balance;

#[cfg(test)]
mod tests;

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
