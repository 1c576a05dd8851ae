use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::server::CallbackSlot;

pub async fn health(Extension(slot): Extension<CallbackSlot>) -> Json<Value> {
    let received = slot.lock().await.is_some();
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "redirect_received": received
    }))
}
