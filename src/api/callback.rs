use axum::{
    Extension,
    extract::Query,
    response::{Html, Redirect},
};

use crate::{server::CallbackSlot, server::DONE_PATH, types::CallbackParams};

/// Receives the authorization redirect.
///
/// The parameters are handed to the waiting command, the browser is sent on to
/// a page without query string so the code does not stay in the address bar
/// or the history. Only the first redirect carrying a `code` or an `error` is
/// kept; requests without either (reloads, prefetches) are ignored.
pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(slot): Extension<CallbackSlot>,
) -> Redirect {
    if params.code.is_none() && params.error.is_none() {
        return Redirect::to(DONE_PATH);
    }

    let mut lock = slot.lock().await;
    if lock.is_none() {
        *lock = Some(params);
    }
    Redirect::to(DONE_PATH)
}

pub async fn done() -> Html<&'static str> {
    Html("<h2>Authorization received.</h2><p>Close this window and return to the terminal.</p>")
}
