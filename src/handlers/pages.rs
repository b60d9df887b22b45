//! Page handlers: home, onboarding, wallet.

use axum::{extract::State, response::Html};
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::handlers::http::AppState;
use crate::middleware::session::Session;
use crate::views;

/// GET /home/
pub async fn home() -> Html<String> {
    Html(views::home_page())
}

/// GET /onboarding/
pub async fn onboarding() -> Html<String> {
    Html(views::onboarding_page())
}

/// GET /wallet/: authenticated only; the wallet is created on first visit.
pub async fn wallet(State(state): State<AppState>, session: Session) -> AppResult<Html<String>> {
    let user_id = session.require_user()?;
    let Some(user) = state.users().find_by_id(user_id).await? else {
        warn!(%user_id, "session refers to a missing user");
        return Err(AppError::LoginRequired);
    };
    let wallet = state.users().get_or_create_wallet(user.id).await?;
    Ok(Html(views::wallet_page(&user, &wallet)))
}
