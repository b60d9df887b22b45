//! Auth HTTP handlers: login page, signup, logout.

use axum::{
    extract::{rejection::FormRejection, State},
    response::{Html, Response},
    Form,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::handlers::http::{found, AppState};
use crate::middleware::session::Session;
use crate::models::Flash;
use crate::services::account::{AccountService, SignupForm, ACCOUNT_CREATED};
use crate::views::{self, LoginPage};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Body of a POST to `/`. The login page carries two forms; the submit
/// button's `login` or `signup` field says which one was sent.
#[derive(Debug, Default, Deserialize)]
pub struct LoginPageForm {
    #[serde(default)]
    pub signup: Option<String>,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl LoginPageForm {
    fn into_signup(self) -> SignupForm {
        SignupForm {
            username: self.username,
            password: self.password,
            confirm_password: self.confirm_password,
            email: self.email,
        }
    }
}

/// GET /
pub async fn login_page(State(state): State<AppState>, mut session: Session) -> AppResult<Response> {
    let page = render_login(&mut session, false, None);
    session.respond(&state, Html(page)).await
}

/// POST /: log in, or sign up when the signup form was submitted.
/// A body that is not a urlencoded form carries no marker and gets the plain page.
pub async fn login_submit(
    State(state): State<AppState>,
    mut session: Session,
    form: Result<Form<LoginPageForm>, FormRejection>,
) -> AppResult<Response> {
    let form = form_or_default(form);
    if form.signup.is_some() {
        return signup_flow(&state, session, form.into_signup()).await;
    }

    if form.login.is_some() {
        match state.users().authenticate(&form.username, &form.password).await {
            Ok(user) => {
                session.login(user.id);
                info!(user_id = %user.id, username = %user.username, "login");
                return session.respond(&state, found("/home/")).await;
            }
            Err(AppError::InvalidCredentials) => {
                debug!(username = %form.username, "login rejected");
                session.push_flash(Flash::error(INVALID_CREDENTIALS));
            }
            Err(e) => return Err(e),
        }
    }

    let page = render_login(&mut session, false, None);
    session.respond(&state, Html(page)).await
}

/// GET /signup/: login page with the signup form showing.
pub async fn signup_page(State(state): State<AppState>, mut session: Session) -> AppResult<Response> {
    let page = render_login(&mut session, true, None);
    session.respond(&state, Html(page)).await
}

/// POST /signup/
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    form: Result<Form<SignupForm>, FormRejection>,
) -> AppResult<Response> {
    signup_flow(&state, session, form_or_default(form)).await
}

/// GET|POST /logout/: always ends up anonymous.
pub async fn logout(State(state): State<AppState>, mut session: Session) -> AppResult<Response> {
    if let Some(user_id) = session.user_id() {
        info!(%user_id, "logout");
    }
    session.logout();
    session.respond(&state, found("/")).await
}

async fn signup_flow(state: &AppState, mut session: Session, form: SignupForm) -> AppResult<Response> {
    match AccountService::signup(state.users(), &form).await {
        Ok(_) => {
            session.push_flash(Flash::success(ACCOUNT_CREATED));
            session.respond(state, found("/")).await
        }
        Err(err) => {
            let Some(message) = err.user_message() else {
                return Err(err);
            };
            debug!(username = %form.username.trim(), error = %message, "signup rejected");
            let page = render_login(&mut session, true, Some(&message));
            session.respond(state, Html(page)).await
        }
    }
}

/// Unreadable bodies count as empty forms, so validation reports them.
fn form_or_default<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    match form {
        Ok(Form(value)) => value,
        Err(rejection) => {
            debug!(error = %rejection, "form body ignored");
            T::default()
        }
    }
}

fn render_login(session: &mut Session, signup_mode: bool, error: Option<&str>) -> String {
    let messages = session.take_flashes();
    views::login_page(&LoginPage {
        signup_mode,
        error,
        messages: &messages,
    })
}
