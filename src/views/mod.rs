//! Server-rendered HTML pages.

use axum::http::StatusCode;

use crate::models::{Flash, User, Wallet};

/// What the login page shows.
pub struct LoginPage<'a> {
    /// Show the signup form instead of the login form.
    pub signup_mode: bool,
    pub error: Option<&'a str>,
    pub messages: &'a [Flash],
}

/// Escape text for HTML element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/css/style.css">
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

fn messages_block(messages: &[Flash]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|m| {
            format!(
                r#"<li class="message {}">{}</li>"#,
                m.level.as_str(),
                escape(&m.message)
            )
        })
        .collect();
    format!(r#"<ul class="messages">{items}</ul>"#)
}

pub fn login_page(page: &LoginPage<'_>) -> String {
    let (login_display, signup_display) = if page.signup_mode {
        ("none", "block")
    } else {
        ("block", "none")
    };
    let error = page
        .error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape(e)))
        .unwrap_or_default();
    let body = format!(
        r#"<main class="auth">
{messages}
{error}
<section id="loginForm" style="display: {login_display}">
<h1>Log In</h1>
<form method="post" action="/">
<input type="text" name="username" placeholder="Username" autocomplete="username">
<input type="password" name="password" placeholder="Password" autocomplete="current-password">
<button type="submit" name="login" value="1">Log In</button>
</form>
<p><a href="/signup/">Sign Up</a></p>
</section>
<section id="signupForm" style="display: {signup_display}">
<h1>Sign Up</h1>
<form method="post" action="/signup/">
<input type="text" name="username" placeholder="Username" autocomplete="username">
<input type="email" name="email" placeholder="Email (optional)" autocomplete="email">
<input type="password" name="password" placeholder="Password" autocomplete="new-password">
<input type="password" name="confirm_password" placeholder="Confirm password" autocomplete="new-password">
<button type="submit" name="signup" value="1">Sign Up</button>
</form>
<p><a href="/">Log In</a></p>
</section>
</main>"#,
        messages = messages_block(page.messages),
    );
    layout(if page.signup_mode { "Sign Up" } else { "Log In" }, &body)
}

pub fn home_page() -> String {
    layout(
        "Home",
        r#"<main class="home">
<h1>Welcome</h1>
<nav>
<a href="/onboarding/">Get started</a>
<a href="/wallet/">My wallet</a>
<a href="/logout/">Log out</a>
</nav>
</main>"#,
    )
}

pub fn onboarding_page() -> String {
    layout(
        "Onboarding",
        r#"<main class="onboarding">
<h1>Let's get you set up</h1>
<p>Your account comes with a wallet. Open it any time from the home page.</p>
<a href="/home/">Continue</a>
</main>"#,
    )
}

pub fn wallet_page(user: &User, wallet: &Wallet) -> String {
    let body = format!(
        r#"<main class="wallet">
<h1>{username}'s wallet</h1>
<dl>
<dt>Wallet</dt><dd id="wallet-id">{wallet_id}</dd>
<dt>Opened</dt><dd>{created}</dd>
</dl>
<nav>
<a href="/home/">Home</a>
<a href="/logout/">Log out</a>
</nav>
</main>"#,
        username = escape(&user.username),
        wallet_id = wallet.id,
        created = wallet.created_at.format("%Y-%m-%d"),
    );
    layout("Wallet", &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<main class="error">
<h1>{status}</h1>
<p>{message}</p>
<a href="/">Back</a>
</main>"#,
        status = status.as_u16(),
        message = escape(message),
    );
    layout("Error", &body)
}
