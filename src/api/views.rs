//! Minimal HTML views.
//!
//! The login view carries the `invalidLogin` flag as `data-invalid-login` on
//! the form so the page and tests can key off it without parsing prose.

use axum::{http::StatusCode, response::Html};

use crate::auth::Identity;

const INVALID_LOGIN_MESSAGE: &str = "Invalid username or password";

#[must_use]
pub fn login_page(invalid_login: bool, signed_in_as: Option<&Identity>) -> Html<String> {
    let mut body = String::new();

    if let Some(identity) = signed_in_as {
        body.push_str(&format!(
            r#"<p class="signed-in">Signed in as {}. <a href="/">Continue</a></p>"#,
            escape(identity.display_name())
        ));
    }

    if invalid_login {
        body.push_str(&format!(
            r#"<p class="error" role="alert">{INVALID_LOGIN_MESSAGE}</p>"#
        ));
    }

    body.push_str(&format!(
        r#"<form method="post" action="/login" data-invalid-login="{invalid_login}">
<label>Username <input type="text" name="username" autocomplete="username" required></label>
<label>Password <input type="password" name="password" autocomplete="current-password" required></label>
<button type="submit">Login</button>
</form>"#
    ));

    Html(layout("Login", &body))
}

#[must_use]
pub fn index_page(identity: &Identity) -> Html<String> {
    let body = format!(
        r#"<h1>Hello, {}!</h1>
<form method="post" action="/logout"><button type="submit">Logout</button></form>"#,
        escape(identity.display_name())
    );
    Html(layout("Home", &body))
}

/// Named error views, chosen by status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorView {
    NotFound,
    InternalServerError,
    Generic,
}

impl ErrorView {
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::INTERNAL_SERVER_ERROR => Self::InternalServerError,
            _ => Self::Generic,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::NotFound => "errors/404",
            Self::InternalServerError => "errors/500",
            Self::Generic => "errors/default",
        }
    }

    #[must_use]
    pub fn render(self, status: StatusCode) -> Html<String> {
        let (title, message) = match self {
            Self::NotFound => ("Not Found", "The page you are looking for does not exist."),
            Self::InternalServerError => ("Internal Server Error", "Something went wrong."),
            Self::Generic => (
                status.canonical_reason().unwrap_or("Error"),
                "The request could not be processed.",
            ),
        };
        let body = format!(
            r#"<section class="error" data-view="{}" data-status="{}"><h1>{}</h1><p>{}</p></section>"#,
            self.name(),
            status.as_u16(),
            escape(title),
            message
        );
        Html(layout(title, &body))
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{}</title></head>
<body>
<main>
{body}
</main>
</body>
</html>"#,
        escape(title)
    )
}

fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
