//! Login and logout
//!
//! A successful login stores the token and user, drops any snapshot fetched
//! under a previous session and sends the browser to the transactions page.

use axum::extract::Form;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use remitdash_core::session::{load_session, save_session};
use remitdash_core::{CoreError, Session};
use remitdash_utils::escape_html;

use crate::error::status_for;
use crate::{base_html, end_session, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login page; already signed-in users go straight to the dashboard
pub async fn page_login(state: axum::extract::State<AppState>) -> Result<Response, ApiError> {
    if load_session(state.sessions.as_ref()).await?.is_some() {
        return Ok(Redirect::to("/transactions").into_response());
    }
    Ok(Html(render_login_page("", None)).into_response())
}

/// Submit credentials to the records API
pub async fn login_submit(
    state: axum::extract::State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        let html = render_login_page(email, Some("Email and password are required."));
        return Ok((StatusCode::BAD_REQUEST, Html(html)).into_response());
    }

    match state.client.login(email, &form.password).await {
        Ok(response) => {
            let session = Session::from(response);
            save_session(state.sessions.as_ref(), &session).await?;
            state.dashboard.write().await.clear();
            log::info!("Signed in as {} ({})", email, session.role());
            Ok(Redirect::to("/transactions").into_response())
        }
        Err(e) => {
            let error = CoreError::from(e);
            let status = status_for(error.code());
            let message = match &error {
                CoreError::Unreachable { .. } => {
                    "The records service is offline. Try again later.".to_string()
                }
                _ => error.user_message(),
            };
            ApiError::from(error).log("login");
            Ok((status, Html(render_login_page(email, Some(&message)))).into_response())
        }
    }
}

/// Clear the session and return to the login page
pub async fn logout(state: axum::extract::State<AppState>) -> Result<Redirect, ApiError> {
    end_session(&state).await?;
    log::info!("Signed out");
    Ok(Redirect::to("/login"))
}

fn render_login_page(email: &str, error: Option<&str>) -> String {
    let error_html = error
        .map(|e| format!("<p class='text-sm text-red-600 mb-4' role='alert'>{}</p>", escape_html(e)))
        .unwrap_or_default();

    base_html(
        "Sign in",
        &format!(
            r#"<div class='min-h-screen flex items-center justify-center'>
    <form method='post' action='/login' class='bg-white rounded-xl shadow-sm p-8 w-full max-w-sm'>
        <h1 class='text-2xl font-bold text-indigo-600 mb-6'>Remitdash</h1>
        {}
        <label class='block text-sm font-medium text-gray-700 mb-1' for='email'>Email</label>
        <input id='email' type='email' name='email' value='{}' required
            class='w-full px-4 py-2 border rounded-lg mb-4'>
        <label class='block text-sm font-medium text-gray-700 mb-1' for='password'>Password</label>
        <input id='password' type='password' name='password' required
            class='w-full px-4 py-2 border rounded-lg mb-6'>
        <button type='submit' class='w-full px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>
            Sign in
        </button>
    </form>
</div>"#,
            error_html,
            escape_html(email)
        ),
    )
}
