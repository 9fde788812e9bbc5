//! OAuth callback listener.
//!
//! The backend finishes the Google OAuth flow in the user's browser and
//! redirects it to the app's loopback address with `?login=success&email=…`.
//! This module serves that address until the first matching request arrives,
//! then resolves with the identity and shuts the server down. Callers bind
//! before opening the browser so the redirect never lands on a closed port.

use crate::session::identity_from_callback;
use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};

const SIGNED_IN_PAGE: &str = "<!doctype html><html><body>\
<h2>Signed in</h2><p>You can close this tab and return to calPal.</p>\
</body></html>";

const KEEP_WAITING_PAGE: &str = "<!doctype html><html><body>\
<h2>Login not completed</h2><p>Finish signing in with Google, then try again.</p>\
</body></html>";

/// A bound loopback listener waiting for the OAuth redirect.
pub struct CallbackListener {
    listener: tokio::net::TcpListener,
}

impl CallbackListener {
    /// Bind the callback address.
    pub async fn bind(bind: &str, port: u16) -> Result<Self> {
        let bind_addr = format!("{}:{}", bind.trim(), port);
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("binding OAuth callback to {}", bind_addr))?;
        log::info!("waiting for OAuth callback on {}", bind_addr);
        Ok(Self { listener })
    }

    /// Local address of the bound listener (useful when bound to port 0).
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        self.listener.local_addr().context("callback listener address")
    }

    /// Serve until the first successful login redirect; returns the email.
    /// The browser gets its response before the server drains and stops.
    /// Requests without the success marker keep the listener waiting.
    pub async fn wait_for_login(self) -> Result<String> {
        let (tx, mut rx) = mpsc::channel::<String>(1);
        let app = Router::new().route("/", get(callback)).with_state(tx);

        let (done_tx, done_rx) = oneshot::channel::<String>();
        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move {
                if let Some(email) = rx.recv().await {
                    let _ = done_tx.send(email);
                }
            })
            .await
            .context("callback listener exited")?;

        let email = done_rx
            .await
            .map_err(|_| anyhow::anyhow!("callback listener stopped before a login arrived"))?;
        log::info!("OAuth callback completed for {}", email);
        Ok(email)
    }
}

async fn callback(
    State(tx): State<mpsc::Sender<String>>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<&'static str> {
    match identity_from_callback(&params) {
        Some(email) => {
            let _ = tx.try_send(email);
            Html(SIGNED_IN_PAGE)
        }
        None => Html(KEEP_WAITING_PAGE),
    }
}
