//! Walks the session lifecycle the way the mobile app's composition
//! root does: construct storage, inject it into the cache, load at
//! startup, gate "navigation" on the status, sign in, restart, sign out.
//!
//! Run it twice to see persistence in action — the second run restores
//! the session the first one left behind:
//!
//! ```text
//! cargo run -p login-flow [path/to/storage.json]
//! ```
//!
//! Set `BEAMDROP_API` to a backend base URL to sign in over HTTP via
//! `beamdrop-auth` (credentials `demo@beamdrop.example` / `demo`);
//! without it the demo fabricates the session a login would return.

use beamdrop_auth::AuthClient;
use beamdrop_session::{Session, SessionCache, SessionStatus};
use beamdrop_store::FileStore;
use tracing_subscriber::EnvFilter;

/// The screen sets of the app shell, selected purely from the status.
fn screens_for(status: &SessionStatus) -> &'static str {
    match status {
        SessionStatus::Uninitialized | SessionStatus::Loading => "Splash",
        SessionStatus::Unauthenticated => "Login, Register",
        SessionStatus::Authenticated(_) => {
            "Home, Send, Receive, MyFiles, Profile, History"
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "beamdrop-session.json".to_string());
    let cache = SessionCache::new(FileStore::new(&path));

    // A "navigation layer": reacts to every status change.
    let mut status_rx = cache.subscribe();
    let navigator = tokio::spawn(async move {
        loop {
            let status = status_rx.borrow_and_update().clone();
            tracing::info!(%status, screens = screens_for(&status), "navigating");
            if status_rx.changed().await.is_err() {
                break; // cache dropped, app is shutting down
            }
        }
    });

    // Startup: the one-time load decides which screen set comes up.
    let settled = cache.load().await.expect("first load of this cache");

    match settled {
        SessionStatus::Authenticated(session) => {
            // Second run: the previous run's session was restored.
            tracing::info!(user = %session, "welcome back");

            let refreshed = cache.refresh().await.expect("cache is loaded");
            tracing::info!(status = %refreshed, "after refresh");

            cache.logout().await;
            tracing::info!("signed out, next run starts fresh");
        }
        _ => {
            // Signed out: run a login and feed the result to the cache.
            let session = match std::env::var("BEAMDROP_API") {
                Ok(base_url) => {
                    let auth = AuthClient::new(base_url);
                    match auth.login("demo@beamdrop.example", "demo").await {
                        Ok(response) => response.into_session(),
                        Err(err) => {
                            tracing::error!(error = %err, "login failed");
                            return;
                        }
                    }
                }
                Err(_) => Session::new("demo@beamdrop.example", "demo-token")
                    .with_id("u-demo")
                    .with_name("Demo User"),
            };
            cache
                .set_session(Some(session))
                .await
                .expect("cache is loaded and the record is valid");
            tracing::info!(%path, "signed in and persisted, run again to restore");
        }
    }

    drop(cache);
    let _ = navigator.await;
}
