use std::sync::Arc;
use std::time::Duration;

use warden::prelude::*;
use warden::telemetry::init_tracing;

// ---------------------------------------------------------------------------
// Stand-ins for real store clients
// ---------------------------------------------------------------------------

/// A cache client that drops the first two connection attempts.
struct FlakyCache {
    failures_left: u32,
}

impl Connector for FlakyCache {
    async fn connect(&mut self) -> Result<(), ConnectFault> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(ConnectFault::SocketClosed);
        }
        Ok(())
    }
}

/// Compares stored passwords verbatim. Demo only: real deployments
/// plug in a password hasher.
struct DemoVerifier;

impl CredentialVerifier for DemoVerifier {
    fn verify(&self, submitted: &str, stored: &str) -> bool {
        submitted == stored
    }
}

fn browser() -> RequestMeta {
    RequestMeta::new()
        .header("user-agent", "Mozilla/5.0 (demo)")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("info,warden=debug")?;

    let status = SharedStatus::new();

    // The primary store client reports through the status channel.
    let (status_tx, consumer) = spawn_status_consumer(status.clone(), 16);
    status_tx
        .send(StoreKind::Primary, ConnectivityState::Connected)
        .await?;

    // The cache store client connects through the reconnect controller.
    let config = WardenConfig::default();
    let controller = ReconnectController::new(config.reconnect.clone(), status.clone());
    let (handle, controller_task) = spawn_controller(controller, 16);
    reconnect(&mut FlakyCache { failures_left: 2 }, &handle).await?;

    let sessions = Arc::new(MemorySessionStore::new(config.session.clone()));
    let sweeper = sessions.spawn_sweeper(Duration::from_secs(60));

    let warden = WardenBuilder::new().config(config).build(
        sessions,
        Arc::new(MemoryUserDirectory::new()),
        status.clone(),
        DemoVerifier,
    );
    warden
        .users()
        .create(NewUser {
            user_type: UserType::Normal,
            email: "ada@example.com".into(),
            password: Some("analytical engine".into()),
            permissions: vec!["READ".into()],
            created_by: None,
        })
        .await?;

    // Log in.
    let ctx = warden.context(browser()).await?;
    let login = warden
        .log_in(&ctx, LogInInput::new("ada@example.com", "analytical engine"))
        .await?;
    println!("log_in: {}", serde_json::to_string_pretty(&login)?);
    let Some(token) = login.include.session_id else {
        return Err("login failed".into());
    };

    // Use the session.
    let ctx = warden
        .context(browser().header("authorization", format!("Bearer {token}")))
        .await?;
    println!("current session: {}", serde_json::to_string_pretty(&warden.current_session(&ctx))?);

    // Log out.
    let logout = warden.log_out(&ctx).await?;
    println!("log_out: {}", serde_json::to_string_pretty(&logout)?);

    sweeper.abort();
    drop(status_tx);
    drop(handle);
    consumer.await?;
    controller_task.await?;
    Ok(())
}
