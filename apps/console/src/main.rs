use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use client_core::{AdminConsole, AnonymousAuth, AuthState, DenyAllPrompt, RestGateway};
use shared::protocol::UserSummary;
use tracing::info;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    server_url: String,
    /// Bearer token for admin endpoints; omit for the public read-only view.
    #[arg(long)]
    token: Option<String>,
}

struct TokenAuth {
    token: String,
}

#[async_trait]
impl AuthState for TokenAuth {
    async fn current_user(&self) -> Option<UserSummary> {
        None
    }

    async fn is_authenticated(&self) -> bool {
        true
    }

    async fn access_token(&self) -> Option<String> {
        Some(self.token.clone())
    }

    async fn logout(&self) -> Result<()> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let auth: Arc<dyn AuthState> = match args.token {
        Some(token) => Arc::new(TokenAuth { token }),
        None => Arc::new(AnonymousAuth),
    };
    let rest = Arc::new(RestGateway::new(&args.server_url, Arc::clone(&auth))?);
    let console = AdminConsole::new(
        rest.clone(),
        rest.clone(),
        rest.clone(),
        auth,
        Arc::new(DenyAllPrompt),
    );

    info!(server_url = %args.server_url, "fetching admin listings");
    console.refresh_all().await;

    let projects = console.projects().records().await;
    let posts = console.posts().records().await;
    let messages = console.inbox().messages().await;
    println!(
        "Projects: {} | Blog posts: {} | Messages: {}",
        projects.len(),
        posts.len(),
        messages.len()
    );
    println!("{}", serde_json::to_string_pretty(&projects)?);

    Ok(())
}
