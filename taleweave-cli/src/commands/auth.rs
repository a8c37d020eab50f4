//! Session commands.

use anyhow::{Context, Result};
use clap::Parser;
use taleweave_client::AppContext;
use tracing::info;

/// Arguments for the login command
#[derive(Parser)]
pub struct LoginArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,

    /// Account password
    #[arg(short, long, env = "TALEWEAVE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Signs in and stores the session.
///
/// # Errors
///
/// Returns error if the backend rejects the credentials.
pub async fn login(context: &AppContext, args: LoginArgs) -> Result<()> {
    info!(email = %args.email, "Signing in");
    let user = context
        .auth()
        .login(&args.email, &args.password)
        .await
        .context("Sign in failed")?;
    println!("Signed in as {} ({})", user.name, user.role);
    Ok(())
}

/// Signs out locally and on the backend.
pub async fn logout(context: &AppContext) {
    context.auth().logout().await;
    println!("Signed out");
}

/// Prints the signed-in user, refreshed from the backend when reachable.
///
/// # Errors
///
/// Returns error if nobody is signed in.
pub async fn whoami(context: &AppContext) -> Result<()> {
    if !context.store().is_authenticated() {
        anyhow::bail!("Not signed in. Run `taleweave login` first.");
    }

    let user = match context.auth().me().await {
        Ok(user) => user,
        Err(error) => {
            info!(%error, "Using stored profile");
            context
                .store()
                .user()
                .context("Session has no user record")?
        }
    };

    println!("{} <{}>", user.name, user.email.as_deref().unwrap_or("-"));
    println!("Role: {}", user.role);
    println!("Id:   {}", user.id);
    Ok(())
}
