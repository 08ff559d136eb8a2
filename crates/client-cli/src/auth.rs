//! CLI authentication - Google sign-in exchange for login

use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};

use crate::api::ApiClient;
use crate::credentials::CredentialStore;
use crate::session::Session;

/// Perform the sign-in flow: exchange a Google ID token for an app bearer
/// token and persist it. The ID token comes from the identity provider's own
/// sign-in surface; pass it as an argument or paste it at the prompt.
pub async fn login(
    api: &ApiClient,
    credentials: &CredentialStore,
    id_token: Option<String>,
) -> Result<()> {
    let id_token = match id_token {
        Some(token) => token,
        None => prompt_for_token()?,
    };
    let id_token = id_token.trim();
    if id_token.is_empty() {
        bail!("No identity token given");
    }

    let resp = api
        .sign_in(id_token)
        .await
        .context("Sign-in exchange failed")?;
    credentials.set(&resp.token)?;

    println!();
    println!("\x1b[1;32m✅ Signed in as {} <{}>\x1b[0m", resp.user.name, resp.user.email);
    Ok(())
}

fn prompt_for_token() -> Result<String> {
    println!();
    println!("\x1b[1;36m🔐 Sign in with Google\x1b[0m");
    println!();
    println!("\x1b[90mComplete the Google sign-in in your browser, then paste the\x1b[0m");
    println!("\x1b[90mID token it issued:\x1b[0m");
    print!("> ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

/// Logout by deleting the stored credential
pub fn logout(credentials: &CredentialStore) {
    credentials.remove();
    println!("\x1b[32m✅ Signed out\x1b[0m");
}

/// Show current login status by verifying the stored credential
pub async fn whoami(api: &ApiClient, credentials: &CredentialStore) -> Result<()> {
    if credentials.get().is_none() {
        println!("\x1b[33m✗ Not signed in\x1b[0m");
        println!("Run '\x1b[1mintrack login\x1b[0m' to authenticate");
        return Ok(());
    }

    let mut session = Session::new();
    session.bootstrap(api, credentials).await;
    match session.user() {
        Some(user) => {
            println!("\x1b[32m✓ Signed in\x1b[0m");
            println!("Name:  {}", user.name);
            println!("Email: {}", user.email);
        }
        None => {
            // Bootstrap already evicted the rejected credential.
            println!("\x1b[33m✗ Stored credential was rejected\x1b[0m");
            println!("Run '\x1b[1mintrack login\x1b[0m' to authenticate again");
        }
    }
    Ok(())
}
