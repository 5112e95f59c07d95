use std::io::{BufRead, Write};

use clap::Subcommand;
use coinrate_core::{Config, Database, KvStore, SignInSync, Tracker};
use serde_json::json;

use super::{open_tracker, print_event, print_json, save_json, CmdResult, SESSION_KEY};

#[derive(Subcommand)]
pub enum RemoteAction {
    /// Create a remote account
    SignUp {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign in, then pull remote entries (remote wins on matching timestamps)
    SignIn {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
        /// Upload local entries before pulling
        #[arg(long)]
        upload: bool,
        /// Delete the local copy once the upload succeeds
        #[arg(long, requires = "upload")]
        clear_local: bool,
    },
    /// Forget the saved session
    SignOut,
    /// Show the remote endpoint and who is signed in
    Status,
    /// Upload all local entries
    Upload,
    /// Fetch remote entries and merge them in
    Pull,
}

fn read_password(given: Option<String>) -> Result<String, std::io::Error> {
    if let Some(password) = given {
        return Ok(password);
    }
    eprint!("password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Keep the stored session in step with the tracker's.
fn store_session(tracker: &Tracker<Database>) -> CmdResult {
    match tracker.session() {
        Some(session) => save_json(tracker.kv(), SESSION_KEY, session),
        None => Ok(tracker.kv().kv_remove(SESSION_KEY)?),
    }
}

pub async fn run(action: RemoteAction) -> CmdResult {
    let config = Config::load_or_default();
    let mut tracker = open_tracker(&config)?;

    match action {
        RemoteAction::SignUp { email, password } => {
            let password = read_password(password)?;
            tracker.sign_up(&email, &password).await?;
            println!("account created for {email}");
        }
        RemoteAction::SignIn {
            email,
            password,
            upload,
            clear_local,
        } => {
            let password = read_password(password)?;
            let options = SignInSync {
                upload_local: upload,
                clear_local,
            };
            let result = tracker.sign_in_and_sync(&email, &password, options).await;
            // A failed sync still leaves a valid session behind.
            store_session(&tracker)?;
            for event in result? {
                print_event(&event)?;
            }
        }
        RemoteAction::SignOut => {
            let event = tracker.sign_out().await;
            store_session(&tracker)?;
            print_json(&event)?;
        }
        RemoteAction::Status => {
            let session = tracker.session();
            print_json(&json!({
                "remote": config.remote_url(),
                "signed_in": session.is_some(),
                "user_id": session.map(|s| s.user_id.as_str()),
                "email": session.map(|s| s.email.as_str()),
            }))?;
        }
        RemoteAction::Upload => {
            let event = tracker.upload().await?;
            print_json(&event)?;
        }
        RemoteAction::Pull => {
            let event = tracker.pull().await?;
            print_event(&event)?;
        }
    }
    Ok(())
}
