//! Subcommand handlers for the `ers` binary.

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::Session;
use crate::api::{NewReimbursement, Reimbursement, Resolution};
use crate::auth::{GateDecision, SessionError, SessionPhase, UserRecord, visible_items};
use crate::cli::{Command, ReimbursementCommand, UserCommand};

/// Run one command against a restored session.
pub async fn run(session: &mut Session, command: Command) -> Result<(), SessionError> {
    match command {
        Command::Login { email, password } => {
            let user = session.controller.sign_in(&email, &password).await?;
            println!("Signed in as {} ({})", user.email, user.role);
            println!("Landing page: {}", session.gate.after_login(None));
        }
        Command::Register { email, password } => {
            let user = session.controller.sign_up(&email, &password).await?;
            println!("Registered {} ({})", user.email, user.role);
            println!("Landing page: {}", session.gate.after_login(None));
        }
        Command::Logout => {
            if let Some(remote) = session.controller.logout() {
                wait_for_remote_logout(remote).await;
            }
            println!("Signed out");
        }
        Command::Whoami => whoami(session),
        Command::Open { path } => match session.gate.navigate(&path) {
            GateDecision::Allow => println!("{}", path),
            GateDecision::Pending => println!("Session is still being restored"),
            GateDecision::Redirect { to, from } => match from {
                Some(from) => println!("{} (redirected from {})", to, from),
                None => println!("{}", to),
            },
        },
        Command::Upgrade => {
            let user = session.controller.request_upgrade().await?;
            println!("Upgraded to {}", user.role);
            println!("Landing page: {}", session.gate.after_login(None));
        }
        Command::Reimbursements(command) => {
            require_login(session)?;
            reimbursements(session, command).await?;
        }
        Command::Users(command) => {
            require_login(session)?;
            users(session, command).await?;
        }
    }
    Ok(())
}

/// Keep the process alive until the backend has been told. Returns `false`
/// if the task did not finish normally.
async fn wait_for_remote_logout(remote: JoinHandle<()>) -> bool {
    match remote.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Remote logout task failed");
            false
        }
    }
}

fn require_login(session: &Session) -> Result<(), SessionError> {
    if session.controller.view().is_authenticated() {
        Ok(())
    } else {
        Err(SessionError::NotLoggedIn)
    }
}

fn whoami(session: &Session) {
    let view = session.controller.view();
    let Some(user) = view.user() else {
        match view.phase() {
            SessionPhase::Restoring => println!("Session is still being restored"),
            _ => println!("Not signed in"),
        }
        return;
    };

    println!("{} ({})", user.email, user.role);
    println!("User id: {}", user.id);

    let permissions = session.permissions.effective(&user);
    if !permissions.is_empty() {
        let list: Vec<&str> = permissions.iter().map(String::as_str).collect();
        println!("Permissions: {}", list.join(", "));
    }
    for item in visible_items(&view) {
        println!("  {:<12} {}", item.label, item.path);
    }
}

async fn reimbursements(
    session: &Session,
    command: ReimbursementCommand,
) -> Result<(), SessionError> {
    let api = session.api();
    match command {
        ReimbursementCommand::List { all, status } => {
            let list = if all {
                api.all_reimbursements(status).await?
            } else {
                api.my_reimbursements(status).await?
            };
            info!(count = list.len(), "Listed reimbursements");
            if list.is_empty() {
                println!("No reimbursements");
            }
            for r in &list {
                print_reimbursement(r);
            }
        }
        ReimbursementCommand::Create { description, kind } => {
            let created = api
                .create_reimbursement(&NewReimbursement { description, kind })
                .await?;
            print_reimbursement(&created);
        }
        ReimbursementCommand::Update {
            id,
            description,
            kind,
        } => {
            let updated = api
                .update_reimbursement(id, &NewReimbursement { description, kind })
                .await?;
            print_reimbursement(&updated);
        }
        ReimbursementCommand::Resolve {
            id,
            status,
            comment,
        } => {
            let resolved = api
                .resolve_reimbursement(id, &Resolution { status, comment })
                .await?;
            print_reimbursement(&resolved);
        }
        ReimbursementCommand::Show { id } => {
            print_reimbursement(&api.reimbursement(id).await?);
        }
    }
    Ok(())
}

async fn users(session: &Session, command: UserCommand) -> Result<(), SessionError> {
    let api = session.api();
    match command {
        UserCommand::List => {
            for user in api.list_users().await? {
                print_user(&user);
            }
        }
        UserCommand::Delete { id } => {
            api.delete_user(id).await?;
            println!("Deleted user {}", id);
        }
    }
    Ok(())
}

fn print_reimbursement(r: &Reimbursement) {
    println!(
        "#{:<5} {:<9} {:<9} {:<24} {}",
        r.id, r.status, r.kind, r.user_email, r.description
    );
}

fn print_user(user: &UserRecord) {
    println!("#{:<5} {:<11} {}", user.id, user.role, user.email);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remote_logout_completes() {
        let handle = tokio::spawn(async {});
        assert!(wait_for_remote_logout(handle).await);
    }

    #[tokio::test]
    async fn test_remote_logout_panic_is_reported() {
        let handle = tokio::spawn(async { panic!("backend went away") });
        assert!(!wait_for_remote_logout(handle).await);
    }

    #[tokio::test]
    async fn test_remote_logout_abort_is_reported() {
        let handle = tokio::spawn(std::future::pending::<()>());
        handle.abort();
        assert!(!wait_for_remote_logout(handle).await);
    }
}
