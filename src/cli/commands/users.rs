//! User command handlers

use crate::models::user::NewUser;
use crate::state::SharedState;

pub async fn cmd_create_user(state: &SharedState, new_user: NewUser) -> anyhow::Result<()> {
    let user = state.auth_service.register(new_user).await?;

    println!("✓ Created user '{}' (ID: {})", user.username, user.id);
    Ok(())
}

pub async fn cmd_list_users(state: &SharedState) -> anyhow::Result<()> {
    let users = state.user_service.list().await?;

    if users.is_empty() {
        println!("No users registered.");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<60}", "");
    for user in users {
        let status = if user.is_active { "active" } else { "disabled" };
        println!("• {} <{}> [{}]", user.username, user.email, status);
        println!(
            "  ID: {} | Name: {} | Last login: {}",
            user.id,
            user.full_name(),
            user.last_login.as_deref().unwrap_or("never")
        );
    }
    Ok(())
}

pub async fn cmd_set_user_active(
    state: &SharedState,
    username: &str,
    is_active: bool,
) -> anyhow::Result<()> {
    let user = state.user_service.set_active(username, is_active).await?;

    let verb = if user.is_active { "activated" } else { "deactivated" };
    println!("✓ User '{}' {verb}", user.username);
    Ok(())
}
