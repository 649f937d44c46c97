//! One-shot bootstrap: create an admin user, or promote an existing account.
//! Role changes are only possible through this out-of-band path, never via
//! the API.

use shopcore::auth::{dto::Role, repo::User, services::hash_password};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "create_admin=info".to_string()),
        )
        .init();

    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@test.com".into());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());

    let database_url = std::env::var("DATABASE_URL")?;
    let db = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&db).await?;

    if let Some(existing) = User::find_by_email(&db, &email).await? {
        if existing.role == Role::Admin {
            tracing::info!(email = %email, "user is already an admin");
            return Ok(());
        }
        User::set_role(&db, &email, Role::Admin).await?;
        tracing::info!(email = %email, user_id = %existing.id, "user promoted to admin");
        return Ok(());
    }

    let hash = hash_password(&password)?;
    let user = User::create(&db, &email, &hash, "Admin", "User", Role::Admin).await?;
    tracing::info!(email = %email, user_id = %user.id, "admin user created");

    Ok(())
}
