use crate::config::types::{ConnectionSettings, DatabaseTarget};
use crate::constants::{CONNECT_ACQUIRE_TIMEOUT, CONNECT_RETRY_DELAY};
use crate::db::{DbError, DbResult};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use tracing::info;

/// Mask password in database URL for display
pub fn mask_url_password(url: &str) -> String {
    let Some((protocol, rest)) = url.split_once("://") else {
        return url.to_string();
    };

    // user:pass@host or user@host
    if let Some((user_info, host_and_path)) = rest.split_once('@')
        && let Some((username, _)) = user_info.split_once(':')
    {
        return format!("{}://{}:***@{}", protocol, username, host_and_path);
    }

    url.to_string()
}

/// Build sqlx connect options for a configured target
pub fn connect_options(target: &DatabaseTarget) -> DbResult<PgConnectOptions> {
    match target {
        DatabaseTarget::Url(url) => {
            PgConnectOptions::from_str(url).map_err(|e| DbError::Connection {
                target: mask_url_password(url),
                message: format!("invalid database URL: {}", e),
            })
        }
        DatabaseTarget::Settings(settings) => Ok(settings_options(settings)),
    }
}

fn settings_options(settings: &ConnectionSettings) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.username)
        .database(&settings.database);

    match &settings.password {
        Some(password) => options.password(password),
        None => options,
    }
}

/// Connect once with a short acquire timeout
pub async fn connect_to_database(target: &DatabaseTarget) -> DbResult<PgPool> {
    let options = connect_options(target)?;

    PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(CONNECT_ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
        .map_err(|e| DbError::Connection {
            target: target.to_string(),
            message: e.to_string(),
        })
}

/// Connect, retrying while the server is still starting up
pub async fn connect_with_retry(target: &DatabaseTarget, max_retries: u32) -> DbResult<PgPool> {
    let mut attempt = 0;

    loop {
        match connect_to_database(target).await {
            Ok(pool) => {
                if attempt > 0 {
                    info!(
                        "Connected to {} (after {} retr{})",
                        target,
                        attempt,
                        if attempt == 1 { "y" } else { "ies" }
                    );
                } else {
                    info!("Connected to {}", target);
                }
                return Ok(pool);
            }
            Err(e) if attempt < max_retries => {
                if attempt == 0 {
                    info!("Database not ready, retrying... ({})", e);
                }
                attempt += 1;
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
            Err(DbError::Connection { target, message }) => {
                return Err(DbError::Connection {
                    target,
                    message: format!("{} (after {} attempts)", message, attempt + 1),
                });
            }
            Err(e) => return Err(e),
        }
    }
}
