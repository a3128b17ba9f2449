use std::env;

use crate::error::AppError;

/// Database profile enum for different environments
#[derive(Debug, Clone, PartialEq)]
pub enum DbProfile {
    /// Production database profile
    Prod,
    /// Test database profile - enforces safety rules
    Test,
}

/// Builds a database URL from environment variables.
///
/// `DATABASE_URL` wins when set; otherwise the URL is assembled from the
/// `DB_*` variables.
pub fn db_url(profile: DbProfile) -> Result<String, AppError> {
    let url = match env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
            let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
            let db_name = must_var("DB_DATABASE")?;
            let username = must_var("DB_USERNAME")?;
            let password = must_var("DB_PASSWORD")?;
            format!("postgresql://{username}:{password}@{host}:{port}/{db_name}")
        }
    };

    if profile == DbProfile::Test {
        validate_test_database_url(&url)?;
    }

    Ok(url)
}

/// Test databases must be named `*_test`.
fn validate_test_database_url(database_url: &str) -> Result<(), AppError> {
    let Some(db_name_start) = database_url.rfind('/') else {
        return Err(AppError::config(format!(
            "Invalid database URL format: '{database_url}'"
        )));
    };

    let db_name = &database_url[db_name_start + 1..];
    let db_name = db_name.split('?').next().unwrap_or(db_name);

    if !db_name.ends_with("_test") {
        return Err(AppError::config(format!(
            "Test profile requires database name to end with '_test', but got: '{db_name}'"
        )));
    }
    Ok(())
}

/// Get required environment variable or return error
pub(crate) fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Required environment variable '{name}' is not set")))
}
