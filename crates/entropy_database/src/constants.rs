//! Lookup of platform ids and schedule specs from the `bot_constants` table.
//!
//! Every category, role and channel id the bot touches lives in the database
//! with separate prod and test values. Which value wins is decided once at
//! startup from the `IS_PROD` environment variable.

use crate::schema::bot_constants;
use crate::{DatabaseResult, DbPool};
use diesel::prelude::*;
use entropy_error::{ConfigError, ConfigErrorKind, DatabaseError};
use tracing::instrument;

/// Database row for the bot_constants table.
#[derive(Debug, Clone, Queryable, Selectable, derive_getters::Getters)]
#[diesel(table_name = bot_constants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BotConstantRow {
    /// Surrogate id
    pub id: i32,
    /// Unique lookup key, e.g. `CATEGORY_TICKET_PRO_TEAMS`
    pub const_key: String,
    /// Value used when running in production
    prod_value: Option<String>,
    /// Value used when running against the test guild
    test_value: Option<String>,
}

/// Pick the effective value for a constant.
///
/// Production mode always uses the prod value. Test mode prefers the test
/// value and falls back to the prod value when no test value is set.
pub fn select_value(is_prod: bool, prod: Option<&str>, test: Option<&str>) -> Option<String> {
    if is_prod {
        prod.map(str::to_owned)
    } else {
        test.filter(|v| !v.is_empty())
            .or(prod)
            .map(str::to_owned)
    }
}

/// Read access to `bot_constants` with prod/test selection baked in.
#[derive(Clone)]
pub struct ConstantStore {
    pool: DbPool,
    is_prod: bool,
}

impl ConstantStore {
    /// Create a constant store over the shared pool.
    pub fn new(pool: DbPool, is_prod: bool) -> Self {
        Self { pool, is_prod }
    }

    /// Whether the store resolves prod values.
    pub fn is_prod(&self) -> bool {
        self.is_prod
    }

    /// Fetch the effective value for a constant key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing, inactive, or has no value for
    /// the current environment.
    #[instrument(name = "constants.get", skip(self))]
    pub fn get(&self, key: &str) -> DatabaseResult<String> {
        let mut conn = self.pool.get().map_err(DatabaseError::from)?;

        let row: BotConstantRow = bot_constants::table
            .filter(bot_constants::const_key.eq(key))
            .filter(bot_constants::is_active.eq(true))
            .select(BotConstantRow::as_select())
            .first(&mut conn)?;

        select_value(
            self.is_prod,
            row.prod_value.as_deref(),
            row.test_value.as_deref(),
        )
        .ok_or_else(|| {
            tracing::error!(key, "Constant has no value for this environment");
            entropy_error::DatabaseError::new(entropy_error::DatabaseErrorKind::NotFound)
        })
    }

    /// Fetch a constant and parse it as a Discord snowflake.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the key is missing or the value is not a
    /// valid u64.
    #[instrument(name = "constants.get_id", skip(self))]
    pub fn get_id(&self, key: &str) -> std::result::Result<u64, ConfigError> {
        let value = self.get(key).map_err(|_| {
            ConfigError::new(ConfigErrorKind::MissingConstant(key.to_string()))
        })?;

        value.parse::<u64>().map_err(|_| {
            ConfigError::new(ConfigErrorKind::InvalidValue {
                key: key.to_string(),
                value,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prod_selects_prod_value() {
        let v = select_value(true, Some("prod"), Some("test"));
        assert_eq!(v.as_deref(), Some("prod"));
    }

    #[test]
    fn test_prefers_test_value() {
        let v = select_value(false, Some("prod"), Some("test"));
        assert_eq!(v.as_deref(), Some("test"));
    }

    #[test]
    fn test_falls_back_to_prod_when_unset() {
        let v = select_value(false, Some("prod"), None);
        assert_eq!(v.as_deref(), Some("prod"));

        let v = select_value(false, Some("prod"), Some(""));
        assert_eq!(v.as_deref(), Some("prod"));
    }

    #[test]
    fn missing_both_yields_none() {
        assert!(select_value(true, None, Some("test")).is_none());
        assert!(select_value(false, None, None).is_none());
    }
}
