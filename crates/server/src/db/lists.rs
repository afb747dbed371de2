//! List repository for database operations.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use mailmirror_core::{ListId, Visibility};

use super::{ListStore, RepositoryError};
use crate::models::{CampaignDefaults, List, ListContact};

/// `PostgreSQL`-backed list store.
#[derive(Clone)]
pub struct PgListStore {
    pool: PgPool,
}

impl PgListStore {
    /// Create a new list store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape of `mail_chimp_lists`.
#[derive(sqlx::FromRow)]
struct ListRow {
    id: Uuid,
    name: String,
    contact: serde_json::Value,
    permission_reminder: String,
    campaign_defaults: serde_json::Value,
    email_type_option: bool,
    use_archive_bar: Option<bool>,
    notify_on_subscribe: Option<String>,
    notify_on_unsubscribe: Option<String>,
    visibility: Option<String>,
    double_optin: Option<bool>,
    marketing_permissions: Option<bool>,
    mail_chimp_id: Option<String>,
}

impl ListRow {
    fn into_list(self) -> Result<List, RepositoryError> {
        let contact: ListContact = serde_json::from_value(self.contact).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid contact in database: {e}"))
        })?;
        let campaign_defaults: CampaignDefaults = serde_json::from_value(self.campaign_defaults)
            .map_err(|e| {
                RepositoryError::DataCorruption(format!(
                    "invalid campaign defaults in database: {e}"
                ))
            })?;
        let visibility = self
            .visibility
            .as_deref()
            .map(str::parse::<Visibility>)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid visibility in database: {e}"))
            })?;

        Ok(List {
            id: ListId::new(self.id),
            name: self.name,
            contact,
            permission_reminder: self.permission_reminder,
            campaign_defaults,
            email_type_option: self.email_type_option,
            use_archive_bar: self.use_archive_bar,
            notify_on_subscribe: self.notify_on_subscribe,
            notify_on_unsubscribe: self.notify_on_unsubscribe,
            visibility,
            double_optin: self.double_optin,
            marketing_permissions: self.marketing_permissions,
            mail_chimp_id: self.mail_chimp_id,
        })
    }
}

const SELECT_COLUMNS: &str = "id, name, contact, permission_reminder, campaign_defaults, \
     email_type_option, use_archive_bar, notify_on_subscribe, notify_on_unsubscribe, \
     visibility, double_optin, marketing_permissions, mail_chimp_id";

fn json_column(
    value: &impl serde::Serialize,
    column: &str,
) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("failed to serialize {column}: {e}")))
}

#[async_trait]
impl ListStore for PgListStore {
    async fn insert(&self, list: &List) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO mail_chimp_lists (
                id, name, contact, permission_reminder, campaign_defaults,
                email_type_option, use_archive_bar, notify_on_subscribe,
                notify_on_unsubscribe, visibility, double_optin,
                marketing_permissions, mail_chimp_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(list.id.as_uuid())
        .bind(&list.name)
        .bind(json_column(&list.contact, "contact")?)
        .bind(&list.permission_reminder)
        .bind(json_column(&list.campaign_defaults, "campaign_defaults")?)
        .bind(list.email_type_option)
        .bind(list.use_archive_bar)
        .bind(&list.notify_on_subscribe)
        .bind(&list.notify_on_unsubscribe)
        .bind(list.visibility.map(|v| v.to_string()))
        .bind(list.double_optin)
        .bind(list.marketing_permissions)
        .bind(&list.mail_chimp_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, list: &List) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE mail_chimp_lists
            SET name = $2, contact = $3, permission_reminder = $4,
                campaign_defaults = $5, email_type_option = $6,
                use_archive_bar = $7, notify_on_subscribe = $8,
                notify_on_unsubscribe = $9, visibility = $10,
                double_optin = $11, marketing_permissions = $12,
                mail_chimp_id = $13
            WHERE id = $1
            ",
        )
        .bind(list.id.as_uuid())
        .bind(&list.name)
        .bind(json_column(&list.contact, "contact")?)
        .bind(&list.permission_reminder)
        .bind(json_column(&list.campaign_defaults, "campaign_defaults")?)
        .bind(list.email_type_option)
        .bind(list.use_archive_bar)
        .bind(&list.notify_on_subscribe)
        .bind(&list.notify_on_unsubscribe)
        .bind(list.visibility.map(|v| v.to_string()))
        .bind(list.double_optin)
        .bind(list.marketing_permissions)
        .bind(&list.mail_chimp_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn remove(&self, id: ListId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM mail_chimp_lists WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn find(&self, id: ListId) -> Result<Option<List>, RepositoryError> {
        let row = sqlx::query_as::<_, ListRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM mail_chimp_lists WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ListRow::into_list).transpose()
    }

    async fn all(&self) -> Result<Vec<List>, RepositoryError> {
        let rows = sqlx::query_as::<_, ListRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM mail_chimp_lists ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ListRow::into_list).collect()
    }
}
