//! Member repository for database operations.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use mailmirror_core::{Email, EmailType, ListId, MemberId, SubscriberStatus};

use super::{MemberStore, RepositoryError};
use crate::models::{Member, MemberLocation};
use crate::models::member::MarketingPermission;

/// `PostgreSQL`-backed member store.
#[derive(Clone)]
pub struct PgMemberStore {
    pool: PgPool,
}

impl PgMemberStore {
    /// Create a new member store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape of `mail_chimp_members`.
#[derive(sqlx::FromRow)]
struct MemberRow {
    id: Uuid,
    list_id: Uuid,
    email_address: String,
    status: String,
    email_type: Option<String>,
    language: Option<String>,
    vip: Option<bool>,
    location: Option<serde_json::Value>,
    marketing_permissions: Option<serde_json::Value>,
    ip_signup: Option<String>,
    timestamp_signup: Option<String>,
    ip_opt: Option<String>,
    timestamp_opt: Option<String>,
    tags: Option<serde_json::Value>,
    email_id: Option<String>,
    unique_email_id: Option<String>,
    member_rating: Option<i32>,
    mail_chimp_id: Option<String>,
}

impl MemberRow {
    fn into_member(self) -> Result<Member, RepositoryError> {
        let email_address = Email::parse(&self.email_address).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let status = self.status.parse::<SubscriberStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;
        let email_type = self
            .email_type
            .as_deref()
            .map(str::parse::<EmailType>)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email type in database: {e}"))
            })?;

        let location: Option<MemberLocation> = decode_json(self.location, "location")?;
        let marketing_permissions: Option<Vec<MarketingPermission>> =
            decode_json(self.marketing_permissions, "marketing permissions")?;
        let tags: Option<Vec<String>> = decode_json(self.tags, "tags")?;

        Ok(Member {
            id: MemberId::new(self.id),
            list_id: ListId::new(self.list_id),
            email_address,
            status,
            email_type,
            language: self.language,
            vip: self.vip,
            location,
            marketing_permissions,
            ip_signup: self.ip_signup,
            timestamp_signup: self.timestamp_signup,
            ip_opt: self.ip_opt,
            timestamp_opt: self.timestamp_opt,
            tags,
            email_id: self.email_id,
            unique_email_id: self.unique_email_id,
            member_rating: self.member_rating,
            mail_chimp_id: self.mail_chimp_id,
        })
    }
}

const SELECT_COLUMNS: &str = "id, list_id, email_address, status, email_type, language, vip, \
     location, marketing_permissions, ip_signup, timestamp_signup, ip_opt, timestamp_opt, \
     tags, email_id, unique_email_id, member_rating, mail_chimp_id";

fn decode_json<T: serde::de::DeserializeOwned>(
    value: Option<serde_json::Value>,
    column: &str,
) -> Result<Option<T>, RepositoryError> {
    value
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {column} in database: {e}")))
}

fn encode_json(
    value: Option<&impl serde::Serialize>,
    column: &str,
) -> Result<Option<serde_json::Value>, RepositoryError> {
    value
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| RepositoryError::DataCorruption(format!("failed to serialize {column}: {e}")))
}

#[async_trait]
impl MemberStore for PgMemberStore {
    async fn insert(&self, member: &Member) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO mail_chimp_members (
                id, list_id, email_address, status, email_type, language, vip,
                location, marketing_permissions, ip_signup, timestamp_signup,
                ip_opt, timestamp_opt, tags, email_id, unique_email_id,
                member_rating, mail_chimp_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18)
            ",
        )
        .bind(member.id.as_uuid())
        .bind(member.list_id.as_uuid())
        .bind(member.email_address.as_str())
        .bind(member.status.to_string())
        .bind(member.email_type.map(|t| t.to_string()))
        .bind(&member.language)
        .bind(member.vip)
        .bind(encode_json(member.location.as_ref(), "location")?)
        .bind(encode_json(
            member.marketing_permissions.as_ref(),
            "marketing permissions",
        )?)
        .bind(&member.ip_signup)
        .bind(&member.timestamp_signup)
        .bind(&member.ip_opt)
        .bind(&member.timestamp_opt)
        .bind(encode_json(member.tags.as_ref(), "tags")?)
        .bind(&member.email_id)
        .bind(&member.unique_email_id)
        .bind(member.member_rating)
        .bind(&member.mail_chimp_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, member: &Member) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE mail_chimp_members
            SET email_address = $2, status = $3, email_type = $4, language = $5,
                vip = $6, location = $7, marketing_permissions = $8,
                ip_signup = $9, timestamp_signup = $10, ip_opt = $11,
                timestamp_opt = $12, tags = $13, email_id = $14,
                unique_email_id = $15, member_rating = $16, mail_chimp_id = $17
            WHERE id = $1
            ",
        )
        .bind(member.id.as_uuid())
        .bind(member.email_address.as_str())
        .bind(member.status.to_string())
        .bind(member.email_type.map(|t| t.to_string()))
        .bind(&member.language)
        .bind(member.vip)
        .bind(encode_json(member.location.as_ref(), "location")?)
        .bind(encode_json(
            member.marketing_permissions.as_ref(),
            "marketing permissions",
        )?)
        .bind(&member.ip_signup)
        .bind(&member.timestamp_signup)
        .bind(&member.ip_opt)
        .bind(&member.timestamp_opt)
        .bind(encode_json(member.tags.as_ref(), "tags")?)
        .bind(&member.email_id)
        .bind(&member.unique_email_id)
        .bind(member.member_rating)
        .bind(&member.mail_chimp_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn remove(&self, id: MemberId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM mail_chimp_members WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn find_in_list(
        &self,
        list_id: ListId,
        id: MemberId,
    ) -> Result<Option<Member>, RepositoryError> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM mail_chimp_members WHERE id = $1 AND list_id = $2"
        ))
        .bind(id.as_uuid())
        .bind(list_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MemberRow::into_member).transpose()
    }

    async fn find_by_list(&self, list_id: ListId) -> Result<Vec<Member>, RepositoryError> {
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM mail_chimp_members WHERE list_id = $1 \
             ORDER BY email_address ASC"
        ))
        .bind(list_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MemberRow::into_member).collect()
    }

    async fn find_by_email(
        &self,
        list_id: ListId,
        email_address: &str,
    ) -> Result<Vec<Member>, RepositoryError> {
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM mail_chimp_members \
             WHERE list_id = $1 AND email_address = $2"
        ))
        .bind(list_id.as_uuid())
        .bind(email_address)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MemberRow::into_member).collect()
    }
}
