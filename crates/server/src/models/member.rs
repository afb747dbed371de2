//! The list-member record and its wire views.

use serde::{Deserialize, Deserializer, Serialize};

use mailmirror_core::{Email, EmailType, ListId, MemberId, SubscriberStatus};

use crate::validation::{self, FieldErrors};

/// A subscriber record scoped to exactly one list.
///
/// `email_address` and `list_id` are immutable after creation; the update
/// pipeline rejects any attempt to change the address. `mail_chimp_id`
/// follows the same set-once semantics as on [`crate::models::List`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Member {
    #[serde(rename = "member_id")]
    pub id: MemberId,
    pub list_id: ListId,
    pub email_address: Email,
    pub status: SubscriberStatus,
    pub email_type: Option<EmailType>,
    pub language: Option<String>,
    pub vip: Option<bool>,
    pub location: Option<MemberLocation>,
    pub marketing_permissions: Option<Vec<MarketingPermission>>,
    pub ip_signup: Option<String>,
    pub timestamp_signup: Option<String>,
    pub ip_opt: Option<String>,
    pub timestamp_opt: Option<String>,
    pub tags: Option<Vec<String>>,
    pub email_id: Option<String>,
    pub unique_email_id: Option<String>,
    pub member_rating: Option<i32>,
    pub mail_chimp_id: Option<String>,
}

/// Subscriber location block. Populated by clients or by MailChimp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmtoff: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dstoff: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// A single marketing permission attached to a member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketingPermission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing_permission_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Remote-shaped view of a member.
///
/// Doubles as the request body for create and update. `list_id` is carried
/// for validation and route cross-checking but never serialized to the
/// remote API (MailChimp addresses the list through the URL path). The
/// `vip` flag accepts loosely-typed input (booleans, numbers, strings) and
/// is coerced at the edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberProjection {
    #[serde(default, skip_serializing)]
    pub list_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_loose_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub vip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<MemberLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing_permissions: Option<Vec<MarketingPermission>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_signup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_signup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_opt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_opt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_email_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_rating: Option<i32>,
}

impl Member {
    /// Build a new member from a create request, assigning a fresh local id.
    ///
    /// The payload must already carry its `list_id` (the service injects
    /// the route value when the body omits it). Field rules run against
    /// the projection first.
    ///
    /// # Errors
    ///
    /// Returns the full per-field error map when validation fails.
    pub fn from_payload(list_id: ListId, payload: &MemberProjection) -> Result<Self, FieldErrors> {
        validation::validate_member(payload)?;

        let email_address = payload
            .email_address
            .as_deref()
            .and_then(|raw| Email::parse(raw).ok())
            .ok_or_else(|| FieldErrors::single("email_address", "must be a valid email address"))?;
        let status = payload
            .status
            .as_deref()
            .and_then(|raw| raw.parse::<SubscriberStatus>().ok())
            .ok_or_else(|| FieldErrors::single("status", "is required"))?;

        Ok(Self {
            id: MemberId::generate(),
            list_id,
            email_address,
            status,
            email_type: parse_email_type(payload.email_type.as_deref()),
            language: payload.language.clone(),
            vip: payload.vip,
            location: payload.location.clone(),
            marketing_permissions: payload.marketing_permissions.clone(),
            ip_signup: payload.ip_signup.clone(),
            timestamp_signup: payload.timestamp_signup.clone(),
            ip_opt: payload.ip_opt.clone(),
            timestamp_opt: payload.timestamp_opt.clone(),
            tags: payload.tags.clone(),
            email_id: payload.email_id.clone(),
            unique_email_id: payload.unique_email_id.clone(),
            member_rating: payload.member_rating,
            mail_chimp_id: None,
        })
    }

    /// Overlay the fields present in an update request.
    ///
    /// `email_address` and `list_id` are immutable and never touched here;
    /// the email guard has already established that any supplied address
    /// matches the stored one.
    pub fn merge(&mut self, payload: MemberProjection) {
        if let Some(status) = payload.status.and_then(|raw| raw.parse().ok()) {
            self.status = status;
        }
        if let Some(email_type) = payload.email_type {
            self.email_type = parse_email_type(Some(&email_type));
        }
        if let Some(language) = payload.language {
            self.language = Some(language);
        }
        if let Some(vip) = payload.vip {
            self.vip = Some(vip);
        }
        if let Some(location) = payload.location {
            self.location = Some(location);
        }
        if let Some(marketing_permissions) = payload.marketing_permissions {
            self.marketing_permissions = Some(marketing_permissions);
        }
        if let Some(ip_signup) = payload.ip_signup {
            self.ip_signup = Some(ip_signup);
        }
        if let Some(timestamp_signup) = payload.timestamp_signup {
            self.timestamp_signup = Some(timestamp_signup);
        }
        if let Some(ip_opt) = payload.ip_opt {
            self.ip_opt = Some(ip_opt);
        }
        if let Some(timestamp_opt) = payload.timestamp_opt {
            self.timestamp_opt = Some(timestamp_opt);
        }
        if let Some(tags) = payload.tags {
            self.tags = Some(tags);
        }
        if let Some(email_id) = payload.email_id {
            self.email_id = Some(email_id);
        }
        if let Some(unique_email_id) = payload.unique_email_id {
            self.unique_email_id = Some(unique_email_id);
        }
        if let Some(member_rating) = payload.member_rating {
            self.member_rating = Some(member_rating);
        }
    }

    /// The remote-shaped view: wire names, absent fields dropped.
    #[must_use]
    pub fn remote_projection(&self) -> MemberProjection {
        MemberProjection {
            list_id: Some(self.list_id.to_string()),
            email_address: Some(self.email_address.as_str().to_string()),
            status: Some(self.status.to_string()),
            email_type: self.email_type.map(|t| t.to_string()),
            language: self.language.clone(),
            vip: self.vip,
            location: self.location.clone(),
            marketing_permissions: self.marketing_permissions.clone(),
            ip_signup: self.ip_signup.clone(),
            timestamp_signup: self.timestamp_signup.clone(),
            ip_opt: self.ip_opt.clone(),
            timestamp_opt: self.timestamp_opt.clone(),
            tags: self.tags.clone(),
            email_id: self.email_id.clone(),
            unique_email_id: self.unique_email_id.clone(),
            member_rating: self.member_rating,
        }
    }
}

impl MemberProjection {
    /// Overlay `other` onto `self` at the wire level, other-wins-if-present.
    ///
    /// Used by the update pipeline to validate the would-be merged record
    /// before any typed coercion drops an invalid string.
    #[must_use]
    pub fn overlaid(self, other: Self) -> Self {
        Self {
            list_id: other.list_id.or(self.list_id),
            email_address: other.email_address.or(self.email_address),
            status: other.status.or(self.status),
            email_type: other.email_type.or(self.email_type),
            language: other.language.or(self.language),
            vip: other.vip.or(self.vip),
            location: other.location.or(self.location),
            marketing_permissions: other.marketing_permissions.or(self.marketing_permissions),
            ip_signup: other.ip_signup.or(self.ip_signup),
            timestamp_signup: other.timestamp_signup.or(self.timestamp_signup),
            ip_opt: other.ip_opt.or(self.ip_opt),
            timestamp_opt: other.timestamp_opt.or(self.timestamp_opt),
            tags: other.tags.or(self.tags),
            email_id: other.email_id.or(self.email_id),
            unique_email_id: other.unique_email_id.or(self.unique_email_id),
            member_rating: other.member_rating.or(self.member_rating),
        }
    }
}

/// Parse an email-type string that validation has already accepted.
fn parse_email_type(raw: Option<&str>) -> Option<EmailType> {
    raw.and_then(|t| t.parse().ok())
}

/// Coerce loosely-typed `vip` input to a boolean.
///
/// HTTP clients send the flag as a bool, a number, or a string; anything
/// except an explicit falsy value counts as true.
fn deserialize_loose_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Bool(flag)) => Ok(Some(flag)),
        Some(serde_json::Value::Number(number)) => {
            Ok(Some(number.as_f64().is_some_and(|n| n != 0.0)))
        }
        Some(serde_json::Value::String(raw)) => {
            let falsy = matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "" | "0" | "false" | "no" | "off"
            );
            Ok(Some(!falsy))
        }
        Some(other) => Err(D::Error::custom(format!(
            "vip must be a boolean, got {other}"
        ))),
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use uuid::Uuid;

    /// A complete, valid create payload.
    #[must_use]
    pub fn valid_member_projection() -> MemberProjection {
        MemberProjection {
            list_id: Some(Uuid::nil().to_string()),
            email_address: Some("jane@doe.com".to_string()),
            status: Some("subscribed".to_string()),
            email_type: Some("html".to_string()),
            language: Some("en".to_string()),
            vip: Some(false),
            location: Some(MemberLocation {
                latitude: Some(-33.87),
                longitude: Some(151.21),
                timezone: Some("Australia/Sydney".to_string()),
                ..MemberLocation::default()
            }),
            tags: Some(vec!["vip-campaign".to_string()]),
            ..MemberProjection::default()
        }
    }
}
