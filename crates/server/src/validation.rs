//! Field validation for the remote-shaped views of lists and members.
//!
//! Validation always runs against a remote projection (absent fields
//! dropped, wire field names), never against a raw record, so the keys in
//! the error map match what the client sent and what the remote API would
//! see. The rule set mirrors the MailChimp resource schemas.

use std::collections::BTreeMap;

use serde::Serialize;

use mailmirror_core::{Email, SubscriberStatus, Visibility};

use crate::models::list::{CampaignDefaultsProjection, ContactProjection, ListProjection};
use crate::models::member::MemberProjection;

/// Accumulated per-field validation messages, keyed by wire field name.
///
/// Nested fields use dotted paths (`contact.company`,
/// `campaign_defaults.from_name`), matching the error shape of the JSON
/// envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// A map holding a single message for one field.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Whether any message has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a field has at least one message.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(())` when empty, `Err(self)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns the accumulated errors when any message was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Borrow the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }
}

/// Validate the remote projection of a list.
///
/// # Errors
///
/// Returns every rule failure keyed by wire field name.
pub fn validate_list(projection: &ListProjection) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();

    require_string(&mut errors, "name", projection.name.as_deref());
    require_string(
        &mut errors,
        "permission_reminder",
        projection.permission_reminder.as_deref(),
    );

    if projection.email_type_option.is_none() {
        errors.add("email_type_option", "is required");
    }

    match &projection.contact {
        None => {
            errors.add("contact", "is required");
            contact_required_fields(&mut errors, &ContactProjection::default());
        }
        Some(contact) => contact_required_fields(&mut errors, contact),
    }

    match &projection.campaign_defaults {
        None => {
            errors.add("campaign_defaults", "is required");
            campaign_defaults_required_fields(&mut errors, &CampaignDefaultsProjection::default());
        }
        Some(defaults) => campaign_defaults_required_fields(&mut errors, defaults),
    }

    optional_email(
        &mut errors,
        "notify_on_subscribe",
        projection.notify_on_subscribe.as_deref(),
    );
    optional_email(
        &mut errors,
        "notify_on_unsubscribe",
        projection.notify_on_unsubscribe.as_deref(),
    );

    if let Some(visibility) = projection.visibility.as_deref()
        && visibility.parse::<Visibility>().is_err()
    {
        errors.add("visibility", "must be one of: pub, prv");
    }

    errors.into_result()
}

/// Validate the remote projection of a member.
///
/// # Errors
///
/// Returns every rule failure keyed by wire field name.
pub fn validate_member(projection: &MemberProjection) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();

    require_string(&mut errors, "list_id", projection.list_id.as_deref());

    match projection.email_address.as_deref() {
        None => errors.add("email_address", "is required"),
        Some(raw) if raw.trim().is_empty() => errors.add("email_address", "is required"),
        Some(raw) => {
            if Email::parse(raw).is_err() {
                errors.add("email_address", "must be a valid email address");
            }
        }
    }

    match projection.status.as_deref() {
        None => errors.add("status", "is required"),
        Some(raw) => {
            if raw.parse::<SubscriberStatus>().is_err() {
                errors.add(
                    "status",
                    format!("must be one of: {}", SubscriberStatus::ALL.join(", ")),
                );
            }
        }
    }

    if let Some(email_type) = projection.email_type.as_deref()
        && email_type.parse::<mailmirror_core::EmailType>().is_err()
    {
        errors.add("email_type", "must be one of: html, text");
    }

    errors.into_result()
}

fn contact_required_fields(errors: &mut FieldErrors, contact: &ContactProjection) {
    require_string(errors, "contact.company", contact.company.as_deref());
    require_string(errors, "contact.address1", contact.address1.as_deref());
    require_string(errors, "contact.city", contact.city.as_deref());
    require_string(errors, "contact.state", contact.state.as_deref());
    require_string(errors, "contact.zip", contact.zip.as_deref());

    match contact.country.as_deref() {
        None => errors.add("contact.country", "is required"),
        Some(country) if country.trim().is_empty() => errors.add("contact.country", "is required"),
        Some(country) => {
            if country.chars().count() != 2 {
                errors.add("contact.country", "must be exactly 2 characters");
            }
        }
    }
}

fn campaign_defaults_required_fields(
    errors: &mut FieldErrors,
    defaults: &CampaignDefaultsProjection,
) {
    require_string(
        errors,
        "campaign_defaults.from_name",
        defaults.from_name.as_deref(),
    );
    require_string(
        errors,
        "campaign_defaults.from_email",
        defaults.from_email.as_deref(),
    );
    require_string(
        errors,
        "campaign_defaults.subject",
        defaults.subject.as_deref(),
    );
    require_string(
        errors,
        "campaign_defaults.language",
        defaults.language.as_deref(),
    );
}

fn require_string(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    match value {
        None => errors.add(field, "is required"),
        Some(v) if v.trim().is_empty() => errors.add(field, "is required"),
        Some(_) => {}
    }
}

fn optional_email(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(raw) = value
        && Email::parse(raw).is_err()
    {
        errors.add(field, "must be a valid email address");
    }
}
