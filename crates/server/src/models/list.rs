//! The mailing-list record and its wire views.

use serde::{Deserialize, Serialize};

use mailmirror_core::{ListId, Visibility};

use crate::validation::{self, FieldErrors};

/// A mailing list mirrored between the local store and MailChimp.
///
/// Serializes to the local response shape: every field, snake_case, with
/// `null` for absent optionals. `mail_chimp_id` is `None` until the first
/// successful remote create and is never cleared afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    #[serde(rename = "list_id")]
    pub id: ListId,
    pub name: String,
    pub contact: ListContact,
    pub permission_reminder: String,
    pub campaign_defaults: CampaignDefaults,
    pub email_type_option: bool,
    pub use_archive_bar: Option<bool>,
    pub notify_on_subscribe: Option<String>,
    pub notify_on_unsubscribe: Option<String>,
    pub visibility: Option<Visibility>,
    pub double_optin: Option<bool>,
    pub marketing_permissions: Option<bool>,
    pub mail_chimp_id: Option<String>,
}

/// Contact block required on every list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListContact {
    pub company: String,
    pub address1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Campaign defaults block required on every list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDefaults {
    pub from_name: String,
    pub from_email: String,
    pub subject: String,
    pub language: String,
}

/// Remote-shaped view of a list.
///
/// Doubles as the request body for create and update: every field is
/// optional, absent fields are omitted when serialized for MailChimp, and
/// enum-like fields stay strings so bad values surface as field errors
/// rather than body-rejections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListProjection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactProjection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_reminder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_defaults: Option<CampaignDefaultsProjection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_type_option: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_archive_bar: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_on_subscribe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_on_unsubscribe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_optin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing_permissions: Option<bool>,
}

/// Contact block with every field optional (request / wire form).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactProjection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Campaign defaults block with every field optional (request / wire form).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignDefaultsProjection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl List {
    /// Build a new list from a create request, assigning a fresh local id.
    ///
    /// Field rules run against the projection first; required fields are
    /// therefore present when the record is constructed.
    ///
    /// # Errors
    ///
    /// Returns the full per-field error map when validation fails.
    pub fn from_payload(payload: &ListProjection) -> Result<Self, FieldErrors> {
        validation::validate_list(payload)?;

        Ok(Self {
            id: ListId::generate(),
            name: payload.name.clone().unwrap_or_default(),
            contact: payload
                .contact
                .clone()
                .map(ListContact::from)
                .unwrap_or_default(),
            permission_reminder: payload.permission_reminder.clone().unwrap_or_default(),
            campaign_defaults: payload
                .campaign_defaults
                .clone()
                .map(CampaignDefaults::from)
                .unwrap_or_default(),
            email_type_option: payload.email_type_option.unwrap_or_default(),
            use_archive_bar: payload.use_archive_bar,
            notify_on_subscribe: payload.notify_on_subscribe.clone(),
            notify_on_unsubscribe: payload.notify_on_unsubscribe.clone(),
            visibility: parse_visibility(payload.visibility.as_deref()),
            double_optin: payload.double_optin,
            marketing_permissions: payload.marketing_permissions,
            mail_chimp_id: None,
        })
    }

    /// Overlay the fields present in an update request.
    ///
    /// Absent fields are left untouched; structured blocks (`contact`,
    /// `campaign_defaults`) are replaced as a whole when present.
    pub fn merge(&mut self, payload: ListProjection) {
        if let Some(name) = payload.name {
            self.name = name;
        }
        if let Some(contact) = payload.contact {
            self.contact = ListContact::from(contact);
        }
        if let Some(permission_reminder) = payload.permission_reminder {
            self.permission_reminder = permission_reminder;
        }
        if let Some(campaign_defaults) = payload.campaign_defaults {
            self.campaign_defaults = CampaignDefaults::from(campaign_defaults);
        }
        if let Some(email_type_option) = payload.email_type_option {
            self.email_type_option = email_type_option;
        }
        if let Some(use_archive_bar) = payload.use_archive_bar {
            self.use_archive_bar = Some(use_archive_bar);
        }
        if let Some(notify_on_subscribe) = payload.notify_on_subscribe {
            self.notify_on_subscribe = Some(notify_on_subscribe);
        }
        if let Some(notify_on_unsubscribe) = payload.notify_on_unsubscribe {
            self.notify_on_unsubscribe = Some(notify_on_unsubscribe);
        }
        if let Some(visibility) = payload.visibility {
            self.visibility = parse_visibility(Some(&visibility));
        }
        if let Some(double_optin) = payload.double_optin {
            self.double_optin = Some(double_optin);
        }
        if let Some(marketing_permissions) = payload.marketing_permissions {
            self.marketing_permissions = Some(marketing_permissions);
        }
    }

    /// The remote-shaped view: wire names, absent fields dropped.
    #[must_use]
    pub fn remote_projection(&self) -> ListProjection {
        ListProjection {
            name: Some(self.name.clone()),
            contact: Some(ContactProjection::from(self.contact.clone())),
            permission_reminder: Some(self.permission_reminder.clone()),
            campaign_defaults: Some(CampaignDefaultsProjection::from(
                self.campaign_defaults.clone(),
            )),
            email_type_option: Some(self.email_type_option),
            use_archive_bar: self.use_archive_bar,
            notify_on_subscribe: self.notify_on_subscribe.clone(),
            notify_on_unsubscribe: self.notify_on_unsubscribe.clone(),
            visibility: self.visibility.map(|v| v.to_string()),
            double_optin: self.double_optin,
            marketing_permissions: self.marketing_permissions,
        }
    }
}

impl ListProjection {
    /// Overlay `other` onto `self` at the wire level, other-wins-if-present.
    ///
    /// Used by the update pipeline to validate the would-be merged record
    /// before any typed coercion drops an invalid string.
    #[must_use]
    pub fn overlaid(self, other: Self) -> Self {
        Self {
            name: other.name.or(self.name),
            contact: other.contact.or(self.contact),
            permission_reminder: other.permission_reminder.or(self.permission_reminder),
            campaign_defaults: other.campaign_defaults.or(self.campaign_defaults),
            email_type_option: other.email_type_option.or(self.email_type_option),
            use_archive_bar: other.use_archive_bar.or(self.use_archive_bar),
            notify_on_subscribe: other.notify_on_subscribe.or(self.notify_on_subscribe),
            notify_on_unsubscribe: other.notify_on_unsubscribe.or(self.notify_on_unsubscribe),
            visibility: other.visibility.or(self.visibility),
            double_optin: other.double_optin.or(self.double_optin),
            marketing_permissions: other.marketing_permissions.or(self.marketing_permissions),
        }
    }
}

/// Parse a visibility string that validation has already accepted.
fn parse_visibility(raw: Option<&str>) -> Option<Visibility> {
    raw.and_then(|v| v.parse().ok())
}

impl From<ContactProjection> for ListContact {
    fn from(p: ContactProjection) -> Self {
        Self {
            company: p.company.unwrap_or_default(),
            address1: p.address1.unwrap_or_default(),
            address2: p.address2,
            city: p.city.unwrap_or_default(),
            state: p.state.unwrap_or_default(),
            zip: p.zip.unwrap_or_default(),
            country: p.country.unwrap_or_default(),
            phone: p.phone,
        }
    }
}

impl From<ListContact> for ContactProjection {
    fn from(c: ListContact) -> Self {
        Self {
            company: Some(c.company),
            address1: Some(c.address1),
            address2: c.address2,
            city: Some(c.city),
            state: Some(c.state),
            zip: Some(c.zip),
            country: Some(c.country),
            phone: c.phone,
        }
    }
}

impl From<CampaignDefaultsProjection> for CampaignDefaults {
    fn from(p: CampaignDefaultsProjection) -> Self {
        Self {
            from_name: p.from_name.unwrap_or_default(),
            from_email: p.from_email.unwrap_or_default(),
            subject: p.subject.unwrap_or_default(),
            language: p.language.unwrap_or_default(),
        }
    }
}

impl From<CampaignDefaults> for CampaignDefaultsProjection {
    fn from(d: CampaignDefaults) -> Self {
        Self {
            from_name: Some(d.from_name),
            from_email: Some(d.from_email),
            subject: Some(d.subject),
            language: Some(d.language),
        }
    }
}

impl Default for ListContact {
    fn default() -> Self {
        Self {
            company: String::new(),
            address1: String::new(),
            address2: None,
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            country: String::new(),
            phone: None,
        }
    }
}

impl Default for CampaignDefaults {
    fn default() -> Self {
        Self {
            from_name: String::new(),
            from_email: String::new(),
            subject: String::new(),
            language: String::new(),
        }
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;

    /// A complete, valid create payload.
    #[must_use]
    pub fn valid_list_projection() -> ListProjection {
        ListProjection {
            name: Some("New list".to_string()),
            contact: Some(ContactProjection {
                company: Some("Doe Ltd.".to_string()),
                address1: Some("DoeStreet 1".to_string()),
                address2: Some(String::new()),
                city: Some("Doesy".to_string()),
                state: Some("Doedoe".to_string()),
                zip: Some("1672-12".to_string()),
                country: Some("US".to_string()),
                phone: Some("55533344412".to_string()),
            }),
            permission_reminder: Some("You signed up for updates on Greeks economy.".to_string()),
            campaign_defaults: Some(CampaignDefaultsProjection {
                from_name: Some("John Doe".to_string()),
                from_email: Some("john@doe.com".to_string()),
                subject: Some("My new campaign!".to_string()),
                language: Some("US".to_string()),
            }),
            email_type_option: Some(false),
            use_archive_bar: Some(false),
            notify_on_subscribe: Some("notify@loyaltycorp.com.au".to_string()),
            notify_on_unsubscribe: Some("notify@loyaltycorp.com.au".to_string()),
            visibility: Some("prv".to_string()),
            double_optin: Some(false),
            marketing_permissions: Some(false),
        }
    }
}
