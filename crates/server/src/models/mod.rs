//! Domain records for the two mirrored resources.
//!
//! Records are plain data; persistence lives in [`crate::db`] and the
//! mutation pipelines in [`crate::services`]. Each record knows how to
//! build its remote projection (the null-stripped, wire-named view sent to
//! MailChimp and fed to validation) and how to merge an update request
//! onto itself.

pub mod list;
pub mod member;

pub use list::{CampaignDefaults, List, ListContact, ListProjection};
pub use member::{Member, MemberLocation, MemberProjection};

/// Identifier description used in not-found and not-synced messages.
///
/// Renders as pipe-joined `"<Label>:<value>"` segments in a fixed order,
/// skipping absent values, e.g. `List Id:…|Member Id:…`.
#[derive(Debug, Clone, Default)]
pub struct IdsDesc {
    list_id: Option<String>,
    member_id: Option<String>,
    list_mail_chimp_id: Option<String>,
    member_mail_chimp_id: Option<String>,
}

impl IdsDesc {
    /// Start an empty description.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the local list id.
    #[must_use]
    pub fn list_id(mut self, id: impl ToString) -> Self {
        self.list_id = Some(id.to_string());
        self
    }

    /// Attach the local member id.
    #[must_use]
    pub fn member_id(mut self, id: impl ToString) -> Self {
        self.member_id = Some(id.to_string());
        self
    }

    /// Attach the list's remote MailChimp id.
    #[must_use]
    pub fn list_mail_chimp_id(mut self, id: impl ToString) -> Self {
        self.list_mail_chimp_id = Some(id.to_string());
        self
    }

    /// Attach the member's remote MailChimp id.
    #[must_use]
    pub fn member_mail_chimp_id(mut self, id: impl ToString) -> Self {
        self.member_mail_chimp_id = Some(id.to_string());
        self
    }
}

impl std::fmt::Display for IdsDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labeled = [
            ("List Id", &self.list_id),
            ("Member Id", &self.member_id),
            ("List Mailchimp Id", &self.list_mail_chimp_id),
            ("Member Mailchimp Id", &self.member_mail_chimp_id),
        ];

        let mut first = true;
        for (label, value) in labeled {
            let Some(value) = value else { continue };
            if value.is_empty() {
                continue;
            }
            if !first {
                write!(f, "|")?;
            }
            write!(f, "{label}:{value}")?;
            first = false;
        }

        Ok(())
    }
}
