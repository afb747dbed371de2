//! Sync coordinator for list members, including the duplicate guard and
//! the email-immutability guard.

use std::sync::Arc;

use mailmirror_core::{ListId, MemberId, email};

use crate::db::{ListStore, MemberStore};
use crate::error::AppError;
use crate::mailchimp::{self, MailchimpApi};
use crate::models::{IdsDesc, List, Member, MemberProjection};
use crate::validation::{self, FieldErrors};

use super::wire_body;

/// Orchestrates member mutations across the local store and MailChimp.
///
/// Every operation is scoped by the parent list: an unknown list id is a
/// not-found before the member is even looked up, and remote calls
/// address the member through the list's remote id.
#[derive(Clone)]
pub struct MemberService {
    lists: Arc<dyn ListStore>,
    members: Arc<dyn MemberStore>,
    mailchimp: Arc<dyn MailchimpApi>,
}

impl MemberService {
    /// Create a service over the injected collaborators.
    pub fn new(
        lists: Arc<dyn ListStore>,
        members: Arc<dyn MemberStore>,
        mailchimp: Arc<dyn MailchimpApi>,
    ) -> Self {
        Self {
            lists,
            members,
            mailchimp,
        }
    }

    /// Create a member: duplicate guard, validate, persist locally,
    /// create remotely, attach the remote id.
    ///
    /// The duplicate guard runs before construction, validation and
    /// persistence: a duplicate is rejected with zero side effects.
    ///
    /// # Errors
    ///
    /// Not-found / not-synced for the parent list, conflict for a
    /// duplicate email, validation failures, or a remote failure (which
    /// leaves the local row without a `mail_chimp_id`).
    pub async fn create(
        &self,
        list_id: ListId,
        mut payload: MemberProjection,
    ) -> Result<Member, AppError> {
        let list = self.require_list(list_id).await?;
        let list_remote_id = require_list_remote_id(&list)?;

        // list id may be included in the request body; the route wins
        let route_list_id = list_id.to_string();
        if let Some(body_list_id) = payload.list_id.as_deref()
            && !body_list_id.is_empty()
            && body_list_id != route_list_id
        {
            return Err(AppError::Validation(FieldErrors::single(
                "list_id",
                "must match the list id in the route",
            )));
        }
        if payload.list_id.as_deref().unwrap_or_default().is_empty() {
            payload.list_id = Some(route_list_id);
        }

        if let Some(email_address) = payload.email_address.as_deref() {
            self.check_duplicate(list_id, email_address).await?;
        }

        let mut member = Member::from_payload(list_id, &payload).map_err(AppError::Validation)?;

        self.members.insert(&member).await?;
        tracing::info!(member_id = %member.id, list_id = %list_id, "member persisted locally");

        let response = self
            .mailchimp
            .post(
                &format!("lists/{list_remote_id}/members"),
                &wire_body(&member.remote_projection())?,
            )
            .await?;

        member.mail_chimp_id = Some(mailchimp::response_id(&response)?);
        self.members.update(&member).await?;
        tracing::info!(member_id = %member.id, list_id = %list_id, "member created remotely");

        Ok(member)
    }

    /// Fetch one member from the local store, scoped by its list.
    ///
    /// # Errors
    ///
    /// Not-found for an unknown list or member id. Reads never call the
    /// remote system.
    pub async fn show(&self, list_id: ListId, member_id: MemberId) -> Result<Member, AppError> {
        self.require_list(list_id).await?;
        self.require_member(list_id, member_id).await
    }

    /// Fetch every member of a list from the local store.
    ///
    /// # Errors
    ///
    /// Not-found for an unknown list id.
    pub async fn index(&self, list_id: ListId) -> Result<Vec<Member>, AppError> {
        self.require_list(list_id).await?;
        Ok(self.members.find_by_list(list_id).await?)
    }

    /// Update a member: email guard, merge, validate, propagate remotely,
    /// then persist.
    ///
    /// An attempt to change the email address is rejected before the
    /// merge, leaving the member untouched locally and remotely. Local
    /// persistence is deferred until after remote success. MailChimp can
    /// report a different member id on replace; a changed id is adopted.
    ///
    /// # Errors
    ///
    /// Not-found for unknown ids, the email-change rejection, validation
    /// failures, not-synced when either the member or its list has no
    /// remote id, or a remote failure (local state untouched).
    pub async fn update(
        &self,
        list_id: ListId,
        member_id: MemberId,
        payload: MemberProjection,
    ) -> Result<Member, AppError> {
        let list = self.require_list(list_id).await?;
        let mut member = self.require_member(list_id, member_id).await?;

        // before any field merge: the address is immutable
        if let Some(attempted) = payload.email_address.as_deref() {
            let attempted_normalized = email::normalize(attempted);
            if !attempted_normalized.is_empty()
                && !member.email_address.normalized_eq(attempted)
            {
                return Err(AppError::EmailChange {
                    original: member.email_address.normalized(),
                    attempted: attempted_normalized,
                });
            }
        }

        let merged = member.remote_projection().overlaid(payload.clone());
        validation::validate_member(&merged).map_err(AppError::Validation)?;
        member.merge(payload);

        let list_remote_id = require_list_remote_id(&list)?;
        let Some(member_remote_id) = member.mail_chimp_id.clone() else {
            return Err(AppError::member_not_synced(
                IdsDesc::new().list_id(list_id).member_id(member_id),
            ));
        };

        let response = self
            .mailchimp
            .put(
                &format!("lists/{list_remote_id}/members/{member_remote_id}"),
                &wire_body(&member.remote_projection())?,
            )
            .await?;

        // the replace can hand back a different remote id; adopt it
        if let Ok(remote_id) = mailchimp::response_id(&response)
            && member.mail_chimp_id.as_deref() != Some(remote_id.as_str())
        {
            tracing::warn!(
                member_id = %member.id,
                old = ?member.mail_chimp_id,
                new = %remote_id,
                "remote member id changed"
            );
            member.mail_chimp_id = Some(remote_id);
        }

        self.members.update(&member).await?;
        tracing::info!(member_id = %member.id, list_id = %list_id, "member updated");

        Ok(member)
    }

    /// Delete a member: remote first, local removal only on remote
    /// success.
    ///
    /// # Errors
    ///
    /// Not-found for unknown ids, not-synced for a missing remote id; a
    /// remote failure leaves the local row in place.
    pub async fn remove(&self, list_id: ListId, member_id: MemberId) -> Result<(), AppError> {
        let list = self.require_list(list_id).await?;
        let member = self.require_member(list_id, member_id).await?;

        let list_remote_id = require_list_remote_id(&list)?;
        let Some(member_remote_id) = member.mail_chimp_id else {
            return Err(AppError::member_not_synced(
                IdsDesc::new().list_id(list_id).member_id(member_id),
            ));
        };

        self.mailchimp
            .delete(&format!(
                "lists/{list_remote_id}/members/{member_remote_id}"
            ))
            .await?;

        self.members.remove(member_id).await?;
        tracing::info!(member_id = %member_id, list_id = %list_id, "member removed");

        Ok(())
    }

    /// The duplicate guard: one email address per list.
    ///
    /// Lookup uses store-level equality on the address as given; no
    /// normalization is applied here. Inherently racy under concurrent
    /// creates; the remote system's own duplicate handling is the
    /// backstop.
    async fn check_duplicate(
        &self,
        list_id: ListId,
        email_address: &str,
    ) -> Result<(), AppError> {
        let existing = self.members.find_by_email(list_id, email_address).await?;
        if existing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Conflict(duplicate_email_message(
                email_address,
                list_id,
            )))
        }
    }

    async fn require_list(&self, list_id: ListId) -> Result<List, AppError> {
        self.lists
            .find(list_id)
            .await?
            .ok_or_else(|| AppError::list_not_found(IdsDesc::new().list_id(list_id)))
    }

    async fn require_member(
        &self,
        list_id: ListId,
        member_id: MemberId,
    ) -> Result<Member, AppError> {
        self.members
            .find_in_list(list_id, member_id)
            .await?
            .ok_or_else(|| {
                AppError::member_not_found(IdsDesc::new().list_id(list_id).member_id(member_id))
            })
    }
}

fn require_list_remote_id(list: &List) -> Result<String, AppError> {
    list.mail_chimp_id
        .clone()
        .ok_or_else(|| AppError::list_not_synced(IdsDesc::new().list_id(list.id)))
}

/// Error message for a duplicate email address under one list.
fn duplicate_email_message(email_address: &str, list_id: ListId) -> String {
    format!(
        "A list cannot have duplicate email addresses. \
         [Email: {email_address}] [List ID: {list_id}]"
    )
}
