//! Sync coordinator for mailing lists.

use std::sync::Arc;

use mailmirror_core::ListId;

use crate::db::ListStore;
use crate::error::AppError;
use crate::mailchimp::{self, MailchimpApi};
use crate::models::{IdsDesc, List, ListProjection};
use crate::validation;

use super::wire_body;

/// Orchestrates list mutations across the local store and MailChimp.
#[derive(Clone)]
pub struct ListService {
    store: Arc<dyn ListStore>,
    mailchimp: Arc<dyn MailchimpApi>,
}

impl ListService {
    /// Create a service over the injected collaborators.
    pub fn new(store: Arc<dyn ListStore>, mailchimp: Arc<dyn MailchimpApi>) -> Self {
        Self { store, mailchimp }
    }

    /// Create a list: validate, persist locally, create remotely, attach
    /// the remote id.
    ///
    /// # Errors
    ///
    /// Validation failures reject the request before any side effect. A
    /// remote failure leaves the local row without a `mail_chimp_id` and
    /// surfaces the remote message; the caller can retry with an update.
    pub async fn create(&self, payload: ListProjection) -> Result<List, AppError> {
        let mut list = List::from_payload(&payload).map_err(AppError::Validation)?;

        self.store.insert(&list).await?;
        tracing::info!(list_id = %list.id, "list persisted locally");

        let response = self
            .mailchimp
            .post("lists", &wire_body(&list.remote_projection())?)
            .await?;

        list.mail_chimp_id = Some(mailchimp::response_id(&response)?);
        self.store.update(&list).await?;
        tracing::info!(list_id = %list.id, mail_chimp_id = ?list.mail_chimp_id, "list created remotely");

        Ok(list)
    }

    /// Fetch one list from the local store.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the id is unknown locally. Reads
    /// never call the remote system.
    pub async fn show(&self, id: ListId) -> Result<List, AppError> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| AppError::list_not_found(IdsDesc::new().list_id(id)))
    }

    /// Fetch every list from the local store.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store fails.
    pub async fn index(&self) -> Result<Vec<List>, AppError> {
        Ok(self.store.all().await?)
    }

    /// Update a list: merge, validate, propagate remotely, then persist.
    ///
    /// Local persistence is deferred until after remote success, so a
    /// remote failure leaves the stored list unchanged.
    ///
    /// # Errors
    ///
    /// Not-found when the id is unknown; not-synced when the list has no
    /// remote id; validation or remote failures otherwise.
    pub async fn update(&self, id: ListId, payload: ListProjection) -> Result<List, AppError> {
        let Some(mut list) = self.store.find(id).await? else {
            return Err(AppError::list_not_found(IdsDesc::new().list_id(id)));
        };

        let merged = list.remote_projection().overlaid(payload.clone());
        validation::validate_list(&merged).map_err(AppError::Validation)?;
        list.merge(payload);

        let Some(remote_id) = list.mail_chimp_id.clone() else {
            return Err(AppError::list_not_synced(IdsDesc::new().list_id(id)));
        };

        self.mailchimp
            .patch(
                &format!("lists/{remote_id}"),
                &wire_body(&list.remote_projection())?,
            )
            .await?;

        self.store.update(&list).await?;
        tracing::info!(list_id = %list.id, "list updated");

        Ok(list)
    }

    /// Delete a list: remote first, local removal only on remote success.
    ///
    /// # Errors
    ///
    /// Not-found when the id is unknown; not-synced when the list has no
    /// remote id; a remote failure leaves the local row in place.
    pub async fn remove(&self, id: ListId) -> Result<(), AppError> {
        let Some(list) = self.store.find(id).await? else {
            return Err(AppError::list_not_found(IdsDesc::new().list_id(id)));
        };

        let Some(remote_id) = list.mail_chimp_id else {
            return Err(AppError::list_not_synced(IdsDesc::new().list_id(id)));
        };

        self.mailchimp.delete(&format!("lists/{remote_id}")).await?;

        self.store.remove(id).await?;
        tracing::info!(list_id = %id, "list removed");

        Ok(())
    }
}
