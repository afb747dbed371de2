//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::db::{ListStore, MemberStore};
use crate::mailchimp::MailchimpApi;
use crate::services::{ListService, MemberService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// sync services and configuration. The store and remote client are
/// injected as trait objects so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    lists: ListService,
    members: MemberService,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create a new application state over injected collaborators.
    pub fn new(
        config: Config,
        list_store: Arc<dyn ListStore>,
        member_store: Arc<dyn MemberStore>,
        mailchimp: Arc<dyn MailchimpApi>,
    ) -> Self {
        let lists = ListService::new(Arc::clone(&list_store), Arc::clone(&mailchimp));
        let members = MemberService::new(list_store, member_store, mailchimp);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                lists,
                members,
                pool: None,
            }),
        }
    }

    /// Attach the database pool (used by the readiness probe).
    #[must_use]
    pub fn with_pool(self, pool: PgPool) -> Self {
        let inner = &self.inner;
        Self {
            inner: Arc::new(AppStateInner {
                config: inner.config.clone(),
                lists: inner.lists.clone(),
                members: inner.members.clone(),
                pool: Some(pool),
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get a reference to the list sync service.
    #[must_use]
    pub fn lists(&self) -> &ListService {
        &self.inner.lists
    }

    /// Get a reference to the member sync service.
    #[must_use]
    pub fn members(&self) -> &MemberService {
        &self.inner.members
    }

    /// Get the database pool, if one is attached.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
