//! Service wiring.

use surrealdb::engine::any::Any;
use tracing::info;
use trackem_auth::{AuthConfig, IdentityResolver};
use trackem_core::TrackemError;
use trackem_core::models::user::CreateUser;
use trackem_core::repository::MembershipStore;
use trackem_db::SurrealMembershipStore;
use trackem_groups::{
    ActivityService, GroupsConfig, InvitationService, LogEmailSender, MembershipService,
};

use crate::error::ServerResult;

pub type Store = SurrealMembershipStore<Any>;

/// Everything a request handler needs.
pub struct App {
    pub store: Store,
    pub identity: IdentityResolver,
    pub memberships: MembershipService<Store>,
    pub invitations: InvitationService<Store, LogEmailSender>,
    pub activities: ActivityService<Store>,
}

impl App {
    pub fn new(store: Store, auth: &AuthConfig, groups: GroupsConfig) -> Self {
        Self {
            identity: IdentityResolver::from_config(auth),
            memberships: MembershipService::new(store.clone()),
            invitations: InvitationService::new(store.clone(), LogEmailSender, groups),
            activities: ActivityService::new(store.clone()),
            store,
        }
    }

    /// Make sure a global admin with `email` exists.
    pub async fn bootstrap_admin(&self, email: &str) -> ServerResult<()> {
        match self.store.get_user_by_email(email).await {
            Ok(user) => {
                info!(user_id = %user.id, "Bootstrap admin already exists");
                Ok(())
            }
            Err(TrackemError::NotFound { .. }) => {
                let username = email.split('@').next().unwrap_or(email).to_string();
                let user = self
                    .store
                    .create_user(CreateUser {
                        username,
                        email: email.to_string(),
                        email_verified: true,
                        is_global_admin: true,
                    })
                    .await?;
                info!(user_id = %user.id, "Bootstrap admin created");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
