//! End-to-end wiring test against the embedded in-memory engine.

use trackem_auth::{AuthConfig, RequestCredentials, token};
use trackem_core::Identity;
use trackem_core::models::group::CreateGroup;
use trackem_core::repository::MembershipStore;
use trackem_db::{DbConfig, DbManager, SurrealMembershipStore};
use trackem_groups::GroupsConfig;
use trackem_server::App;

async fn app() -> (App, AuthConfig) {
    let config = DbConfig {
        url: "mem://".into(),
        ..DbConfig::default()
    };
    let manager = DbManager::connect(&config).await.unwrap();
    trackem_db::run_migrations(manager.client()).await.unwrap();

    let auth = AuthConfig {
        legacy_jwt_secret: Some("legacy-secret".into()),
        ..AuthConfig::default()
    };
    let app = App::new(
        SurrealMembershipStore::new(manager.client().clone()),
        &auth,
        GroupsConfig::default(),
    );
    (app, auth)
}

#[tokio::test]
async fn bootstrap_admin_is_idempotent() {
    let (app, _) = app().await;

    app.bootstrap_admin("root@example.com").await.unwrap();
    app.bootstrap_admin("root@example.com").await.unwrap();

    let user = app.store.get_user_by_email("root@example.com").await.unwrap();
    assert!(user.is_global_admin);
    assert_eq!(user.username, "root");
}

#[tokio::test]
async fn resolved_identity_drives_the_services() {
    let (app, auth) = app().await;
    app.bootstrap_admin("root@example.com").await.unwrap();
    let user = app.store.get_user_by_email("root@example.com").await.unwrap();

    let bearer = token::issue_legacy_token(Identity::global_admin(user.id), &auth).unwrap();
    let caller = app
        .identity
        .resolve(&RequestCredentials::bearer(bearer))
        .unwrap();

    let group = app
        .memberships
        .create_group(
            caller,
            CreateGroup {
                name: "Ops".into(),
                description: None,
            },
        )
        .await
        .unwrap();

    let overview = app
        .activities
        .group_overview(caller, group.id)
        .await
        .unwrap();
    assert_eq!(overview.members.len(), 1);

    let pending = app.invitations.list_pending(caller, group.id).await.unwrap();
    assert!(pending.is_empty());
}
