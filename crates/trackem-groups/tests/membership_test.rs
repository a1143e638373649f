//! Integration tests for group and membership management using
//! in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use trackem_core::authz::GroupRole;
use trackem_core::models::activity::CreateActivity;
use trackem_core::models::group::{CreateGroup, Group};
use trackem_core::models::membership::MemberRef;
use trackem_core::models::user::{CreateUser, User};
use trackem_core::repository::MembershipStore;
use trackem_core::{Identity, TrackemError};
use trackem_db::SurrealMembershipStore;
use trackem_groups::{ActivityService, MembershipService};
use uuid::Uuid;

type Store = SurrealMembershipStore<Db>;

struct Fixture {
    store: Store,
    service: MembershipService<Store>,
    owner: User,
    admin: User,
    member: User,
    group: Group,
}

async fn user(store: &Store, name: &str) -> User {
    store
        .create_user(CreateUser {
            username: name.into(),
            email: format!("{name}@x.com"),
            email_verified: true,
            is_global_admin: false,
        })
        .await
        .unwrap()
}

/// Helper: group with an owner, an admin and a plain member.
async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    trackem_db::run_migrations(&db).await.unwrap();

    let store = SurrealMembershipStore::new(db);
    let service = MembershipService::new(store.clone());

    let owner = user(&store, "owner").await;
    let admin = user(&store, "admin").await;
    let member = user(&store, "member").await;
    let group = service
        .create_group(
            Identity::user(owner.id),
            CreateGroup {
                name: "  Climbing  ".into(),
                description: Some("Weekend trips".into()),
            },
        )
        .await
        .unwrap();
    for (u, is_admin) in [(&admin, true), (&member, false)] {
        service
            .add_existing_user(Identity::user(owner.id), group.id, MemberRef::Id(u.id), is_admin)
            .await
            .unwrap();
    }

    Fixture {
        store,
        service,
        owner,
        admin,
        member,
        group,
    }
}

async fn owner_is_admin(f: &Fixture) -> bool {
    f.store
        .get_membership(f.owner.id, f.group.id)
        .await
        .unwrap()
        .map(|m| m.is_admin)
        .unwrap_or(false)
}

#[tokio::test]
async fn create_group_makes_owner_an_admin_member() {
    let f = setup().await;
    assert_eq!(f.group.name, "Climbing");
    assert_eq!(f.group.owner_id, f.owner.id);
    assert!(owner_is_admin(&f).await);

    let members = f
        .service
        .list_members(Identity::user(f.member.id), f.group.id)
        .await
        .unwrap();
    let roles: Vec<_> = members.iter().map(|m| (m.username.as_str(), m.role)).collect();
    assert!(roles.contains(&("owner", GroupRole::Owner)));
    assert!(roles.contains(&("admin", GroupRole::Admin)));
    assert!(roles.contains(&("member", GroupRole::Member)));
}

#[tokio::test]
async fn blank_group_name_is_rejected() {
    let f = setup().await;
    let err = f
        .service
        .create_group(
            Identity::user(f.member.id),
            CreateGroup {
                name: "   ".into(),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TrackemError::Validation { .. }));
}

#[tokio::test]
async fn add_existing_user_checks_role_and_duplicates() {
    let f = setup().await;
    let newcomer = user(&f.store, "newcomer").await;

    let err = f
        .service
        .add_existing_user(
            Identity::user(f.member.id),
            f.group.id,
            MemberRef::Id(newcomer.id),
            false,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TrackemError::PermissionDenied));

    f.service
        .add_existing_user(
            Identity::user(f.admin.id),
            f.group.id,
            MemberRef::Email("NEWCOMER@x.com".into()),
            false,
        )
        .await
        .unwrap();

    let err = f
        .service
        .add_existing_user(
            Identity::user(f.admin.id),
            f.group.id,
            MemberRef::Id(newcomer.id),
            false,
        )
        .await
        .unwrap_err();
    assert!(
        matches!(err, TrackemError::Conflict { .. }),
        "expected Conflict, got: {err:?}"
    );

    let err = f
        .service
        .add_existing_user(
            Identity::user(f.admin.id),
            f.group.id,
            MemberRef::Id(Uuid::new_v4()),
            false,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TrackemError::NotFound { .. }));
}

#[tokio::test]
async fn owner_can_never_be_removed_or_demoted() {
    let f = setup().await;

    for caller in [f.owner.id, f.admin.id, f.member.id] {
        let err = f
            .service
            .remove(Identity::user(caller), f.group.id, f.owner.id)
            .await
            .unwrap_err();
        assert!(
            matches!(err, TrackemError::PermissionDenied),
            "expected PermissionDenied, got: {err:?}"
        );

        let err = f
            .service
            .set_admin_flag(Identity::user(caller), f.group.id, f.owner.id, false)
            .await
            .unwrap_err();
        assert!(matches!(err, TrackemError::PermissionDenied));
    }

    let global = Identity::global_admin(Uuid::new_v4());
    assert!(f.service.remove(global, f.group.id, f.owner.id).await.is_err());
    assert!(owner_is_admin(&f).await);
}

#[tokio::test]
async fn members_may_leave_but_not_remove_others() {
    let f = setup().await;

    let err = f
        .service
        .remove(Identity::user(f.member.id), f.group.id, f.admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackemError::PermissionDenied));

    f.service
        .remove(Identity::user(f.member.id), f.group.id, f.member.id)
        .await
        .unwrap();
    assert!(
        f.store
            .get_membership(f.member.id, f.group.id)
            .await
            .unwrap()
            .is_none()
    );

    let err = f
        .service
        .remove(Identity::user(f.admin.id), f.group.id, f.member.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackemError::NotFound { .. }));
}

#[tokio::test]
async fn admin_removes_member() {
    let f = setup().await;
    f.service
        .remove(Identity::user(f.admin.id), f.group.id, f.member.id)
        .await
        .unwrap();

    let members = f
        .service
        .list_members(Identity::user(f.owner.id), f.group.id)
        .await
        .unwrap();
    assert!(members.iter().all(|m| m.user_id != f.member.id));

    // Removed users lose read access.
    let err = f
        .service
        .list_members(Identity::user(f.member.id), f.group.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackemError::PermissionDenied));
}

#[tokio::test]
async fn only_owner_sets_admin_flag_and_never_on_self() {
    let f = setup().await;

    let err = f
        .service
        .set_admin_flag(Identity::user(f.admin.id), f.group.id, f.member.id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackemError::PermissionDenied));

    let err = f
        .service
        .set_admin_flag(Identity::user(f.admin.id), f.group.id, f.admin.id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackemError::PermissionDenied));

    let promoted = f
        .service
        .set_admin_flag(Identity::user(f.owner.id), f.group.id, f.member.id, true)
        .await
        .unwrap();
    assert!(promoted.is_admin);

    let demoted = f
        .service
        .set_admin_flag(Identity::user(f.owner.id), f.group.id, f.admin.id, false)
        .await
        .unwrap();
    assert!(!demoted.is_admin);
    assert!(owner_is_admin(&f).await);
}

#[tokio::test]
async fn delete_group_is_owner_only_and_cascades() {
    let f = setup().await;
    let activities = ActivityService::new(f.store.clone());
    let activity = activities
        .create_activity(
            Identity::user(f.admin.id),
            CreateActivity {
                group_id: f.group.id,
                name: "Bouldering".into(),
                description: None,
            },
        )
        .await
        .unwrap();

    let err = f
        .service
        .delete_group(Identity::user(f.admin.id), f.group.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackemError::PermissionDenied));

    f.service
        .delete_group(Identity::user(f.owner.id), f.group.id)
        .await
        .unwrap();

    assert!(matches!(
        f.store.get_group(f.group.id).await.unwrap_err(),
        TrackemError::NotFound { .. }
    ));
    assert!(matches!(
        f.store.get_activity(activity.id).await.unwrap_err(),
        TrackemError::NotFound { .. }
    ));
    assert!(f.store.list_memberships(f.group.id).await.unwrap().is_empty());
    assert!(
        f.service
            .list_groups(Identity::user(f.member.id))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn list_groups_reports_counts() {
    let f = setup().await;
    let groups = f
        .service
        .list_groups(Identity::user(f.member.id))
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].group.id, f.group.id);
    assert_eq!(groups[0].member_count, 3);
    assert_eq!(groups[0].activity_count, 0);
}

#[tokio::test]
async fn outsiders_cannot_see_members() {
    let f = setup().await;
    let outsider = user(&f.store, "outsider").await;
    let err = f
        .service
        .list_members(Identity::user(outsider.id), f.group.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackemError::PermissionDenied));
}
