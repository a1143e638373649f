use trackem_core::authz::AccessContext;
use trackem_core::error::TrackemResult;
use trackem_core::models::group::Group;
use trackem_core::repository::MembershipStore;
use trackem_core::Identity;
use uuid::Uuid;

/// Load a group and the caller's standing in it.
pub(crate) async fn load<S: MembershipStore>(
    store: &S,
    identity: Identity,
    group_id: Uuid,
) -> TrackemResult<(Group, AccessContext)> {
    let group = store.get_group(group_id).await?;
    let membership = store.get_membership(identity.user_id, group_id).await?;
    let ctx = AccessContext::new(identity, &group, membership.as_ref());
    Ok((group, ctx))
}
