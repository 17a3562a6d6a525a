//! Session tracking through `PortalState` and privilege resolution.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use sol_city_core::types::{AppRole, Privilege};
use sol_city_integration_tests::{TestPortal, member};
use sol_city_portal::backend::Table;
use sol_city_portal::backend::memory::{MemoryIdentityProvider, Operation};

#[tokio::test]
async fn test_privilege_follows_identity_changes() {
    let portal = TestPortal::new();
    let admin = member("Mayor");
    let resident = member("Rita");
    portal.grant(admin.id, AppRole::Admin).await;
    portal.grant(resident.id, AppRole::User).await;
    let roles = portal.state.roles();

    let session = portal.state.start_session();
    let mut changes = session.watch();
    let state = session.ready().await;
    assert_eq!(roles.privilege(state.identity.as_ref()).await.unwrap(), Privilege::Anonymous);
    assert_eq!(portal.records.count(Operation::Select, Table::UserRoles).await, 0);

    portal.identity.sign_in(admin.clone()).await;
    changes.wait_for(|s| s.user_id() == Some(admin.id)).await.unwrap();
    assert!(roles.is_admin(session.identity().as_ref()).await.unwrap());

    portal.identity.sign_in(resident.clone()).await;
    changes.wait_for(|s| s.user_id() == Some(resident.id)).await.unwrap();
    assert_eq!(
        roles.privilege(session.identity().as_ref()).await.unwrap(),
        Privilege::Authenticated
    );
    assert_eq!(portal.records.count(Operation::Select, Table::UserRoles).await, 2);

    portal.state.sign_out().await.unwrap();
    changes.wait_for(|s| s.identity.is_none()).await.unwrap();
    assert!(!roles.is_admin(session.identity().as_ref()).await.unwrap());
    assert_eq!(portal.records.count(Operation::Select, Table::UserRoles).await, 2);
}

#[tokio::test]
async fn test_roles_query_failure_is_an_error_not_a_downgrade() {
    let portal = TestPortal::new();
    let admin = member("Mayor");
    portal.grant(admin.id, AppRole::Admin).await;
    portal.records.fail(Operation::Select, Table::UserRoles).await;

    let result = portal.state.roles().privilege(Some(&admin)).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_provider_degrades_to_signed_out() {
    let portal = TestPortal::with_timeout(Some(Duration::from_secs(10)));
    portal.identity.set_unreachable(true).await;

    let session = portal.state.start_session();
    assert!(session.loading());

    let state = session.ready().await;
    assert!(!state.loading);
    assert!(state.identity.is_none());

    // A later sign-in still gets through
    let mut changes = session.watch();
    let resident = member("Rita");
    portal.identity.sign_in(resident.clone()).await;
    changes.wait_for(|s| s.user_id() == Some(resident.id)).await.unwrap();
}

#[tokio::test]
async fn test_every_page_shares_one_provider() {
    let portal = TestPortal::new();
    let resident = member("Rita");
    portal
        .identity
        .set_session(Some(MemoryIdentityProvider::session_for(resident.clone())))
        .await;

    let header = portal.state.start_session();
    let page = portal.state.start_session();
    assert_eq!(portal.identity.subscriber_count(), 2);
    assert_eq!(header.ready().await.identity, Some(resident.clone()));
    assert_eq!(page.ready().await.identity, Some(resident));

    header.close().await;
    assert_eq!(portal.identity.subscriber_count(), 1);
    drop(page);
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
    assert_eq!(portal.identity.subscriber_count(), 0);
}

#[tokio::test]
async fn test_sign_in_url_carries_redirect() {
    let portal = TestPortal::new();
    let state = portal.state.clone().with_oauth("discord", "https://solcity.test/");

    let url = state.sign_in_url().await.unwrap();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    assert!(pairs.contains(&("provider".to_string(), "discord".to_string())));
    assert!(pairs.contains(&("redirect_to".to_string(), "https://solcity.test/".to_string())));
}
