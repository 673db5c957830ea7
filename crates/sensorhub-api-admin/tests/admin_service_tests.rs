//! AdminService behaviour over in-memory collaborators.

mod common;

use common::{account, claims, seed, TestBackend};
use sensorhub_api_admin::models::{ListUsersQuery, UpdateUserRequest};
use sensorhub_api_admin::AdminApiError;
use sensorhub_store::{DeviceRepository, ProfileRepository, RecordRepository};
use serde_json::json;

#[tokio::test]
async fn test_list_users_counts_owned_devices() {
    let backend = TestBackend::new();
    seed(&backend).await;

    let page = backend
        .service
        .list_users(&ListUsersQuery::default())
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert!(page.next_page_token.is_none());
    let alice = page.users.iter().find(|u| u.uid == "alice").unwrap();
    let bob = page.users.iter().find(|u| u.uid == "bob").unwrap();
    assert_eq!(alice.device_count, 2);
    assert_eq!(bob.device_count, 1);
    assert!(!alice.admin);
}

#[tokio::test]
async fn test_list_users_pages_with_cursor() {
    let backend = TestBackend::new();
    for uid in ["u1", "u2", "u3"] {
        backend
            .identity
            .insert(account(uid, &format!("{uid}@example.com"), uid))
            .await;
    }

    let first = backend
        .service
        .list_users(&ListUsersQuery {
            limit: Some(2),
            page_token: None,
        })
        .await
        .unwrap();
    assert_eq!(first.total, 2);
    let cursor = first.next_page_token.clone().unwrap();

    let second = backend
        .service
        .list_users(&ListUsersQuery {
            limit: Some(2),
            page_token: Some(cursor),
        })
        .await
        .unwrap();
    assert_eq!(second.total, 1);
    assert_eq!(second.users[0].uid, "u3");
}

#[tokio::test]
async fn test_list_users_failure_is_prefixed() {
    let backend = TestBackend::new();
    backend.db.fail_on("list_devices").await;

    let err = backend
        .service
        .list_users(&ListUsersQuery::default())
        .await
        .unwrap_err();

    match err {
        AdminApiError::ServiceFailure(msg) => {
            assert!(msg.starts_with("Failed to fetch users: "), "{msg}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_admin_only_update_preserves_fields_and_claims() {
    let backend = TestBackend::new();
    seed(&backend).await;

    let request = UpdateUserRequest {
        admin: Some(true),
        ..Default::default()
    };
    backend.service.update_user("alice", &request).await.unwrap();

    let alice = backend.identity.snapshot("alice").await.unwrap();
    assert!(alice.is_admin());
    assert_eq!(alice.custom_claims["tier"], "gold");
    assert_eq!(alice.email.as_deref(), Some("alice@example.com"));
    assert_eq!(alice.display_name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn test_update_fields_without_admin_leaves_claims() {
    let backend = TestBackend::new();
    seed(&backend).await;
    backend.identity.fail_on("set_custom_claims").await;

    let request = UpdateUserRequest {
        display_name: Some("Alice L.".to_string()),
        disabled: Some(true),
        ..Default::default()
    };
    backend.service.update_user("alice", &request).await.unwrap();

    let alice = backend.identity.snapshot("alice").await.unwrap();
    assert_eq!(alice.display_name.as_deref(), Some("Alice L."));
    assert!(alice.disabled);
    assert_eq!(alice.custom_claims, claims(json!({ "tier": "gold" })));
}

#[tokio::test]
async fn test_revoking_admin_keeps_other_claims() {
    let backend = TestBackend::new();
    let mut carol = account("carol", "carol@example.com", "Carol");
    carol.custom_claims = claims(json!({ "admin": true, "region": "eu" }));
    backend.identity.insert(carol).await;

    let request = UpdateUserRequest {
        admin: Some(false),
        ..Default::default()
    };
    backend.service.update_user("carol", &request).await.unwrap();

    let carol = backend.identity.snapshot("carol").await.unwrap();
    assert_eq!(
        carol.custom_claims,
        claims(json!({ "admin": false, "region": "eu" }))
    );
}

#[tokio::test]
async fn test_update_unknown_account_is_service_failure() {
    let backend = TestBackend::new();

    let request = UpdateUserRequest {
        email: Some("x@example.com".to_string()),
        ..Default::default()
    };
    let err = backend
        .service
        .update_user("nobody", &request)
        .await
        .unwrap_err();

    assert!(matches!(err, AdminApiError::ServiceFailure(ref m) if m.starts_with("Failed to update user: ")));
}

#[tokio::test]
async fn test_delete_user_cascades_everything_owned() {
    let backend = TestBackend::new();
    seed(&backend).await;

    backend.service.delete_user("alice").await.unwrap();

    assert!(backend.identity.snapshot("alice").await.is_none());
    assert!(backend.db.devices_by_owner("alice").await.unwrap().is_empty());
    assert!(backend.db.records_by_owner("alice").await.unwrap().is_empty());
    assert!(backend.db.get_profile("alice").await.unwrap().is_none());

    // Bob's data is untouched.
    assert_eq!(backend.db.devices_by_owner("bob").await.unwrap().len(), 1);
    assert_eq!(backend.db.record_count().await, 1);
}

#[tokio::test]
async fn test_delete_user_without_account_still_cleans_data() {
    let backend = TestBackend::new();
    seed(&backend).await;

    backend.service.delete_user("ghost").await.unwrap();

    assert!(backend.db.devices_by_owner("ghost").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_user_reports_failed_step_and_can_resume() {
    let backend = TestBackend::new();
    seed(&backend).await;
    backend.db.fail_on("delete_record").await;

    let err = backend.service.delete_user("alice").await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("Failed to delete user: "), "{msg}");
    assert!(msg.contains("step 'records' failed"), "{msg}");
    assert!(msg.contains("[identity account, devices]"), "{msg}");

    // Earlier steps took effect, later ones did not.
    assert!(backend.identity.snapshot("alice").await.is_none());
    assert!(backend.db.devices_by_owner("alice").await.unwrap().is_empty());
    assert!(backend.db.get_profile("alice").await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_user_identity_failure_stops_before_data() {
    let backend = TestBackend::new();
    seed(&backend).await;
    backend.identity.fail_on("delete_account").await;

    let err = backend.service.delete_user("alice").await.unwrap_err();

    assert!(err.to_string().contains("step 'identity account' failed (completed: [])"));
    assert_eq!(backend.db.devices_by_owner("alice").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_user_twice_is_idempotent() {
    let backend = TestBackend::new();
    seed(&backend).await;

    backend.service.delete_user("alice").await.unwrap();
    backend.service.delete_user("alice").await.unwrap();
}

#[tokio::test]
async fn test_list_devices_enrichment_and_order() {
    let backend = TestBackend::new();
    seed(&backend).await;

    let listing = backend.service.list_devices().await.unwrap();

    let ids: Vec<&str> = listing.devices.iter().map(|d| d.device_id.as_str()).collect();
    assert_eq!(ids, vec!["dev-b1", "dev-a1", "dev-g1", "dev-a2"]);
    assert_eq!(listing.total, 4);

    let a1 = &listing.devices[1];
    assert_eq!(a1.last_active, Some(300));
    assert_eq!(a1.user_email, Some(Some("alice@example.com".to_string())));

    let ghost = &listing.devices[2];
    assert_eq!(ghost.user_email, Some(Some("Unknown".to_string())));
    assert_eq!(ghost.user_display_name, Some(Some("Deleted User".to_string())));
    assert_eq!(ghost.last_active, None);

    // Records without a timestamp do not count as activity.
    assert_eq!(listing.devices[3].last_active, None);
}

#[tokio::test]
async fn test_list_devices_owner_lookup_failure_falls_back() {
    let backend = TestBackend::new();
    seed(&backend).await;
    backend.identity.fail_on("get_account").await;

    let listing = backend.service.list_devices().await.unwrap();

    assert!(listing
        .devices
        .iter()
        .all(|d| d.user_email == Some(Some("Unknown".to_string()))));
}

#[tokio::test]
async fn test_unowned_device_has_no_owner_fields() {
    let backend = TestBackend::new();
    backend
        .db
        .insert_device("dev-x", json!({ "registered_at": 10 }))
        .await;

    let listing = backend.service.list_devices().await.unwrap();

    assert!(listing.devices[0].user_id.is_none());
    assert!(listing.devices[0].user_email.is_none());
}

#[tokio::test]
async fn test_delete_device_keeps_records() {
    let backend = TestBackend::new();
    seed(&backend).await;

    backend.service.delete_device("dev-a1").await.unwrap();
    backend.service.delete_device("dev-a1").await.unwrap();

    let listing = backend.service.list_devices().await.unwrap();
    assert!(listing.devices.iter().all(|d| d.device_id != "dev-a1"));
    assert_eq!(backend.db.records_by_device("dev-a1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_profile_found_and_missing() {
    let backend = TestBackend::new();
    seed(&backend).await;

    let profile = backend.service.get_profile("alice").await.unwrap();
    assert_eq!(profile.status, "success");
    assert_eq!(profile.profile["units"], "metric");

    let err = backend.service.get_profile("bob").await.unwrap_err();
    assert!(matches!(err, AdminApiError::NotFound(ref m) if m == "User profile not found"));
}

#[tokio::test]
async fn test_blank_profile_is_not_found() {
    let backend = TestBackend::new();
    backend.db.insert_profile("carol", json!("")).await;
    backend.db.insert_profile("dave", json!({})).await;

    for uid in ["carol", "dave"] {
        let err = backend.service.get_profile(uid).await.unwrap_err();
        assert!(matches!(err, AdminApiError::NotFound(_)));
    }
}

#[tokio::test]
async fn test_user_devices_with_last_active() {
    let backend = TestBackend::new();
    seed(&backend).await;

    let listing = backend.service.user_devices("alice").await.unwrap();

    assert_eq!(listing.total, 2);
    let a1 = listing.devices.iter().find(|d| d.device_id == "dev-a1").unwrap();
    assert_eq!(a1.registered_at, Some(3000));
    assert_eq!(a1.last_active, Some(300));

    let none = backend.service.user_devices("nobody").await.unwrap();
    assert_eq!(none.total, 0);
}

#[tokio::test]
async fn test_stats_match_collection_sizes() {
    let backend = TestBackend::new();
    seed(&backend).await;
    for i in 0..1203 {
        backend
            .identity
            .insert(account(&format!("bulk-{i:04}"), "bulk@example.com", "Bulk"))
            .await;
    }

    let before = chrono::Utc::now().timestamp_millis();
    let stats = backend.service.stats().await.unwrap();

    assert_eq!(stats.user_count, 1205);
    assert_eq!(stats.device_count, 4);
    assert_eq!(stats.total_records, 4);
    assert!(stats.timestamp >= before);
}

#[tokio::test]
async fn test_stats_failure_is_prefixed() {
    let backend = TestBackend::new();
    backend.db.fail_on("count_records").await;

    let err = backend.service.stats().await.unwrap_err();
    assert!(err.to_string().starts_with("Failed to fetch stats: "));
}
