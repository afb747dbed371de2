//! API tests for the member endpoints: duplicate guard, email
//! immutability, and the remote-before-local mutation ordering.

#![allow(clippy::unwrap_used)]

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_list, create_member, list_payload, member_payload, request, test_app};

#[tokio::test]
async fn create_member_returns_entity_with_remote_id() {
    let app = test_app();
    let list_id = create_list(&app).await;

    let (status, body) = request(
        &app.app,
        "POST",
        &format!("/mailchimp/lists/{list_id}/members"),
        Some(member_payload("jane@doe.com")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email_address"], "jane@doe.com");
    assert_eq!(body["status"], "subscribed");
    assert_eq!(body["list_id"], list_id.as_str());
    assert!(body["member_id"].as_str().is_some());
    assert_eq!(body["mail_chimp_id"], "mc-2");

    let call = app.mailchimp.last_call().unwrap();
    assert_eq!(call.method, "POST");
    assert_eq!(call.path, "lists/mc-1/members");

    // MailChimp addresses the list through the path, not the body
    let remote_body = call.body.unwrap();
    assert!(remote_body.get("list_id").is_none());
    assert_eq!(remote_body["email_address"], "jane@doe.com");
}

#[tokio::test]
async fn create_member_coerces_loosely_typed_vip() {
    let app = test_app();
    let list_id = create_list(&app).await;

    let mut payload = member_payload("jane@doe.com");
    payload["vip"] = json!("1");

    let (status, body) = request(
        &app.app,
        "POST",
        &format!("/mailchimp/lists/{list_id}/members"),
        Some(payload),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vip"], true);
}

#[tokio::test]
async fn create_member_on_unknown_list_is_not_found() {
    let app = test_app();

    let (status, body) = request(
        &app.app,
        "POST",
        "/mailchimp/lists/6c2b8ecd-c9c9-4b41-9a61-ae88c132eb19/members",
        Some(member_payload("jane@doe.com")),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().starts_with("List not found"));
    assert_eq!(app.mailchimp.call_count(), 0);
}

#[tokio::test]
async fn create_member_on_unsynced_list_is_rejected() {
    let app = test_app();
    app.mailchimp.fail_with("down");
    let _ = request(&app.app, "POST", "/mailchimp/lists", Some(list_payload())).await;
    app.mailchimp.succeed();

    let (_, lists) = request(&app.app, "GET", "/mailchimp/lists", None).await;
    let list_id = lists[0]["list_id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &app.app,
        "POST",
        &format!("/mailchimp/lists/{list_id}/members"),
        Some(member_payload("jane@doe.com")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("not found on remote system")
    );

    let (_, members) = request(
        &app.app,
        "GET",
        &format!("/mailchimp/lists/{list_id}/members"),
        None,
    )
    .await;
    assert_eq!(members.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn duplicate_member_email_is_rejected_with_zero_side_effects() {
    let app = test_app();
    let list_id = create_list(&app).await;
    create_member(&app, &list_id, "a@b.com").await;
    let calls_before = app.mailchimp.call_count();

    let (status, body) = request(
        &app.app,
        "POST",
        &format!("/mailchimp/lists/{list_id}/members"),
        Some(member_payload("a@b.com")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("duplicate"));
    assert!(message.contains("a@b.com"));
    assert!(message.contains(&list_id));

    // no remote call, no new local row
    assert_eq!(app.mailchimp.call_count(), calls_before);
    let (_, members) = request(
        &app.app,
        "GET",
        &format!("/mailchimp/lists/{list_id}/members"),
        None,
    )
    .await;
    assert_eq!(members.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_member_validation_failure_has_no_side_effects() {
    let app = test_app();
    let list_id = create_list(&app).await;
    let calls_before = app.mailchimp.call_count();

    let (status, body) = request(
        &app.app,
        "POST",
        &format!("/mailchimp/lists/{list_id}/members"),
        Some(json!({"email_address": "jane@doe.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid data given");
    assert!(body["errors"].get("status").is_some());

    assert_eq!(app.mailchimp.call_count(), calls_before);
    let (_, members) = request(
        &app.app,
        "GET",
        &format!("/mailchimp/lists/{list_id}/members"),
        None,
    )
    .await;
    assert_eq!(members.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn create_member_rejects_mismatched_body_list_id() {
    let app = test_app();
    let list_id = create_list(&app).await;

    let mut payload = member_payload("jane@doe.com");
    payload["list_id"] = json!("11111111-1111-1111-1111-111111111111");

    let (status, body) = request(
        &app.app,
        "POST",
        &format!("/mailchimp/lists/{list_id}/members"),
        Some(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].get("list_id").is_some());
}

#[tokio::test]
async fn create_member_remote_failure_keeps_unsynced_local_row() {
    let app = test_app();
    let list_id = create_list(&app).await;
    app.mailchimp.fail_with("member rejected");

    let (status, body) = request(
        &app.app,
        "POST",
        &format!("/mailchimp/lists/{list_id}/members"),
        Some(member_payload("jane@doe.com")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("member rejected"));

    let (_, members) = request(
        &app.app,
        "GET",
        &format!("/mailchimp/lists/{list_id}/members"),
        None,
    )
    .await;
    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert!(members[0]["mail_chimp_id"].is_null());
}

#[tokio::test]
async fn show_member_returns_local_copy() {
    let app = test_app();
    let list_id = create_list(&app).await;
    let member_id = create_member(&app, &list_id, "jane@doe.com").await;

    let (status, body) = request(
        &app.app,
        "GET",
        &format!("/mailchimp/lists/{list_id}/members/{member_id}"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["member_id"], member_id.as_str());
    assert_eq!(body["email_address"], "jane@doe.com");
}

#[tokio::test]
async fn show_unknown_member_is_not_found_with_both_ids() {
    let app = test_app();
    let list_id = create_list(&app).await;
    let missing = "0a0a0a0a-0a0a-0a0a-0a0a-0a0a0a0a0a0a";

    let (status, body) = request(
        &app.app,
        "GET",
        &format!("/mailchimp/lists/{list_id}/members/{missing}"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        format!("Member not found [List Id:{list_id}|Member Id:{missing}]")
    );
}

#[tokio::test]
async fn update_member_changing_email_is_rejected_before_any_merge() {
    let app = test_app();
    let list_id = create_list(&app).await;
    let member_id = create_member(&app, &list_id, "a@b.com").await;
    let calls_before = app.mailchimp.call_count();

    let (status, body) = request(
        &app.app,
        "PUT",
        &format!("/mailchimp/lists/{list_id}/members/{member_id}"),
        Some(json!({"email_address": "c@d.com", "status": "unsubscribed"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("a@b.com"));
    assert!(message.contains("c@d.com"));

    // completely unchanged, locally and remotely
    assert_eq!(app.mailchimp.call_count(), calls_before);
    let (_, shown) = request(
        &app.app,
        "GET",
        &format!("/mailchimp/lists/{list_id}/members/{member_id}"),
        None,
    )
    .await;
    assert_eq!(shown["email_address"], "a@b.com");
    assert_eq!(shown["status"], "subscribed");
}

#[tokio::test]
async fn update_member_same_email_different_case_is_not_a_change() {
    let app = test_app();
    let list_id = create_list(&app).await;
    let member_id = create_member(&app, &list_id, "a@b.com").await;

    let (status, body) = request(
        &app.app,
        "PUT",
        &format!("/mailchimp/lists/{list_id}/members/{member_id}"),
        Some(json!({"email_address": " A@B.COM ", "status": "unsubscribed"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unsubscribed");
    assert_eq!(body["email_address"], "a@b.com");
}

#[tokio::test]
async fn update_member_puts_remote_then_persists() {
    let app = test_app();
    let list_id = create_list(&app).await;
    let member_id = create_member(&app, &list_id, "jane@doe.com").await;

    let (status, body) = request(
        &app.app,
        "PUT",
        &format!("/mailchimp/lists/{list_id}/members/{member_id}"),
        Some(json!({"status": "unsubscribed", "language": "fr"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unsubscribed");
    assert_eq!(body["language"], "fr");

    let call = app.mailchimp.last_call().unwrap();
    assert_eq!(call.method, "PUT");
    assert_eq!(call.path, "lists/mc-1/members/mc-2");
}

#[tokio::test]
async fn update_member_remote_failure_leaves_local_state_untouched() {
    let app = test_app();
    let list_id = create_list(&app).await;
    let member_id = create_member(&app, &list_id, "jane@doe.com").await;
    app.mailchimp.fail_with("nope");

    let (status, _) = request(
        &app.app,
        "PUT",
        &format!("/mailchimp/lists/{list_id}/members/{member_id}"),
        Some(json!({"status": "unsubscribed"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, shown) = request(
        &app.app,
        "GET",
        &format!("/mailchimp/lists/{list_id}/members/{member_id}"),
        None,
    )
    .await;
    assert_eq!(shown["status"], "subscribed");
}

#[tokio::test]
async fn update_member_adopts_changed_remote_id() {
    let app = test_app();
    let list_id = create_list(&app).await;
    let member_id = create_member(&app, &list_id, "jane@doe.com").await;
    app.mailchimp.set_put_response_id("mc-99");

    let (status, body) = request(
        &app.app,
        "PUT",
        &format!("/mailchimp/lists/{list_id}/members/{member_id}"),
        Some(json!({"status": "pending"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mail_chimp_id"], "mc-99");

    let (_, shown) = request(
        &app.app,
        "GET",
        &format!("/mailchimp/lists/{list_id}/members/{member_id}"),
        None,
    )
    .await;
    assert_eq!(shown["mail_chimp_id"], "mc-99");
}

#[tokio::test]
async fn update_member_validation_failure_skips_remote_call() {
    let app = test_app();
    let list_id = create_list(&app).await;
    let member_id = create_member(&app, &list_id, "jane@doe.com").await;
    let calls_before = app.mailchimp.call_count();

    let (status, body) = request(
        &app.app,
        "PUT",
        &format!("/mailchimp/lists/{list_id}/members/{member_id}"),
        Some(json!({"status": "archived"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].get("status").is_some());
    assert_eq!(app.mailchimp.call_count(), calls_before);
}

#[tokio::test]
async fn index_members_lists_local_copies() {
    let app = test_app();
    let list_id = create_list(&app).await;
    create_member(&app, &list_id, "a@b.com").await;
    create_member(&app, &list_id, "c@d.com").await;

    let (status, body) = request(
        &app.app,
        "GET",
        &format!("/mailchimp/lists/{list_id}/members"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let members = body.as_array().unwrap();
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn delete_member_removes_remote_then_local() {
    let app = test_app();
    let list_id = create_list(&app).await;
    let member_id = create_member(&app, &list_id, "jane@doe.com").await;

    let (status, body) = request(
        &app.app,
        "DELETE",
        &format!("/mailchimp/lists/{list_id}/members/{member_id}"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let call = app.mailchimp.last_call().unwrap();
    assert_eq!(call.method, "DELETE");
    assert_eq!(call.path, "lists/mc-1/members/mc-2");

    let (status, _) = request(
        &app.app,
        "GET",
        &format!("/mailchimp/lists/{list_id}/members/{member_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_member_remote_failure_keeps_local_row() {
    let app = test_app();
    let list_id = create_list(&app).await;
    let member_id = create_member(&app, &list_id, "jane@doe.com").await;
    app.mailchimp.fail_with("cannot delete");

    let (status, _) = request(
        &app.app,
        "DELETE",
        &format!("/mailchimp/lists/{list_id}/members/{member_id}"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app.app,
        "GET",
        &format!("/mailchimp/lists/{list_id}/members/{member_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn duplicate_guard_uses_stored_form_equality() {
    let app = test_app();
    let list_id = create_list(&app).await;
    create_member(&app, &list_id, "a@b.com").await;

    // stored-form lookup: a case variant passes the guard (accepted race
    // semantics; the remote system is the backstop)
    let (status, _) = request(
        &app.app,
        "POST",
        &format!("/mailchimp/lists/{list_id}/members"),
        Some(member_payload("A@b.com")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}
