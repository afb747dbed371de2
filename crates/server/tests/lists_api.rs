//! API tests for the list endpoints, driving the router with an
//! in-memory store and a scripted MailChimp fake.

#![allow(clippy::unwrap_used)]

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_list, list_payload, request, test_app};

#[tokio::test]
async fn create_list_returns_entity_with_remote_id() {
    let app = test_app();

    let (status, body) = request(&app.app, "POST", "/mailchimp/lists", Some(list_payload())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "New list");
    assert_eq!(body["visibility"], "prv");
    assert_eq!(body["contact"]["company"], "Doe Ltd.");
    assert!(body["list_id"].as_str().is_some());
    assert_eq!(body["mail_chimp_id"], "mc-1");

    let call = app.mailchimp.last_call().unwrap();
    assert_eq!(call.method, "POST");
    assert_eq!(call.path, "lists");

    // the remote projection carries no local bookkeeping fields
    let remote_body = call.body.unwrap();
    assert!(remote_body.get("list_id").is_none());
    assert!(remote_body.get("mail_chimp_id").is_none());
    assert_eq!(remote_body["name"], "New list");
}

#[tokio::test]
async fn create_list_with_missing_campaign_defaults_reports_subfields() {
    let app = test_app();
    let mut payload = list_payload();
    payload.as_object_mut().unwrap().remove("campaign_defaults");

    let (status, body) = request(&app.app, "POST", "/mailchimp/lists", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid data given");
    for key in [
        "campaign_defaults",
        "campaign_defaults.from_name",
        "campaign_defaults.from_email",
        "campaign_defaults.subject",
        "campaign_defaults.language",
    ] {
        assert!(body["errors"].get(key).is_some(), "missing errors entry {key}");
    }

    // rejected before any side effect
    assert_eq!(app.mailchimp.call_count(), 0);
    let (_, lists) = request(&app.app, "GET", "/mailchimp/lists", None).await;
    assert_eq!(lists.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn create_list_remote_failure_keeps_unsynced_local_row() {
    let app = test_app();
    app.mailchimp.fail_with("MailChimp is down");

    let (status, body) = request(&app.app, "POST", "/mailchimp/lists", Some(list_payload())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("MailChimp is down"));

    // the local row survives without a remote id; a later update can retry
    let (_, lists) = request(&app.app, "GET", "/mailchimp/lists", None).await;
    let lists = lists.as_array().unwrap();
    assert_eq!(lists.len(), 1);
    assert!(lists[0]["mail_chimp_id"].is_null());
}

#[tokio::test]
async fn show_list_returns_local_copy_without_remote_calls() {
    let app = test_app();
    let list_id = create_list(&app).await;
    let calls_after_create = app.mailchimp.call_count();

    let (status, body) =
        request(&app.app, "GET", &format!("/mailchimp/lists/{list_id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["list_id"], list_id.as_str());
    assert_eq!(app.mailchimp.call_count(), calls_after_create);
}

#[tokio::test]
async fn show_unknown_list_is_not_found() {
    let app = test_app();

    let (status, body) = request(
        &app.app,
        "GET",
        "/mailchimp/lists/6c2b8ecd-c9c9-4b41-9a61-ae88c132eb19",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        "List not found [List Id:6c2b8ecd-c9c9-4b41-9a61-ae88c132eb19]"
    );
}

#[tokio::test]
async fn show_malformed_list_id_is_not_found() {
    let app = test_app();

    let (status, body) =
        request(&app.app, "GET", "/mailchimp/lists/invalid-list-id", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "List not found [List Id:invalid-list-id]");
}

#[tokio::test]
async fn index_returns_all_lists() {
    let app = test_app();
    create_list(&app).await;

    let (status, body) = request(&app.app, "GET", "/mailchimp/lists", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn update_list_patches_remote_then_persists() {
    let app = test_app();
    let list_id = create_list(&app).await;

    let (status, body) = request(
        &app.app,
        "PUT",
        &format!("/mailchimp/lists/{list_id}"),
        Some(json!({"name": "Renamed list"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed list");
    // untouched fields survive the merge
    assert_eq!(body["contact"]["company"], "Doe Ltd.");

    let call = app.mailchimp.last_call().unwrap();
    assert_eq!(call.method, "PATCH");
    assert_eq!(call.path, "lists/mc-1");

    let (_, shown) =
        request(&app.app, "GET", &format!("/mailchimp/lists/{list_id}"), None).await;
    assert_eq!(shown["name"], "Renamed list");
}

#[tokio::test]
async fn update_list_remote_failure_leaves_local_state_untouched() {
    let app = test_app();
    let list_id = create_list(&app).await;
    app.mailchimp.fail_with("nope");

    let (status, body) = request(
        &app.app,
        "PUT",
        &format!("/mailchimp/lists/{list_id}"),
        Some(json!({"name": "Renamed list"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("nope"));

    let (_, shown) =
        request(&app.app, "GET", &format!("/mailchimp/lists/{list_id}"), None).await;
    assert_eq!(shown["name"], "New list");
}

#[tokio::test]
async fn update_list_validation_failure_skips_remote_call() {
    let app = test_app();
    let list_id = create_list(&app).await;
    let calls_after_create = app.mailchimp.call_count();

    let (status, body) = request(
        &app.app,
        "PUT",
        &format!("/mailchimp/lists/{list_id}"),
        Some(json!({"name": "", "visibility": "public"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].get("name").is_some());
    assert!(body["errors"].get("visibility").is_some());
    assert_eq!(app.mailchimp.call_count(), calls_after_create);
}

#[tokio::test]
async fn update_unknown_list_is_not_found() {
    let app = test_app();

    let (status, _) = request(
        &app.app,
        "PUT",
        "/mailchimp/lists/6c2b8ecd-c9c9-4b41-9a61-ae88c132eb19",
        Some(json!({"name": "x"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_unsynced_list_is_rejected() {
    let app = test_app();
    app.mailchimp.fail_with("down");
    let (_, body) = request(&app.app, "POST", "/mailchimp/lists", Some(list_payload())).await;
    assert!(body["message"].as_str().unwrap().contains("down"));
    app.mailchimp.succeed();

    let (_, lists) = request(&app.app, "GET", "/mailchimp/lists", None).await;
    let list_id = lists[0]["list_id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &app.app,
        "PUT",
        &format!("/mailchimp/lists/{list_id}"),
        Some(json!({"name": "Renamed"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        format!("List not found on remote system [List Id:{list_id}]")
    );
}

#[tokio::test]
async fn delete_list_removes_remote_then_local() {
    let app = test_app();
    let list_id = create_list(&app).await;

    let (status, body) = request(
        &app.app,
        "DELETE",
        &format!("/mailchimp/lists/{list_id}"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let call = app.mailchimp.last_call().unwrap();
    assert_eq!(call.method, "DELETE");
    assert_eq!(call.path, "lists/mc-1");

    let (status, _) =
        request(&app.app, "GET", &format!("/mailchimp/lists/{list_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_list_remote_failure_keeps_local_row() {
    let app = test_app();
    let list_id = create_list(&app).await;
    app.mailchimp.fail_with("cannot delete");

    let (status, body) = request(
        &app.app,
        "DELETE",
        &format!("/mailchimp/lists/{list_id}"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("cannot delete"));

    // the row is still retrievable afterwards
    let (status, _) =
        request(&app.app, "GET", &format!("/mailchimp/lists/{list_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delete_unsynced_list_is_rejected_and_kept() {
    let app = test_app();
    app.mailchimp.fail_with("down");
    let _ = request(&app.app, "POST", "/mailchimp/lists", Some(list_payload())).await;
    app.mailchimp.succeed();

    let (_, lists) = request(&app.app, "GET", "/mailchimp/lists", None).await;
    let list_id = lists[0]["list_id"].as_str().unwrap().to_string();
    let calls_before = app.mailchimp.call_count();

    let (status, body) = request(
        &app.app,
        "DELETE",
        &format!("/mailchimp/lists/{list_id}"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("not found on remote system")
    );
    assert_eq!(app.mailchimp.call_count(), calls_before);

    // still present in a subsequent show
    let (status, _) =
        request(&app.app, "GET", &format!("/mailchimp/lists/{list_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
}
