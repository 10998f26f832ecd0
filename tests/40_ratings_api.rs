mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn create_requires_authentication() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/ratings", server.base_url))
        .json(&json!({ "media_id": Uuid::new_v4(), "score": 5 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn create_rejects_out_of_range_scores() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Score bounds are validated before the ledger is touched, so both the
    // low and high side fail 400 even without a database.
    for score in [0, 6] {
        let res = client
            .post(format!("{}/api/ratings", server.base_url))
            .header("Authorization", format!("Bearer {}", common::bearer_token()))
            .json(&json!({ "media_id": Uuid::new_v4(), "score": score }))
            .send()
            .await?;

        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "score {} should be rejected",
            score
        );
        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["messages"].get("score").is_some(), "{}", body);
    }
    Ok(())
}

#[tokio::test]
async fn create_requires_media_id_and_score() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/ratings", server.base_url))
        .header("Authorization", format!("Bearer {}", common::bearer_token()))
        .json(&json!({ "comment": "missing everything else" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["messages"].get("media_id").is_some(), "{}", body);
    assert!(body["messages"].get("score").is_some(), "{}", body);
    Ok(())
}

#[tokio::test]
async fn list_rejects_bad_page_params() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/ratings?page=0&per_page=5", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn record_routes_reject_invalid_ids() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/ratings/not-a-uuid", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!(
            "{}/api/ratings/media/not-a-uuid/stats",
            server.base_url
        ))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .delete(format!("{}/api/ratings/not-a-uuid", server.base_url))
        .header("Authorization", format!("Bearer {}", common::bearer_token()))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn mutations_without_token_fail_before_ownership() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // 401 (unauthenticated), never 403: the ownership gate only runs for
    // callers with a validated identity.
    let res = client
        .put(format!("{}/api/ratings/{}", server.base_url, Uuid::new_v4()))
        .json(&json!({ "score": 3 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .delete(format!("{}/api/ratings/{}", server.base_url, Uuid::new_v4()))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
