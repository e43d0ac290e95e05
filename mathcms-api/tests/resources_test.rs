/// Integration tests for the CRUD routes
///
/// Every collection is driven through the full router over an in-memory
/// store: create, read, update, delete, search and list filters.

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;
use uuid::Uuid;

fn news(en: &str, status: &str) -> serde_json::Value {
    json!({
        "title": { "en": en, "fr": format!("{} (fr)", en) },
        "content": "Announced at the spring colloquium",
        "status": status,
        "category": "award"
    })
}

fn event(title: &str, start: &str, end: &str) -> serde_json::Value {
    json!({
        "title": title,
        "startDate": start,
        "endDate": end,
        "location": "seminar_room",
        "speakers": ["Sophie Germain"]
    })
}

#[tokio::test]
async fn test_create_missing_required_fields() {
    let ctx = TestContext::new();

    for uri in [
        "/news",
        "/events",
        "/documents",
        "/researchers",
        "/repositories",
        "/categories",
        "/time-entries",
    ] {
        let response = ctx.post(uri, json!({})).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(response.body["success"], false, "{}", uri);

        let errors = response.body["errors"].as_array().unwrap();
        assert!(!errors.is_empty(), "{} returned no field errors", uri);
    }
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let ctx = TestContext::new();
    let missing = Uuid::new_v4();

    for uri in ["/news", "/events", "/documents", "/researchers", "/repositories"] {
        let response = ctx.get(&format!("{}/{}", uri, missing)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(response.body["success"], false);

        let response = ctx.get(&format!("{}/not-an-id", uri)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", uri);
    }

    let response = ctx.put(&format!("/news/{}", missing), json!({ "content": "x" })).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "News not found");

    let response = ctx.delete(&format!("/events/{}", missing)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_news_lifecycle() {
    let ctx = TestContext::new();

    let response = ctx.post("/news", news("Fields Medal", "published")).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["message"], "News created");
    assert_eq!(response.body["data"]["title"]["en"], "Fields Medal");
    assert!(response.body["data"]["createdAt"].is_string());
    let id = response.body["data"]["id"].as_str().unwrap().to_string();

    let response = ctx.get(&format!("/news/{}", id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["category"], "award");

    let response = ctx
        .put(&format!("/news/{}", id), json!({ "status": "archived" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "archived");
    assert_eq!(response.body["data"]["title"]["fr"], "Fields Medal (fr)");

    let response = ctx.delete(&format!("/news/{}", id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["id"], id.as_str());

    let response = ctx.get(&format!("/news/{}", id)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_news_title_requires_both_languages() {
    let ctx = TestContext::new();

    let response = ctx
        .post(
            "/news",
            json!({ "title": { "en": "Only English" }, "content": "Body" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = response.body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"title.fr"), "{:?}", fields);
}

#[tokio::test]
async fn test_list_filters_and_count() {
    let ctx = TestContext::new();
    ctx.create("/news", news("Draft note", "draft")).await;
    ctx.create("/news", news("Prize", "published")).await;
    ctx.create("/news", news("Seminar", "published")).await;

    let response = ctx.get("/news").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 3);

    let response = ctx.get("/news?status=published").await;
    assert_eq!(response.body["count"], 2);
    for item in response.body["data"].as_array().unwrap() {
        assert_eq!(item["status"], "published");
    }

    let response = ctx.get("/news?limit=1").await;
    assert_eq!(response.body["count"], 1);

    let response = ctx.get("/news?status=unknown").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let ctx = TestContext::new();
    ctx.create("/news", news("Prize in Algebraic Topology", "published")).await;
    ctx.create("/events", event("Topology seminar", "2031-03-01T14:00:00Z", "2031-03-01T15:00:00Z"))
        .await;

    let response = ctx.get("/news/search?q=TOPOLOGY").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 1);

    let response = ctx.get("/events/search?q=germain").await;
    assert_eq!(response.body["count"], 1);

    let response = ctx.get("/news/search?q=number%20theory").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 0);
    assert_eq!(response.body["data"], json!([]));

    let response = ctx.get("/news/search?q=%20").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["field"], "q");
}

#[tokio::test]
async fn test_search_matches_list_elements_only() {
    let ctx = TestContext::new();
    let mut body = event("Algebra day", "2031-03-01T14:00:00Z", "2031-03-01T15:00:00Z");
    body["speakers"] = json!(["Sophie Germain", "Emmy Noether"]);
    ctx.create("/events", body).await;

    let response = ctx.get("/events/search?q=noether").await;
    assert_eq!(response.body["count"], 1);

    for q in ["%22", "%2C", "%5B", "Germain%22%2C%22Emmy"] {
        let response = ctx.get(&format!("/events/search?q={}", q)).await;
        assert_eq!(response.status, StatusCode::OK, "{}", q);
        assert_eq!(response.body["count"], 0, "{}", q);
    }
}

#[tokio::test]
async fn test_blank_required_text_is_rejected() {
    let ctx = TestContext::new();

    let response = ctx
        .post("/events", event("   ", "2031-03-01T14:00:00Z", "2031-03-01T15:00:00Z"))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["field"], "title");

    let response = ctx
        .post("/researchers", json!({ "name": "  ", "email": "blank@math.example.org" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["field"], "name");

    let mut body = news("Blank content", "draft");
    body["content"] = json!("   ");
    let response = ctx.post("/news", body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["field"], "content");

    for (uri, body) in [
        ("/documents", json!({ "title": " ", "authors": ["E. Noether"], "fileType": "pdf" })),
        ("/repositories", json!({ "name": "\t" })),
        ("/categories", json!({ "name": "  " })),
        ("/time-entries", json!({ "description": " ", "startTime": "2031-01-10T10:00:00Z" })),
    ] {
        let response = ctx.post(uri, body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", uri);
    }

    let id = ctx
        .create("/events", event("Number theory", "2031-03-01T14:00:00Z", "2031-03-01T15:00:00Z"))
        .await;
    let response = ctx.put(&format!("/events/{}", id), json!({ "title": "  " })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = ctx.get(&format!("/events/{}", id)).await;
    assert_eq!(response.body["data"]["title"], "Number theory");
}

#[tokio::test]
async fn test_event_dates_are_checked() {
    let ctx = TestContext::new();

    let response = ctx
        .post("/events", event("Backwards", "2031-03-01T15:00:00Z", "2031-03-01T14:00:00Z"))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = ctx
        .post("/events", event("Instant", "2031-03-01T15:00:00Z", "2031-03-01T15:00:00Z"))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let id = ctx
        .create("/events", event("Colloquium", "2031-03-01T14:00:00Z", "2031-03-01T15:00:00Z"))
        .await;

    let response = ctx
        .put(&format!("/events/{}", id), json!({ "endDate": "2031-03-01T13:00:00Z" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = ctx.get(&format!("/events/{}", id)).await;
    assert_eq!(response.body["data"]["endDate"], "2031-03-01T15:00:00Z");
}

#[tokio::test]
async fn test_malformed_body() {
    let ctx = TestContext::new();

    let response = ctx
        .post("/events", json!({ "title": "Talk", "location": "the moon" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["field"], "body");
}

#[tokio::test]
async fn test_researcher_email_is_unique() {
    let ctx = TestContext::new();
    let researcher = |email: &str| json!({ "name": "Emmy Noether", "email": email });

    let response = ctx.post("/researchers", researcher("emmy@math.example.org")).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["role"], "researcher");
    assert_eq!(response.body["data"]["contributions"], 0);

    let response = ctx.post("/researchers", researcher("Emmy@Math.Example.org")).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_document_defaults_and_tag_filter() {
    let ctx = TestContext::new();

    let response = ctx
        .post(
            "/documents",
            json!({
                "title": "On the zeros of the zeta function",
                "abstract": "A short note",
                "authors": ["B. Riemann"],
                "fileType": "pdf",
                "tags": ["analysis", "number-theory"],
                "fileUrl": "/uploads/documents/zeta.pdf",
                "fileSize": 1024
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let data = &response.body["data"];
    assert_eq!(data["category"], "other");
    assert_eq!(data["status"], "draft");
    assert_eq!(data["visibility"], "public");
    assert_eq!(data["abstract"], "A short note");
    assert_eq!(data["versions"][0]["version"], 1);

    ctx.create(
        "/documents",
        json!({ "title": "Lecture notes", "authors": ["E. Artin"], "fileType": "latex" }),
    )
    .await;

    let response = ctx.get("/documents?tag=analysis").await;
    assert_eq!(response.body["count"], 1);

    let response = ctx.get("/documents?fileType=latex").await;
    assert_eq!(response.body["count"], 1);
    assert_eq!(response.body["data"][0]["title"], "Lecture notes");
}

#[tokio::test]
async fn test_repository_visibility_persists() {
    let ctx = TestContext::new();
    let owner = ctx
        .create(
            "/researchers",
            json!({ "name": "Alexander Grothendieck", "email": "ag@math.example.org" }),
        )
        .await;
    let id = ctx
        .create(
            "/repositories",
            json!({ "name": "Schemes", "owner": owner, "tags": ["geometry"] }),
        )
        .await;

    let response = ctx.get(&format!("/repositories/{}", id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["isPublic"], true);
    assert_eq!(response.body["data"]["ownerProfile"]["name"], "Alexander Grothendieck");

    let response = ctx
        .put(&format!("/repositories/{}/visibility", id), json!({ "isPublic": false }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["isPublic"], false);

    let response = ctx.get(&format!("/repositories/{}", id)).await;
    assert_eq!(response.body["data"]["isPublic"], false);

    let response = ctx.get("/repositories?isPublic=false").await;
    assert_eq!(response.body["count"], 1);

    let response = ctx
        .put(&format!("/repositories/{}/visibility", id), json!({}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["field"], "isPublic");
}

#[tokio::test]
async fn test_repositories_by_owner_and_dangling_owner() {
    let ctx = TestContext::new();
    let owner = ctx
        .create(
            "/researchers",
            json!({ "name": "Ada Lovelace", "email": "ada@math.example.org" }),
        )
        .await;
    ctx.create("/repositories", json!({ "name": "Engines", "owner": owner })).await;
    ctx.create("/repositories", json!({ "name": "Notes", "owner": owner })).await;
    ctx.create("/repositories", json!({ "name": "Orphan", "owner": Uuid::new_v4() })).await;

    let response = ctx.get(&format!("/repositories/owner/{}", owner)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 2);

    let response = ctx.get("/repositories/search?q=orphan").await;
    assert_eq!(response.body["count"], 1);

    let response = ctx.get("/repositories").await;
    let orphan = response.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == "Orphan")
        .unwrap()
        .clone();
    assert!(orphan["ownerProfile"].is_null());

    let response = ctx.delete(&format!("/researchers/{}", owner)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = ctx.get(&format!("/repositories/owner/{}", owner)).await;
    assert_eq!(response.body["count"], 2);
}

#[tokio::test]
async fn test_categories_and_time_entries() {
    let ctx = TestContext::new();

    let response = ctx.post("/categories", json!({ "name": "Teaching", "color": "#a1b2c3" })).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["color"], "#A1B2C3");
    let category = response.body["data"]["id"].as_str().unwrap().to_string();

    let response = ctx.post("/categories", json!({ "name": "Research" })).await;
    assert_eq!(response.body["data"]["color"], "#3B82F6");

    let response = ctx
        .post(
            "/time-entries",
            json!({
                "description": "Grading exams",
                "category": category,
                "startTime": "2031-01-10T10:00:00Z",
                "endTime": "2031-01-10T11:30:00Z"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["durationMinutes"], 90);

    let response = ctx
        .post(
            "/time-entries",
            json!({
                "description": "Backwards",
                "startTime": "2031-01-10T10:00:00Z",
                "endTime": "2031-01-10T09:00:00Z"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["field"], "endTime");

    let response = ctx
        .get_as(&format!("/time-entries?category={}", category), &ctx.editor_token)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 1);
}
