//! Integration tests for the lumicat HTTP API
//!
//! Covers catalog query/pagination, CRUD, designers, assets, timeline,
//! settings, admin reset and photo search against a temporary database.

mod helpers;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::post,
    Json, Router,
};
use helpers::TestApp;
use lumicat_common::config::{SimilarityConfig, TomlConfig};
use serde_json::{json, Value};

fn names(page: &Value) -> Vec<String> {
    page["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Health and build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "lumicat-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/buildinfo").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["gitHash"].is_string());
    assert!(body["buildProfile"].is_string());
}

// =============================================================================
// Catalog CRUD
// =============================================================================

#[tokio::test]
async fn test_create_get_update_delete_luminaire() {
    let app = TestApp::new().await;

    let created = app
        .create(json!({
            "name": "Lampe Gras 205",
            "designer": "Bernard-Albin Gras (1886-1943)",
            "year": 1921,
            "materials": ["acier", "laiton"],
            "dimensions": {"height": 52.5}
        }))
        .await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["favorite"], false);
    assert_eq!(created["images"], json!([]));

    let (status, fetched) = app.get(&format!("/api/catalog/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Lampe Gras 205");
    assert_eq!(fetched["dimensions"]["height"], 52.5);

    let (status, updated) = app
        .request(
            "PUT",
            &format!("/api/catalog/{}", id),
            Some(json!({"year": null, "period": "Modernisme"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["updated"], true);
    assert_eq!(updated["record"]["year"], Value::Null);
    assert_eq!(updated["record"]["period"], "Modernisme");
    assert_eq!(updated["record"]["name"], "Lampe Gras 205");
    assert_ne!(updated["record"]["updatedAt"], created["updatedAt"]);

    let (status, body) = app.request("DELETE", &format!("/api/catalog/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, body) = app.request("DELETE", &format!("/api/catalog/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = app.get(&format!("/api/catalog/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/catalog/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = app.request("DELETE", "/api/catalog/123", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_validation() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request("POST", "/api/catalog", Some(json!({"name": "   "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request("POST", "/api/catalog", Some(json!({"name": "Futur", "year": 3000})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, page) = app.get("/api/catalog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_toggle_favorite() {
    let app = TestApp::new().await;
    let id = app.create(json!({"name": "Arco"})).await["id"]
        .as_str()
        .unwrap()
        .to_string();
    app.create(json!({"name": "Tizio"})).await;

    let (status, record) = app
        .request("POST", &format!("/api/catalog/{}/favorite", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["favorite"], true);

    let (_, page) = app.get("/api/catalog?favorite=true").await;
    assert_eq!(names(&page), vec!["Arco"]);

    let (_, record) = app
        .request("POST", &format!("/api/catalog/{}/favorite", id), None)
        .await;
    assert_eq!(record["favorite"], false);
}

// =============================================================================
// Catalog query service
// =============================================================================

#[tokio::test]
async fn test_pagination_block() {
    let app = TestApp::new().await;
    for i in 0..25 {
        app.create(json!({"name": format!("Lampe {:02}", i)})).await;
    }

    let (status, page) = app.get("/api/catalog?limit=10&page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["records"].as_array().unwrap().len(), 10);
    assert_eq!(
        page["pagination"],
        json!({"page": 2, "limit": 10, "total": 25, "pages": 3})
    );

    let (_, last) = app.get("/api/catalog?limit=10&page=3").await;
    assert_eq!(last["records"].as_array().unwrap().len(), 5);

    // Past the end: empty page, true totals
    let (status, beyond) = app.get("/api/catalog?limit=10&page=9").await;
    assert_eq!(status, StatusCode::OK);
    assert!(beyond["records"].as_array().unwrap().is_empty());
    assert_eq!(beyond["pagination"]["total"], 25);
    assert_eq!(beyond["pagination"]["page"], 9);

    // Clamping
    let (_, clamped) = app.get("/api/catalog?limit=1000&page=0").await;
    assert_eq!(clamped["pagination"]["limit"], 100);
    assert_eq!(clamped["pagination"]["page"], 1);

    let (_, default) = app.get("/api/catalog").await;
    assert_eq!(default["pagination"]["limit"], 20);
    assert_eq!(default["pagination"]["pages"], 2);
}

#[tokio::test]
async fn test_huge_page_number_is_an_empty_page() {
    let app = TestApp::new().await;
    app.create(json!({"name": "Arco"})).await;

    let (status, page) = app
        .get("/api/catalog?page=9223372036854775807&limit=20")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(page["records"].as_array().unwrap().is_empty());
    assert_eq!(page["pagination"]["total"], 1);
    assert_eq!(page["pagination"]["page"], i64::MAX / 20);
}

#[tokio::test]
async fn test_year_min_excludes_missing_years() {
    let app = TestApp::new().await;
    app.create(json!({"name": "Old", "year": 1925})).await;
    app.create(json!({"name": "New", "year": 1970})).await;
    app.create(json!({"name": "Undated"})).await;

    let (_, page) = app.get("/api/catalog?yearMin=1950&sortField=name&sortDirection=asc").await;
    assert_eq!(names(&page), vec!["New"]);

    let (_, page) = app.get("/api/catalog?yearMax=1970&sortField=year&sortDirection=asc").await;
    assert_eq!(names(&page), vec!["Old", "New"]);

    let (_, page) = app.get("/api/catalog?yearMin=1925&yearMax=1925").await;
    assert_eq!(names(&page), vec!["Old"]);
}

#[tokio::test]
async fn test_field_filters_and_empty_params() {
    let app = TestApp::new().await;
    app.create(json!({"name": "A", "designer": "Gino Sarfatti", "period": "1950s",
                      "materials": ["laiton", "verre"], "colors": ["blanc"]}))
        .await;
    app.create(json!({"name": "B", "designer": "Gino Sarfatti", "period": "1960s",
                      "materials": ["aluminium"], "colors": ["rouge"]}))
        .await;
    app.create(json!({"name": "C", "designer": "Serge Mouille", "period": "1950s",
                      "materials": ["acier"], "colors": ["noir", "blanc"]}))
        .await;

    let sorted = "sortField=name&sortDirection=asc";

    let (_, page) = app.get(&format!("/api/catalog?designer=Gino%20Sarfatti&{}", sorted)).await;
    assert_eq!(names(&page), vec!["A", "B"]);

    let (_, page) = app.get(&format!("/api/catalog?period=1950s&{}", sorted)).await;
    assert_eq!(names(&page), vec!["A", "C"]);

    let (_, page) = app.get(&format!("/api/catalog?materials=verre,acier&{}", sorted)).await;
    assert_eq!(names(&page), vec!["A", "C"]);

    let (_, page) = app
        .get(&format!("/api/catalog?colors=blanc&designer=Serge%20Mouille&{}", sorted))
        .await;
    assert_eq!(names(&page), vec!["C"]);

    let (status, page) = app
        .get(&format!("/api/catalog?designer=&materials=&yearMin=&{}", sorted))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["total"], 3);
}

#[tokio::test]
async fn test_search_overrides_filters() {
    let app = TestApp::new().await;
    app.create(json!({"name": "Lampe Potence", "designer": "Jean Prouvé",
                      "description": "Applique murale pivotante"}))
        .await;
    app.create(json!({"name": "Lampe Gras", "designer": "Bernard-Albin Gras",
                      "description": "Lampe d'atelier"}))
        .await;
    app.create(json!({"name": "Arco", "designer": "Achille Castiglioni"})).await;

    let (_, page) = app.get("/api/catalog?search=lampe&sortField=name&sortDirection=asc").await;
    assert_eq!(names(&page), vec!["Lampe Gras", "Lampe Potence"]);

    // Every term must match some field
    let (_, page) = app.get("/api/catalog?search=LAMPE%20murale").await;
    assert_eq!(names(&page), vec!["Lampe Potence"]);

    // Other filters are ignored while searching
    let (_, page) = app.get("/api/catalog?search=arco&designer=Jean%20Prouv%C3%A9").await;
    assert_eq!(names(&page), vec!["Arco"]);

    // Wildcards are literal
    let (_, page) = app.get("/api/catalog?search=%25").await;
    assert_eq!(page["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_search_folds_accented_capitals() {
    let app = TestApp::new().await;
    let id = app
        .create(json!({"name": "Potence", "designer": "Jean Prouvé"}))
        .await["id"]
        .as_str()
        .unwrap()
        .to_string();
    app.create(json!({"name": "Arco", "designer": "Achille Castiglioni"})).await;

    // PROUVÉ
    let (_, page) = app.get("/api/catalog?search=PROUV%C3%89").await;
    assert_eq!(names(&page), vec!["Potence"]);

    // Edits are searchable under their new text
    app.request(
        "PUT",
        &format!("/api/catalog/{}", id),
        Some(json!({"description": "Éclairage d'atelier"})),
    )
    .await;
    let (_, page) = app.get("/api/catalog?search=%C3%A9clairage").await;
    assert_eq!(names(&page), vec!["Potence"]);
}

#[tokio::test]
async fn test_sorting() {
    let app = TestApp::new().await;
    app.create(json!({"name": "Bolla", "year": 1960})).await;
    app.create(json!({"name": "atollo", "year": 1977})).await;
    app.create(json!({"name": "Cesta", "year": 1964})).await;

    let (_, page) = app.get("/api/catalog?sortField=name&sortDirection=asc").await;
    assert_eq!(names(&page), vec!["atollo", "Bolla", "Cesta"]);

    let (_, page) = app.get("/api/catalog?sortField=year&sortDirection=desc").await;
    assert_eq!(names(&page), vec!["atollo", "Cesta", "Bolla"]);

    // Default: newest first
    let (_, page) = app.get("/api/catalog").await;
    assert_eq!(names(&page), vec!["Cesta", "atollo", "Bolla"]);

    let (status, body) = app.get("/api/catalog?sortField=secret").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("sort field"));

    let (status, _) = app.get("/api/catalog?yearMin=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Assets and image association
// =============================================================================

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

#[tokio::test]
async fn test_asset_upload_and_download() {
    let app = TestApp::new().await;

    let (status, meta) = app
        .upload("/api/assets?bucket=logo", "file", "logo.png", None, PNG)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(meta["bucket"], "logo");
    assert_eq!(meta["contentType"], "image/png");
    assert_eq!(meta["length"], PNG.len());
    let id = meta["id"].as_str().unwrap().to_string();

    let response = app
        .send(
            Request::builder()
                .uri(format!("/api/assets/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(headers[header::CONTENT_LENGTH], PNG.len().to_string().as_str());
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "public, max-age=31536000, immutable"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], PNG);

    let (_, logos) = app.get("/api/assets?bucket=logo").await;
    assert_eq!(logos.as_array().unwrap().len(), 1);
    let (_, uploads) = app.get("/api/assets?bucket=uploads").await;
    assert!(uploads.as_array().unwrap().is_empty());

    let (status, _) = app.request("DELETE", &format!("/api/assets/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/api/assets/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_asset_errors() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/api/assets/xyz").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .get("/api/assets/6f1c1b9e-1f0e-4d59-9a3e-2b8c4f9d0a11")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .upload("/api/assets?bucket=fonts", "file", "a.ttf", None, b"data")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .upload("/api/assets", "attachment", "a.png", None, PNG)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_images_is_set_union() {
    let app = TestApp::new().await;
    let id = app.create(json!({"name": "Eclisse"})).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (_, a) = app
        .upload("/api/assets", "file", "front.jpg", Some("image/jpeg"), b"front")
        .await;
    let (_, b) = app
        .upload("/api/assets", "file", "side.jpg", Some("image/jpeg"), b"side")
        .await;
    let uri = format!("/api/catalog/{}/images", id);

    let (status, record) = app
        .request("POST", &uri, Some(json!({"assetIds": [a["id"], b["id"]]})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["images"], json!([a["id"], b["id"]]));

    let (_, record) = app
        .request("POST", &uri, Some(json!({"assetIds": [b["id"], a["id"]]})))
        .await;
    assert_eq!(record["images"], json!([a["id"], b["id"]]));

    let (status, _) = app
        .request(
            "POST",
            &uri,
            Some(json!({"assetIds": ["6f1c1b9e-1f0e-4d59-9a3e-2b8c4f9d0a11"]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deleting_asset_drops_its_references() {
    let app = TestApp::new().await;
    let id = app.create(json!({"name": "Eclisse"})).await["id"]
        .as_str()
        .unwrap()
        .to_string();
    let (_, keep) = app
        .upload("/api/assets", "file", "front.jpg", Some("image/jpeg"), b"front")
        .await;
    let (_, gone) = app
        .upload("/api/assets?bucket=logo", "file", "logo.png", None, PNG)
        .await;

    app.request(
        "POST",
        &format!("/api/catalog/{}/images", id),
        Some(json!({"assetIds": [gone["id"], keep["id"]]})),
    )
    .await;
    app.request("PUT", "/api/settings", Some(json!({"logoAssetId": gone["id"]})))
        .await;

    let (status, _) = app
        .request("DELETE", &format!("/api/assets/{}", gone["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, record) = app.get(&format!("/api/catalog/{}", id)).await;
    assert_eq!(record["images"], json!([keep["id"]]));
    let (_, settings) = app.get("/api/settings").await;
    assert_eq!(settings["logoAssetId"], Value::Null);
}

// =============================================================================
// Designers
// =============================================================================

#[tokio::test]
async fn test_designer_resolution_by_name_and_slug() {
    let app = TestApp::new().await;
    app.create(json!({"name": "LC6", "designer": "Le Corbusier (1887-1965)"})).await;
    app.create(json!({"name": "Arco", "designer": "Achille Castiglioni"})).await;

    let (status, body) = app.get("/api/designers/le-corbusier").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["designer"]["slug"], "le-corbusier");
    assert_eq!(body["designer"]["derived"], true);
    assert_eq!(body["luminaires"][0]["name"], "LC6");

    let (status, body) = app.get("/api/designers/le%20corbusier").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["designer"]["luminaireCount"], 1);

    let (status, _) = app.get("/api/designers/corbu").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listing) = app.get("/api/designers").await;
    let slugs: Vec<&str> = listing
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["achille-castiglioni", "le-corbusier"]);
}

#[tokio::test]
async fn test_explicit_designer_and_backfill() {
    let app = TestApp::new().await;
    let lamp = app
        .create(json!({"name": "Standard", "designer": "Jean Prouvé (1901-1984)"}))
        .await;
    app.create(json!({"name": "Mystery", "designer": "Unknown Hand"})).await;

    let (status, designer) = app
        .request(
            "POST",
            "/api/designers",
            Some(json!({"name": "Jean Prouvé", "nationality": "française"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(designer["slug"], "jean-prouvé");

    let (status, body) = app
        .request("POST", "/api/designers", Some(json!({"name": "jean  prouvé"})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, _) = app
        .request("POST", "/api/designers", Some(json!({"name": ""})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Textual fallback before backfill
    let (_, profile) = app.get("/api/designers/jean-prouv%C3%A9").await;
    assert_eq!(profile["designer"]["derived"], false);
    assert_eq!(profile["luminaires"][0]["name"], "Standard");

    let (status, report) = app
        .request("POST", "/api/admin/designers/backfill", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report, json!({"linked": 1, "unmatched": 1}));

    let (_, record) = app
        .get(&format!("/api/catalog/{}", lamp["id"].as_str().unwrap()))
        .await;
    assert_eq!(record["designerId"], designer["id"]);

    let (_, report) = app
        .request("POST", "/api/admin/designers/backfill", None)
        .await;
    assert_eq!(report["linked"], 0);

    let (status, _) = app
        .request("DELETE", "/api/designers/jean-prouv%C3%A9", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, record) = app
        .get(&format!("/api/catalog/{}", lamp["id"].as_str().unwrap()))
        .await;
    assert_eq!(record["designerId"], Value::Null);
}

// =============================================================================
// Timeline and settings
// =============================================================================

#[tokio::test]
async fn test_timeline_crud() {
    let app = TestApp::new().await;

    let (status, entry) = app
        .request(
            "PUT",
            "/api/timeline/Art%20d%C3%A9co",
            Some(json!({"description": "Formes géométriques"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["period"], "Art déco");

    app.request("PUT", "/api/timeline/Bauhaus", Some(json!({"description": "v1"})))
        .await;
    app.request("PUT", "/api/timeline/Bauhaus", Some(json!({"description": "v2"})))
        .await;

    let (_, entries) = app.get("/api/timeline").await;
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["description"], "v2");

    let (status, _) = app.request("DELETE", "/api/timeline/Bauhaus", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.request("DELETE", "/api/timeline/Bauhaus", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_settings_partial_update() {
    let app = TestApp::new().await;

    let (status, settings) = app.get("/api/settings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["siteTitle"], "Lumicat");

    let (status, settings) = app
        .request("PUT", "/api/settings", Some(json!({"aboutText": "Collection privée"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["siteTitle"], "Lumicat");
    assert_eq!(settings["aboutText"], "Collection privée");

    let (_, settings) = app.get("/api/settings").await;
    assert_eq!(settings["aboutText"], "Collection privée");
    assert!(settings["updatedAt"].is_string());
}

// =============================================================================
// Admin reset
// =============================================================================

#[tokio::test]
async fn test_reset_clears_everything_but_settings() {
    let app = TestApp::new().await;
    app.create(json!({"name": "Arco", "designer": "Achille Castiglioni"})).await;
    app.request("POST", "/api/designers", Some(json!({"name": "Charlotte Perriand"})))
        .await;
    app.request("PUT", "/api/timeline/Bauhaus", Some(json!({"description": "x"})))
        .await;
    let (_, video) = app.upload("/api/assets", "file", "a.png", None, PNG).await;
    app.request(
        "PUT",
        "/api/settings",
        Some(json!({"siteTitle": "Ma collection", "videoAssetId": video["id"]})),
    )
    .await;

    let (status, body) = app.request("DELETE", "/api/admin/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
    assert!(body["timestamp"].is_string());
    assert_eq!(
        body["cleared"],
        json!({"luminaires": 1, "designers": 1, "timeline": 1, "assets": 1})
    );

    let (_, page) = app.get("/api/catalog").await;
    assert_eq!(page["pagination"]["total"], 0);
    for uri in ["/api/designers", "/api/timeline", "/api/assets"] {
        let (_, listing) = app.get(uri).await;
        assert!(listing.as_array().unwrap().is_empty(), "{} not empty", uri);
    }

    let (_, settings) = app.get("/api/settings").await;
    assert_eq!(settings["siteTitle"], "Ma collection");
    assert_eq!(settings["videoAssetId"], Value::Null);
}

// =============================================================================
// Photo search
// =============================================================================

/// Serve a canned answer on a random local port; returns the endpoint URL
async fn spawn_similarity_stub(status: StatusCode, answer: Value) -> String {
    let stub = Router::new().route("/search", post(move || async move { (status, Json(answer)) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, stub).await.unwrap();
    });
    format!("http://{}/search", addr)
}

fn similarity_config(endpoint: String) -> TomlConfig {
    TomlConfig {
        similarity: SimilarityConfig {
            endpoint: Some(endpoint),
            api_key: Some("test-key".to_string()),
            timeout_secs: 5,
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_photo_search_not_configured() {
    let app = TestApp::new().await;
    let (status, body) = app
        .upload("/api/search/by-photo", "image", "q.png", None, PNG)
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "UNAVAILABLE");
}

#[tokio::test]
async fn test_photo_search_matches_filenames() {
    let endpoint = spawn_similarity_stub(
        StatusCode::OK,
        json!({"results": [
            {"filename": "ARCO.png", "score": 0.61},
            {"filename": "unknown.jpg", "score": 0.99},
            {"filename": "eclisse_front.jpg", "score": 0.87}
        ]}),
    )
    .await;
    let app = TestApp::with_config(similarity_config(endpoint)).await;

    app.create(json!({"name": "Arco", "filename": "arco.jpg"})).await;
    let eclisse = app.create(json!({"name": "Eclisse"})).await;
    let (_, asset) = app
        .upload("/api/assets", "file", "Eclisse_Front.jpg", Some("image/jpeg"), b"jpg")
        .await;
    app.request(
        "POST",
        &format!("/api/catalog/{}/images", eclisse["id"].as_str().unwrap()),
        Some(json!({"assetIds": [asset["id"]]})),
    )
    .await;

    let (status, body) = app
        .upload("/api/search/by-photo", "image", "query.png", None, PNG)
        .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["record"]["name"], "Eclisse");
    assert_eq!(results[0]["score"], 0.87);
    assert_eq!(results[1]["record"]["name"], "Arco");
}

#[tokio::test]
async fn test_photo_search_upstream_failure() {
    let endpoint =
        spawn_similarity_stub(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "boom"})).await;
    let app = TestApp::with_config(similarity_config(endpoint)).await;

    let (status, body) = app
        .upload("/api/search/by-photo", "image", "q.png", None, PNG)
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}
