use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use beredt::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Bootstrap superadmin seeded by the initial migration.
const SUPERADMIN_EMAIL: &str = "superadmin@beredt.no";
const SUPERADMIN_PASSWORD: &str = "password";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let state = beredt::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    beredt::api::router(state).await
}

async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

async fn get_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let body = if let Some(json) = body {
        builder = builder.header("Content-Type", "application/json");
        Body::from(json.to_string())
    } else {
        Body::empty()
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// Registers a user and returns (token, user id).
async fn register_user(app: &Router, email: &str, phone: &str) -> (String, i64) {
    let (status, body) = post_json(
        app,
        "/api/users/register",
        None,
        serde_json::json!({
            "email": email,
            "password": "hemmelig123",
            "first_name": "Test",
            "last_name": "Bruker",
            "phone": phone,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "registration failed: {body}");
    let token = body["data"]["token"].as_str().unwrap().to_string();
    let id = body["data"]["user"]["id"].as_i64().unwrap();
    (token, id)
}

async fn superadmin_token(app: &Router) -> String {
    let (status, body) = post_json(
        app,
        "/api/admin/login",
        None,
        serde_json::json!({
            "email": SUPERADMIN_EMAIL,
            "password": SUPERADMIN_PASSWORD,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "superadmin login failed: {body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_auth_flow() {
    let app = spawn_app().await;

    // Protected route without a token.
    let (status, _) = get_json(&app, "/api/users/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (token, _) = register_user(&app, "kari@example.no", "+4740000001").await;

    let (status, body) = get_json(&app, "/api/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "kari@example.no");
    assert_eq!(body["data"]["role"], "user");

    // Wrong password.
    let (status, _) = post_json(
        &app,
        "/api/users/login",
        None,
        serde_json::json!({"email": "kari@example.no", "password": "feil-passord"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Duplicate email registration conflicts.
    let (status, _) = post_json(
        &app,
        "/api/users/register",
        None,
        serde_json::json!({
            "email": "kari@example.no",
            "password": "hemmelig123",
            "first_name": "Kari",
            "last_name": "Nordmann",
            "phone": "+4740000099",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_household_join_flow() {
    let app = spawn_app().await;

    let (token_a, _) = register_user(&app, "a@example.no", "+4740000010").await;
    let (token_b, user_b) = register_user(&app, "b@example.no", "+4740000011").await;

    let (status, body) = post_json(
        &app,
        "/api/households",
        Some(&token_a),
        serde_json::json!({"name": "Bakklandet 3", "latitude": 63.43, "longitude": 10.40}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let household_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["member_count"], 1);

    // Only members may see the household.
    let (status, _) = get_json(
        &app,
        &format!("/api/households/{household_id}"),
        Some(&token_b),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin member mints a join code; B redeems it.
    let (status, body) = post_json(
        &app,
        &format!("/api/households/{household_id}/join-code"),
        Some(&token_a),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let code = body["data"]["code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 8);

    let (status, body) = post_json(
        &app,
        "/api/households/join",
        Some(&token_b),
        serde_json::json!({"code": code}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"].as_i64().unwrap(), household_id);
    assert_eq!(body["data"]["member_count"], 2);

    // Non-admin members cannot mint codes.
    let (status, _) = post_json(
        &app,
        &format!("/api/households/{household_id}/join-code"),
        Some(&token_b),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An invalid code is a soft failure, not an HTTP error.
    let (status, body) = post_json(
        &app,
        "/api/households/join",
        Some(&token_b),
        serde_json::json!({"code": "NOPE1234"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);

    // Admin removes B; removal is effective.
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/households/{household_id}/members/{user_b}"),
        Some(&token_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_json(&app, "/api/households", Some(&token_b)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_items_crud_and_authorization() {
    let app = spawn_app().await;

    let (token_a, _) = register_user(&app, "eier@example.no", "+4740000020").await;
    let (token_b, _) = register_user(&app, "nabo@example.no", "+4740000021").await;

    let (_, body) = post_json(
        &app,
        "/api/households",
        Some(&token_a),
        serde_json::json!({"name": "Husstand", "latitude": 59.9, "longitude": 10.7}),
    )
    .await;
    let household_id = body["data"]["id"].as_i64().unwrap();

    // Seeded catalog is publicly readable.
    let (status, categories) = get_json(&app, "/api/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    let category_id = categories["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name_no"] == "Hermetikk")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let (_, units) = get_json(&app, "/api/units", None).await;
    let unit_id = units["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["name_no"] == "stk")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let (status, body) = post_json(
        &app,
        "/api/emergency/items",
        Some(&token_a),
        serde_json::json!({
            "name": "Hermetiske bønner",
            "amount": 12.0,
            "unit_id": unit_id,
            "category_id": category_id,
            "expiration_date": "2027-01-01",
            "household_ids": [household_id],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "item create failed: {body}");
    let item_id = body["data"]["id"].as_i64().unwrap();

    // A non-member can neither read nor delete the item.
    let (status, _) = get_json(
        &app,
        &format!("/api/emergency/items/{item_id}"),
        Some(&token_b),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/emergency/items/{item_id}"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Creating into a household you are not in is rejected.
    let (status, _) = post_json(
        &app,
        "/api/emergency/items",
        Some(&token_b),
        serde_json::json!({
            "name": "Smuglervann",
            "amount": 1.0,
            "unit_id": unit_id,
            "category_id": category_id,
            "household_ids": [household_id],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Update replaces scalars.
    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/emergency/items/{item_id}"),
        Some(&token_a),
        Some(serde_json::json!({
            "name": "Hermetiske bønner",
            "amount": 24.0,
            "unit_id": unit_id,
            "category_id": category_id,
            "expiration_date": "2027-01-01",
            "household_ids": [household_id],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["amount"], 24.0);

    // Delete, then the item is gone.
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/emergency/items/{item_id}"),
        Some(&token_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get_json(
        &app,
        &format!("/api/emergency/items/{item_id}"),
        Some(&token_a),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_preparedness_endpoint() {
    let app = spawn_app().await;

    let (token, _) = register_user(&app, "alene@example.no", "+4740000030").await;

    let (_, body) = post_json(
        &app,
        "/api/households",
        Some(&token),
        serde_json::json!({"name": "Enslig", "latitude": 59.9, "longitude": 10.7}),
    )
    .await;
    let household_id = body["data"]["id"].as_i64().unwrap();

    let (_, categories) = get_json(&app, "/api/categories", None).await;
    let water_category = categories["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name_no"] == "Vann")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let (_, units) = get_json(&app, "/api/units", None).await;
    let litre_unit = units["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["name_no"] == "l")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    // One member: 21 l covers the full week of water, but there is no food.
    let (status, _) = post_json(
        &app,
        "/api/emergency/items",
        Some(&token),
        serde_json::json!({
            "name": "Vann",
            "amount": 21.0,
            "unit_id": litre_unit,
            "category_id": water_category,
            "household_ids": [household_id],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_json(
        &app,
        &format!("/api/households/{household_id}/preparedness"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["water_percentage"], 100);
    assert_eq!(body["data"]["kcal_percentage"], 0);
    assert_eq!(body["data"]["percentage"], 0);
    assert_eq!(body["data"]["warning"], true);
    assert_eq!(
        body["data"]["message"],
        "Lageret dekker ikke 3 dager med mat og vann"
    );

    // The essential-supply listing is member-gated and keyword-based.
    let (status, body) = get_json(
        &app,
        &format!("/api/households/{household_id}/essentials"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let statuses = body["data"].as_array().unwrap();
    assert!(!statuses.is_empty());
    assert!(statuses.iter().all(|s| s["present"].is_boolean()));
}

#[tokio::test]
async fn test_news_and_admin_gating() {
    let app = spawn_app().await;

    let (user_token, _) = register_user(&app, "leser@example.no", "+4740000040").await;

    // Regular users may read but not publish.
    let (status, _) = get_json(&app, "/api/news", None).await;
    assert_eq!(status, StatusCode::OK);

    let article = serde_json::json!({
        "title": "Øvelse i morgen",
        "link": "https://example.no/artikkel/1",
        "content": "Varslingsprøve klokken tolv.",
        "district": "Trøndelag",
    });

    let (status, _) = post_json(&app, "/api/news/add", Some(&user_token), article.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_token = superadmin_token(&app).await;
    let (status, _) = post_json(&app, "/api/news/add", Some(&admin_token), article).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_json(&app, "/api/news", None).await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["title"].as_str())
        .collect();
    assert!(titles.contains(&"Øvelse i morgen"));

    // Path segments arrive percent-encoded and are decoded by the router.
    let (_, body) = get_json(&app, "/api/news/district/Tr%C3%B8ndelag", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = get_json(&app, "/api/news/district/Finnmark", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_admin_lifecycle() {
    let app = spawn_app().await;
    let super_token = superadmin_token(&app).await;

    let (status, body) = post_json(
        &app,
        "/api/admin/create",
        Some(&super_token),
        serde_json::json!({
            "email": "vakt@beredt.no",
            "password": "adminpass123",
            "first_name": "Vakt",
            "last_name": "Havende",
            "phone": "+4740000050",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create admin failed: {body}");
    let admin_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["role"], "admin");

    // The new admin can log in via the admin endpoint but cannot create
    // further admins.
    let (status, body) = post_json(
        &app,
        "/api/admin/login",
        None,
        serde_json::json!({"email": "vakt@beredt.no", "password": "adminpass123"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let admin_token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, _) = post_json(
        &app,
        "/api/admin/create",
        Some(&admin_token),
        serde_json::json!({
            "email": "enda-en@beredt.no",
            "password": "adminpass123",
            "first_name": "Enda",
            "last_name": "En",
            "phone": "+4740000051",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Elevate, then delete.
    let (status, body) = post_json(
        &app,
        &format!("/api/admin/elevate/{admin_id}"),
        Some(&super_token),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "superadmin");

    let (status, _) = post_json(
        &app,
        &format!("/api/admin/delete/{admin_id}"),
        Some(&super_token),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Regular users never reach the admin surface.
    let (user_token, _) = register_user(&app, "vanlig@example.no", "+4740000052").await;
    let (status, _) = get_json(&app, "/api/admin", Some(&user_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An admin login with a regular account reads as bad credentials.
    let (status, _) = post_json(
        &app,
        "/api/admin/login",
        None,
        serde_json::json!({"email": "vanlig@example.no", "password": "hemmelig123"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_zones_and_shelter_import() {
    let app = spawn_app().await;
    let admin_token = superadmin_token(&app).await;

    let zone = |name: &str, min: f64, max: f64| {
        serde_json::json!({
            "name": name,
            "zone_type": "flom",
            "severity_level": 2,
            "description": null,
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[min, min], [max, min], [max, max], [min, max], [min, min]]],
            },
        })
    };

    // Zone writes are admin-gated.
    let (user_token, _) = register_user(&app, "kart@example.no", "+4740000060").await;
    let (status, _) = post_json(
        &app,
        "/api/emergency-zones",
        Some(&user_token),
        zone("Uautorisert", 0.0, 1.0),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, outer) = post_json(
        &app,
        "/api/emergency-zones",
        Some(&admin_token),
        zone("Ytre flomsone", 0.0, 10.0),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "zone create failed: {outer}");

    let (status, inner) = post_json(
        &app,
        "/api/emergency-zones",
        Some(&admin_token),
        zone("Indre flomsone", 2.0, 4.0),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let inner_id = inner["data"]["id"].as_i64().unwrap();

    // The map view nests the inner zone under the outer.
    let (status, body) = get_json(&app, "/api/map/zones", None).await;
    assert_eq!(status, StatusCode::OK);
    let roots = body["data"].as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["name"], "Ytre flomsone");
    assert_eq!(roots[0]["children"][0]["id"].as_i64().unwrap(), inner_id);

    // Malformed geometry is rejected.
    let (status, _) = post_json(
        &app,
        "/api/emergency-zones",
        Some(&admin_token),
        serde_json::json!({
            "name": "Punktsone",
            "zone_type": "flom",
            "severity_level": 1,
            "geometry": {"type": "Polygon", "coordinates": []},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // One-shot shelter import from the bundled dataset.
    let (status, body) = post_json(
        &app,
        "/api/bunker/import",
        Some(&admin_token),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let imported = body["data"]["imported"].as_u64().unwrap();
    assert!(imported > 0);

    let (status, body) = get_json(&app, "/api/map/shelters", None).await;
    assert_eq!(status, StatusCode::OK);
    let shelters = body["data"].as_array().unwrap();
    assert_eq!(shelters.len() as u64, imported);

    let oslo = shelters
        .iter()
        .find(|s| s["municipality"] == "Oslo")
        .expect("Oslo shelter present");
    let lat = oslo["latitude"].as_f64().unwrap();
    let lon = oslo["longitude"].as_f64().unwrap();
    assert!((59.0..61.0).contains(&lat), "lat was {lat}");
    assert!((10.0..12.0).contains(&lon), "lon was {lon}");

    // Re-running the import replaces rather than duplicates.
    let (_, body) = post_json(
        &app,
        "/api/bunker/import",
        Some(&admin_token),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(body["data"]["imported"].as_u64().unwrap(), imported);
}
