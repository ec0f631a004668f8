// HTTP 层集成测试
//
// 每个测试使用独立的内存数据库和临时存储目录。

use std::io::Cursor;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use fleet_catalog_backend::api::{self, AppState};
use fleet_catalog_backend::config::AppConfig;
use fleet_catalog_backend::database::Database;
use fleet_catalog_backend::models::{CreateVehicleRequest, Vehicle, VehicleKind};

struct TestApp {
    router: Router,
    state: AppState,
    _storage: tempfile::TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let storage = tempfile::tempdir().unwrap();
        let config = AppConfig {
            storage_dir: storage.path().to_path_buf(),
            public_base_url: "https://rent.example.com".to_string(),
            booking_phone: "905551234567".to_string(),
            max_upload_bytes: 1024 * 1024,
            ..AppConfig::default()
        };
        let database = Database::connect("sqlite::memory:").await.unwrap();
        let state = AppState::new(config, database);

        Self {
            router: api::router(state.clone()),
            state,
            _storage: storage,
        }
    }

    async fn seed_cars(&self, count: usize) -> Vec<Vehicle> {
        let mut vehicles = Vec::new();
        for i in 0..count {
            let vehicle = Vehicle::from_create_request(vehicle_request(
                VehicleKind::Car,
                if i % 4 == 0 { "BMW" } else { "Hyundai" },
                2016 + (i % 8) as i32,
                35 + i as i64,
            ))
            .unwrap();
            vehicles.push(self.state.catalog.create_vehicle(vehicle).await.unwrap());
        }
        vehicles
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec(), headers)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body, _) = self
            .send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn send_json(&self, method: &str, uri: &str, payload: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let (status, body, _) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }
}

fn vehicle_request(kind: VehicleKind, brand: &str, year: i32, price: i64) -> CreateVehicleRequest {
    CreateVehicleRequest {
        kind,
        brand: brand.to_string(),
        model: "Test".to_string(),
        year,
        vehicle_class: "economy".to_string(),
        price_per_day: price,
        seats: 5,
        transmission: None,
        fuel: None,
        image_url: None,
        gallery: None,
        description: None,
        popularity: None,
    }
}

fn png_bytes() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(10, 6, image::Rgb([10, 120, 200])));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png).unwrap();
    buffer
}

fn multipart_request(field: &str, data: &[u8]) -> Request<Body> {
    let boundary = "fleet-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"car.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/uploads")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_and_banner() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");

    let (status, body, _) = app
        .send(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("Fleet Catalog"));
}

#[tokio::test]
async fn test_list_vehicles_pagination() {
    let app = TestApp::new().await;
    app.seed_cars(40).await;

    let (status, body) = app.get("/api/vehicles?kind=car&page=2&per_page=12").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total"], 40);
    assert_eq!(data["total_pages"], 4);
    assert_eq!(data["page"], 2);
    assert_eq!(data["items"].as_array().unwrap().len(), 12);
    assert_eq!(data["has_next"], true);
    assert_eq!(data["has_previous"], true);
    assert_eq!(data["page_size_options"], json!([6, 12, 24, 48]));
    assert_eq!(data["active_filter_count"], 0);

    // 超出范围的页码收回到最后一页
    let (_, body) = app.get("/api/vehicles?page=10").await;
    assert_eq!(body["data"]["page"], 4);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 4);

    // 不支持的每页条数回退为默认值
    let (_, body) = app.get("/api/vehicles?per_page=1000").await;
    assert_eq!(body["data"]["per_page"], 12);
}

#[tokio::test]
async fn test_list_vehicles_booking_urls_follow_language() {
    let app = TestApp::new().await;
    app.seed_cars(3).await;

    let (status, body) = app.get("/api/vehicles?lang=tr").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    for item in items {
        let booking_url = item["booking_url"].as_str().unwrap();
        assert!(booking_url.starts_with("https://wa.me/905551234567"));
        let parsed = url::Url::parse(booking_url).unwrap();
        let text = parsed
            .query_pairs()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(text.starts_with("Merhaba!"));
        assert!(text.contains(item["name"].as_str().unwrap()));
    }

    // 未指定语言时使用英文
    let (_, body) = app.get("/api/vehicles").await;
    let booking_url = body["data"]["items"][0]["booking_url"].as_str().unwrap();
    let parsed = url::Url::parse(booking_url).unwrap();
    assert!(parsed.query_pairs().any(|(k, v)| k == "text" && v.starts_with("Hello!")));
}

#[tokio::test]
async fn test_list_vehicles_filters() {
    let app = TestApp::new().await;
    app.seed_cars(20).await;

    let (status, body) = app.get("/api/vehicles?q=bmw&year=2020&sort=price_asc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["active_filter_count"], 2);
    let items = body["data"]["items"].as_array().unwrap();
    assert!(!items.is_empty());
    assert!(items.iter().all(|v| v["brand"] == "BMW" && v["year"] == 2020));

    let (status, body) = app.get("/api/vehicles?sort=cheapest").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "bad_request");

    let (status, _) = app.get("/api/vehicles?kind=truck").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/api/vehicles/filters?kind=car").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price_min"], 35);
    assert_eq!(body["data"]["classes"], json!(["economy"]));
}

#[tokio::test]
async fn test_vehicle_crud() {
    let app = TestApp::new().await;

    let payload = json!({
        "kind": "bus",
        "brand": "Setra",
        "model": "S 515 HD",
        "year": 2019,
        "vehicle_class": "Coach",
        "price_per_day": 320,
        "seats": 49
    });
    let (status, body) = app.send_json("POST", "/api/vehicles", payload).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let slug = body["data"]["slug"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["vehicle_class"], "coach");
    assert_eq!(body["data"]["image"], "/storage/placeholder.webp");

    let (status, body) = app.get(&format!("/api/vehicles/{}?lang=tr", slug)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());
    assert!(body["data"]["booking_url"]
        .as_str()
        .unwrap()
        .starts_with("https://wa.me/905551234567?text="));

    let (status, body) = app.get(&format!("/api/vehicles/{}/availability?date=2026-05-01", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["date"], "2026-05-01");

    let invalid = json!({
        "kind": "car",
        "brand": "Lada",
        "model": "Niva",
        "year": 1800,
        "vehicle_class": "suv",
        "price_per_day": 20,
        "seats": 4
    });
    let (status, body) = app.send_json("POST", "/api/vehicles", invalid).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["type"], "validation_error");

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/vehicles/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = app.send(delete).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&format!("/api/vehicles/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "not_found");
}

#[tokio::test]
async fn test_booking_flow() {
    let app = TestApp::new().await;
    let vehicle = app.seed_cars(1).await.remove(0);

    let pickup = chrono::Utc::now().date_naive() + chrono::Duration::days(3);
    let payload = json!({
        "vehicle_id": vehicle.id,
        "name": "Deniz",
        "phone": "+90 555 765 43 21",
        "pickup_date": pickup,
        "return_date": pickup + chrono::Duration::days(2),
        "lang": "en"
    });
    let (status, body) = app.send_json("POST", "/api/bookings", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rental_days"], 2);
    assert_eq!(body["data"]["estimated_total"], vehicle.price_per_day * 2);
    assert!(body["data"]["redirect_url"].as_str().unwrap().starts_with("https://wa.me/"));

    let past = json!({
        "vehicle_id": vehicle.id,
        "name": "Deniz",
        "phone": "+90 555 765 43 21",
        "pickup_date": "2020-01-01",
        "return_date": "2020-01-03"
    });
    let (status, _) = app.send_json("POST", "/api/bookings", past).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, headers) = app
        .send(
            Request::builder()
                .uri(format!("/api/vehicles/{}/book?lang=ru", vehicle.slug))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(headers[header::LOCATION].to_str().unwrap().starts_with("https://wa.me/905551234567"));
}

#[tokio::test]
async fn test_upload_and_assign_image() {
    let app = TestApp::new().await;
    let vehicle = app.seed_cars(1).await.remove(0);

    let (status, body, _) = app.send(multipart_request("file", &png_bytes())).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let body: Value = serde_json::from_slice(&body).unwrap();
    let job_id = body["data"]["job_id"].as_str().unwrap().to_string();

    let mut state = Value::Null;
    for _ in 0..100 {
        let (_, body) = app.get(&format!("/api/uploads/{}", job_id)).await;
        state = body["data"].clone();
        if state["status"] == "success" || state["status"] == "error" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(state["status"], "success");
    let public_url = state["data"]["public_url"].as_str().unwrap().to_string();
    let storage_path = state["data"]["storage_path"].as_str().unwrap().to_string();

    let (status, body) = app
        .send_json(
            "PUT",
            &format!("/api/vehicles/{}/image", vehicle.id),
            json!({ "upload_id": job_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["image"], public_url.as_str());

    let (status, file, _) = app
        .send(
            Request::builder()
                .uri(format!("/storage/{}", storage_path))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&file[8..12], b"WEBP");

    let (status, _, _) = app.send(multipart_request("file", b"not an image")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = app.send(multipart_request("photo", &png_bytes())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/uploads/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorites_and_language() {
    let app = TestApp::new().await;
    let vehicle = app.seed_cars(1).await.remove(0);

    let (status, body) = app
        .send_json("POST", "/api/favorites/session-1", json!({ "vehicle_id": vehicle.id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["favorite"], true);

    let (_, body) = app.get("/api/favorites/session-1").await;
    assert_eq!(body["data"]["favorites"], json!([vehicle.id]));

    let (status, _) = app
        .send_json("POST", "/api/favorites/session-1", json!({ "vehicle_id": "missing" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/favorites/bad:session").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/api/preferences/session-1/language").await;
    assert_eq!(body["data"]["language"], "en");

    let (status, _) = app
        .send_json("PUT", "/api/preferences/session-1/language", json!({ "language": "TR" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/api/preferences/session-1/language").await;
    assert_eq!(body["data"]["language"], "tr");

    let (status, _) = app
        .send_json("PUT", "/api/preferences/session-1/language", json!({ "language": "de" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_seo_endpoints() {
    let app = TestApp::new().await;
    let vehicle = app.seed_cars(2).await.remove(0);

    let (status, body) = app.get("/api/seo/pages/buses?lang=ru").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["canonical_url"], "https://rent.example.com/ru/buses");

    let (status, _) = app.get("/api/seo/pages/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get(&format!("/api/seo/vehicles/{}", vehicle.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["schema"]["@type"], "Car");
    assert_eq!(body["data"]["breadcrumbs"]["@type"], "BreadcrumbList");

    let (_, body) = app.get("/api/seo/organization").await;
    assert_eq!(body["data"]["@type"], "AutoRental");

    let (status, xml, headers) = app
        .send(Request::builder().uri("/sitemap.xml").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("application/xml"));
    let xml = String::from_utf8(xml).unwrap();
    assert_eq!(xml.matches("<url>").count(), (5 + 2) * 3);
    assert!(xml.contains(&vehicle.slug));
}

#[tokio::test]
async fn test_visitors() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/visitors").await;
    assert_eq!(status, StatusCode::OK);
    let visitors = body["data"]["visitors"].as_u64().unwrap();
    assert!((120..300).contains(&visitors));
}
