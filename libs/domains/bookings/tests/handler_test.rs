//! Handler tests for Bookings domain
//!
//! The router runs over in-memory repositories for users, items and bookings.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use domain_bookings::*;
use domain_items::{CreateItem, InMemoryItemRepository, ItemRepository};
use domain_users::{CreateUser, InMemoryUserRepository, UserRepository};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Users 1 (ann), 2 (bob), 3 (eve); ann owns item 1 (available) and item 2 (not)
async fn app() -> (Router, InMemoryBookingRepository) {
    let users = InMemoryUserRepository::new();
    for name in ["ann", "bob", "eve"] {
        users
            .create(CreateUser {
                name: name.to_string(),
                email: format!("{}@mail.com", name),
            })
            .await
            .unwrap();
    }

    let items = InMemoryItemRepository::new();
    for available in [true, false] {
        items
            .create(
                1,
                CreateItem {
                    name: "Drill".to_string(),
                    description: "Cordless".to_string(),
                    available: Some(available),
                    request_id: None,
                },
            )
            .await
            .unwrap();
    }

    let bookings = InMemoryBookingRepository::new();
    let service = BookingService::new(bookings.clone(), Arc::new(items), Arc::new(users));
    (handlers::router(service), bookings)
}

fn send(method: &str, uri: &str, user_id: i64, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Sharer-User-Id", user_id.to_string());
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn booking_body(item_id: i64, start_hours: i64, end_hours: i64) -> Value {
    let now = Utc::now();
    json!({
        "itemId": item_id,
        "start": now + Duration::hours(start_hours),
        "end": now + Duration::hours(end_hours),
    })
}

async fn book(app: &Router, booker: i64, body: Value) -> BookingDetails {
    let response = app
        .clone()
        .oneshot(send("POST", "/", booker, Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response.into_body()).await
}

async fn error_of(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body: Value = json_body(response.into_body()).await;
    (status, body["error"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn test_create_booking_returns_waiting_details() {
    let (app, _) = app().await;

    let booking = book(&app, 2, booking_body(1, 1, 2)).await;

    assert_eq!(booking.id, 1);
    assert_eq!(booking.status, BookingStatus::Waiting);
    assert_eq!(booking.item.id, 1);
    assert_eq!(booking.item.name, "Drill");
    assert_eq!(booking.booker.name, "bob");
}

#[tokio::test]
async fn test_create_booking_with_local_timestamps() {
    let (app, _) = app().await;
    let local = |hours: i64| {
        (Utc::now() + Duration::hours(hours))
            .naive_utc()
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string()
    };
    let (start, end) = (local(1), local(2));

    let booking = book(&app, 2, json!({ "itemId": 1, "start": start, "end": end })).await;

    assert_eq!(booking.status, BookingStatus::Waiting);
    assert_eq!(booking.start.format("%Y-%m-%dT%H:%M:%S").to_string(), start);
    assert_eq!(booking.end.format("%Y-%m-%dT%H:%M:%S").to_string(), end);
}

#[tokio::test]
async fn test_create_booking_failures() {
    let (app, _) = app().await;

    let (status, error) = error_of(&app, send("POST", "/", 2, Some(booking_body(2, 1, 2)))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error, "Item: 2 is unavailable");

    let (status, error) = error_of(&app, send("POST", "/", 1, Some(booking_body(1, 1, 2)))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error, "User can't book own item");

    let (status, error) = error_of(&app, send("POST", "/", 2, Some(booking_body(1, 2, 1)))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error.starts_with("Interval: "), "{}", error);

    let (status, _) = error_of(&app, send("POST", "/", 2, Some(booking_body(9, 1, 2)))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = error_of(&app, send("POST", "/", 9, Some(booking_body(1, 1, 2)))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // missing start and end
    let response = app
        .oneshot(send("POST", "/", 2, Some(json!({ "itemId": 1 }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_header_is_400() {
    let (app, _) = app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_approval_flow() {
    let (app, _) = app().await;
    let booking = book(&app, 2, booking_body(1, 1, 2)).await;
    let uri = format!("/{}?approved=true", booking.id);

    // the booker cannot approve
    let (status, error) = error_of(&app, send("PATCH", &uri, 2, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error, "Only owner can control booking");

    let response = app
        .clone()
        .oneshot(send("PATCH", &uri, 1, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let approved: BookingDetails = json_body(response.into_body()).await;
    assert_eq!(approved.status, BookingStatus::Approved);

    let (status, error) = error_of(
        &app,
        send("PATCH", &format!("/{}?approved=false", booking.id), 1, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error, format!("Status of booking {} is not WAITING", booking.id));

    let (status, _) = error_of(&app, send("PATCH", "/99?approved=true", 1, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_approval_needs_decision() {
    let (app, _) = app().await;
    let booking = book(&app, 2, booking_body(1, 1, 2)).await;

    for uri in [format!("/{}", booking.id), format!("/{}?approved=maybe", booking.id)] {
        let response = app.clone().oneshot(send("PATCH", &uri, 1, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_get_booking_visibility() {
    let (app, _) = app().await;
    let booking = book(&app, 2, booking_body(1, 1, 2)).await;
    let uri = format!("/{}", booking.id);

    for caller in [1, 2] {
        let response = app
            .clone()
            .oneshot(send("GET", &uri, caller, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let (status, error) = error_of(&app, send("GET", &uri, 3, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error, "Only owner or booker can access booking");
}

#[tokio::test]
async fn test_list_by_state() {
    let (app, repo) = app().await;
    let now = Utc::now();

    // seeded through the repository since past intervals cannot be booked
    let past = repo
        .create(NewBooking {
            item_id: 1,
            booker_id: 2,
            start: now - Duration::hours(5),
            end: now - Duration::hours(4),
        })
        .await
        .unwrap();
    let current = repo
        .create(NewBooking {
            item_id: 1,
            booker_id: 2,
            start: now - Duration::hours(1),
            end: now + Duration::hours(1),
        })
        .await
        .unwrap();
    let future = book(&app, 2, booking_body(1, 3, 4)).await;

    let cases = [
        ("", vec![future.id, current.id, past.id]),
        ("?state=ALL", vec![future.id, current.id, past.id]),
        ("?state=PAST", vec![past.id]),
        ("?state=CURRENT", vec![current.id]),
        ("?state=FUTURE", vec![future.id]),
        ("?state=WAITING", vec![future.id, current.id, past.id]),
        ("?state=REJECTED", vec![]),
        ("?state=ALL&from=1&size=1", vec![current.id]),
    ];

    for (query, expected) in cases {
        for (path, caller) in [("/", 2), ("/owner", 1)] {
            let uri = format!("{}{}", path, query);
            let response = app
                .clone()
                .oneshot(send("GET", &uri, caller, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
            let bookings: Vec<BookingDetails> = json_body(response.into_body()).await;
            let ids: Vec<i64> = bookings.iter().map(|b| b.id).collect();
            assert_eq!(ids, expected, "{}", uri);
        }
    }
}

#[tokio::test]
async fn test_list_rejects_unknown_state_and_bad_paging() {
    let (app, _) = app().await;

    let (status, error) = error_of(&app, send("GET", "/?state=SOON", 2, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error, "Unknown state: SOON");

    // checked before the caller lookup
    let (status, error) = error_of(&app, send("GET", "/owner?state=future", 99, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error, "Unknown state: future");

    let (status, error) = error_of(&app, send("GET", "/?from=-1", 2, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error, "Illegal argument");

    let (status, _) = error_of(&app, send("GET", "/", 99, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owner_without_items_gets_empty_list() {
    let (app, _) = app().await;
    book(&app, 2, booking_body(1, 1, 2)).await;

    let response = app
        .oneshot(send("GET", "/owner", 3, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bookings: Vec<BookingDetails> = json_body(response.into_body()).await;
    assert!(bookings.is_empty());
}
