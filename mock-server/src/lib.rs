//! In-process stand-in for the booking service.
//!
//! Mirrors the public surface closely enough for the harness's integration
//! tests: status codes, text vs JSON bodies and cookie-token auth behave like
//! the real service.

use std::{
    collections::{BTreeMap, HashSet},
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "password123";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingDates {
    pub checkin: String,
    pub checkout: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Booking {
    pub firstname: String,
    pub lastname: String,
    pub totalprice: i64,
    pub depositpaid: bool,
    pub bookingdates: BookingDates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additionalneeds: Option<String>,
}

#[derive(Deserialize)]
pub struct PartialBookingDates {
    pub checkin: Option<String>,
    pub checkout: Option<String>,
}

#[derive(Deserialize)]
pub struct PatchBooking {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub totalprice: Option<i64>,
    pub depositpaid: Option<bool>,
    pub bookingdates: Option<PartialBookingDates>,
    pub additionalneeds: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Created {
    pub bookingid: i64,
    pub booking: Booking,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BookingId {
    pub bookingid: i64,
}

#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Default)]
pub struct Filter {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub checkin: Option<String>,
    pub checkout: Option<String>,
}

#[derive(Default)]
pub struct Store {
    bookings: RwLock<BTreeMap<i64, Booking>>,
    tokens: RwLock<HashSet<String>>,
    next_id: AtomicI64,
}

pub type Db = Arc<Store>;

pub fn app() -> Router {
    let db: Db = Arc::new(Store {
        next_id: AtomicI64::new(1),
        ..Default::default()
    });
    Router::new()
        .route("/ping", get(ping))
        .route("/auth", post(create_token))
        .route("/booking", get(list_bookings).post(create_booking))
        .route(
            "/booking/{id}",
            get(get_booking)
                .put(update_booking)
                .patch(partial_update_booking)
                .delete(delete_booking),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock booking service listening");
    }
    axum::serve(listener, app()).await
}

async fn ping() -> (StatusCode, &'static str) {
    (StatusCode::CREATED, "Created")
}

/// Bad or missing credentials still get a 200, with a reason instead of a
/// token.
async fn create_token(State(db): State<Db>, Json(input): Json<Credentials>) -> Json<serde_json::Value> {
    if input.username != USERNAME || input.password != PASSWORD {
        return Json(serde_json::json!({ "reason": "Bad credentials" }));
    }
    let token = Uuid::new_v4().simple().to_string()[..15].to_string();
    db.tokens.write().await.insert(token.clone());
    debug!("issued token");
    Json(serde_json::json!({ "token": token }))
}

async fn list_bookings(State(db): State<Db>, Query(filter): Query<Filter>) -> Json<Vec<BookingId>> {
    let bookings = db.bookings.read().await;
    let ids = bookings
        .iter()
        .filter(|(_, b)| filter.firstname.as_ref().map_or(true, |f| *f == b.firstname))
        .filter(|(_, b)| filter.lastname.as_ref().map_or(true, |l| *l == b.lastname))
        .filter(|(_, b)| filter.checkin.as_ref().map_or(true, |c| b.bookingdates.checkin >= *c))
        .filter(|(_, b)| filter.checkout.as_ref().map_or(true, |c| b.bookingdates.checkout <= *c))
        .map(|(id, _)| BookingId { bookingid: *id })
        .collect();
    Json(ids)
}

async fn create_booking(State(db): State<Db>, Json(input): Json<Booking>) -> Json<Created> {
    let id = db.next_id.fetch_add(1, Ordering::SeqCst);
    db.bookings.write().await.insert(id, input.clone());
    Json(Created {
        bookingid: id,
        booking: input,
    })
}

async fn get_booking(State(db): State<Db>, Path(id): Path<i64>) -> Response {
    match db.bookings.read().await.get(&id) {
        Some(booking) => Json(booking.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

async fn update_booking(
    State(db): State<Db>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(input): Json<Booking>,
) -> Response {
    if !authorized(&db, &headers).await {
        return forbidden();
    }
    let mut bookings = db.bookings.write().await;
    match bookings.get_mut(&id) {
        Some(booking) => {
            *booking = input;
            Json(booking.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

async fn partial_update_booking(
    State(db): State<Db>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(input): Json<PatchBooking>,
) -> Response {
    if !authorized(&db, &headers).await {
        return forbidden();
    }
    let mut bookings = db.bookings.write().await;
    let Some(booking) = bookings.get_mut(&id) else {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };
    if let Some(firstname) = input.firstname {
        booking.firstname = firstname;
    }
    if let Some(lastname) = input.lastname {
        booking.lastname = lastname;
    }
    if let Some(totalprice) = input.totalprice {
        booking.totalprice = totalprice;
    }
    if let Some(depositpaid) = input.depositpaid {
        booking.depositpaid = depositpaid;
    }
    if let Some(dates) = input.bookingdates {
        if let Some(checkin) = dates.checkin {
            booking.bookingdates.checkin = checkin;
        }
        if let Some(checkout) = dates.checkout {
            booking.bookingdates.checkout = checkout;
        }
    }
    if let Some(needs) = input.additionalneeds {
        booking.additionalneeds = Some(needs);
    }
    Json(booking.clone()).into_response()
}

/// Answers like the real service: `201 Created` on success, `405` for an
/// unknown id.
async fn delete_booking(State(db): State<Db>, Path(id): Path<i64>, headers: HeaderMap) -> Response {
    if !authorized(&db, &headers).await {
        return forbidden();
    }
    match db.bookings.write().await.remove(&id) {
        Some(_) => (StatusCode::CREATED, "Created").into_response(),
        None => (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response(),
    }
}

fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, "Forbidden").into_response()
}

async fn authorized(db: &Db, headers: &HeaderMap) -> bool {
    match cookie_token(headers) {
        Some(token) => db.tokens.read().await.contains(&token),
        None => false,
    }
}

/// Extract `token` from any `Cookie` header.
fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "token")
        .map(|(_, value)| value.to_string())
}
