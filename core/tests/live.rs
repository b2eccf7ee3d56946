//! Smoke checks against the deployed service named by `BOOKER_BASE_URL`
//! (default: the public instance). Ignored by default; run with
//! `cargo test -p booker-core --test live -- --ignored`.

use booker_core::assertions::{expect_booking_matches_request, ResponseAssertions};
use booker_core::{with_booking, worker_token, BookingRequestBuilder, Config, Fixture};

#[tokio::test]
#[ignore = "talks to the deployed service"]
async fn live_ping() {
    let fx = Fixture::new(&Config::from_env()).unwrap();
    fx.clients.booking.ping().await.unwrap().assert_status(201);
}

#[tokio::test]
#[ignore = "talks to the deployed service"]
async fn live_booking_round_trip() {
    let config = Config::from_env();
    let fx = Fixture::new(&config).unwrap();
    let token = worker_token(&config).await.unwrap();
    let payload = BookingRequestBuilder::default().with_random_names(None).build();

    let booking_client = &fx.clients.booking;
    let expected = payload.clone();
    with_booking(&fx.clients, &token, &payload, |id, _| async move {
        let resp = booking_client.get_booking(id).await.unwrap();
        resp.assert_ok("get live booking");
        expect_booking_matches_request(resp.json().unwrap(), &expected);
    })
    .await
    .unwrap();
}
