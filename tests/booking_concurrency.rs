use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use rust_decimal::Decimal;
use uuid::Uuid;

use campervan_booking::availability::OccupancyPolicy;
use campervan_booking::models::reservation::{Addons, DateRange, NewReservation, ReservationStatus};
use campervan_booking::repositories::{MemoryReservationRepository, MemoryUserRepository, ReservationRepository};
use campervan_booking::utils::errors::AppError;

const CAPACITY: u32 = 3;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn booking(start: &str, end: &str) -> NewReservation {
    NewReservation::new(
        Uuid::new_v4(),
        DateRange::new(day(start), day(end)).unwrap(),
        Decimal::from(3700),
        Addons::default(),
    )
}

fn repository() -> Arc<MemoryReservationRepository> {
    Arc::new(MemoryReservationRepository::new(
        Arc::new(MemoryUserRepository::new()),
        OccupancyPolicy::default(),
    ))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_bookings_on_last_slot_admit_exactly_one() {
    for _ in 0..20 {
        let repo = repository();
        for _ in 0..CAPACITY - 1 {
            repo.insert_if_available(booking("2026-06-10", "2026-06-11"), CAPACITY)
                .await
                .unwrap();
        }

        let contenders = (0..8).map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.insert_if_available(booking("2026-06-09", "2026-06-10"), CAPACITY).await })
        });
        let results: Vec<_> = join_all(contenders).await.into_iter().map(|r| r.unwrap()).collect();

        let accepted = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(accepted, 1);
        for rejected in results.iter().filter_map(|r| r.as_ref().err()) {
            match rejected {
                AppError::CapacityOverlap { dates } => assert_eq!(dates, &vec![day("2026-06-10")]),
                other => panic!("unexpected error: {:?}", other),
            }
        }

        assert_eq!(repo.blocked_dates(CAPACITY).await.unwrap(), vec![day("2026-06-10")]);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_ranges_in_opposite_order_do_not_deadlock() {
    let repo = repository();

    let tasks = (0..40).map(|i| {
        let repo = repo.clone();
        tokio::spawn(async move {
            let (start, end) = if i % 2 == 0 {
                ("2026-07-01", "2026-07-05")
            } else {
                ("2026-07-03", "2026-07-08")
            };
            repo.insert_if_available(booking(start, end), CAPACITY).await
        })
    });

    let results = tokio::time::timeout(std::time::Duration::from_secs(10), join_all(tasks))
        .await
        .expect("bookings deadlocked");

    let accepted = results.into_iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
    // 07-03..07-05 es compartido: nunca más de CAPACITY reservas en total
    assert_eq!(accepted, CAPACITY as usize);
    let snapshot = repo.occupancy_between(day("2026-07-01"), day("2026-07-08")).await.unwrap();
    assert!(snapshot.iter().all(|(_, booked)| booked <= CAPACITY));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_reactivations_respect_capacity() {
    let repo = repository();

    let mut cancelled = Vec::new();
    for _ in 0..4 {
        let created = repo
            .insert_if_available(booking("2026-08-01", "2026-08-02"), 10)
            .await
            .unwrap();
        cancelled.push(
            repo.update_status(created.id, ReservationStatus::Cancelled, CAPACITY)
                .await
                .unwrap()
                .id,
        );
    }
    assert!(repo.blocked_dates(CAPACITY).await.unwrap().is_empty());

    let tasks = cancelled.into_iter().map(|id| {
        let repo = repo.clone();
        tokio::spawn(async move { repo.update_status(id, ReservationStatus::Confirmed, CAPACITY).await })
    });
    let accepted = join_all(tasks)
        .await
        .into_iter()
        .filter(|r| matches!(r, Ok(Ok(_))))
        .count();

    assert_eq!(accepted, CAPACITY as usize);
    assert_eq!(
        repo.blocked_dates(CAPACITY).await.unwrap(),
        vec![day("2026-08-01"), day("2026-08-02")]
    );
}
