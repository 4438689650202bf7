use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::availability::{OccupancyPolicy, OccupancySnapshot};
use crate::models::reservation::{
    AuthorizationArtifact, NewReservation, Reservation, ReservationStatus, ReservationWithOwner,
};
use crate::utils::dates::days_inclusive;
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Almacén de reservas con índice de ocupación por día.
///
/// `insert_if_available` y `update_status` son las únicas operaciones que
/// modifican la ocupación, y ambas son atómicas respecto de cualquier otra
/// reserva que toque los mismos días.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn list_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Reservation>>;
    async fn list_with_owner(&self) -> AppResult<Vec<ReservationWithOwner>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>>;
    async fn occupancy_between(&self, start: NaiveDate, end: NaiveDate) -> AppResult<OccupancySnapshot>;
    async fn blocked_dates(&self, capacity: u32) -> AppResult<Vec<NaiveDate>>;
    async fn insert_if_available(&self, reservation: NewReservation, capacity: u32) -> AppResult<Reservation>;
    async fn update_status(&self, id: Uuid, status: ReservationStatus, capacity: u32) -> AppResult<Reservation>;
    async fn attach_authorization(&self, id: Uuid, artifact: AuthorizationArtifact) -> AppResult<Reservation>;
}

pub struct PgReservationRepository {
    pool: PgPool,
    policy: OccupancyPolicy,
}

impl PgReservationRepository {
    pub fn new(pool: PgPool, policy: OccupancyPolicy) -> Self {
        Self { pool, policy }
    }

    /// Reconstruir `date_occupancy` desde la tabla de reservas con la
    /// política vigente. Se ejecuta al arrancar, antes de aceptar tráfico.
    pub async fn rebuild_occupancy(&self) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("LOCK TABLE date_occupancy IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM date_occupancy").execute(&mut *tx).await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO date_occupancy (day, booked)
            SELECT d::date, COUNT(*)::int
            FROM reservations r
            CROSS JOIN LATERAL generate_series(r.start_date::timestamp, r.end_date::timestamp, interval '1 day') AS d
            WHERE $1 OR r.status <> 'cancelled'
            GROUP BY d::date
            "#,
        )
        .bind(self.policy.count_cancelled)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        info!("📅 Índice de ocupación reconstruido: {} días con reservas", inserted);
        Ok(inserted)
    }

    /// Incrementar cada día en orden ascendente solo si está por debajo de la
    /// capacidad. Devuelve los días que rechazaron el incremento.
    async fn reserve_days(
        tx: &mut Transaction<'_, Postgres>,
        start: NaiveDate,
        end: NaiveDate,
        capacity: u32,
    ) -> AppResult<Vec<NaiveDate>> {
        let capacity = i32::try_from(capacity).unwrap_or(i32::MAX);
        let mut blocked = Vec::new();

        for day in days_inclusive(start, end) {
            let row: Option<(i32,)> = sqlx::query_as(
                r#"
                INSERT INTO date_occupancy (day, booked)
                VALUES ($1, 1)
                ON CONFLICT (day) DO UPDATE
                SET booked = date_occupancy.booked + 1
                WHERE date_occupancy.booked < $2
                RETURNING booked
                "#,
            )
            .bind(day)
            .bind(capacity)
            .fetch_optional(&mut **tx)
            .await?;

            if row.is_none() {
                blocked.push(day);
            }
        }

        Ok(blocked)
    }

    async fn release_days(tx: &mut Transaction<'_, Postgres>, start: NaiveDate, end: NaiveDate) -> AppResult<()> {
        for day in days_inclusive(start, end) {
            sqlx::query("UPDATE date_occupancy SET booked = booked - 1 WHERE day = $1 AND booked > 0")
                .bind(day)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    async fn list_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    async fn list_with_owner(&self) -> AppResult<Vec<ReservationWithOwner>> {
        let rows = sqlx::query_as::<_, ReservationWithOwner>(
            r#"
            SELECT r.*, u.name AS user_name, u.phone AS user_phone, u.email AS user_email
            FROM reservations r
            JOIN users u ON u.id = r.user_id
            ORDER BY r.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        let reservation = sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(reservation)
    }

    async fn occupancy_between(&self, start: NaiveDate, end: NaiveDate) -> AppResult<OccupancySnapshot> {
        let rows: Vec<(NaiveDate, i32)> =
            sqlx::query_as("SELECT day, booked FROM date_occupancy WHERE day BETWEEN $1 AND $2")
                .bind(start)
                .bind(end)
                .fetch_all(&self.pool)
                .await?;

        Ok(OccupancySnapshot::from_counts(
            rows.into_iter().map(|(day, booked)| (day, booked.max(0) as u32)),
        ))
    }

    async fn blocked_dates(&self, capacity: u32) -> AppResult<Vec<NaiveDate>> {
        let rows: Vec<(NaiveDate,)> =
            sqlx::query_as("SELECT day FROM date_occupancy WHERE booked >= $1 ORDER BY day")
                .bind(i32::try_from(capacity).unwrap_or(i32::MAX))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(day,)| day).collect())
    }

    async fn insert_if_available(&self, reservation: NewReservation, capacity: u32) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        let blocked = Self::reserve_days(&mut tx, reservation.range.start(), reservation.range.end(), capacity).await?;
        if !blocked.is_empty() {
            tx.rollback().await?;
            debug!("Reserva rechazada en el commit: {:?}", blocked);
            return Err(AppError::CapacityOverlap { dates: blocked });
        }

        let row = reservation.into_reservation();
        let created = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (id, user_id, start_date, end_date, status, total_price, addons, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(row.id)
        .bind(row.user_id)
        .bind(row.start_date)
        .bind(row.end_date)
        .bind(row.status)
        .bind(row.total_price)
        .bind(&row.addons)
        .bind(row.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn update_status(&self, id: Uuid, status: ReservationStatus, capacity: u32) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Reservation", &id.to_string()))?;

        match self.policy.delta(current.status, status) {
            d if d > 0 => {
                let blocked = Self::reserve_days(&mut tx, current.start_date, current.end_date, capacity).await?;
                if !blocked.is_empty() {
                    tx.rollback().await?;
                    return Err(AppError::CapacityOverlap { dates: blocked });
                }
            }
            d if d < 0 => Self::release_days(&mut tx, current.start_date, current.end_date).await?,
            _ => {}
        }

        let updated = sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn attach_authorization(&self, id: Uuid, artifact: AuthorizationArtifact) -> AppResult<Reservation> {
        let updated = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET authorization_ref = $2, authorization_signed_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(artifact.reference)
        .bind(artifact.signed_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Reservation", &id.to_string()))?;

        Ok(updated)
    }
}
