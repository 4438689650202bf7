//! Almacén de reservas en memoria
//!
//! Mismo contrato que la versión PostgreSQL. Cada día del calendario tiene su
//! propio mutex con el contador de ocupación; una reserva bloquea solo los
//! días de su rango, siempre en orden ascendente, de modo que reservas con
//! rangos disjuntos nunca se esperan entre sí.
//!
//! Orden de bloqueo: mutex de los días, luego el mapa de reservas.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use uuid::Uuid;

use crate::availability::{occupancy_counts, OccupancyPolicy, OccupancySnapshot};
use crate::models::reservation::{
    AuthorizationArtifact, NewReservation, Reservation, ReservationStatus, ReservationWithOwner,
};
use crate::repositories::reservation_repository::ReservationRepository;
use crate::repositories::user_repository::{MemoryUserRepository, UserRepository};
use crate::utils::dates::days_inclusive;
use crate::utils::errors::{not_found_error, AppError, AppResult};

type DaySlot = Arc<Mutex<u32>>;

pub struct MemoryReservationRepository {
    policy: OccupancyPolicy,
    users: Arc<MemoryUserRepository>,
    days: DashMap<NaiveDate, DaySlot>,
    reservations: RwLock<HashMap<Uuid, Reservation>>,
}

fn poisoned() -> AppError {
    AppError::Internal("reservation store lock poisoned".to_string())
}

fn lock_slot(slot: &DaySlot) -> AppResult<MutexGuard<'_, u32>> {
    slot.lock().map_err(|_| poisoned())
}

impl MemoryReservationRepository {
    pub fn new(users: Arc<MemoryUserRepository>, policy: OccupancyPolicy) -> Self {
        Self {
            policy,
            users,
            days: DashMap::new(),
            reservations: RwLock::new(HashMap::new()),
        }
    }

    /// Cargar reservas existentes y derivar el índice con la calculadora
    pub fn with_reservations(
        users: Arc<MemoryUserRepository>,
        policy: OccupancyPolicy,
        existing: Vec<Reservation>,
    ) -> Self {
        let repo = Self::new(users, policy);
        for (day, booked) in occupancy_counts(&existing, policy).iter() {
            repo.days.insert(day, Arc::new(Mutex::new(booked)));
        }
        if let Ok(mut map) = repo.reservations.write() {
            map.extend(existing.into_iter().map(|r| (r.id, r)));
        }
        repo
    }

    /// Slots del rango en orden ascendente. Se clonan los `Arc` y se suelta
    /// el shard del DashMap antes de tomar cualquier mutex.
    fn slots(&self, days: impl Iterator<Item = NaiveDate>) -> Vec<(NaiveDate, DaySlot)> {
        days
            .map(|day| (day, self.days.entry(day).or_default().value().clone()))
            .collect()
    }

    fn commit_new(&self, reservation: NewReservation, capacity: u32) -> AppResult<Reservation> {
        let slots = self.slots(reservation.range.days());

        let mut guards = Vec::with_capacity(slots.len());
        for (day, slot) in &slots {
            guards.push((*day, lock_slot(slot)?));
        }

        let blocked: Vec<NaiveDate> = guards
            .iter()
            .filter(|(_, booked)| **booked >= capacity)
            .map(|(day, _)| *day)
            .collect();
        if !blocked.is_empty() {
            return Err(AppError::CapacityOverlap { dates: blocked });
        }

        for (_, booked) in guards.iter_mut() {
            **booked += 1;
        }

        let created = reservation.into_reservation();
        self.reservations
            .write()
            .map_err(|_| poisoned())?
            .insert(created.id, created.clone());

        Ok(created)
    }

    fn commit_status(&self, id: Uuid, status: ReservationStatus, capacity: u32) -> AppResult<Reservation> {
        let (start, end) = {
            let map = self.reservations.read().map_err(|_| poisoned())?;
            let current = map.get(&id).ok_or_else(|| not_found_error("Reservation", &id.to_string()))?;
            (current.start_date, current.end_date)
        };

        let slots = self.slots(days_inclusive(start, end));
        let mut guards = Vec::with_capacity(slots.len());
        for (day, slot) in &slots {
            guards.push((*day, lock_slot(slot)?));
        }

        let mut map = self.reservations.write().map_err(|_| poisoned())?;
        let current = map
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Reservation", &id.to_string()))?;

        // El estado se relee con los días bloqueados: dos cambios
        // simultáneos sobre la misma reserva quedan serializados aquí
        match self.policy.delta(current.status, status) {
            d if d > 0 => {
                let blocked: Vec<NaiveDate> = guards
                    .iter()
                    .filter(|(_, booked)| **booked >= capacity)
                    .map(|(day, _)| *day)
                    .collect();
                if !blocked.is_empty() {
                    return Err(AppError::CapacityOverlap { dates: blocked });
                }
                for (_, booked) in guards.iter_mut() {
                    **booked += 1;
                }
            }
            d if d < 0 => {
                for (_, booked) in guards.iter_mut() {
                    **booked = booked.saturating_sub(1);
                }
            }
            _ => {}
        }

        current.status = status;
        Ok(current.clone())
    }

    fn snapshot_between(&self, start: NaiveDate, end: NaiveDate) -> AppResult<OccupancySnapshot> {
        let slots: Vec<(NaiveDate, DaySlot)> = days_inclusive(start, end)
            .filter_map(|day| self.days.get(&day).map(|slot| (day, slot.value().clone())))
            .collect();

        let mut rows = Vec::with_capacity(slots.len());
        for (day, slot) in &slots {
            rows.push((*day, *lock_slot(slot)?));
        }
        Ok(OccupancySnapshot::from_counts(rows))
    }

    fn blocked(&self, capacity: u32) -> AppResult<Vec<NaiveDate>> {
        let slots: Vec<(NaiveDate, DaySlot)> = self
            .days
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut blocked = Vec::new();
        for (day, slot) in &slots {
            if *lock_slot(slot)? >= capacity {
                blocked.push(*day);
            }
        }
        blocked.sort();
        Ok(blocked)
    }

    fn sorted_newest_first(mut reservations: Vec<Reservation>) -> Vec<Reservation> {
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reservations
    }
}

#[async_trait]
impl ReservationRepository for MemoryReservationRepository {
    async fn list_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Reservation>> {
        let owned: Vec<Reservation> = {
            let map = self.reservations.read().map_err(|_| poisoned())?;
            map.values().filter(|r| r.user_id == user_id).cloned().collect()
        };
        Ok(Self::sorted_newest_first(owned))
    }

    async fn list_with_owner(&self) -> AppResult<Vec<ReservationWithOwner>> {
        let all: Vec<Reservation> = {
            let map = self.reservations.read().map_err(|_| poisoned())?;
            map.values().cloned().collect()
        };

        let mut rows = Vec::with_capacity(all.len());
        for reservation in Self::sorted_newest_first(all) {
            // Igual que el JOIN: reservas sin usuario no aparecen
            if let Some(owner) = self.users.find_by_id(reservation.user_id).await? {
                rows.push(ReservationWithOwner {
                    reservation,
                    user_name: owner.name,
                    user_phone: owner.phone,
                    user_email: owner.email,
                });
            }
        }
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        let map = self.reservations.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn occupancy_between(&self, start: NaiveDate, end: NaiveDate) -> AppResult<OccupancySnapshot> {
        self.snapshot_between(start, end)
    }

    async fn blocked_dates(&self, capacity: u32) -> AppResult<Vec<NaiveDate>> {
        self.blocked(capacity)
    }

    async fn insert_if_available(&self, reservation: NewReservation, capacity: u32) -> AppResult<Reservation> {
        self.commit_new(reservation, capacity)
    }

    async fn update_status(&self, id: Uuid, status: ReservationStatus, capacity: u32) -> AppResult<Reservation> {
        self.commit_status(id, status, capacity)
    }

    async fn attach_authorization(&self, id: Uuid, artifact: AuthorizationArtifact) -> AppResult<Reservation> {
        let mut map = self.reservations.write().map_err(|_| poisoned())?;
        let reservation = map
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Reservation", &id.to_string()))?;

        reservation.authorization_ref = Some(artifact.reference);
        reservation.authorization_signed_at = Some(artifact.signed_at);
        Ok(reservation.clone())
    }
}
