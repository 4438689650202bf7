//! Filtro consultivo del selector de fechas
//!
//! Réplica local del cálculo de días bloqueados para deshabilitar fechas en
//! el calendario del cliente. Puede estar desactualizado: la verificación del
//! servidor al confirmar la reserva es la única autoritativa.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::availability::validator::validate_against_blocked;
use crate::models::reservation::DateRange;
use crate::utils::errors::AppError;

/// Resultado de un paso de selección
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Inicio aceptado; `latest_end` es el último fin elegible (None = sin límite)
    StartAccepted { latest_end: Option<NaiveDate> },
    /// El día de inicio está completo
    StartBlocked,
    /// El día siguiente al inicio está completo, no hay fin posible
    NoEndAvailable,
    /// Rango completo listo para enviar
    RangeSelected(DateRange),
    /// El fin debe ser posterior al inicio
    EndNotAfterStart,
    /// El rango cruza días completos; volver a pedir el fin
    EndCrossesBlocked {
        blocked: Vec<NaiveDate>,
        latest_end: Option<NaiveDate>,
    },
    /// Se eligió un fin sin haber elegido inicio
    NoStartSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    Empty,
    Start(NaiveDate),
    Range(DateRange),
}

/// Estado del selector con la caché de días bloqueados
#[derive(Debug, Clone)]
pub struct AdvisoryFilter {
    blocked: BTreeSet<NaiveDate>,
    selection: Selection,
}

impl AdvisoryFilter {
    pub fn new(blocked: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            blocked: blocked.into_iter().collect(),
            selection: Selection::Empty,
        }
    }

    /// Reemplazar la caché con una lectura nueva de `/blocked-dates`
    pub fn refresh(&mut self, blocked: impl IntoIterator<Item = NaiveDate>) {
        self.blocked = blocked.into_iter().collect();
    }

    pub fn is_disabled(&self, day: NaiveDate) -> bool {
        self.blocked.contains(&day)
    }

    /// Último fin elegible para un inicio dado: el día anterior al primer
    /// bloqueado después del inicio. `None` si no hay ningún bloqueado después.
    pub fn latest_selectable_end(&self, start: NaiveDate) -> Option<NaiveDate> {
        let next_day = start.succ_opt()?;
        self.blocked
            .range(next_day..)
            .next()
            .and_then(|first_blocked| first_blocked.pred_opt())
    }

    pub fn select_start(&mut self, start: NaiveDate) -> SelectionOutcome {
        if self.is_disabled(start) {
            self.selection = Selection::Empty;
            return SelectionOutcome::StartBlocked;
        }

        let latest_end = self.latest_selectable_end(start);
        if latest_end.is_some_and(|end| end <= start) {
            self.selection = Selection::Empty;
            return SelectionOutcome::NoEndAvailable;
        }

        self.selection = Selection::Start(start);
        SelectionOutcome::StartAccepted { latest_end }
    }

    /// Elegir el fin. Si cruza un día completo se conserva el inicio para
    /// que el usuario pueda elegir otro fin.
    pub fn select_end(&mut self, end: NaiveDate) -> SelectionOutcome {
        let start = match self.selection {
            Selection::Start(start) => start,
            Selection::Range(range) => range.start(),
            Selection::Empty => return SelectionOutcome::NoStartSelected,
        };

        match validate_against_blocked(start, end, &self.blocked) {
            Ok(range) => {
                self.selection = Selection::Range(range);
                SelectionOutcome::RangeSelected(range)
            }
            Err(AppError::CapacityOverlap { dates }) => {
                self.selection = Selection::Start(start);
                SelectionOutcome::EndCrossesBlocked {
                    blocked: dates,
                    latest_end: self.latest_selectable_end(start),
                }
            }
            Err(_) => {
                self.selection = Selection::Start(start);
                SelectionOutcome::EndNotAfterStart
            }
        }
    }

    pub fn selected_range(&self) -> Option<DateRange> {
        match self.selection {
            Selection::Range(range) => Some(range),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.selection = Selection::Empty;
    }

    /// El servidor rechazó el envío: limpiar la selección e incorporar los
    /// días que el servidor reportó como completos.
    pub fn apply_server_rejection(&mut self, blocked_dates: &[NaiveDate]) {
        self.blocked.extend(blocked_dates.iter().copied());
        self.selection = Selection::Empty;
    }
}
