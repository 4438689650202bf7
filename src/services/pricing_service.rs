//! Cálculo del precio autoritativo de una reserva
//!
//! Tarifa diaria por noche de alquiler más un cargo único por cada
//! equipamiento adicional.

use rust_decimal::Decimal;

use crate::models::reservation::{Addons, DateRange};

pub const MATTRESS_FEE: i64 = 500;
pub const BLANKET_FEE: i64 = 200;
pub const COOKWARE_FEE: i64 = 200;

/// Un equipamiento adicional con su precio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddonLine {
    pub key: &'static str,
    pub label: &'static str,
    pub fee: i64,
}

const ADDON_CATALOG: [AddonLine; 3] = [
    AddonLine { key: "mattress", label: "Double inflatable mattress", fee: MATTRESS_FEE },
    AddonLine { key: "blanket", label: "Warm blanket", fee: BLANKET_FEE },
    AddonLine { key: "cookware", label: "Multi-purpose cookware set", fee: COOKWARE_FEE },
];

/// Equipamiento elegido, en el orden del catálogo
pub fn selected_addons(addons: &Addons) -> Vec<AddonLine> {
    ADDON_CATALOG
        .iter()
        .filter(|line| match line.key {
            "mattress" => addons.mattress,
            "blanket" => addons.blanket,
            "cookware" => addons.cookware,
            _ => false,
        })
        .copied()
        .collect()
}

#[derive(Debug, Clone)]
pub struct PricingService {
    daily_rate: Decimal,
}

impl PricingService {
    pub fn new(daily_rate: Decimal) -> Self {
        Self { daily_rate }
    }

    pub fn quote(&self, range: &DateRange, addons: &Addons) -> Decimal {
        let rental = self.daily_rate * Decimal::from(range.rental_days());
        let extras: i64 = selected_addons(addons).iter().map(|line| line.fee).sum();
        rental + Decimal::from(extras)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(
            NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_quote_without_addons() {
        let pricing = PricingService::new(Decimal::from(3700));
        assert_eq!(pricing.quote(&range("2026-06-11", "2026-06-13"), &Addons::default()), Decimal::from(7400));
    }

    #[test]
    fn test_quote_with_all_addons() {
        let pricing = PricingService::new(Decimal::from(3700));
        let addons = Addons { mattress: true, blanket: true, cookware: true };
        assert_eq!(pricing.quote(&range("2026-06-11", "2026-06-12"), &addons), Decimal::from(4600));
    }

    #[test]
    fn test_selected_addons_order() {
        let addons = Addons { mattress: false, blanket: true, cookware: true };
        let keys: Vec<&str> = selected_addons(&addons).iter().map(|l| l.key).collect();
        assert_eq!(keys, vec!["blanket", "cookware"]);
    }
}
