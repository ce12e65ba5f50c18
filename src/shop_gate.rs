use blackanchor_common::CoreError;
use blackanchor_data::Catalog;

use crate::clock::WorldClock;

/// Per-location open-hours predicate driven by the clock and a closed-day list (component C).
pub struct ShopGate;

impl ShopGate {
    /// `false` if today's `day_number` appears in the closed-days list; otherwise delegates to
    /// the clock's range predicate on `open_time..close_time` (§4.C).
    pub fn is_open(store_id: &str, clock: &WorldClock, catalog: &Catalog) -> Result<bool, CoreError> {
        let shop = catalog
            .shops
            .get(store_id)
            .ok_or_else(|| CoreError::NotFound(format!("shop {store_id:?}")))?;
        let today = clock.day_number() as u64;
        if shop.closed_days.contains(&today) {
            return Ok(false);
        }
        clock.is_time_in_range(&shop.open_time, &shop.close_time)
    }

    /// `"Open"` or `"Closed (opens at HH:MM)"`.
    pub fn status(store_id: &str, clock: &WorldClock, catalog: &Catalog) -> Result<String, CoreError> {
        let shop = catalog
            .shops
            .get(store_id)
            .ok_or_else(|| CoreError::NotFound(format!("shop {store_id:?}")))?;
        if Self::is_open(store_id, clock, catalog)? {
            Ok("Open".to_string())
        } else {
            Ok(format!("Closed (opens at {})", shop.open_time))
        }
    }

    /// Room-entry gate: rooms carrying the `"shop"` flag reject entry while closed.
    pub fn check_room_entry(
        store_id: &str,
        clock: &WorldClock,
        catalog: &Catalog,
    ) -> Result<(), CoreError> {
        if Self::is_open(store_id, clock, catalog)? {
            Ok(())
        } else {
            Err(CoreError::Rejected(Self::status(store_id, clock, catalog)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackanchor_data::ShopGateData;
    use std::collections::HashSet;

    fn catalog_with_shop() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.shops.insert(
            "general_store".to_string(),
            ShopGateData {
                store_id: "general_store".to_string(),
                room_id: blackanchor_data::RoomId::from("market"),
                open_time: "08:00".to_string(),
                close_time: "18:00".to_string(),
                closed_days: HashSet::new(),
            },
        );
        catalog
    }

    #[test]
    fn shop_closed_before_opening_hour() {
        let catalog = catalog_with_shop();
        let clock = WorldClock::with_start(3, 7 * 3600);
        assert!(!ShopGate::is_open("general_store", &clock, &catalog).unwrap());
        let err = ShopGate::check_room_entry("general_store", &clock, &catalog).unwrap_err();
        assert!(matches!(err, CoreError::Rejected(_)));
    }

    #[test]
    fn shop_open_during_hours() {
        let catalog = catalog_with_shop();
        let clock = WorldClock::with_start(3, 9 * 3600);
        assert!(ShopGate::is_open("general_store", &clock, &catalog).unwrap());
        assert_eq!(
            ShopGate::status("general_store", &clock, &catalog).unwrap(),
            "Open"
        );
    }

    #[test]
    fn closed_day_overrides_hours() {
        let mut catalog = catalog_with_shop();
        catalog
            .shops
            .get_mut("general_store")
            .unwrap()
            .closed_days
            .insert(0);
        let clock = WorldClock::with_start(3, 9 * 3600);
        assert!(!ShopGate::is_open("general_store", &clock, &catalog).unwrap());
    }
}
