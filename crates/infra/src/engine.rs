//! Movement engine: the only path that changes a stock cell quantity.

use chrono::{DateTime, Utc};

use boteco_core::{DomainError, MovementId};
use boteco_events::Event;
use boteco_inventory::{Movement, MovementDraft};

use crate::error::CoreResult;
use crate::store::UnitOfWork;

/// Check that every record a draft references exists.
fn ensure_references<U: UnitOfWork>(uow: &U, draft: &MovementDraft) -> CoreResult<()> {
    if uow.product(draft.product).is_none() {
        return Err(DomainError::not_found(format!("product {}", draft.product)).into());
    }
    for location in [draft.source, draft.destination].into_iter().flatten() {
        if uow.location(location).is_none() {
            return Err(DomainError::not_found(format!("location {location}")).into());
        }
    }
    Ok(())
}

/// Record `draft` and apply its deltas inside `uow`.
///
/// References are checked before anything is written. The caller commits.
pub fn apply_movement<U: UnitOfWork>(
    uow: &mut U,
    draft: MovementDraft,
    occurred_at: DateTime<Utc>,
) -> CoreResult<Movement> {
    draft.validate()?;
    ensure_references(uow, &draft)?;

    let movement = draft.record(MovementId::new(), occurred_at)?;
    for (key, delta) in movement.deltas() {
        let quantity = uow.adjust_stock(key, delta)?;
        tracing::debug!(
            event = movement.event_type(),
            movement_id = %movement.id,
            location = %key.location,
            product = %key.product,
            %delta,
            %quantity,
            "stock cell adjusted"
        );
    }
    uow.append_movement(movement.clone());
    Ok(movement)
}

/// Apply several drafts in order; the first failure aborts the rest.
///
/// Partial writes stay inside `uow` and are discarded with it.
pub fn apply_all<U: UnitOfWork>(
    uow: &mut U,
    drafts: impl IntoIterator<Item = MovementDraft>,
    occurred_at: DateTime<Utc>,
) -> CoreResult<Vec<Movement>> {
    drafts
        .into_iter()
        .map(|draft| apply_movement(uow, draft, occurred_at))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use boteco_catalog::{NewLocation, NewProduct};
    use boteco_core::{LocationId, ProductId, Quantity};
    use boteco_inventory::StockKey;
    use rust_decimal_macros::dec;

    use crate::store::{InMemoryStore, InventoryStore, StoreReader};

    fn seeded(store: &InMemoryStore) -> (LocationId, LocationId, ProductId) {
        let mut tx = store.begin().unwrap();
        let hub = NewLocation::new("Central").into_location(LocationId::new()).unwrap();
        let bar = NewLocation::new("Boteco Centro").into_location(LocationId::new()).unwrap();
        let beer = NewProduct::ingredient("Chopp Litro").into_product(ProductId::new()).unwrap();
        let ids = (hub.id, bar.id, beer.id);
        tx.put_location(hub);
        tx.put_location(bar);
        tx.put_product(beer);
        tx.commit().unwrap();
        ids
    }

    #[test]
    fn first_movement_creates_the_cell_at_its_own_quantity() {
        let store = InMemoryStore::new();
        let (hub, _, beer) = seeded(&store);

        let mut tx = store.begin().unwrap();
        let q = Quantity::positive(dec!(12)).unwrap();
        apply_movement(&mut tx, MovementDraft::entry(beer, q, hub), Utc::now()).unwrap();
        tx.commit().unwrap();

        let reader = store.read().unwrap();
        let cell = reader.stock_cell(StockKey::new(hub, beer)).unwrap();
        assert_eq!(cell.quantity(), dec!(12));
        assert_eq!(cell.minimum_quantity(), dec!(0));
        assert_eq!(reader.movements().len(), 1);
    }

    #[test]
    fn unknown_location_is_rejected_before_any_write() {
        let store = InMemoryStore::new();
        let (hub, _, beer) = seeded(&store);
        let ghost = LocationId::new();

        let mut tx = store.begin().unwrap();
        let q = Quantity::positive(dec!(1)).unwrap();
        let err = apply_movement(&mut tx, MovementDraft::transfer(beer, q, hub, ghost), Utc::now())
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(tx.stock_cell(StockKey::new(hub, beer)).is_none());
        assert!(tx.movements().is_empty());
    }

    #[test]
    fn failed_batch_leaves_committed_state_untouched() {
        let store = InMemoryStore::new();
        let (hub, bar, beer) = seeded(&store);
        let q = Quantity::positive(dec!(2)).unwrap();

        {
            let mut tx = store.begin().unwrap();
            let drafts = vec![
                MovementDraft::transfer(beer, q, hub, bar),
                MovementDraft::exit(ProductId::new(), q, bar),
            ];
            assert!(apply_all(&mut tx, drafts, Utc::now()).is_err());
        }

        let reader = store.read().unwrap();
        assert_eq!(reader.stock_level(hub, beer), dec!(0));
        assert_eq!(reader.stock_level(bar, beer), dec!(0));
        assert!(reader.movements().is_empty());
    }
}
