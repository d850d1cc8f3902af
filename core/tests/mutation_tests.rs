// tests/mutation_tests.rs
mod common;
use common::*;
use std::time::Duration;
use kart::{
  AddPolicy, CartAction, CartStore, LineId, MutationOutcome, NotificationVariant, QuantityUpdate, StoreRequest,
  GENERIC_ERROR_MESSAGE,
};

#[tokio::test]
async fn add_creates_a_single_unit_line_and_confirms() {
  let h = harness();
  let outcome = h.engine.add_to_cart(ROADSTER).await;
  assert_eq!(outcome, MutationOutcome::Applied);

  let view = h.engine.fetch_cart().await.unwrap();
  assert_eq!(view.lines.len(), 1);
  assert_eq!(view.lines[0].car_id, ROADSTER);
  assert_eq!(view.lines[0].quantity, 1);
  assert_eq!(view.lines[0].car.name, "Roadster GT");

  let notes = h.notifications.snapshot();
  assert_eq!(notes.len(), 1);
  assert_eq!(notes[0].title, "Added to cart");
  assert_eq!(notes[0].description, "The item has been added to your cart");
  assert_eq!(notes[0].variant, NotificationVariant::Default);
}

#[tokio::test]
async fn add_is_visible_after_next_fetch_when_not_refetching_eagerly() {
  let h = harness_with(test_config().with_refetch_on_invalidate(false));
  h.engine.fetch_cart().await.unwrap();

  assert!(h.engine.add_to_cart(FAMILY_SUV).await.is_applied());
  // No placeholder line: the cache only learns about the add on resync.
  let stale = h.engine.view();
  assert!(stale.lines.is_empty());
  assert!(stale.is_stale);

  let view = h.engine.fetch_cart().await.unwrap();
  assert_eq!(view.lines.len(), 1);
  assert_eq!(view.lines[0].car_id, FAMILY_SUV);
}

#[tokio::test]
async fn merge_policy_increments_the_existing_line() {
  let h = harness();
  h.engine.add_to_cart(ROADSTER).await;
  h.engine.add_to_cart(ROADSTER).await;

  let view = h.engine.fetch_cart().await.unwrap();
  assert_eq!(view.lines.len(), 1);
  assert_eq!(view.lines[0].quantity, 2);
  let line_id = view.lines[0].id;
  assert!(h
    .store
    .requests()
    .contains(&StoreRequest::Update(line_id, QuantityUpdate { quantity: 2 })));
  assert_eq!(h.notifications.len(), 2);
}

#[tokio::test]
async fn concurrent_merging_adds_each_count() {
  let (h, _laggy) = laggy_harness(Duration::from_millis(20));
  let line_id = h.store.seed_line(&h.session, ROADSTER, 1);

  let (first, second) = tokio::join!(h.engine.add_to_cart(ROADSTER), h.engine.add_to_cart(ROADSTER));
  assert!(first.is_applied());
  assert!(second.is_applied());

  let quantities: Vec<u32> = h.store.lines_for(&h.session).iter().map(|line| line.quantity).collect();
  assert_eq!(quantities, vec![3]);
  let updates: Vec<StoreRequest> = h
    .store
    .requests()
    .into_iter()
    .filter(|r| matches!(r, StoreRequest::Update(..)))
    .collect();
  assert_eq!(
    updates,
    vec![
      StoreRequest::Update(line_id, QuantityUpdate { quantity: 2 }),
      StoreRequest::Update(line_id, QuantityUpdate { quantity: 3 }),
    ]
  );
  assert_eq!(h.engine.view().line(line_id).map(|line| line.quantity), Some(3));
}

#[tokio::test]
async fn merging_add_reads_past_a_fresh_cache() {
  let h = harness();
  let line_id = h.store.seed_line(&h.session, ROADSTER, 1);
  h.engine.fetch_cart().await.unwrap();

  // Another device raises the quantity while our cache is still fresh.
  h.store
    .update_line(&h.session, line_id, QuantityUpdate { quantity: 5 })
    .await
    .unwrap();

  assert!(h.engine.add_to_cart(ROADSTER).await.is_applied());
  assert_eq!(h.engine.view().line(line_id).map(|line| line.quantity), Some(6));
}

#[tokio::test]
async fn always_create_policy_leaves_duplicates_to_the_server() {
  let h = harness_with(test_config().with_add_policy(AddPolicy::AlwaysCreate));
  h.engine.add_to_cart(ROADSTER).await;
  h.engine.add_to_cart(ROADSTER).await;

  let view = h.engine.fetch_cart().await.unwrap();
  assert_eq!(view.lines.len(), 2);
  assert!(view.lines.iter().all(|line| line.car_id == ROADSTER && line.quantity == 1));
}

#[tokio::test]
async fn rejected_add_forwards_server_message_and_leaves_cache() {
  let h = harness();
  h.store.seed_line(&h.session, CITY_HATCH, 1);
  let before = h.engine.fetch_cart().await.unwrap();

  let outcome = h.engine.add_to_cart(PHANTOM_CAR).await;
  assert_eq!(
    outcome,
    MutationOutcome::Failed {
      message: "Car not found".to_string(),
      status: Some(404),
    }
  );

  let errors = h.notifications.errors();
  assert_eq!(errors.len(), 1);
  assert_eq!(errors[0].title, "Error adding to cart");
  assert_eq!(errors[0].description, "Car not found");
  assert_eq!(errors[0].action, CartAction::Add { car_id: PHANTOM_CAR });

  let after = h.engine.view();
  assert_eq!(after.lines, before.lines);
  assert!(!after.is_stale);
}

#[tokio::test]
async fn transport_failure_uses_generic_message() {
  let h = harness_with(test_config().with_add_policy(AddPolicy::AlwaysCreate));
  h.store.set_offline(true);

  let outcome = h.engine.add_to_cart(ROADSTER).await;
  assert_eq!(outcome.failure_message(), Some(GENERIC_ERROR_MESSAGE));
  assert_eq!(h.notifications.errors()[0].description, "An error occurred");
}

#[tokio::test]
async fn positive_quantity_update_is_quiet() {
  let h = harness();
  let line_id = h.store.seed_line(&h.session, FAMILY_SUV, 1);
  h.engine.fetch_cart().await.unwrap();

  assert!(h.engine.update_quantity(line_id, 3).await.is_applied());
  let view = h.engine.view();
  assert_eq!(view.line(line_id).map(|line| line.quantity), Some(3));
  assert_eq!(view.subtotal(), 35_500.5 * 3.0);
  assert!(h.notifications.is_empty());
}

#[tokio::test]
async fn non_positive_quantities_remove_the_line() {
  for quantity in [0_i64, -3] {
    let h = harness();
    let keep = h.store.seed_line(&h.session, ROADSTER, 1);
    let drop = h.store.seed_line(&h.session, CITY_HATCH, 2);
    h.engine.fetch_cart().await.unwrap();

    assert!(h.engine.update_quantity(drop, quantity).await.is_applied());

    let view = h.engine.view();
    assert_eq!(view.line_ids(), vec![keep]);
    assert!(h
      .store
      .requests()
      .iter()
      .all(|r| !matches!(r, StoreRequest::Update(..))));
    assert!(h.store.requests().contains(&StoreRequest::Delete(drop)));

    let notes = h.notifications.snapshot();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Removed from cart");
    assert_eq!(notes[0].action, CartAction::Remove { line_id: drop });
  }
}

#[tokio::test]
async fn failed_update_notifies_and_keeps_quantity() {
  let h = harness();
  let line_id = h.store.seed_line(&h.session, ROADSTER, 1);
  h.engine.fetch_cart().await.unwrap();
  h.store.reject_line(line_id, "Only one of this vehicle is available");

  let outcome = h.engine.update_quantity(line_id, 2).await;
  assert_eq!(
    outcome.failure_message(),
    Some("Only one of this vehicle is available")
  );
  assert_eq!(h.engine.view().line(line_id).map(|l| l.quantity), Some(1));

  let errors = h.notifications.errors();
  assert_eq!(errors.len(), 1);
  assert_eq!(errors[0].title, "Error updating cart");
}

#[tokio::test]
async fn oversized_quantity_is_refused_locally() {
  let h = harness();
  let line_id = h.store.seed_line(&h.session, ROADSTER, 1);
  h.engine.fetch_cart().await.unwrap();

  let outcome = h.engine.update_quantity(line_id, i64::MAX).await;
  assert!(!outcome.is_applied());
  assert_eq!(h.store.requests(), vec![StoreRequest::Fetch]);
  assert_eq!(h.notifications.errors().len(), 1);
}

#[tokio::test]
async fn remove_confirms_and_failed_remove_reports() {
  let h = harness();
  let gone = h.store.seed_line(&h.session, ROADSTER, 1);
  h.engine.fetch_cart().await.unwrap();

  assert!(h.engine.remove_from_cart(gone).await.is_applied());
  assert!(h.engine.view().is_empty());

  let outcome = h.engine.remove_from_cart(LineId(4242)).await;
  assert_eq!(outcome.failure_message(), Some("Cart item not found"));

  let notes = h.notifications.snapshot();
  assert_eq!(notes.len(), 2);
  assert_eq!(notes[0].title, "Removed from cart");
  assert_eq!(notes[1].title, "Error removing from cart");
  assert_eq!(notes[1].variant, NotificationVariant::Destructive);
}

#[tokio::test]
async fn concurrent_mutations_from_cloned_handles() {
  let h = harness_with(test_config().with_add_policy(AddPolicy::AlwaysCreate));
  let first = h.engine.clone();
  let second = h.engine.clone();

  let a = tokio::spawn(async move { first.add_to_cart(ROADSTER).await });
  let b = tokio::spawn(async move { second.add_to_cart(CITY_HATCH).await });
  assert!(a.await.unwrap().is_applied());
  assert!(b.await.unwrap().is_applied());

  let view = h.engine.refresh().await.unwrap();
  let mut cars: Vec<_> = view.lines.iter().map(|line| line.car_id).collect();
  cars.sort();
  assert_eq!(cars, vec![ROADSTER, CITY_HATCH]);
  assert_eq!(view.subtotal(), 20_000.0 + 15_999.99);
}

#[tokio::test]
async fn sold_car_cannot_be_added() {
  let h = harness();
  h.store.reject_car(FAMILY_SUV);

  let outcome = h.engine.add_to_cart(FAMILY_SUV).await;
  assert_eq!(outcome.failure_message(), Some("This vehicle is no longer available"));
  assert!(h.engine.fetch_cart().await.unwrap().is_empty());
}
