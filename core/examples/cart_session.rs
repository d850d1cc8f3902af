// examples/cart_session.rs
//
// Walks one guest cart through add, merge, quantity changes and a partial
// clear against the in-memory store, printing what the drawer would show.
// Run with `RUST_LOG=kart=debug` to see the engine's tracing.

use kart::{
  format_currency, presentation::tax_label, CarId, CarSnapshot, CartDrawer, CartEngine, CartSummary, EngineConfig,
  InMemoryCartStore, NotificationLog, SessionContext,
};
use tracing_subscriber::EnvFilter;

fn car(id: i64, name: &str, year: i32, price: f64, transmission: &str) -> CarSnapshot {
  CarSnapshot {
    id: CarId(id),
    name: name.to_string(),
    year,
    price,
    mileage: 18_500,
    transmission: transmission.to_string(),
    image_url: format!("https://img.example/cars/{}.jpg", id),
  }
}

fn print_drawer(engine: &CartEngine, notifications: &NotificationLog) {
  let view = engine.view();
  let summary = CartSummary::from_view(&view);

  println!("Your Cart ({})", summary.item_count);
  if summary.is_empty {
    println!("  Your cart is empty");
  }
  for line in &view.lines {
    println!(
      "  #{} {} {} x{} @ {}",
      line.id,
      line.car.year,
      line.car.name,
      line.quantity,
      format_currency(line.car.price)
    );
  }
  println!("  Subtotal: {}", summary.formatted_subtotal());
  println!("  {}: {}", tax_label(engine.config().tax_rate), summary.formatted_tax());
  println!("  Total: {}", summary.formatted_total());

  for note in notifications.drain() {
    println!("  [{:?}] {}: {}", note.variant, note.title, note.description);
  }
  println!();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let store = InMemoryCartStore::with_catalog([
    car(1, "Roadster GT", 2021, 20_000.0, "Manual"),
    car(2, "Family SUV", 2019, 35_500.0, "Automatic"),
    car(3, "City Hatch", 2022, 15_999.0, "Automatic"),
  ]);
  let notifications = NotificationLog::new();
  let engine = CartEngine::new(
    store.clone(),
    notifications.clone(),
    EngineConfig::default(),
    SessionContext::guest("demo-session"),
  )?;
  let mut drawer = CartDrawer::default();

  engine.fetch_cart().await?;
  engine.add_to_cart(CarId(1)).await;
  engine.add_to_cart(CarId(1)).await; // merged into the existing line
  engine.add_to_cart(CarId(2)).await;
  engine.add_to_cart(CarId(3)).await;
  engine.add_to_cart(CarId(42)).await; // not in the catalog

  drawer.open();
  if drawer.is_open() {
    print_drawer(&engine, &notifications);
  }

  let suv = engine.view().lines.iter().find(|l| l.car_id == CarId(2)).map(|l| l.id);
  if let Some(suv) = suv {
    store.reject_line(suv, "This vehicle is reserved for a test drive");
  }
  engine.clear_cart().await;
  print_drawer(&engine, &notifications);

  drawer.close();
  Ok(())
}
