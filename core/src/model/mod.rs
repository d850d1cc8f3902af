pub mod car;
pub mod cart_line;

pub use car::{CarId, CarSnapshot};
pub use cart_line::{CartLine, LineId, NewCartLine, QuantityUpdate};
