mod client_id;
mod model_state;
mod order;
mod order_type;
mod side;

pub use client_id::ClientId;
pub use model_state::{Inventory, ModelState, PriceSnapshot};
pub use order::Order;
pub use order_type::OrderType;
pub use side::Side;
