pub mod item;
pub mod observation;

pub use item::{CategoryId, Item, ServiceId, UserId};
pub use observation::Observation;
