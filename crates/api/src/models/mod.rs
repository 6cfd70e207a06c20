//! Domain row types backing the repositories.

pub mod order;
pub mod points;
pub mod product;
pub mod user;

pub use order::{Order, OrderItem};
pub use points::PointsEntry;
pub use product::{Category, Product};
pub use user::User;
