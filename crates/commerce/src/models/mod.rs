//! Entity records and their derived-value helpers.
//!
//! These are plain data holders referencing each other by typed ID; the
//! store owns resolution and persistence. Behavior is limited to small
//! derivations (availability, cancellation eligibility, totals).

pub mod address;
pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use address::{Address, NewAddress};
pub use cart::{CartItem, CartLineView, CartSummary, ShoppingCart};
pub use category::{Category, NewCategory};
pub use order::{NewOrder, Order, OrderItem, StatusChange};
pub use product::{NewProduct, Product, ProductImage, Review};
pub use user::{NewUser, User};
