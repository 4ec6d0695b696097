//! Orchestrating services.
//!
//! Each service borrows the store (and configuration where relevant),
//! runs every mutation inside a single unit of work, and commits on the
//! operation's one success path. Construction is cheap; call sites build
//! services on demand.

pub mod accounts;
pub mod carts;
pub mod catalog;
pub mod mailer;
pub mod orders;

pub use accounts::{AccountService, ChangePassword, RegisterAccount, UpdateAddress, UpdateProfile};
pub use carts::CartService;
pub use catalog::{CatalogService, CreateCategory, CreateProduct, CreateReview, UpdateCategory, UpdateProduct};
pub use mailer::{LogMailer, Mailer};
pub use orders::{OrderLine, OrderService, PlaceOrder};
