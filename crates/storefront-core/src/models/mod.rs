//! Data models for storefront entities.
//!
//! These mirror the backend's JSON (snake_case, Laravel-style):
//!
//! - `User`, `RoleInfo`, `Permission`: accounts and their roles
//! - `Product`, `ProductImage`, `Category`: the catalog
//! - `Cart`, `CartItem`: the customer's cart
//! - `Order`, `OrderItem`, `OrderStatus`, `AnalyticsOverview`: orders and admin stats
//! - `Page`, `Pagination`: normalized listing pages

pub(crate) mod amount;
pub mod cart;
pub mod envelope;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem};
pub use envelope::{decode_data, decode_message, decode_page, Page, Pagination};
pub use order::{AnalyticsOverview, CheckoutDetails, Order, OrderItem, OrderStatus};
pub use product::{Category, Product, ProductImage, ProductUpdate};
pub use user::{
    ChangePasswordRequest, Permission, ProfileUpdate, RegisterRequest, RoleInfo, RoleInput, User, UserInput,
};
