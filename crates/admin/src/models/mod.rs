//! Domain models for admin.
//!
//! Every record serializes with camelCase keys, matching the documents the
//! storefront writes and the JSON the dashboard API returns.

pub mod customer;
pub mod email_log;
pub mod order;
pub mod preorder;
pub mod product;
pub mod session;
pub mod settings;

pub use customer::{CustomerOrder, CustomerSummary, User};
pub use email_log::EmailLog;
pub use order::{Order, OrderItem, ShippingAddress};
pub use preorder::{PaymentLinkRef, Preorder};
pub use product::{MissingProductFields, NewProduct, Product, ProductPatch};
pub use session::{CurrentAdmin, keys as session_keys};
pub use settings::{SettingsUpdate, StoreSettings};
