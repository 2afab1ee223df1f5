//! Business logic services for admin.
//!
//! # Services
//!
//! - `customers` - Join users with the orders attributed to them
//! - `email` - Templated email delivery via SMTP
//! - `payments` - Razorpay payment links and webhook verification
//! - `stats` - Dashboard statistics

pub mod customers;
pub mod email;
pub mod payments;
pub mod stats;

pub use email::{EmailError, EmailService, Mailer};
pub use payments::{PaymentError, PaymentGateway, RazorpayClient};
pub use stats::DashboardStats;
