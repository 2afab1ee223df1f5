//! Customer list aggregation.
//!
//! Orders carry no foreign key to users. They are grouped by `userId`, then
//! by `customerEmail`, and each user claims the group matching its id or,
//! failing that, its email.

use std::collections::HashMap;

use sareine_core::Amount;

use crate::models::order::non_empty;
use crate::models::{CustomerOrder, CustomerSummary, Order, User};

const UNKNOWN_KEY: &str = "unknown";

fn group_key(order: &Order) -> &str {
    order
        .user_id
        .as_ref()
        .and_then(|id| non_empty(id.as_str()))
        .or_else(|| non_empty(&order.customer_email))
        .unwrap_or(UNKNOWN_KEY)
}

/// Join users with their orders, preserving the user order.
#[must_use]
pub fn summarize(users: Vec<User>, orders: &[Order]) -> Vec<CustomerSummary> {
    let mut groups: HashMap<&str, Vec<&Order>> = HashMap::new();
    for order in orders {
        groups.entry(group_key(order)).or_default().push(order);
    }

    users
        .into_iter()
        .map(|user| {
            let matched = groups
                .get(user.id.as_str())
                .or_else(|| user.email.as_deref().and_then(|e| groups.get(e)))
                .map_or(&[][..], Vec::as_slice);

            CustomerSummary {
                display_name: user
                    .display_name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| "Unknown".to_string()),
                email: user.email.unwrap_or_default(),
                photo_url: user.photo_url.unwrap_or_default(),
                phone: user.phone.unwrap_or_default(),
                created_at: user.created_at,
                order_count: matched.len(),
                total_spend: matched.iter().map(|o| o.amount).sum::<Amount>(),
                orders: matched
                    .iter()
                    .map(|o| CustomerOrder {
                        id: o.id.clone(),
                        amount: o.amount,
                        status: o.status,
                        created_at: o.created_at,
                        items: o.items.clone(),
                    })
                    .collect(),
                id: user.id,
            }
        })
        .collect()
}

/// Case-insensitive match on display name, email or phone.
#[must_use]
pub fn matches_search(customer: &CustomerSummary, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    customer.display_name.to_lowercase().contains(&needle)
        || customer.email.to_lowercase().contains(&needle)
        || customer.phone.to_lowercase().contains(&needle)
}
