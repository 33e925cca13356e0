//! Order model.
//!
//! An order is a snapshot of a purchase: line items carry the unit price
//! that was in effect when the order was placed, and the total is computed
//! once from those snapshots. After placement only the status changes.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DomainError, OrderId, ProductId, Timestamp, UserId};

// =============================================================================
// OrderStatus
// =============================================================================

/// The lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed but not yet fulfilled.
    #[default]
    Pending,
    /// Fulfilled.
    Completed,
    /// Cancelled by an administrator.
    Cancelled,
}

impl OrderStatus {
    /// Wire representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` for `Completed` and `Cancelled`.
    ///
    /// Terminal states are informational only; an administrator may still
    /// move an order out of them.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

// =============================================================================
// PricingPolicy
// =============================================================================

/// Where unit prices come from when an order is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PricingPolicy {
    /// Use the price submitted with each order item.
    #[default]
    ClientSupplied,
    /// Look every product up in the catalog and use its stored price.
    Catalog,
}

impl PricingPolicy {
    /// Configuration representation of the policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClientSupplied => "client",
            Self::Catalog => "catalog",
        }
    }
}

impl FromStr for PricingPolicy {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "client" => Ok(Self::ClientSupplied),
            "catalog" => Ok(Self::Catalog),
            other => Err(DomainError::invalid_field(
                "pricing",
                format!("unknown pricing policy '{other}', expected 'client' or 'catalog'"),
            )),
        }
    }
}

// =============================================================================
// CustomerInfo
// =============================================================================

/// Delivery contact supplied with an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInfo {
    /// Recipient name.
    pub name: String,
    /// Delivery address.
    pub address: String,
    /// Contact phone number.
    pub phone: String,
}

impl CustomerInfo {
    /// Creates customer info, requiring every field to be non-blank.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingField` naming the first blank field.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        phone: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let info = Self {
            name: name.into(),
            address: address.into(),
            phone: phone.into(),
        };

        if info.name.trim().is_empty() {
            return Err(DomainError::MissingField("customerInfo.name"));
        }
        if info.address.trim().is_empty() {
            return Err(DomainError::MissingField("customerInfo.address"));
        }
        if info.phone.trim().is_empty() {
            return Err(DomainError::MissingField("customerInfo.phone"));
        }

        Ok(info)
    }
}

// =============================================================================
// OrderLineItem
// =============================================================================

/// One line of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLineItem {
    /// Product that was ordered.
    pub product_id: ProductId,
    /// Units ordered.
    pub quantity: u32,
    /// Unit price at the time the order was placed.
    pub price: Decimal,
}

impl OrderLineItem {
    /// Creates an order line.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidField` for a zero quantity or a negative
    /// price.
    pub fn new(product_id: ProductId, quantity: u32, price: Decimal) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::invalid_field("quantity", "must be at least 1"));
        }
        if price.is_sign_negative() && !price.is_zero() {
            return Err(DomainError::invalid_field("price", "must not be negative"));
        }
        Ok(Self {
            product_id,
            quantity,
            price,
        })
    }

    /// `quantity × price`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidField` if the product overflows.
    pub fn line_total(&self) -> Result<Decimal, DomainError> {
        Decimal::from(self.quantity)
            .checked_mul(self.price)
            .ok_or_else(|| DomainError::invalid_field("total", "amount out of range"))
    }
}

/// Sums `quantity × price` over `items`.
///
/// # Errors
///
/// Returns `DomainError::InvalidField` if the sum overflows.
pub fn compute_total(items: &[OrderLineItem]) -> Result<Decimal, DomainError> {
    items.iter().try_fold(Decimal::ZERO, |total, item| {
        total
            .checked_add(item.line_total()?)
            .ok_or_else(|| DomainError::invalid_field("total", "amount out of range"))
    })
}

// =============================================================================
// Order
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Unique identifier.
    pub order_id: OrderId,
    /// User who placed the order.
    pub user_id: UserId,
    /// Ordered lines with their price snapshots.
    pub items: Vec<OrderLineItem>,
    /// Sum of `quantity × price` over `items`.
    pub total: Decimal,
    /// Delivery contact.
    pub customer_info: CustomerInfo,
    /// Current status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: Timestamp,
}

impl Order {
    /// Places a new order in the `Pending` status, computing its total.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyOrder` when `items` is empty, or an
    /// `InvalidField` error if the total overflows.
    pub fn place(
        order_id: OrderId,
        user_id: UserId,
        items: Vec<OrderLineItem>,
        customer_info: CustomerInfo,
        created_at: Timestamp,
    ) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        let total = compute_total(&items)?;

        Ok(Self {
            order_id,
            user_id,
            items,
            total,
            customer_info,
            status: OrderStatus::Pending,
            created_at,
        })
    }

    /// Returns the order with its status replaced.
    #[must_use]
    pub fn with_status(self, status: OrderStatus) -> Self {
        Self { status, ..self }
    }

    /// Product ids referenced by the order, in line order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|item| item.product_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn customer() -> CustomerInfo {
        CustomerInfo::new("Ada Lovelace", "12 St James's Square", "+44 20 7946 0000").unwrap()
    }

    fn line(quantity: u32, price: i64) -> OrderLineItem {
        OrderLineItem::new(ProductId::generate(), quantity, Decimal::from(price)).unwrap()
    }

    #[rstest]
    #[case("pending", OrderStatus::Pending)]
    #[case("completed", OrderStatus::Completed)]
    #[case("cancelled", OrderStatus::Cancelled)]
    fn status_parses_known_values(#[case] input: &str, #[case] expected: OrderStatus) {
        let status: OrderStatus = input.parse().unwrap();
        assert_eq!(status, expected);
        assert_eq!(status.as_str(), input);
    }

    #[rstest]
    #[case("shipped")]
    #[case("PENDING")]
    #[case("")]
    fn status_rejects_unknown_values(#[case] input: &str) {
        assert_eq!(
            input.parse::<OrderStatus>(),
            Err(DomainError::InvalidStatus(input.to_string()))
        );
    }

    #[rstest]
    fn status_defaults_to_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[rstest]
    #[case("client", PricingPolicy::ClientSupplied)]
    #[case("Catalog", PricingPolicy::Catalog)]
    fn pricing_policy_parses(#[case] input: &str, #[case] expected: PricingPolicy) {
        assert_eq!(input.parse::<PricingPolicy>().unwrap(), expected);
    }

    #[rstest]
    #[case("", "Ave", "555", "customerInfo.name")]
    #[case("Ada", " ", "555", "customerInfo.address")]
    #[case("Ada", "Ave", "", "customerInfo.phone")]
    fn customer_info_requires_every_field(
        #[case] name: &str,
        #[case] address: &str,
        #[case] phone: &str,
        #[case] field: &'static str,
    ) {
        assert_eq!(
            CustomerInfo::new(name, address, phone),
            Err(DomainError::MissingField(field))
        );
    }

    #[rstest]
    fn line_item_rejects_zero_quantity() {
        let result = OrderLineItem::new(ProductId::generate(), 0, Decimal::ONE);
        assert!(matches!(
            result,
            Err(DomainError::InvalidField {
                field: "quantity",
                ..
            })
        ));
    }

    #[rstest]
    fn place_computes_total_and_starts_pending(customer: CustomerInfo) {
        let order = Order::place(
            OrderId::generate(),
            UserId::new("user-1"),
            vec![line(2, 10), line(1, 5)],
            customer,
            Timestamp::now(),
        )
        .unwrap();

        assert_eq!(order.total, Decimal::from(25));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[rstest]
    fn place_rejects_empty_items(customer: CustomerInfo) {
        let result = Order::place(
            OrderId::generate(),
            UserId::new("user-1"),
            Vec::new(),
            customer,
            Timestamp::now(),
        );
        assert_eq!(result, Err(DomainError::EmptyOrder));
    }

    #[rstest]
    fn with_status_only_changes_status(customer: CustomerInfo) {
        let order = Order::place(
            OrderId::generate(),
            UserId::new("user-1"),
            vec![line(1, 3)],
            customer,
            Timestamp::now(),
        )
        .unwrap();
        let completed = order.clone().with_status(OrderStatus::Completed);

        assert_eq!(completed.status, OrderStatus::Completed);
        assert_eq!(completed.total, order.total);
        assert_eq!(completed.items, order.items);

        let reopened = completed.with_status(OrderStatus::Pending);
        assert_eq!(reopened.status, OrderStatus::Pending);
    }

    #[rstest]
    fn compute_total_keeps_cents() {
        let items = vec![
            OrderLineItem::new(ProductId::generate(), 3, Decimal::new(1999, 2)).unwrap(),
            OrderLineItem::new(ProductId::generate(), 1, Decimal::new(1, 2)).unwrap(),
        ];
        assert_eq!(compute_total(&items).unwrap(), Decimal::new(5998, 2));
    }

    proptest! {
        #[test]
        fn total_equals_sum_of_line_products(
            lines in prop::collection::vec((1u32..1_000, 0i64..1_000_000), 1..20)
        ) {
            let items: Vec<OrderLineItem> = lines
                .iter()
                .map(|(quantity, cents)| {
                    OrderLineItem::new(ProductId::generate(), *quantity, Decimal::new(*cents, 2)).unwrap()
                })
                .collect();
            let expected = lines.iter().fold(Decimal::ZERO, |total, (quantity, cents)| {
                total + Decimal::from(*quantity) * Decimal::new(*cents, 2)
            });

            prop_assert_eq!(compute_total(&items).unwrap(), expected);
        }
    }
}
