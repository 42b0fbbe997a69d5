use crate::backend::StoreBackend;
use crate::errors::AppResult;
use crate::models::{Order, OrderStatus};
use crate::pricing;

use super::files::can_download;
use super::membership::format_timestamp;

/// One row of the order history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub order_id: u64,
    pub item_name: String,
    pub price: String,
    pub payment_method: &'static str,
    pub status: &'static str,
    pub date: String,
    pub coupon_code: Option<String>,
    pub downloadable: bool,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id,
            item_name: order.item_name.clone(),
            price: pricing::format_price(order.price),
            payment_method: order.payment_method.label(),
            status: order.status.label(),
            date: format_timestamp(order.timestamp),
            coupon_code: order.coupon_code.clone(),
            downloadable: can_download(order),
        }
    }
}

/// A customer's orders, newest first as returned by the backend.
#[derive(Debug, Clone, Default)]
pub struct OrderHistory {
    orders: Vec<Order>,
}

impl OrderHistory {
    pub fn new(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    pub async fn load(backend: &dyn StoreBackend, username: &str) -> AppResult<Self> {
        Ok(Self::new(backend.get_customer_orders(username).await?))
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.count_with(OrderStatus::Pending)
    }

    pub fn count_with(&self, status: OrderStatus) -> usize {
        self.orders.iter().filter(|o| o.status == status).count()
    }

    pub fn downloadable(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| can_download(o))
    }

    pub fn total_spent(&self) -> u64 {
        self.orders
            .iter()
            .filter(|o| o.is_accepted())
            .map(|o| o.price)
            .sum()
    }

    pub fn rows(&self) -> Vec<OrderRow> {
        self.orders.iter().map(OrderRow::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;

    fn order(id: u64, status: OrderStatus, price: u64) -> Order {
        Order {
            order_id: id,
            customer_username: "alice".into(),
            item_name: format!("Item {id}"),
            price,
            payment_method: PaymentMethod::Xbox,
            payment_reference: "code".into(),
            status,
            coupon_code: None,
            delivery_email: "alice@example.com".into(),
            timestamp: 1_741_176_000_000_000_000,
        }
    }

    #[test]
    fn counts_and_totals() {
        let history = OrderHistory::new(vec![
            order(1, OrderStatus::Pending, 500),
            order(2, OrderStatus::Accepted, 900),
            order(3, OrderStatus::Declined, 300),
            order(4, OrderStatus::Accepted, 100),
        ]);
        assert_eq!(history.pending_count(), 1);
        assert_eq!(history.downloadable().map(|o| o.order_id).collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(history.total_spent(), 1000);
    }

    #[test]
    fn row_labels() {
        let row = OrderRow::from(&order(2, OrderStatus::Accepted, 999));
        assert_eq!(row.payment_method, "Xbox Gift Card");
        assert_eq!(row.status, "Accepted");
        assert_eq!(row.date, "05 Mar 2025");
        assert!(row.price.ends_with("9.99"));
        assert!(row.downloadable);
    }
}
