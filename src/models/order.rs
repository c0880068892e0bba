use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::utils::deserialize::null_as_default;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    WaitingPayment,
    Paid,
    Shipped,
    Delivered,
    Canceled,
}

// DB models

/// Order row joined with its client's name and optional payment.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub moment: DateTime<Utc>,
    pub status: OrderStatus,
    pub client_id: i64,
    pub client_name: String,
    pub payment_moment: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub product_id: i64,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub img_url: String,
}

/// Line ready for insertion, priced from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_id: i64,
    pub quantity: i32,
    pub price: Decimal,
}

// Request types

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OrderRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(
        length(min = 1, message = "Deve ter pelo menos um item"),
        custom(function = "positive_quantities")
    )]
    pub items: Vec<OrderItemRequest>,
}

impl OrderRequest {
    /// Sums quantities of repeated products, keeping first-seen order.
    pub fn merged_items(&self) -> Vec<(i64, i32)> {
        let mut merged: Vec<(i64, i32)> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match merged.iter_mut().find(|(id, _)| *id == item.product_id) {
                Some((_, quantity)) => *quantity = quantity.saturating_add(item.quantity),
                None => merged.push((item.product_id, item.quantity)),
            }
        }
        merged
    }
}

fn positive_quantities(items: &[OrderItemRequest]) -> Result<(), ValidationError> {
    if items.iter().any(|item| item.quantity < 1) {
        let mut err = ValidationError::new("positive");
        err.message = Some("Quantidade deve ser positiva".into());
        return Err(err);
    }
    Ok(())
}

// Response types

#[derive(Debug, Serialize)]
pub struct ClientDto {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentDto {
    pub id: i64,
    pub moment: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub product_id: i64,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub img_url: String,
    pub sub_total: Decimal,
}

impl From<OrderItem> for OrderItemDto {
    fn from(item: OrderItem) -> Self {
        Self {
            sub_total: item.price * Decimal::from(item.quantity),
            product_id: item.product_id,
            name: item.name,
            price: item.price,
            quantity: item.quantity,
            img_url: item.img_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDto {
    pub id: i64,
    pub moment: DateTime<Utc>,
    pub status: OrderStatus,
    pub client: ClientDto,
    pub payment: Option<PaymentDto>,
    pub items: Vec<OrderItemDto>,
    pub total: Decimal,
}

impl OrderDto {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        let items: Vec<OrderItemDto> = items.into_iter().map(OrderItemDto::from).collect();
        let total = items.iter().map(|item| item.sub_total).sum();

        Self {
            id: order.id,
            moment: order.moment,
            status: order.status,
            client: ClientDto {
                id: order.client_id,
                name: order.client_name,
            },
            payment: order.payment_moment.map(|moment| PaymentDto {
                id: order.id,
                moment,
            }),
            items,
            total,
        }
    }
}
