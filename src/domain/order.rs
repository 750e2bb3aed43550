use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schema::{Column, ColumnType, TableSchema, MONEY};
use crate::store::{Entity, EntityId, ValidationError};

/// Represents a customer order.
///
/// `product_id` is a soft reference: nothing checks that the product exists,
/// and deleting the product leaves the order untouched. `quantity` is stored
/// as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    pub id: EntityId,
    pub product_id: EntityId,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_price: Decimal,
    pub order_date: DateTime<Utc>,
}

#[cfg(test)]
impl Order {
    pub fn new(
        product_id: EntityId,
        quantity: i32,
        total_price: Decimal,
        order_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            product_id,
            quantity,
            total_price,
            order_date,
        }
    }
}

impl Entity for Order {
    const NAME: &'static str = "Order";
    const TABLE: TableSchema = TableSchema {
        name: "Orders",
        columns: &[
            Column::key("Id"),
            Column::new("ProductId", ColumnType::Int),
            Column::new("Quantity", ColumnType::Int),
            Column::new("TotalPrice", ColumnType::Decimal(MONEY)),
            Column::new("OrderDate", ColumnType::Timestamp),
        ],
    };

    fn id(&self) -> EntityId {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn into_storable(mut self) -> Result<Self, ValidationError> {
        self.total_price = MONEY.fit("totalPrice", self.total_price)?;
        Ok(self)
    }
}
