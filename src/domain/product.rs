use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schema::{Column, ColumnType, TableSchema, MONEY};
use crate::store::{Entity, EntityId, ValidationError};

/// Represents a product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: EntityId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
}

#[cfg(test)]
impl Product {
    /// The id stays 0 until the store assigns one.
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: 0,
            name: name.into(),
            price,
        }
    }
}

impl Entity for Product {
    const NAME: &'static str = "Product";
    const TABLE: TableSchema = TableSchema {
        name: "Products",
        columns: &[
            Column::key("Id"),
            Column::new("Name", ColumnType::Text),
            Column::new("Price", ColumnType::Decimal(MONEY)),
        ],
    };

    fn id(&self) -> EntityId {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    /// A product needs a non-blank name; the price is fitted to decimal(18,2).
    fn into_storable(mut self) -> Result<Self, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required { field: "name" });
        }
        self.price = MONEY.fit("price", self.price)?;
        Ok(self)
    }
}
