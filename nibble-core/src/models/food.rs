use serde::{Deserialize, Serialize};

use super::nutrient::Nutrient;

/// Entry of the food reference database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodItem {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Nutrient amounts per 100 g.
    pub per_100g: Vec<Nutrient>,
}

impl FoodItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            per_100g: Vec::new(),
        }
    }
}
