use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::meal_type::MealType;
use super::nutrient::Nutrient;

/// What a child actually ate at one meal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiaryEntry {
    pub id: Uuid,
    pub child_id: Uuid,
    pub meal_type: MealType,
    pub foods: Vec<String>,
    pub nutrients: Vec<Nutrient>,
    pub notes: Option<String>,
    pub logged_at: DateTime<Utc>,
}

impl DiaryEntry {
    pub fn new(child_id: Uuid, meal_type: MealType, logged_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            child_id,
            meal_type,
            foods: Vec::new(),
            nutrients: Vec::new(),
            notes: None,
            logged_at,
        }
    }

    pub fn with_foods(mut self, foods: Vec<String>) -> Self {
        self.foods = foods;
        self
    }
}

impl fmt::Display for DiaryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.logged_at.format("%Y-%m-%d %H:%M"),
            self.meal_type,
            if self.foods.is_empty() {
                "(nothing recorded)".to_string()
            } else {
                self.foods.join(", ")
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display() {
        let at = Utc.with_ymd_and_hms(2025, 2, 3, 7, 5, 0).unwrap();
        let entry = DiaryEntry::new(Uuid::new_v4(), MealType::Breakfast, at)
            .with_foods(vec!["oatmeal".to_string(), "banana".to_string()]);
        assert_eq!(entry.to_string(), "2025-02-03 07:05 breakfast: oatmeal, banana");
    }
}
