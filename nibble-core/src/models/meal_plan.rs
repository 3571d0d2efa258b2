use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::meal_type::MealType;

/// A meal plan covers one week for one child.
///
/// Plans are generated server-side; the client only caches them so the
/// week stays readable offline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealPlan {
    pub id: Uuid,
    pub child_id: Uuid,
    pub week_start: NaiveDate,
    pub meals: Vec<PlannedMeal>,
    pub created_at: DateTime<Utc>,
}

/// One planned slot within a meal plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannedMeal {
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub title: String,
    pub calories: Option<f64>,
}

impl MealPlan {
    pub fn new(child_id: Uuid, week_start: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            child_id,
            week_start,
            meals: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
