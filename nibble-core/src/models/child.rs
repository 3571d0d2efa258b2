use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A child whose meals are tracked by the parent account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChildProfile {
    pub id: Uuid,
    pub name: String,
    pub birth_date: NaiveDate,
    pub allergies: Vec<String>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
}

impl ChildProfile {
    pub fn new(name: impl Into<String>, birth_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            birth_date,
            allergies: Vec::new(),
            weight_kg: None,
            height_cm: None,
        }
    }

    pub fn with_allergies(mut self, allergies: Vec<String>) -> Self {
        self.allergies = allergies;
        self
    }

    /// Completed months of age on `on`.
    pub fn age_in_months(&self, on: NaiveDate) -> u32 {
        if on < self.birth_date {
            return 0;
        }
        let mut months = (on.year() - self.birth_date.year()) * 12
            + (on.month() as i32 - self.birth_date.month() as i32);
        if on.day() < self.birth_date.day() {
            months -= 1;
        }
        months.max(0) as u32
    }

    pub fn is_allergic_to(&self, food: &str) -> bool {
        let food = food.to_lowercase();
        self.allergies
            .iter()
            .any(|a| food.contains(&a.to_lowercase()))
    }
}
