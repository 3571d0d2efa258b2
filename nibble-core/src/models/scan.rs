use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::nutrient::Nutrient;

/// Outcome of one photo analysis returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanResult {
    pub id: Uuid,
    pub child_id: Option<Uuid>,
    pub foods: Vec<DetectedFood>,
    pub nutrients: Vec<Nutrient>,
    pub scanned_at: DateTime<Utc>,
}

/// A food item recognised in a scanned photo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectedFood {
    pub name: String,
    /// Recogniser confidence in `0.0..=1.0`.
    pub confidence: f64,
    pub portion_grams: Option<f64>,
}

impl ScanResult {
    pub fn new(scanned_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            child_id: None,
            foods: Vec::new(),
            nutrients: Vec::new(),
            scanned_at,
        }
    }

    pub fn with_foods(mut self, foods: Vec<DetectedFood>) -> Self {
        self.foods = foods;
        self
    }

    /// Foods recognised with at least `threshold` confidence.
    pub fn confident_foods(&self, threshold: f64) -> impl Iterator<Item = &DetectedFood> {
        self.foods.iter().filter(move |f| f.confidence >= threshold)
    }
}
