use serde::{Deserialize, Serialize};
use std::fmt;

/// A measured amount of one nutrient, e.g. `protein: 12.5 g`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Nutrient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

impl Nutrient {
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.into(),
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.name, self.amount, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nutrient_display() {
        let nutrient = Nutrient::new("iron", 2.5, "mg");
        assert_eq!(nutrient.to_string(), "iron: 2.5 mg");
    }
}
