mod child;
mod coach;
mod diary;
mod food;
mod meal_plan;
mod meal_type;
mod nutrient;
mod scan;
mod user;

pub use child::ChildProfile;
pub use coach::{CoachMessage, CoachRole};
pub use diary::DiaryEntry;
pub use food::FoodItem;
pub use meal_plan::{MealPlan, PlannedMeal};
pub use meal_type::MealType;
pub use nutrient::Nutrient;
pub use scan::{DetectedFood, ScanResult};
pub use user::UserProfile;
