use std::fmt;

/// Storage keys owned by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    UserProfile,
    ChildrenProfiles,
    DiaryEntries,
    MealPlans,
    ScannerResults,
    CoachMessages,
    FoodDatabase,
    LastSync,
    OfflineQueue,
    DeadLetter,
}

impl CacheKey {
    /// Keys removed by [`Cache::clear_all`](super::Cache::clear_all).
    ///
    /// The offline queue and dead-letter list are not part of this set;
    /// pending mutations survive a cache reset.
    pub const DOMAIN: [CacheKey; 8] = [
        CacheKey::UserProfile,
        CacheKey::ChildrenProfiles,
        CacheKey::DiaryEntries,
        CacheKey::MealPlans,
        CacheKey::ScannerResults,
        CacheKey::CoachMessages,
        CacheKey::FoodDatabase,
        CacheKey::LastSync,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::UserProfile => "USER_PROFILE",
            CacheKey::ChildrenProfiles => "CHILDREN_PROFILES",
            CacheKey::DiaryEntries => "DIARY_ENTRIES",
            CacheKey::MealPlans => "MEAL_PLANS",
            CacheKey::ScannerResults => "SCANNER_RESULTS",
            CacheKey::CoachMessages => "COACH_MESSAGES",
            CacheKey::FoodDatabase => "FOOD_DATABASE",
            CacheKey::LastSync => "LAST_SYNC",
            CacheKey::OfflineQueue => "OFFLINE_QUEUE",
            CacheKey::DeadLetter => "OFFLINE_DEAD_LETTER",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
