//! Typed accessors that apply per-entity retention policy on top of [`Cache`].
//!
//! A failed read here is indistinguishable from "nothing cached" on purpose;
//! callers treat `None` / an empty list as a cache miss, never as an error.

use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Cache, CacheKey};
use crate::models::{
    ChildProfile, CoachMessage, DiaryEntry, FoodItem, MealPlan, ScanResult, UserProfile,
};

/// Retention rules for one cached entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityPolicy {
    pub key: CacheKey,
    pub ttl_days: i64,
    /// Upper bound on stored list length, if any.
    pub max_items: Option<usize>,
}

impl EntityPolicy {
    pub const USER_PROFILE: EntityPolicy = EntityPolicy::new(CacheKey::UserProfile, 7, None);
    pub const CHILDREN: EntityPolicy = EntityPolicy::new(CacheKey::ChildrenProfiles, 7, None);
    pub const DIARY: EntityPolicy = EntityPolicy::new(CacheKey::DiaryEntries, 7, None);
    pub const MEAL_PLANS: EntityPolicy = EntityPolicy::new(CacheKey::MealPlans, 14, None);
    pub const SCANNER: EntityPolicy = EntityPolicy::new(CacheKey::ScannerResults, 7, Some(20));
    pub const COACH: EntityPolicy = EntityPolicy::new(CacheKey::CoachMessages, 3, Some(50));
    pub const FOOD_DATABASE: EntityPolicy = EntityPolicy::new(CacheKey::FoodDatabase, 30, None);

    /// Diary entries older than this are dropped when the diary is cached.
    pub const DIARY_RETENTION_DAYS: i64 = 7;

    const fn new(key: CacheKey, ttl_days: i64, max_items: Option<usize>) -> Self {
        Self {
            key,
            ttl_days,
            max_items,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::days(self.ttl_days)
    }
}

/// Presence of each cached entity type, for status displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub present: Vec<&'static str>,
    pub missing: Vec<&'static str>,
}

/// Domain-level view of the cache.
#[derive(Clone)]
pub struct DomainCache {
    cache: Cache,
}

impl DomainCache {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    pub fn inner(&self) -> &Cache {
        &self.cache
    }

    async fn put<T: Serialize + ?Sized>(&self, policy: EntityPolicy, data: &T) {
        self.cache
            .set(policy.key.as_str(), data, Some(policy.ttl()))
            .await;
    }

    async fn fetch<T: DeserializeOwned>(&self, policy: EntityPolicy) -> Option<T> {
        self.cache.get(policy.key.as_str()).await
    }

    async fn fetch_list<T: DeserializeOwned>(&self, policy: EntityPolicy) -> Vec<T> {
        self.fetch(policy).await.unwrap_or_default()
    }

    pub async fn cache_user_profile(&self, profile: &UserProfile) {
        self.put(EntityPolicy::USER_PROFILE, profile).await;
    }

    pub async fn user_profile(&self) -> Option<UserProfile> {
        self.fetch(EntityPolicy::USER_PROFILE).await
    }

    pub async fn cache_children(&self, children: &[ChildProfile]) {
        self.put(EntityPolicy::CHILDREN, children).await;
    }

    pub async fn children(&self) -> Vec<ChildProfile> {
        self.fetch_list(EntityPolicy::CHILDREN).await
    }

    /// Caches the diary, keeping only entries logged within the retention window.
    pub async fn cache_diary_entries(&self, entries: &[DiaryEntry]) {
        let cutoff = self.cache.now() - Duration::days(EntityPolicy::DIARY_RETENTION_DAYS);
        let recent: Vec<&DiaryEntry> = entries.iter().filter(|e| e.logged_at >= cutoff).collect();

        if recent.len() < entries.len() {
            tracing::debug!(
                dropped = entries.len() - recent.len(),
                "dropping diary entries outside retention window"
            );
        }

        self.put(EntityPolicy::DIARY, &recent).await;
    }

    pub async fn diary_entries(&self) -> Vec<DiaryEntry> {
        self.fetch_list(EntityPolicy::DIARY).await
    }

    pub async fn cache_meal_plans(&self, plans: &[MealPlan]) {
        self.put(EntityPolicy::MEAL_PLANS, plans).await;
    }

    pub async fn meal_plans(&self) -> Vec<MealPlan> {
        self.fetch_list(EntityPolicy::MEAL_PLANS).await
    }

    /// Prepends `result` to the cached scan history, most recent first.
    pub async fn cache_scan_result(&self, result: ScanResult) {
        let policy = EntityPolicy::SCANNER;
        let mut results: Vec<ScanResult> = self.fetch_list(policy).await;
        results.insert(0, result);
        if let Some(max) = policy.max_items {
            results.truncate(max);
        }
        self.put(policy, &results).await;
    }

    pub async fn scan_results(&self) -> Vec<ScanResult> {
        self.fetch_list(EntityPolicy::SCANNER).await
    }

    /// Caches the conversation, keeping only the most recent messages.
    pub async fn cache_coach_messages(&self, messages: &[CoachMessage]) {
        let policy = EntityPolicy::COACH;
        let start = policy
            .max_items
            .map(|max| messages.len().saturating_sub(max))
            .unwrap_or(0);
        self.put(policy, &messages[start..]).await;
    }

    /// Appends one message to the cached conversation.
    pub async fn push_coach_message(&self, message: CoachMessage) {
        let mut messages = self.coach_messages().await;
        messages.push(message);
        self.cache_coach_messages(&messages).await;
    }

    pub async fn coach_messages(&self) -> Vec<CoachMessage> {
        self.fetch_list(EntityPolicy::COACH).await
    }

    pub async fn cache_food_database(&self, foods: &[FoodItem]) {
        self.put(EntityPolicy::FOOD_DATABASE, foods).await;
    }

    pub async fn food_database(&self) -> Vec<FoodItem> {
        self.fetch_list(EntityPolicy::FOOD_DATABASE).await
    }

    /// Case-insensitive name lookup over the cached food database.
    pub async fn search_food_database(&self, query: &str) -> Vec<FoodItem> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.food_database()
            .await
            .into_iter()
            .filter(|f| f.name.to_lowercase().contains(&query))
            .collect()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for key in CacheKey::DOMAIN {
            if self.cache.contains(key.as_str()).await {
                stats.present.push(key.as_str());
            } else {
                stats.missing.push(key.as_str());
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::models::{CoachRole, MealType};
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use uuid::Uuid;

    fn test_domain() -> (DomainCache, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::default());
        let cache = Cache::new(store, clock.clone());
        (DomainCache::new(cache), clock)
    }

    #[tokio::test]
    async fn test_user_profile_expires_after_seven_days() {
        let (domain, clock) = test_domain();
        let profile = UserProfile::new("parent@example.com", "Sam");
        domain.cache_user_profile(&profile).await;

        clock.advance(Duration::days(7));
        assert_eq!(domain.user_profile().await, Some(profile));

        clock.advance(Duration::seconds(1));
        assert_eq!(domain.user_profile().await, None);
    }

    #[tokio::test]
    async fn test_children_overwritten() {
        let (domain, _clock) = test_domain();
        let born = NaiveDate::from_ymd_opt(2021, 4, 2).unwrap();
        domain
            .cache_children(&[ChildProfile::new("Ana", born)])
            .await;
        domain
            .cache_children(&[ChildProfile::new("Ben", born), ChildProfile::new("Cy", born)])
            .await;

        let names: Vec<String> = domain.children().await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Ben", "Cy"]);
    }

    #[tokio::test]
    async fn test_diary_drops_entries_older_than_retention() {
        let (domain, clock) = test_domain();
        let now = clock.now();
        let child = Uuid::new_v4();
        let fresh = DiaryEntry::new(child, MealType::Lunch, now - Duration::days(2));
        let edge = DiaryEntry::new(child, MealType::Dinner, now - Duration::days(7));
        let stale = DiaryEntry::new(child, MealType::Breakfast, now - Duration::days(8));

        domain
            .cache_diary_entries(&[fresh.clone(), stale, edge.clone()])
            .await;

        assert_eq!(domain.diary_entries().await, vec![fresh, edge]);
    }

    #[tokio::test]
    async fn test_meal_plans_ttl_is_fourteen_days() {
        let (domain, clock) = test_domain();
        let plan = MealPlan::new(Uuid::new_v4(), NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        domain.cache_meal_plans(&[plan]).await;

        clock.advance(Duration::days(10));
        assert_eq!(domain.meal_plans().await.len(), 1);

        clock.advance(Duration::days(5));
        assert!(domain.meal_plans().await.is_empty());
    }

    #[tokio::test]
    async fn test_scan_results_capped_most_recent_first() {
        let (domain, clock) = test_domain();
        let mut ids = Vec::new();
        for _ in 0..25 {
            clock.advance(Duration::minutes(1));
            let scan = ScanResult::new(clock.now());
            ids.push(scan.id);
            domain.cache_scan_result(scan).await;
        }

        let cached = domain.scan_results().await;
        assert_eq!(cached.len(), 20);

        let expected: Vec<Uuid> = ids.iter().rev().take(20).copied().collect();
        let actual: Vec<Uuid> = cached.iter().map(|s| s.id).collect();
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_coach_messages_keep_latest_fifty() {
        let (domain, clock) = test_domain();
        let messages: Vec<CoachMessage> = (0..60)
            .map(|i| CoachMessage::new(CoachRole::Parent, format!("msg {}", i), clock.now()))
            .collect();

        domain.cache_coach_messages(&messages).await;

        let cached = domain.coach_messages().await;
        assert_eq!(cached.len(), 50);
        assert_eq!(cached.first().unwrap().content, "msg 10");
        assert_eq!(cached.last().unwrap().content, "msg 59");
    }

    #[tokio::test]
    async fn test_push_coach_message_respects_cap() {
        let (domain, clock) = test_domain();
        for i in 0..51 {
            domain
                .push_coach_message(CoachMessage::new(
                    CoachRole::Coach,
                    format!("tip {}", i),
                    clock.now(),
                ))
                .await;
        }

        let cached = domain.coach_messages().await;
        assert_eq!(cached.len(), 50);
        assert_eq!(cached[0].content, "tip 1");
    }

    #[tokio::test]
    async fn test_coach_messages_expire_after_three_days() {
        let (domain, clock) = test_domain();
        domain
            .push_coach_message(CoachMessage::new(CoachRole::Parent, "hi", clock.now()))
            .await;
        clock.advance(Duration::days(3) + Duration::seconds(1));
        assert!(domain.coach_messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_search_food_database() {
        let (domain, _clock) = test_domain();
        domain
            .cache_food_database(&[
                FoodItem::new("1", "Greek Yogurt", "dairy"),
                FoodItem::new("2", "Sweet potato", "vegetables"),
                FoodItem::new("3", "Plain yogurt drink", "dairy"),
            ])
            .await;

        let hits: Vec<String> = domain
            .search_food_database("YOGURT")
            .await
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(hits, vec!["1", "3"]);
        assert!(domain.search_food_database("  ").await.is_empty());
    }

    #[tokio::test]
    async fn test_cache_stats() {
        let (domain, _clock) = test_domain();
        domain
            .cache_user_profile(&UserProfile::new("a@b.c", "A"))
            .await;

        let stats = domain.cache_stats().await;
        assert_eq!(stats.present, vec!["USER_PROFILE"]);
        assert_eq!(stats.missing.len(), CacheKey::DOMAIN.len() - 1);
    }
}
