// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "ai/mod.rs"]
pub mod ai;

#[path = "collector/bounded_collector.rs"]
pub mod collector;

#[path = "rate_limit/rate_limiter.rs"]
pub mod rate_limit;

#[path = "social/social_links.rs"]
pub mod social;

#[path = "stories/mod.rs"]
pub mod stories;
