use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;
use std::time::Duration;

/// Tune these based on real user counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;
const CACHE_CAPACITY: u64 = 500_000;
const CACHE_TTL_SECS: u64 = 86_400;

/// Fast negative: if the filter does not contain the name it is free.
static TAKEN_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// Fast positive: names confirmed taken within the TTL window.
static TAKEN_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(CACHE_CAPACITY)
        .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
        .build()
});

#[inline]
fn normalize(username: &str) -> String {
    username.to_lowercase()
}

/// Record a freshly registered name in both tiers.
pub async fn mark_taken(username: &str) {
    let username = normalize(username);
    TAKEN_FILTER
        .write()
        .expect("availability filter poisoned")
        .add(&username);
    TAKEN_CACHE.insert(username, true).await;
}

/// true  => username AVAILABLE
/// false => username TAKEN
pub async fn is_username_available(username: &str, pool: &MySqlPool) -> bool {
    let username = normalize(username);

    if !TAKEN_FILTER
        .read()
        .expect("availability filter poisoned")
        .contains(&username)
    {
        return true;
    }

    if TAKEN_CACHE.get(&username).await.unwrap_or(false) {
        return false;
    }

    // Database fallback for filter false positives
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? LIMIT 1)",
    )
    .bind(&username)
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe

    !exists
}

fn fill_filter(usernames: &[String]) {
    let mut filter = TAKEN_FILTER.write().expect("availability filter poisoned");
    for username in usernames {
        filter.add(username);
    }
}

async fn fill_cache(usernames: &[String]) {
    let inserts: Vec<_> = usernames
        .iter()
        .map(|u| TAKEN_CACHE.insert(u.clone(), true))
        .collect();

    futures::future::join_all(inserts).await;
}

/// Warm both tiers from the users table: every username goes into the filter,
/// only recently active ones into the cache. Streams in batches so startup
/// memory stays flat.
pub async fn warmup(pool: &MySqlPool, recent_days: u32, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>("SELECT username FROM users").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (username,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;
        batch.push(normalize(&username));
        total += 1;

        if batch.len() == batch_size {
            fill_filter(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        fill_filter(&batch);
        batch.clear();
    }

    log::info!("Availability filter warmup complete: {} users", total);

    let mut recent_stream = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT username
        FROM users
        WHERE last_login_at >= NOW() - INTERVAL ? DAY
        ORDER BY last_login_at DESC
        "#,
    )
    .bind(recent_days)
    .fetch(pool);

    let mut recent = 0usize;

    while let Some(row) = recent_stream.next().await {
        let (username,) = row?;
        batch.push(normalize(&username));
        recent += 1;

        if batch.len() >= batch_size {
            fill_cache(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        fill_cache(&batch).await;
    }

    log::info!(
        "Availability cache warmup complete: {} recent users (last {} days)",
        recent,
        recent_days
    );

    Ok(())
}
