use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use std::env;
use std::sync::OnceLock;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

fn split_db_url(url: &str) -> Result<(String, String), String> {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base.to_string(), Some(query)),
        None => (url.to_string(), None),
    };

    let db_start = base
        .rfind('/')
        .ok_or_else(|| "invalid database url".to_string())?;
    if db_start + 1 >= base.len() {
        return Err("database name is empty".to_string());
    }

    let db_name = base[db_start + 1..].to_string();
    let mut admin_url = format!("{}postgres", &base[..db_start + 1]);
    if let Some(query) = query {
        admin_url = format!("{admin_url}?{query}");
    }

    Ok((admin_url, db_name))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

static TEST_DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub struct TestDb {
    pub pool: PgPool,
    _guard: MutexGuard<'static, ()>,
}

pub async fn init_test_db() -> TestDb {
    dotenvy::dotenv().ok();
    let test_url = env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let (admin_url, db_name) =
        split_db_url(&test_url).expect("invalid TEST_DATABASE_URL format");

    let lock = TEST_DB_LOCK.get_or_init(|| Mutex::new(()));
    let guard = lock.lock().await;

    let admin_pool = PgPool::connect(&admin_url)
        .await
        .expect("connect admin db");

    let _ = sqlx::query("SELECT pg_advisory_lock(424242)")
        .execute(&admin_pool)
        .await;

    let quoted_name = quote_identifier(&db_name);
    let drop_sql = format!("DROP DATABASE IF EXISTS {quoted_name} WITH (FORCE)");
    let create_sql = format!("CREATE DATABASE {quoted_name}");

    let _ = sqlx::query(&drop_sql).execute(&admin_pool).await;
    let create_result = sqlx::query(&create_sql).execute(&admin_pool).await;
    if let Err(e) = create_result {
        eprintln!("create test db error: {e}");
        let _ = sqlx::query(&drop_sql).execute(&admin_pool).await;
        sqlx::query(&create_sql)
            .execute(&admin_pool)
            .await
            .expect("create test db retry");
    }

    let _ = sqlx::query("SELECT pg_advisory_unlock(424242)")
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;

    let pool = PgPool::connect(&test_url)
        .await
        .expect("connect test db");
    sqlx::migrate!().run(&pool).await.expect("migrations");
    TestDb { pool, _guard: guard }
}

pub async fn create_user(pool: &PgPool, label: &str, payout_handle: Option<&str>) -> i32 {
    let suffix = Uuid::new_v4().to_string();
    sqlx::query(
        r#"INSERT INTO users (username, email, password_hash, payout_handle)
           VALUES ($1, $2, 'test-hash', $3)
           RETURNING id"#,
    )
    .bind(format!("{label}_{suffix}"))
    .bind(format!("{label}_{suffix}@stayhub.test"))
    .bind(payout_handle)
    .fetch_one(pool)
    .await
    .expect("insert user")
    .get("id")
}

pub async fn create_property(pool: &PgPool, owner_id: i32, nightly_rate_minor: i64) -> i32 {
    sqlx::query(
        r#"INSERT INTO properties (owner_id, name, nightly_rate_minor, currency, capacity)
           VALUES ($1, 'Green Nest PG', $2, 'INR', 4)
           RETURNING id"#,
    )
    .bind(owner_id)
    .bind(nightly_rate_minor)
    .fetch_one(pool)
    .await
    .expect("insert property")
    .get("id")
}

pub fn future_date(days_from_now: i64) -> NaiveDate {
    chrono::Utc::now().date_naive() + chrono::Duration::days(days_from_now)
}
