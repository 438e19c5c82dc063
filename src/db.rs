use chrono::prelude::*;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::r2d2;
use once_cell::sync::OnceCell;

#[cfg(test)]
use diesel::connection::Connection;

#[cfg(test)]
use dotenv::dotenv;

pub mod feed_follows;
pub mod feeds;
pub mod posts;
pub mod users;

const POOL_SIZE: u32 = 5;

static POOL: OnceCell<r2d2::Pool<r2d2::ConnectionManager<PgConnection>>> = OnceCell::new();

pub fn init_pool(database_url: &str) {
    POOL.get_or_init(|| create_connection_pool(database_url));
}

pub fn pool() -> &'static r2d2::Pool<r2d2::ConnectionManager<PgConnection>> {
    POOL.get().expect("the connection pool is not initialized")
}

pub fn create_connection_pool(
    database_url: &str,
) -> r2d2::Pool<r2d2::ConnectionManager<PgConnection>> {
    let manager = r2d2::ConnectionManager::<PgConnection>::new(database_url);

    r2d2::Pool::builder()
        .max_size(POOL_SIZE)
        .build(manager)
        .unwrap()
}

pub fn current_time() -> DateTime<Utc> {
    Utc::now().round_subsecs(0)
}

#[cfg(test)]
pub fn establish_test_connection() -> PgConnection {
    dotenv().ok();

    let url = std::env::var("DATABASE_URL").expect("No DATABASE_URL environment variable found");

    PgConnection::establish(&url).unwrap_or_else(|_| panic!("Error connecting to {}", url))
}
