use futures::future::BoxFuture;
use futures::FutureExt;

pub use sqlite::Sqlite;

mod sqlite;

/// Boolean key: threshold is 75% instead of 70%.
pub const USE_75_PERCENT_KEY: &str = "use_75_percent";

/// String key: JSON array with saved stations, absent when there are none.
pub const STATIONS_KEY: &str = "stations_json";

/// Key-value store for user preferences.
pub trait Storage: Send + Sync {
    /// Returns value stored under `key` if exists.
    fn get(&self, key: &str) -> BoxFuture<anyhow::Result<Option<String>>>;

    /// Stores `value` under `key`, replacing the previous one.
    fn set(&self, key: &str, value: &str) -> BoxFuture<anyhow::Result<()>>;

    /// Removes `key`. No effect if absent.
    fn remove(&self, key: &str) -> BoxFuture<anyhow::Result<()>>;

    fn get_bool(&self, key: &str) -> BoxFuture<anyhow::Result<Option<bool>>> {
        let value = self.get(key);
        let key = key.to_string();

        value
            .map(move |res| {
                Ok(res?.and_then(|v| match v.as_str() {
                    "true" => Some(true),
                    "false" => Some(false),
                    other => {
                        log::warn!("ignore non boolean value {:?} for key {}", other, key);
                        None
                    }
                }))
            })
            .boxed()
    }

    fn set_bool(&self, key: &str, value: bool) -> BoxFuture<anyhow::Result<()>> {
        self.set(key, if value { "true" } else { "false" })
    }
}
