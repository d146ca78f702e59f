//! CLI command implementations.

pub mod auth;
pub mod bid;
pub mod config;
pub mod feed;
pub mod listing;
pub mod profile;

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use bidhall_client::Gateway;
use bidhall_core::{Config, FileSessionStore};

use crate::ui;

pub use auth::{run_login, run_logout, run_register, run_whoami};
pub use bid::run_bid;
pub use config::run_config;
pub use feed::run_feed;
pub use listing::run_listing;
pub use profile::run_profile;

/// Gateway backed by the session file in the state directory.
fn gateway(config: &Config) -> Result<Gateway> {
    let store = Arc::new(FileSessionStore::new(Config::session_path()));
    Ok(Gateway::new(&config.api, store)?)
}

/// Await `task` behind a spinner.
async fn with_spinner<T>(msg: &str, task: impl Future<Output = T>) -> T {
    let bar = ui::spinner(msg);
    let result = task.await;
    bar.finish_and_clear();
    result
}
