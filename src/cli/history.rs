use tabled::Table;

use crate::{
    config::ServerConfig,
    error,
    management::{self, HistoryStore},
    utils, warning,
};

pub async fn history(user_id: String) {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid server configuration: {}", e),
    };

    let pool = match management::connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => error!("Cannot open database: {}", e),
    };

    let entries = match HistoryStore::new(pool).recent(&user_id).await {
        Ok(entries) => entries,
        Err(e) => error!("Cannot read history: {}", e),
    };

    if entries.is_empty() {
        warning!("No playlists recorded for {}", user_id);
        return;
    }

    println!("{}", Table::new(utils::history_table_rows(&entries)));
}
