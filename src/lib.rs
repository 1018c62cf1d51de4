pub mod api;
pub mod auth;
pub mod carousel;
pub mod config;
pub mod error;
pub mod logging;
pub mod storage;

use std::sync::Arc;

use api::api_client::ApiClient;
use auth::session::SessionManager;
use carousel::{Carousel, EditWorkflow, SlideStore};
use config::Config;
use error::StorageError;
use storage::database::Database;

/// Everything the hero section needs, wired from one [`Config`].
pub struct Portal {
    pub config: Config,
    pub store: Arc<SlideStore>,
    pub session: Arc<SessionManager>,
}

impl Portal {
    pub fn new(config: Config) -> Result<Self, StorageError> {
        let db = Arc::new(Database::new(&config.data_dir)?);
        Ok(Self::with_database(config, db))
    }

    pub fn with_database(config: Config, db: Arc<Database>) -> Self {
        let api = ApiClient::new(&config.api_base_url);
        log::info!("API base: {}", api.base_url());

        Self {
            store: Arc::new(SlideStore::new(api.clone())),
            session: Arc::new(SessionManager::new(api, db)),
            config,
        }
    }

    /// A carousel over this portal's store. Subscribe, then `spawn()` it.
    pub fn carousel(&self) -> Carousel {
        Carousel::new(self.store.clone(), self.config.image_interval)
    }

    /// An editor that authenticates with the current session.
    pub fn editor(&self) -> EditWorkflow {
        EditWorkflow::new(self.store.clone(), self.session.clone())
    }
}
