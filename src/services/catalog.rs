//! Equipment catalog: equipment types with availability, refreshed periodically

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::{
    equipment::EquipmentService,
    polling::{spawn_poller, PollHandle},
};
use crate::{error::AppResult, models::EquipmentType};

#[derive(Clone)]
pub struct CatalogView {
    equipment: EquipmentService,
    types: Arc<watch::Sender<Vec<EquipmentType>>>,
}

impl CatalogView {
    pub fn new(equipment: EquipmentService) -> Self {
        let (types, _) = watch::channel(Vec::new());
        Self {
            equipment,
            types: Arc::new(types),
        }
    }

    /// Latest snapshot
    pub fn types(&self) -> Vec<EquipmentType> {
        self.types.borrow().clone()
    }

    /// Receiver notified after every successful refresh
    pub fn subscribe(&self) -> watch::Receiver<Vec<EquipmentType>> {
        self.types.subscribe()
    }

    pub fn find(&self, model: &str) -> Option<EquipmentType> {
        self.types.borrow().iter().find(|t| t.model == model).cloned()
    }

    /// Re-fetch the catalog. On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> AppResult<()> {
        match self.equipment.list_types().await {
            Ok(types) => {
                tracing::debug!("Catalog refreshed with {} equipment types", types.len());
                self.types.send_replace(types);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to refresh equipment catalog: {}", e);
                Err(e)
            }
        }
    }

    /// Refresh now and then every `period` until the handle is dropped
    pub fn spawn_polling(&self, period: Duration) -> PollHandle {
        let view = self.clone();
        spawn_poller("catalog", period, move || {
            let view = view.clone();
            async move {
                let _ = view.refresh().await;
            }
        })
    }
}
