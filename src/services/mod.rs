//! Business logic services

pub mod ambassador;
pub mod catalog;
pub mod equipment;
pub mod notifications;
pub mod polling;
pub mod waiver;

use std::sync::Arc;

use crate::{config::AppConfig, repository::EquipmentRepository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub equipment: equipment::EquipmentService,
    pub catalog: catalog::CatalogView,
    pub ambassador: ambassador::AmbassadorConsole,
    pub checkout: waiver::CheckoutFlow,
}

impl Services {
    /// Create all services on top of one repository
    pub fn new(
        repository: Arc<dyn EquipmentRepository>,
        config: &AppConfig,
        notifier: Arc<dyn notifications::Notifier>,
    ) -> Self {
        let notification_duration = config.notifications.duration();
        let equipment = equipment::EquipmentService::new(repository, config.checkout.duration());

        Self {
            catalog: catalog::CatalogView::new(equipment.clone()),
            ambassador: ambassador::AmbassadorConsole::new(
                equipment.clone(),
                notifier.clone(),
                notification_duration,
            ),
            checkout: waiver::CheckoutFlow::new(equipment.clone(), notifier, notification_duration),
            equipment,
        }
    }
}
