//! Ambassador console: pending requests, staged requests and active checkouts
//!
//! Every action is a short sequence of independent backend calls followed by a
//! re-fetch of the affected lists. Sequences are not transactional: when a
//! later call fails the backend may be left between two states, and the next
//! refresh shows whatever the backend holds.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

use super::{
    equipment::{transition, EquipmentService},
    notifications::{Notification, Notifier},
    polling::{spawn_poller, PollHandle},
};
use crate::{
    error::{AppError, AppResult},
    models::{CheckoutRequest, EquipmentCheckout, LifecycleEvent, RequestState, StagedCheckoutRequest},
};

/// The three tables shown to ambassadors
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsoleSnapshot {
    pub requests: Vec<CheckoutRequest>,
    pub staged: Vec<StagedCheckoutRequest>,
    pub checkouts: Vec<EquipmentCheckout>,
}

impl ConsoleSnapshot {
    pub fn requests_len(&self) -> usize {
        self.requests.len()
    }

    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    pub fn checkouts_len(&self) -> usize {
        self.checkouts.len()
    }
}

#[derive(Clone)]
pub struct AmbassadorConsole {
    equipment: EquipmentService,
    notifier: Arc<dyn Notifier>,
    notification_duration: Duration,
    state: Arc<watch::Sender<ConsoleSnapshot>>,
}

impl AmbassadorConsole {
    pub fn new(
        equipment: EquipmentService,
        notifier: Arc<dyn Notifier>,
        notification_duration: Duration,
    ) -> Self {
        let (state, _) = watch::channel(ConsoleSnapshot::default());
        Self {
            equipment,
            notifier,
            notification_duration,
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> ConsoleSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConsoleSnapshot> {
        self.state.subscribe()
    }

    fn notify(&self, message: String) {
        self.notifier.notify(Notification {
            message,
            duration: self.notification_duration,
        });
    }

    pub async fn refresh_requests(&self) -> AppResult<()> {
        let requests = self.equipment.list_requests().await.map_err(|e| {
            tracing::error!("Failed to refresh checkout requests: {}", e);
            e
        })?;
        self.state.send_modify(|s| s.requests = requests);
        Ok(())
    }

    /// Re-fetch staged requests. Unit selections made locally survive when the
    /// row still exists and still offers the selected unit.
    pub async fn refresh_staged(&self) -> AppResult<()> {
        let mut staged = self.equipment.list_staged_requests().await.map_err(|e| {
            tracing::error!("Failed to refresh staged requests: {}", e);
            e
        })?;

        self.state.send_modify(|s| {
            for row in staged.iter_mut() {
                let previous = s
                    .staged
                    .iter()
                    .find(|old| old.matches(row.pid, &row.model))
                    .and_then(|old| old.selected_id);
                if row.selected_id.is_none() {
                    if let Some(id) = previous.filter(|id| row.id_choices.contains(id)) {
                        row.selected_id = Some(id);
                    }
                }
            }
            s.staged = staged;
        });
        Ok(())
    }

    pub async fn refresh_checkouts(&self) -> AppResult<()> {
        let checkouts = self.equipment.list_active_checkouts().await.map_err(|e| {
            tracing::error!("Failed to refresh active checkouts: {}", e);
            e
        })?;
        self.state.send_modify(|s| s.checkouts = checkouts);
        Ok(())
    }

    /// Refresh all three tables; the first error is reported after all were tried
    pub async fn refresh_all(&self) -> AppResult<()> {
        let requests = self.refresh_requests().await;
        let staged = self.refresh_staged().await;
        let checkouts = self.refresh_checkouts().await;
        requests.and(staged).and(checkouts)
    }

    /// Refresh all tables now and then every `period` until the handle is dropped
    pub fn spawn_polling(&self, period: Duration) -> PollHandle {
        let console = self.clone();
        spawn_poller("ambassador", period, move || {
            let console = console.clone();
            async move {
                let _ = console.refresh_all().await;
            }
        })
    }

    /// Approve a pending request: stage it, then remove the pending one
    pub async fn approve(&self, request: &CheckoutRequest) -> AppResult<StagedCheckoutRequest> {
        let staged = self.equipment.approve_request(request).await.map_err(|e| {
            tracing::error!(pid = request.pid, model = %request.model, "Failed to approve request: {}", e);
            e
        })?;

        let deleted = self.equipment.delete_request(request).await;
        if let Err(e) = &deleted {
            tracing::error!(
                pid = request.pid,
                model = %request.model,
                "Request was staged but could not be removed: {}",
                e
            );
        }

        let _ = self.refresh_staged().await;
        let _ = self.refresh_requests().await;

        deleted.map(|_| staged)
    }

    /// Drop a pending request. The notification is shown whatever the outcome.
    pub async fn cancel(&self, request: &CheckoutRequest) -> AppResult<()> {
        transition(RequestState::Requested, LifecycleEvent::Cancel, request.pid, &request.model)?;

        let result = self.equipment.delete_request(request).await;
        match &result {
            Ok(()) => {
                let _ = self.refresh_requests().await;
            }
            Err(e) => tracing::error!(
                pid = request.pid,
                model = %request.model,
                "Failed to cancel request: {}",
                e
            ),
        }

        self.notify(format!(
            "Canceled checkout request of {} by {}",
            request.model, request.user_name
        ));
        result
    }

    /// Record the unit an ambassador picked for a staged request
    pub fn select_unit(&self, pid: i64, model: &str, equipment_id: i32) -> AppResult<StagedCheckoutRequest> {
        let mut result = Err(AppError::NotFound(format!(
            "No staged request for {} by {}",
            model, pid
        )));

        self.state.send_if_modified(|s| {
            match s.staged.iter_mut().find(|row| row.matches(pid, model)) {
                Some(row) => {
                    result = row.select_id(equipment_id).map(|_| row.clone());
                    result.is_ok()
                }
                None => false,
            }
        });

        result
    }

    /// Turn a staged request into an active checkout of its selected unit
    pub async fn finalize(&self, staged: &StagedCheckoutRequest) -> AppResult<EquipmentCheckout> {
        let checkout = self.equipment.create_checkout(staged).await.map_err(|e| {
            tracing::error!(pid = staged.pid, model = %staged.model, "Failed to create checkout: {}", e);
            e
        })?;

        if let Err(e) = self.equipment.delete_staged_request(staged).await {
            tracing::error!(
                pid = staged.pid,
                model = %staged.model,
                "Checkout created but staged request could not be removed: {}",
                e
            );
        }
        let _ = self.refresh_staged().await;
        let _ = self.refresh_checkouts().await;

        self.notify(format!(
            "{} has checked out one {}",
            staged.user_name, staged.model
        ));
        Ok(checkout)
    }

    /// Drop a staged request. The notification is shown whatever the outcome.
    pub async fn cancel_staged(&self, staged: &StagedCheckoutRequest) -> AppResult<()> {
        transition(RequestState::Staged, LifecycleEvent::Cancel, staged.pid, &staged.model)?;

        let result = self.equipment.delete_staged_request(staged).await;
        match &result {
            Ok(()) => {
                let _ = self.refresh_staged().await;
            }
            Err(e) => tracing::error!(
                pid = staged.pid,
                model = %staged.model,
                "Failed to cancel staged request: {}",
                e
            ),
        }

        self.notify(format!(
            "Canceled staged checkout request of {} by {}",
            staged.model, staged.user_name
        ));
        result
    }

    /// Mark a checkout returned and refresh the active table
    pub async fn return_equipment(&self, checkout: &EquipmentCheckout) -> AppResult<EquipmentCheckout> {
        let returned = self.equipment.return_checkout(checkout).await.map_err(|e| {
            tracing::error!(
                pid = checkout.pid,
                equipment_id = checkout.equipment_id,
                "Failed to return checkout: {}",
                e
            );
            e
        })?;

        let _ = self.refresh_checkouts().await;
        self.notify(format!(
            "{} has returned {} with id {}",
            checkout.user_name, checkout.model, checkout.equipment_id
        ));
        Ok(returned)
    }
}
