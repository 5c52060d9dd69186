//! Ambassador console commands

use chrono::{Local, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use equipment_checkout::{
    models::{CheckoutRequest, EquipmentCheckout, StagedCheckoutRequest},
    services::ambassador::{AmbassadorConsole, ConsoleSnapshot},
    AppError, AppResult, AppState,
};

#[derive(Debug, Args)]
pub struct AmbassadorArgs {
    #[command(subcommand)]
    pub command: AmbassadorCommand,
}

#[derive(Debug, Subcommand)]
pub enum AmbassadorCommand {
    /// Pending checkout requests
    Requests,
    /// Approved requests waiting for a unit
    Staged,
    /// Active checkouts
    Checkouts,
    /// Approve a pending request
    Approve(RequestKey),
    /// Cancel a pending request
    Cancel(RequestKey),
    /// Assign a unit to a staged request and check it out
    Finalize {
        #[command(flatten)]
        key: RequestKey,
        /// Unit id, one of the staged request's choices
        #[arg(short, long)]
        unit: i32,
    },
    /// Cancel a staged request
    CancelStaged(RequestKey),
    /// Mark an active checkout as returned
    Return {
        /// Borrower PID
        #[arg(short, long)]
        pid: i64,
        /// Unit id
        #[arg(short, long)]
        unit: i32,
    },
    /// Show all three tables, refreshing until Ctrl-C
    Watch,
}

/// Requests are identified by borrower and model
#[derive(Debug, Args)]
pub struct RequestKey {
    /// Borrower PID
    #[arg(short, long)]
    pub pid: i64,
    /// Equipment model
    #[arg(short, long)]
    pub model: String,
}

#[derive(Debug, Serialize, Tabled)]
struct RequestRow {
    name: String,
    model: String,
    pid: i64,
}

#[derive(Debug, Serialize, Tabled)]
struct StagedRow {
    name: String,
    model: String,
    pid: i64,
    choices: String,
    selected: String,
}

#[derive(Debug, Serialize, Tabled)]
struct CheckoutRow {
    name: String,
    model: String,
    equipment_id: i32,
    due: String,
    overdue: bool,
}

impl From<&CheckoutRequest> for RequestRow {
    fn from(r: &CheckoutRequest) -> Self {
        Self {
            name: r.user_name.clone(),
            model: r.model.clone(),
            pid: r.pid,
        }
    }
}

impl From<&StagedCheckoutRequest> for StagedRow {
    fn from(s: &StagedCheckoutRequest) -> Self {
        Self {
            name: s.user_name.clone(),
            model: s.model.clone(),
            pid: s.pid,
            choices: s
                .id_choices
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            selected: s.selection().map(|id| id.to_string()).unwrap_or_default(),
        }
    }
}

impl From<&EquipmentCheckout> for CheckoutRow {
    fn from(c: &EquipmentCheckout) -> Self {
        Self {
            name: c.user_name.clone(),
            model: c.model.clone(),
            equipment_id: c.equipment_id,
            due: c.end_at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
            overdue: c.is_overdue(Utc::now()),
        }
    }
}

fn print_requests(requests: &[CheckoutRequest], format: OutputFormat) {
    let rows: Vec<RequestRow> = requests.iter().map(RequestRow::from).collect();
    output::print_list(&rows, format);
}

fn print_staged(staged: &[StagedCheckoutRequest], format: OutputFormat) {
    let rows: Vec<StagedRow> = staged.iter().map(StagedRow::from).collect();
    output::print_list(&rows, format);
}

fn print_checkouts(checkouts: &[EquipmentCheckout], format: OutputFormat) {
    let rows: Vec<CheckoutRow> = checkouts.iter().map(CheckoutRow::from).collect();
    output::print_list(&rows, format);
}

fn print_snapshot(snapshot: &ConsoleSnapshot, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_item(snapshot, format);
        return;
    }
    output::print_heading("Checkout requests", snapshot.requests_len());
    print_requests(&snapshot.requests, format);
    output::print_heading("Staged requests", snapshot.staged_len());
    print_staged(&snapshot.staged, format);
    output::print_heading("Active checkouts", snapshot.checkouts_len());
    print_checkouts(&snapshot.checkouts, format);
}

fn find_request(snapshot: &ConsoleSnapshot, key: &RequestKey) -> AppResult<CheckoutRequest> {
    snapshot
        .requests
        .iter()
        .find(|r| r.matches(key.pid, &key.model))
        .cloned()
        .ok_or_else(|| {
            AppError::NotFound(format!("No pending request for {} by {}", key.model, key.pid))
        })
}

fn find_staged(snapshot: &ConsoleSnapshot, key: &RequestKey) -> AppResult<StagedCheckoutRequest> {
    snapshot
        .staged
        .iter()
        .find(|s| s.matches(key.pid, &key.model))
        .cloned()
        .ok_or_else(|| {
            AppError::NotFound(format!("No staged request for {} by {}", key.model, key.pid))
        })
}

async fn watch(console: &AmbassadorConsole, state: &AppState, format: OutputFormat) -> AppResult<()> {
    let mut updates = console.subscribe();
    let _poller = console.spawn_polling(state.config.polling.console_interval());

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                print_snapshot(&snapshot, format);
            }
            _ = super::shutdown_signal() => break,
        }
    }

    Ok(())
}

pub async fn execute(args: &AmbassadorArgs, state: &AppState, format: OutputFormat) -> AppResult<()> {
    let console = &state.services.ambassador;

    match &args.command {
        AmbassadorCommand::Requests => {
            console.refresh_requests().await?;
            print_requests(&console.snapshot().requests, format);
        }
        AmbassadorCommand::Staged => {
            console.refresh_staged().await?;
            print_staged(&console.snapshot().staged, format);
        }
        AmbassadorCommand::Checkouts => {
            console.refresh_checkouts().await?;
            print_checkouts(&console.snapshot().checkouts, format);
        }
        AmbassadorCommand::Approve(key) => {
            console.refresh_requests().await?;
            let request = find_request(&console.snapshot(), key)?;
            let staged = console.approve(&request).await?;
            output::print_success(&format!(
                "Approved {}'s request for {}; available units: {:?}",
                staged.user_name, staged.model, staged.id_choices
            ));
        }
        AmbassadorCommand::Cancel(key) => {
            console.refresh_requests().await?;
            let request = find_request(&console.snapshot(), key)?;
            console.cancel(&request).await?;
        }
        AmbassadorCommand::Finalize { key, unit } => {
            console.refresh_staged().await?;
            let staged = console.select_unit(key.pid, &key.model, *unit)?;
            let checkout = console.finalize(&staged).await?;
            output::print_item(&checkout, format);
        }
        AmbassadorCommand::CancelStaged(key) => {
            console.refresh_staged().await?;
            let staged = find_staged(&console.snapshot(), key)?;
            console.cancel_staged(&staged).await?;
        }
        AmbassadorCommand::Return { pid, unit } => {
            console.refresh_checkouts().await?;
            let checkout = console
                .snapshot()
                .checkouts
                .into_iter()
                .find(|c| c.pid == *pid && c.equipment_id == *unit)
                .ok_or_else(|| {
                    AppError::NotFound(format!("No active checkout of unit {} by {}", unit, pid))
                })?;
            let returned = console.return_equipment(&checkout).await?;
            output::print_item(&returned, format);
        }
        AmbassadorCommand::Watch => watch(console, state, format).await?,
    }

    Ok(())
}
