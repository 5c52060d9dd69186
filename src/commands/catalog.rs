//! Catalog and inventory commands

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use equipment_checkout::{
    models::{Equipment, EquipmentType},
    AppResult, AppState,
};

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Keep refreshing until Ctrl-C
    #[arg(short, long)]
    pub watch: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct TypeRow {
    model: String,
    available: i32,
    image: String,
}

impl From<&EquipmentType> for TypeRow {
    fn from(t: &EquipmentType) -> Self {
        Self {
            model: t.model.clone(),
            available: t.num_available,
            image: t.equipment_img_url.clone(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct UnitRow {
    equipment_id: i32,
    model: String,
    condition: i32,
    checked_out: bool,
}

impl From<&Equipment> for UnitRow {
    fn from(unit: &Equipment) -> Self {
        Self {
            equipment_id: unit.equipment_id,
            model: unit.model.clone(),
            condition: unit.condition,
            checked_out: unit.is_checked_out,
        }
    }
}

fn print_types(types: &[EquipmentType], format: OutputFormat) {
    let rows: Vec<TypeRow> = types.iter().map(TypeRow::from).collect();
    output::print_list(&rows, format);
}

pub async fn execute(args: &CatalogArgs, state: &AppState, format: OutputFormat) -> AppResult<()> {
    let catalog = &state.services.catalog;

    if !args.watch {
        catalog.refresh().await?;
        print_types(&catalog.types(), format);
        return Ok(());
    }

    let mut updates = catalog.subscribe();
    let _poller = catalog.spawn_polling(state.config.polling.catalog_interval());

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let types = updates.borrow_and_update().clone();
                print_types(&types, format);
            }
            _ = super::shutdown_signal() => break,
        }
    }

    Ok(())
}

pub async fn inventory(state: &AppState, format: OutputFormat) -> AppResult<()> {
    let units = state.services.equipment.list_equipment().await?;
    let rows: Vec<UnitRow> = units.iter().map(UnitRow::from).collect();
    output::print_list(&rows, format);

    if format == OutputFormat::Table {
        print_types(&EquipmentType::from_units(&units), format);
    }
    Ok(())
}

pub async fn units(model: &str, state: &AppState, format: OutputFormat) -> AppResult<()> {
    let units = state.services.equipment.available_units(model).await?;
    let rows: Vec<UnitRow> = units.iter().map(UnitRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}

pub async fn set_condition(
    equipment_id: i32,
    condition: i32,
    state: &AppState,
    format: OutputFormat,
) -> AppResult<()> {
    let unit = state
        .services
        .equipment
        .update_condition(equipment_id, condition)
        .await?;
    output::print_success(&format!(
        "Unit {} ({}) now has condition {}",
        unit.equipment_id, unit.model, unit.condition
    ));
    if format == OutputFormat::Json {
        output::print_item(&unit, format);
    }
    Ok(())
}
