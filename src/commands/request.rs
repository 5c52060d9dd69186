//! Checkout request and waiver commands

use clap::Args;

use crate::output::{self, OutputFormat};
use equipment_checkout::{
    models::WaiverForm, services::waiver::CheckoutOutcome, AppError, AppResult, AppState,
};

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// Equipment model to check out
    pub model: String,
}

#[derive(Debug, Args)]
pub struct SignWaiverArgs {
    /// Full name, typed as the signature
    #[arg(short, long)]
    pub signature: String,
}

pub async fn execute(args: &RequestArgs, state: &AppState, format: OutputFormat) -> AppResult<()> {
    let services = &state.services;
    services.equipment.load_profile().await?;
    services.catalog.refresh().await?;

    let equipment_type = services
        .catalog
        .find(&args.model)
        .ok_or_else(|| AppError::NotFound(format!("No equipment model named {}", args.model)))?;

    match services.checkout.request_checkout(&equipment_type).await? {
        CheckoutOutcome::Requested(request) => {
            output::print_success(&format!(
                "Checkout request for {} submitted; an ambassador will assign a unit",
                request.model
            ));
            if format == OutputFormat::Json {
                output::print_item(&request, format);
            }
        }
        CheckoutOutcome::WaiverRequired => {
            output::print_warning(
                "Sign the equipment waiver first: equipment-checkout sign-waiver --signature \"<full name>\"",
            );
        }
    }
    Ok(())
}

pub async fn sign_waiver(args: &SignWaiverArgs, state: &AppState, format: OutputFormat) -> AppResult<()> {
    let services = &state.services;
    services.equipment.load_profile().await?;

    let profile = services
        .checkout
        .sign_waiver(&WaiverForm::new(args.signature.as_str()))
        .await?;
    output::print_item(&profile, format);
    Ok(())
}
