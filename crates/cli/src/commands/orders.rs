//! Order and shipment commands.
//!
//! # Usage
//!
//! ```bash
//! cz-admin orders list
//! cz-admin orders status 665f1c2ab1d4 packed
//! cz-admin orders edit-shipping 665f1c2ab1d4 --postal-code 560001
//! cz-admin shipments sync 665f1c2ab1d4
//! ```

use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use cuztory_admin::messaging::MessageKind;
use cuztory_admin::shipment::SyncOutcome;
use cuztory_admin::{AdminApiClient, AdminConfig, AppError, OrderConsole};
use cuztory_core::{OrderId, OrderStatus};

use super::{client, print};
use crate::operator::TerminalOperator;
use crate::output;

#[derive(Subcommand)]
pub enum OrderAction {
    /// List all orders
    List,
    /// Show one order in full
    Show { id: String },
    /// Set an order's status (e.g. "In Transit" or in-transit)
    Status { id: String, status: OrderStatus },
    /// Delete an order
    Delete { id: String },
    /// Save the order's PDF invoice
    Invoice {
        id: String,
        /// Output directory (default: INVOICE_OUTPUT_DIR)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print a WhatsApp link with a prefilled customer message
    Message { id: String, kind: MessageArg },
    /// Change the shipping details; omitted fields keep their value
    EditShipping {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        postal_code: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ShipmentAction {
    /// Create a Shiprocket shipment
    Create { id: String },
    /// Pull the latest tracking data
    Sync { id: String },
    /// Clear the shipment so it can be created again
    Reset { id: String },
    /// Create shipments for several orders at once
    Bulk {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MessageArg {
    Confirm,
    Status,
    Cancel,
}

impl From<MessageArg> for MessageKind {
    fn from(arg: MessageArg) -> Self {
        match arg {
            MessageArg::Confirm => Self::Confirm,
            MessageArg::Status => Self::Status,
            MessageArg::Cancel => Self::Cancel,
        }
    }
}

type Console = OrderConsole<AdminApiClient, TerminalOperator>;

fn console(config: &AdminConfig, operator: TerminalOperator) -> Result<Console, AppError> {
    Ok(OrderConsole::new(
        client(config)?,
        operator,
        config.console_settings()?,
    ))
}

pub async fn run_order(
    config: &AdminConfig,
    operator: TerminalOperator,
    action: OrderAction,
) -> Result<(), AppError> {
    let mut console = console(config, operator)?;

    match action {
        OrderAction::List => {
            console.refresh().await?;
            let rows = console.rows();
            print(|out| output::order_rows(out, &rows))?;
        }
        OrderAction::Show { id } => {
            let order = console.open(&OrderId::new(id)).await?;
            print(|out| output::order_detail(out, order, config.currency))?;
        }
        OrderAction::Status { id, status } => {
            console.update_status(&OrderId::new(id), status).await?;
        }
        OrderAction::Delete { id } => {
            console.delete(&OrderId::new(id)).await?;
        }
        OrderAction::Invoice { id, out } => {
            console.open(&OrderId::new(id)).await?;
            let dir = out.unwrap_or_else(|| config.invoice_output_dir.clone());
            console.download_invoice(&dir)?;
        }
        OrderAction::Message { id, kind } => {
            console.open(&OrderId::new(id)).await?;
            let link = console.message_link(kind.into())?;
            print(|out| write_line(out, &link))?;
        }
        OrderAction::EditShipping {
            id,
            name,
            phone,
            email,
            address,
            city,
            state,
            country,
            postal_code,
        } => {
            let order = console.open(&OrderId::new(id)).await?;
            let mut shipping = order.shipping.clone();
            for (field, value) in [
                (&mut shipping.name, name),
                (&mut shipping.phone, phone),
                (&mut shipping.email, email),
                (&mut shipping.address, address),
                (&mut shipping.city, city),
                (&mut shipping.state, state),
                (&mut shipping.country, country),
                (&mut shipping.postal_code, postal_code),
            ] {
                if value.is_some() {
                    *field = value;
                }
            }
            console.edit_shipping(shipping).await?;
        }
    }
    Ok(())
}

fn write_line(out: &mut impl std::io::Write, text: &str) -> std::io::Result<()> {
    writeln!(out, "{text}")
}

pub async fn run_shipment(
    config: &AdminConfig,
    operator: TerminalOperator,
    action: ShipmentAction,
) -> Result<(), AppError> {
    let mut console = console(config, operator)?;

    match action {
        ShipmentAction::Create { id } => {
            console.open(&OrderId::new(id)).await?;
            console.create_shipment().await?;
        }
        ShipmentAction::Sync { id } => {
            console.open(&OrderId::new(id)).await?;
            if let SyncOutcome::Refreshed(tracking) = console.sync_shipment().await? {
                let pretty = serde_json::to_string_pretty(&tracking)
                    .unwrap_or_else(|_| tracking.to_string());
                print(|out| write_line(out, &pretty))?;
            }
        }
        ShipmentAction::Reset { id } => {
            console.open(&OrderId::new(id)).await?;
            console.reset_shipment().await?;
        }
        ShipmentAction::Bulk { ids } => {
            for id in ids {
                console.select(OrderId::new(id));
            }
            let summary = console.bulk_create_shipments().await?;
            for result in &summary.outcomes {
                tracing::info!(
                    order_id = result.order_id.as_ref().map_or("?", OrderId::as_str),
                    outcome = %result.outcome,
                    message = result.message.as_deref().unwrap_or(""),
                    "Bulk result"
                );
            }
        }
    }
    Ok(())
}
