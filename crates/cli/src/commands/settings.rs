//! Shipping rate, payment configuration and analytics commands.

use clap::{Args, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use cuztory_admin::models::{AdjustmentType, PaymentConfig, ShippingRateForm};
use cuztory_admin::{AdminConfig, AppError, CatalogScreens};
use cuztory_core::ShippingRateId;

use super::{client, print};
use crate::operator::TerminalOperator;
use crate::output;

#[derive(Subcommand)]
pub enum ShippingRateAction {
    /// List shipping rates
    List,
    /// Add a shipping rate
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        rate: Option<Decimal>,
        /// Add the rate switched off
        #[arg(long)]
        disabled: bool,
    },
    /// Delete a shipping rate
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum PaymentAction {
    /// Show the payment options
    Show,
    /// Change payment options; omitted flags keep their value
    Set(PaymentArgs),
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AdjustmentArg {
    Percent,
    Amount,
}

impl From<AdjustmentArg> for AdjustmentType {
    fn from(arg: AdjustmentArg) -> Self {
        match arg {
            AdjustmentArg::Percent => Self::Percent,
            AdjustmentArg::Amount => Self::Amount,
        }
    }
}

#[derive(Args)]
pub struct PaymentArgs {
    /// Offer a discount for paying in full upfront
    #[arg(long)]
    full_prepaid: Option<bool>,
    #[arg(long)]
    discount_type: Option<AdjustmentArg>,
    #[arg(long)]
    discount_value: Option<Decimal>,
    /// Allow paying an advance with the rest on delivery
    #[arg(long)]
    partial_payment: Option<bool>,
    #[arg(long)]
    partial_type: Option<AdjustmentArg>,
    #[arg(long)]
    partial_value: Option<Decimal>,
    /// Allow cash on delivery
    #[arg(long)]
    cod: Option<bool>,
}

impl PaymentArgs {
    fn apply(self, mut config: PaymentConfig) -> PaymentConfig {
        let prepaid = &mut config.full_prepaid;
        prepaid.enabled = self.full_prepaid.unwrap_or(prepaid.enabled);
        prepaid.discount_type = self.discount_type.map_or(prepaid.discount_type, Into::into);
        prepaid.discount_value = self.discount_value.unwrap_or(prepaid.discount_value);

        let partial = &mut config.partial_payment;
        partial.enabled = self.partial_payment.unwrap_or(partial.enabled);
        partial.partial_type = self.partial_type.map_or(partial.partial_type, Into::into);
        partial.partial_value = self.partial_value.unwrap_or(partial.partial_value);

        config.cod.enabled = self.cod.unwrap_or(config.cod.enabled);
        config
    }
}

pub async fn run_shipping_rate(
    config: &AdminConfig,
    operator: TerminalOperator,
    action: ShippingRateAction,
) -> Result<(), AppError> {
    let screens = CatalogScreens::new(client(config)?, operator);

    let rates = match action {
        ShippingRateAction::List => screens.shipping_rates().await?,
        ShippingRateAction::Add {
            name,
            rate,
            disabled,
        } => {
            let form = ShippingRateForm {
                name,
                rate,
                enabled: !disabled,
            };
            screens.add_shipping_rate(&form).await?
        }
        ShippingRateAction::Delete { id } => {
            screens
                .delete_shipping_rate(&ShippingRateId::new(id))
                .await?
        }
    };
    print(|out| output::shipping_rates(out, &rates, config.currency))
}

pub async fn run_payment(
    config: &AdminConfig,
    operator: TerminalOperator,
    action: PaymentAction,
) -> Result<(), AppError> {
    let screens = CatalogScreens::new(client(config)?, operator);

    let payment = match action {
        PaymentAction::Show => screens.payment_config().await?,
        PaymentAction::Set(args) => {
            let updated = args.apply(screens.payment_config().await?);
            screens.save_payment_config(&updated).await?
        }
    };
    print(|out| output::payment_config(out, &payment, config.currency))
}

pub async fn analytics(config: &AdminConfig, operator: TerminalOperator) -> Result<(), AppError> {
    let screens = CatalogScreens::new(client(config)?, operator);
    let summary = screens.analytics().await?;
    print(|out| output::analytics(out, &summary, config.currency))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_touches_given_flags() {
        let mut current = PaymentConfig::default();
        current.cod.enabled = true;
        current.full_prepaid.discount_value = Decimal::from(5);

        let updated = PaymentArgs {
            full_prepaid: Some(true),
            discount_type: Some(AdjustmentArg::Amount),
            discount_value: None,
            partial_payment: None,
            partial_type: None,
            partial_value: Some(Decimal::from(20)),
            cod: None,
        }
        .apply(current);

        assert!(updated.full_prepaid.enabled);
        assert_eq!(updated.full_prepaid.discount_type, AdjustmentType::Amount);
        assert_eq!(updated.full_prepaid.discount_value, Decimal::from(5));
        assert_eq!(updated.partial_payment.partial_value, Decimal::from(20));
        assert!(!updated.partial_payment.enabled);
        assert!(updated.cod.enabled);
    }
}
