//! Plain-text rendering of console state for the terminal.

use std::io::{self, Write};

use cuztory_admin::invoice::address_block;
use cuztory_admin::line_items::{EMPTY_FIELD, customization_text, specifications_text};
use cuztory_admin::models::{
    AdjustmentType, AnalyticsSummary, Banner, Collection, Order, PaymentConfig, Product,
    ShippingRate,
};
use cuztory_admin::shipment::ShipmentState;
use cuztory_admin::OrderRow;
use cuztory_core::{CurrencyCode, format_amount};

/// Shorten `text` to `width` characters, marking the cut with `~`.
fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('~');
    clipped
}

pub fn order_rows(out: &mut impl Write, rows: &[OrderRow]) -> io::Result<()> {
    writeln!(
        out,
        "{:<26} {:<22} {:<14} {:<8} {:>12} {:<18} {:<10} {}",
        "ORDER", "CUSTOMER", "PHONE", "PIN", "TOTAL", "STATUS", "SHIPMENT", "PLACED"
    )?;
    for row in rows {
        writeln!(
            out,
            "{:<26} {:<22} {:<14} {:<8} {:>12} {:<18} {:<10} {}",
            clip(row.id.as_str(), 26),
            clip(&row.customer_name, 22),
            clip(&row.customer_phone, 14),
            clip(&row.postal_code, 8),
            row.total,
            clip(row.status.label(), 18),
            row.shipment,
            row.placed_at,
        )?;
    }
    writeln!(out, "{} order(s)", rows.len())
}

pub fn order_detail(out: &mut impl Write, order: &Order, currency: CurrencyCode) -> io::Result<()> {
    let money = |amount| format_amount(amount, currency);

    writeln!(out, "Order {}", order.id)?;
    writeln!(out, "Status:   {}", order.status)?;
    writeln!(out, "Customer: {} <{}>", order.customer_name(), order.customer_email())?;
    if let Some(phone) = order.customer_phone() {
        writeln!(out, "Phone:    {phone}")?;
    }
    writeln!(out, "Ship to:  {}", address_block(&order.shipping))?;

    writeln!(out)?;
    for item in &order.items {
        writeln!(
            out,
            "  {} x{} @ {}",
            item.name,
            item.quantity,
            money(item.price)
        )?;
        let specs = specifications_text(item);
        if specs != EMPTY_FIELD {
            writeln!(out, "      specs: {specs}")?;
        }
        let custom = customization_text(item);
        if custom != EMPTY_FIELD {
            writeln!(out, "      customization: {custom}")?;
        }
    }

    let totals = &order.totals;
    writeln!(out)?;
    writeln!(out, "Items:    {}", money(totals.items_price))?;
    writeln!(out, "Shipping: {}", money(totals.shipping_price))?;
    if !totals.discount.is_zero() {
        writeln!(out, "Discount: -{}", money(totals.discount))?;
    }
    writeln!(out, "Total:    {}", money(totals.total_price))?;
    writeln!(out, "Paid:     {}", money(totals.amount_paid))?;
    writeln!(out, "Due:      {}", money(totals.amount_due))?;

    writeln!(out)?;
    match ShipmentState::of(&order.shipment) {
        ShipmentState::NoShipment => writeln!(out, "Shipment: none"),
        ShipmentState::Created {
            external_order_id,
            awb,
        } => writeln!(
            out,
            "Shipment: {external_order_id} (AWB: {}), not yet synced",
            awb.as_deref().unwrap_or("pending")
        ),
        ShipmentState::Synced {
            external_order_id,
            awb,
            tracking,
        } => {
            writeln!(
                out,
                "Shipment: {external_order_id} (AWB: {})",
                awb.as_deref().unwrap_or("pending")
            )?;
            writeln!(out, "Tracking: {tracking}")
        }
    }
}

pub fn collections(out: &mut impl Write, collections: &[Collection]) -> io::Result<()> {
    for collection in collections {
        writeln!(
            out,
            "{:<26} {} ({} products)",
            collection.id,
            collection.name,
            collection.products.len()
        )?;
        for product in &collection.products {
            writeln!(out, "    {:<26} {}", product.id, product.title)?;
        }
    }
    Ok(())
}

pub fn banners(out: &mut impl Write, banners: &[Banner]) -> io::Result<()> {
    for banner in banners {
        writeln!(
            out,
            "{:<26} {:<8} {} {}",
            banner.id,
            if banner.is_active { "active" } else { "hidden" },
            banner.title,
            banner.link.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

pub fn products(out: &mut impl Write, products: &[Product], currency: CurrencyCode) -> io::Result<()> {
    for product in products {
        writeln!(
            out,
            "{:<26} {:<30} {:>12} stock {:<5}{}",
            product.id,
            clip(&product.title, 30),
            format_amount(product.price, currency),
            product.total_stock(),
            if product.is_customizable { " customizable" } else { "" }
        )?;
    }
    Ok(())
}

pub fn shipping_rates(
    out: &mut impl Write,
    rates: &[ShippingRate],
    currency: CurrencyCode,
) -> io::Result<()> {
    for rate in rates {
        writeln!(
            out,
            "{:<26} {:<20} {:>10} {}",
            rate.id,
            rate.name,
            format_amount(rate.rate, currency),
            if rate.enabled { "enabled" } else { "disabled" }
        )?;
    }
    Ok(())
}

fn adjustment(kind: AdjustmentType, value: rust_decimal::Decimal, currency: CurrencyCode) -> String {
    match kind {
        AdjustmentType::Percent => format!("{value}%"),
        AdjustmentType::Amount => format_amount(value, currency),
    }
}

pub fn payment_config(
    out: &mut impl Write,
    config: &PaymentConfig,
    currency: CurrencyCode,
) -> io::Result<()> {
    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    writeln!(
        out,
        "Full prepaid:    {} (discount {})",
        on_off(config.full_prepaid.enabled),
        adjustment(
            config.full_prepaid.discount_type,
            config.full_prepaid.discount_value,
            currency
        )
    )?;
    writeln!(
        out,
        "Partial payment: {} (advance {})",
        on_off(config.partial_payment.enabled),
        adjustment(
            config.partial_payment.partial_type,
            config.partial_payment.partial_value,
            currency
        )
    )?;
    writeln!(out, "Cash on delivery: {}", on_off(config.cod.enabled))
}

pub fn analytics(
    out: &mut impl Write,
    summary: &AnalyticsSummary,
    currency: CurrencyCode,
) -> io::Result<()> {
    writeln!(out, "Users:          {}", summary.total_users)?;
    writeln!(out, "Orders:         {}", summary.total_orders)?;
    writeln!(out, "Pending orders: {}", summary.pending_orders)?;
    writeln!(
        out,
        "Revenue:        {}",
        format_amount(summary.total_revenue, currency)
    )?;

    if !summary.charts.monthly_revenue.is_empty() {
        writeln!(out, "\nMonthly revenue")?;
        for point in &summary.charts.monthly_revenue {
            writeln!(
                out,
                "  {:<12} {:>14}",
                point.label,
                format_amount(point.value, currency)
            )?;
        }
    }
    if !summary.charts.top_selling_products.is_empty() {
        writeln!(out, "\nTop sellers")?;
        for point in &summary.charts.top_selling_products {
            writeln!(out, "  {:<30} {:>6}", clip(&point.label, 30), point.value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cuztory_admin::models::{ChartPoint, FullPrepaid};
    use cuztory_core::{OrderId, OrderStatus};
    use rust_decimal::Decimal;

    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("Asha", 10), "Asha");
        assert_eq!(clip("Asha Rao Krishnan", 8), "Asha Ra~");
    }

    #[test]
    fn test_order_rows_table() {
        let rows = vec![OrderRow {
            id: OrderId::new("665f1c2ab1d4"),
            customer_name: "Asha Rao".to_string(),
            customer_email: "asha@example.com".to_string(),
            customer_phone: "98765 43210".to_string(),
            postal_code: "560001".to_string(),
            total: "₹550.00".to_string(),
            status: OrderStatus::OutForDelivery,
            placed_at: "04/06/2024, 03:00:00 PM".to_string(),
            shipment: "Created",
        }];
        let text = render(|out| order_rows(out, &rows));

        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("ORDER"));
        let row = lines.next().unwrap();
        assert!(row.contains("665f1c2ab1d4"));
        assert!(row.contains("Out for Delivery"));
        assert!(row.contains("₹550.00"));
        assert_eq!(lines.next(), Some("1 order(s)"));
    }

    #[test]
    fn test_payment_config_shows_adjustments() {
        let config = PaymentConfig {
            full_prepaid: FullPrepaid {
                enabled: true,
                discount_type: AdjustmentType::Percent,
                discount_value: Decimal::from(5),
            },
            ..PaymentConfig::default()
        };
        let text = render(|out| payment_config(out, &config, CurrencyCode::INR));
        assert!(text.contains("Full prepaid:    on (discount 5%)"));
        assert!(text.contains("Partial payment: off (advance 0%)"));
        assert!(text.contains("Cash on delivery: off"));
    }

    #[test]
    fn test_analytics_skips_empty_charts() {
        let mut summary = AnalyticsSummary {
            total_orders: 12,
            total_revenue: Decimal::new(1_234_550, 2),
            ..AnalyticsSummary::default()
        };
        let text = render(|out| analytics(out, &summary, CurrencyCode::INR));
        assert!(text.contains("Revenue:        ₹12345.50"));
        assert!(!text.contains("Monthly revenue"));

        summary.charts.monthly_revenue.push(ChartPoint {
            label: "Jun".to_string(),
            value: Decimal::from(4000),
        });
        let text = render(|out| analytics(out, &summary, CurrencyCode::INR));
        assert!(text.contains("Monthly revenue"));
        assert!(text.contains("₹4000.00"));
    }
}
