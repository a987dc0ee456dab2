//! Invoice download and customer messaging for a fetched order.

#![allow(clippy::unwrap_used)]

use cuztory_admin::invoice::{InvoiceBuilder, Section};
use cuztory_admin::messaging::{MessageComposer, MessageKind};
use cuztory_admin::{ConsoleSettings, OrderBackend, OrderConsole};
use cuztory_core::OrderId;
use cuztory_integration_tests::{FakeBackend, FakeState, ScriptedOperator, raw_order};

const ID: &str = "665f1c2ab1d4";

async fn backend() -> FakeBackend {
    FakeBackend::start(FakeState {
        orders: vec![raw_order(ID)],
        ..FakeState::default()
    })
    .await
}

#[tokio::test]
async fn test_invoice_is_saved_under_order_id() {
    let fake = backend().await;
    let mut console = OrderConsole::new(
        fake.client(),
        ScriptedOperator::accepting(),
        ConsoleSettings::default(),
    );
    console.open(&OrderId::new(ID)).await.unwrap();
    let dir = std::env::temp_dir().join(format!("cuztory-invoices-{}", std::process::id()));

    let path = console.download_invoice(&dir).unwrap();

    assert_eq!(path, dir.join("Invoice_665f1c2ab1d4.pdf"));
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_invoice_layout_from_backend_order() {
    let fake = backend().await;
    let order = fake.client().get_order(&OrderId::new(ID)).await.unwrap();

    let document = InvoiceBuilder::default().build(&order).unwrap();

    let table = document.section_text(Section::Table).join("\n");
    assert!(table.contains("Photo Mug"));
    assert!(table.contains("Color: Red"));
    assert!(table.contains("Name: Asha"));
    let summary = document.section_text(Section::Summary).join("\n");
    assert!(summary.contains("₹450.00"));
}

#[tokio::test]
async fn test_message_link_for_fetched_order() {
    let fake = backend().await;
    let mut console = OrderConsole::new(
        fake.client(),
        ScriptedOperator::accepting(),
        ConsoleSettings {
            messages: MessageComposer::new("Cuztory", "https://shop.test/track"),
            ..ConsoleSettings::default()
        },
    );
    console.open(&OrderId::new(ID)).await.unwrap();

    let link = console.message_link(MessageKind::Confirm).unwrap();

    let (base, text) = link.split_once("?text=").unwrap();
    assert_eq!(base, "https://wa.me/919876543210");
    let text = decode(text);
    assert!(text.starts_with("Hi Asha Rao,"));
    assert!(text.contains("Photo Mug, Keychain"));
    assert!(text.ends_with("https://shop.test/track?order_id=665f1c2ab1d4"));
}

fn decode(text: &str) -> String {
    url::form_urlencoded::parse(format!("t={text}").as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap()
}
