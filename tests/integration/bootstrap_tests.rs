use super::*;
use std::io::Cursor;

use restock_watcher::bootstrap::{ensure_settings, SettingsOrigin};
use restock_watcher::models::settings::load_template;
use restock_watcher::setup::{EnvProvider, TerminalWizard};

#[test]
fn test_wizard_prompts_for_item_when_only_items_missing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"phone": "+15550000000", "twilio": {"sid": "ACold", "token": "old", "number": "+15559999999"}}"#,
    )?;

    let template = load_template(None)?;
    let input = "\n\n\n\nWidget\nAcme\nhttps://x/y\n";
    let mut wizard = TerminalWizard::new(Cursor::new(input), Vec::new());

    let (settings, origin) = ensure_settings(&path, &template, &test_retailers(), &mut wizard)?;
    let output = String::from_utf8(wizard.into_output())?;

    assert_eq!(origin, SettingsOrigin::Configured);
    assert!(output.contains("Phone number to receive text alerts (+15550000000)"));
    assert!(output.contains("Twilio SID (ACold)"));
    assert!(output.contains("Twilio Token (old)"));
    assert!(output.contains("Twilio phone number to send from (+15559999999)"));
    assert!(output.contains("Item name for stock watching"));
    assert!(output.contains("Item URL"));

    assert_eq!(settings.phone, "+15550000000");
    assert_eq!(settings.items, vec![restock_watcher::WatchedItem::new("Widget", "acme", "https://x/y")]);
    assert_eq!(restock_watcher::Settings::from_file(&path)?, settings);
    Ok(())
}

#[test]
fn test_wizard_never_runs_for_valid_settings() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.json");
    let settings = test_settings(vec![restock_watcher::WatchedItem::new("Widget", "acme", "https://x/y")]);
    settings.save(&path)?;

    let template = load_template(None)?;
    let mut wizard = TerminalWizard::new(Cursor::new(""), Vec::new());

    let (loaded, origin) = ensure_settings(&path, &template, &test_retailers(), &mut wizard)?;

    assert_eq!(origin, SettingsOrigin::Existing);
    assert_eq!(loaded, settings);
    assert!(wizard.into_output().is_empty());
    Ok(())
}

#[test]
fn test_env_provider_configures_fresh_install() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.json");

    let vars = [
        ("RESTOCK_SETUP_PHONE", "+15551234567"),
        ("RESTOCK_SETUP_TWILIO_SID", "AC123"),
        ("RESTOCK_SETUP_TWILIO_TOKEN", "secret"),
        ("RESTOCK_SETUP_TWILIO_NUMBER", "+15557654321"),
        ("RESTOCK_SETUP_ITEM_NAME", "Gadget"),
        ("RESTOCK_SETUP_ITEM_TYPE", "BESTBUY"),
        ("RESTOCK_SETUP_ITEM_URL", "https://x/gadget"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let mut provider = EnvProvider::with_vars(vars);

    let template = load_template(None)?;
    let (settings, origin) = ensure_settings(&path, &template, &test_retailers(), &mut provider)?;

    assert_eq!(origin, SettingsOrigin::Configured);
    assert_eq!(settings.items[0].retailer, "bestbuy");
    assert_eq!(settings.poll_interval(), Duration::from_millis(120_000));
    assert!(path.exists());
    Ok(())
}
