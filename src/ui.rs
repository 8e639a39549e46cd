// UI layer: terminal output for the commands plus the two interactive bits,
// a hidden password prompt (`dialoguer`) and a spinner shown while a request
// is in flight (`indicatif`).

use crate::error::MintError;
use crate::listing::DocumentStatistics;
use crate::models::{
    section_description, ProcessDocumentItem, ProcessedDocument, TechnicalCardData,
    SECTION_FIELDS,
};
use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::time::Duration;

const NOT_AVAILABLE: &str = "N/A";

/// Ask for the password without echoing it.
pub fn prompt_password() -> Result<String> {
    let password = Password::new().with_prompt("Password").interact()?;
    Ok(password)
}

/// Spinner with a message. Call `finish_and_clear` when the work is done.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

pub fn print_success(message: &str) {
    println!("{}", format!("✓ {}", message).green());
}

/// Print an error the way every command reports it: the message, then the
/// service code and detail when there are any.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);
    let Some(mint) = err.downcast_ref::<MintError>() else {
        return;
    };
    if let Some(code) = mint.code() {
        eprintln!("{} {}", "Code:".yellow(), code);
    }
    if let Some(detail) = mint.detail() {
        eprintln!("{} {}", "Detail:".yellow(), detail);
    }
}

fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(NOT_AVAILABLE)
}

pub fn print_statistics(stats: &DocumentStatistics) {
    println!("\n=== Processed documents summary ===");
    println!("Total documents: {}", stats.total);

    println!("\nBy status:");
    for (status, count) in &stats.by_status {
        println!("  {}: {}", status, count);
    }
    println!("\nBy document type:");
    for (card_type, count) in &stats.by_type {
        println!("  {}: {}", card_type, count);
    }
    println!("\nBy ITV station:");
    for (itv, count) in &stats.by_itv {
        println!("  {}: {}", itv, count);
    }
}

pub fn print_document_list(docs: &[ProcessDocumentItem], limit: usize) {
    let shown = docs.len().min(limit);
    println!(
        "\n=== Processed documents (showing {} of {}) ===",
        shown,
        docs.len()
    );
    for (i, doc) in docs.iter().take(limit).enumerate() {
        println!("\n{}. ID: {}", i + 1, doc.id.as_str().bold());
        println!("   Status: {}", doc.status);
        println!("   Type: {}", doc.technical_card.card_type);
        println!("   Category: {}", doc.technical_card.category);
        println!("   Model: {}", or_na(doc.technical_card.model.as_deref()));
        println!("   ITV: {}", doc.license.itv);
        println!("   Created: {}", doc.created_at);
    }
}

pub fn print_document_summary(doc: &ProcessedDocument) {
    let card = &doc.technical_card;
    println!("\nDocument: {}", doc.id);
    println!("Status: {}", doc.status);
    println!("Type: {}", card.card_type);
    println!("Category: {}", card.category);
    println!("Plate: {}", or_na(card.data.matricula.as_deref()));
    println!("VIN: {}", or_na(card.data.section("E")));
}

pub fn print_document_details(doc: &ProcessedDocument) {
    println!("\n=== Processed document ===");
    println!("ID: {}", doc.id);
    println!("Status: {}", doc.status);
    println!("Document ID: {}", or_na(doc.document_id.as_deref()));
    println!("Created: {}", doc.created_at);
    println!("Updated: {}", doc.updated_at);

    println!("\n--- License ---");
    println!("ITV: {}", doc.license.itv);
    println!("Code: {}", doc.license.code);
    println!("Customer ID: {}", doc.license.customer_id);

    let card = &doc.technical_card;
    println!("\n--- Technical card ---");
    println!("Type: {}", card.card_type);
    println!("Category: {}", card.category);
    println!("Model: {}", or_na(card.model.as_deref()));
    println!("Plate: {}", or_na(card.vehicle_license.as_deref()));
    println!("VIN: {}", or_na(card.vin.as_deref()));
    match card.ict {
        Some(ict) => println!("ICT: {}", ict),
        None => println!("ICT: {}", NOT_AVAILABLE),
    }

    print_technical_card_data(&card.data);
}

/// Print every known section code grouped by its section letter, then any
/// codes the service sent that are not in the table, then the list fields.
pub fn print_technical_card_data(data: &TechnicalCardData) {
    println!("\n--- General ---");
    println!("Plate: {}", or_na(data.matricula.as_deref()));
    println!("Certificate: {}", or_na(data.certificado.as_deref()));
    println!("Issue date: {}", or_na(data.fecha_emision.as_deref()));
    println!("Axles: {}", or_na(data.num_ejes.as_deref()));
    println!("Wheels: {}", or_na(data.num_ruedas.as_deref()));
    println!("Tyres: {}", or_na(data.num_neumaticos.as_deref()));

    let mut current = "";
    for (code, description) in SECTION_FIELDS {
        let section = section_letter(code);
        if section != current {
            println!("\n--- Section {} ---", section);
            current = section;
        }
        println!("{} ({}): {}", description, code, or_na(data.section(code)));
    }

    let extra: Vec<_> = data
        .sections
        .iter()
        .filter(|(code, _)| section_description(code).is_none())
        .collect();
    if !extra.is_empty() {
        println!("\n--- Other ---");
        for (code, value) in extra {
            println!("{}: {}", code, display_value(value));
        }
    }

    print_list("Approvals", data.homologaciones.as_deref());
    print_list("Observations", data.observaciones.as_deref());
    print_list("Modifications", data.reformas.as_deref());
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => or_na(Some(s)).to_string(),
        Value::Null => NOT_AVAILABLE.to_string(),
        other => other.to_string(),
    }
}

fn section_letter(code: &str) -> &str {
    code.split('.').next().unwrap_or(code)
}

fn print_list(title: &str, items: Option<&[String]>) {
    let Some(items) = items.filter(|i| !i.is_empty()) else {
        return;
    };
    println!("\n--- {} ---", title);
    for item in items {
        println!("  - {}", item);
    }
}
