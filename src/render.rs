//! Plain-text and JSON rendering of entities for stdout.

use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::io::Write;

use crate::store::types::{Contact, Deal, Moped, Warehouse};

/// Where and how command results are printed.
#[derive(Debug, Clone, Copy)]
pub struct Output {
  pub json: bool,
}

impl Output {
  pub fn list<T: Serialize>(&self, items: &[T], line: fn(&T) -> String) -> Result<()> {
    if self.json {
      return self.write(&to_json(items)?);
    }
    if items.is_empty() {
      return self.write("(none)");
    }
    let text = items.iter().map(line).collect::<Vec<_>>().join("\n");
    self.write(&text)
  }

  pub fn one<T: Serialize>(&self, item: &T, detail: fn(&T) -> String) -> Result<()> {
    if self.json {
      self.write(&to_json(item)?)
    } else {
      self.write(&detail(item))
    }
  }

  /// Status message; in JSON mode wrapped as `{"message": ...}`.
  pub fn message(&self, text: &str) -> Result<()> {
    if self.json {
      self.write(&to_json(&serde_json::json!({ "message": text }))?)
    } else {
      self.write(text)
    }
  }

  fn write(&self, text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", text).map_err(|e| eyre!("Failed to write output: {}", e))
  }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
  serde_json::to_string_pretty(value).map_err(|e| eyre!("Failed to serialize output: {}", e))
}

fn or_dash(value: &Option<String>) -> &str {
  value.as_deref().unwrap_or("-")
}

/// Two-column `label: value` block
fn fields(rows: &[(&str, String)]) -> String {
  let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
  rows
    .iter()
    .map(|(label, value)| format!("{:<width$}  {}", format!("{}:", label), value, width = width + 1))
    .collect::<Vec<_>>()
    .join("\n")
}

fn created(value: &Option<chrono::DateTime<chrono::Utc>>) -> String {
  value
    .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
    .unwrap_or_else(|| "-".to_string())
}

// ============================================================================
// Mopeds
// ============================================================================

pub fn moped_line(m: &Moped) -> String {
  format!(
    "{:<12} {:<12} {:<12} {:<10} {:<12} {}",
    m.brand,
    m.model,
    m.license_plate,
    m.status,
    m.mileage.map(|n| format!("{} km", n)).unwrap_or_default(),
    m.id
  )
}

pub fn moped_detail(m: &Moped) -> String {
  fields(&[
    ("id", m.id.clone()),
    ("brand", m.brand.clone()),
    ("model", m.model.clone()),
    ("license plate", m.license_plate.clone()),
    ("status", m.status.to_string()),
    ("condition", m.condition.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())),
    ("mileage", m.mileage.map(|n| format!("{} km", n)).unwrap_or_else(|| "-".to_string())),
    ("grnz", or_dash(&m.grnz).to_string()),
    ("vin", or_dash(&m.vin_code).to_string()),
    ("color", or_dash(&m.color).to_string()),
    ("insurance", or_dash(&m.insurance_date).to_string()),
    ("inspection", or_dash(&m.tech_inspection_date).to_string()),
    ("photo", or_dash(&m.photo).to_string()),
    ("created", created(&m.created_at)),
  ])
}

// ============================================================================
// Contacts
// ============================================================================

pub fn contact_line(c: &Contact) -> String {
  format!(
    "{:<28} {:<16} {:<10} {}",
    c.name,
    c.phone,
    or_dash(&c.status),
    c.id
  )
}

pub fn contact_detail(c: &Contact) -> String {
  fields(&[
    ("id", c.id.clone()),
    ("name", c.name.clone()),
    ("phone", c.phone.clone()),
    ("email", or_dash(&c.email).to_string()),
    ("iin", or_dash(&c.iin).to_string()),
    ("document", or_dash(&c.doc_number).to_string()),
    ("status", or_dash(&c.status).to_string()),
    ("emergency contact", or_dash(&c.emergency_contact_id).to_string()),
    ("created", created(&c.created_at)),
  ])
}

/// A contact with their resolved emergency contact.
#[derive(Debug, Serialize)]
pub struct ContactView {
  #[serde(flatten)]
  pub contact: Contact,
  pub emergency_contact: Option<Contact>,
}

pub fn contact_view_detail(v: &ContactView) -> String {
  let mut text = contact_detail(&v.contact);
  if let Some(e) = &v.emergency_contact {
    text.push_str(&format!("\n\nEmergency contact: {} ({})", e.name, e.phone));
  }
  text
}

// ============================================================================
// Warehouses
// ============================================================================

pub fn warehouse_line(w: &Warehouse) -> String {
  format!("{:<24} {:<16} {}", w.name, w.kind, w.id)
}

pub fn warehouse_detail(w: &Warehouse) -> String {
  fields(&[
    ("id", w.id.clone()),
    ("name", w.name.clone()),
    ("type", w.kind.clone()),
    ("created", created(&w.created_at)),
  ])
}

// ============================================================================
// Deals
// ============================================================================

/// A deal joined with its resolved moped, as rendered by `deals` commands.
#[derive(Debug, Serialize)]
pub struct DealView {
  #[serde(flatten)]
  pub deal: Deal,
  pub moped: Option<Moped>,
}

fn moped_label(moped: &Option<Moped>, moped_id: &Option<String>) -> String {
  match (moped, moped_id) {
    (Some(m), _) => format!("{} {} ({})", m.brand, m.model, m.license_plate),
    (None, Some(id)) => format!("unknown moped {}", id),
    (None, None) => "-".to_string(),
  }
}

pub fn deal_line(v: &DealView) -> String {
  format!(
    "{:<12} {:<20} {:<14} {:<28} {}",
    v.deal.stage,
    v.deal.client_name,
    v.deal.phone,
    moped_label(&v.moped, &v.deal.moped_id),
    v.deal.id
  )
}

pub fn deal_detail(v: &DealView) -> String {
  fields(&[
    ("id", v.deal.id.clone()),
    ("client", v.deal.client_name.clone()),
    ("phone", v.deal.phone.clone()),
    ("stage", v.deal.stage.clone()),
    ("moped", moped_label(&v.moped, &v.deal.moped_id)),
    ("amount", or_dash(&v.deal.amount).to_string()),
    ("source", or_dash(&v.deal.source).to_string()),
    ("manager", or_dash(&v.deal.manager).to_string()),
    ("comment", or_dash(&v.deal.comment).to_string()),
    ("created", created(&v.deal.created_at)),
  ])
}
