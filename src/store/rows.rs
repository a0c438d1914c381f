//! Row mappings for each collection.

use serde_json::{json, Value};
use std::cmp::Ordering;

use super::mapper::{normalize_mileage, opt_text, req_text, timestamp, Entity, RowWriter};
use super::types::{
  Condition, Contact, ContactPatch, Deal, DealPatch, Moped, MopedPatch, MopedStatus, Warehouse,
  WarehousePatch,
};
use crate::remote::{Order, Row};

/// Text ordering that ignores case, as the backend's collation does.
fn caseless_cmp(a: &str, b: &str) -> Ordering {
  a.to_lowercase().cmp(&b.to_lowercase())
}

// ============================================================================
// Mopeds
// ============================================================================

impl Entity for Moped {
  type Patch = MopedPatch;

  const COLLECTION: &'static str = "mopeds";
  const ORDER: Order = Order::asc("brand");

  fn from_row(row: &Row) -> Self {
    Moped {
      id: req_text(row, "id"),
      brand: req_text(row, "brand"),
      model: req_text(row, "model"),
      license_plate: req_text(row, "license_plate"),
      photo: opt_text(row, "photo"),
      status: opt_text(row, "status")
        .and_then(|s| s.parse().ok())
        .unwrap_or_default(),
      grnz: opt_text(row, "grnz"),
      vin_code: opt_text(row, "vin_code"),
      color: opt_text(row, "color"),
      mileage: row.get("mileage").and_then(normalize_mileage),
      condition: opt_text(row, "condition").and_then(|s| s.parse().ok()),
      insurance_date: opt_text(row, "insurance_date"),
      tech_inspection_date: opt_text(row, "tech_inspection_date"),
      created_at: timestamp(row, "created_at"),
    }
  }

  fn to_row(patch: &MopedPatch) -> Row {
    RowWriter::new()
      .text("brand", &patch.brand)
      .text("model", &patch.model)
      .text("license_plate", &patch.license_plate)
      .nullable_text("photo", &patch.photo)
      .value("status", &patch.status, |s: &MopedStatus| json!(s.as_str()))
      .nullable_text("grnz", &patch.grnz)
      .nullable_text("vin_code", &patch.vin_code)
      .nullable_text("color", &patch.color)
      .value("mileage", &patch.mileage, |m| json!(m))
      .value("condition", &patch.condition, |c: &Option<Condition>| {
        c.map_or(Value::Null, |c| json!(c.as_str()))
      })
      .nullable_text("insurance_date", &patch.insurance_date)
      .nullable_text("tech_inspection_date", &patch.tech_inspection_date)
      .finish()
  }

  fn to_patch(&self) -> MopedPatch {
    MopedPatch {
      brand: Some(self.brand.clone()),
      model: Some(self.model.clone()),
      license_plate: Some(self.license_plate.clone()),
      photo: Some(self.photo.clone()),
      status: Some(self.status),
      grnz: Some(self.grnz.clone()),
      vin_code: Some(self.vin_code.clone()),
      color: Some(self.color.clone()),
      mileage: Some(self.mileage),
      condition: Some(self.condition),
      insurance_date: Some(self.insurance_date.clone()),
      tech_inspection_date: Some(self.tech_inspection_date.clone()),
    }
  }

  fn sort_cmp(&self, other: &Self) -> Ordering {
    caseless_cmp(&self.brand, &other.brand)
  }
}

// ============================================================================
// Contacts
// ============================================================================

impl Entity for Contact {
  type Patch = ContactPatch;

  const COLLECTION: &'static str = "contacts";
  const ORDER: Order = Order::desc("created_at");

  fn from_row(row: &Row) -> Self {
    Contact {
      id: req_text(row, "id"),
      name: req_text(row, "name"),
      phone: req_text(row, "phone"),
      email: opt_text(row, "email"),
      iin: opt_text(row, "iin"),
      doc_number: opt_text(row, "doc_number"),
      status: opt_text(row, "status"),
      photo: opt_text(row, "photo"),
      emergency_contact_id: opt_text(row, "emergency_contact_id"),
      created_at: timestamp(row, "created_at"),
    }
  }

  fn to_row(patch: &ContactPatch) -> Row {
    RowWriter::new()
      .text("name", &patch.name)
      .text("phone", &patch.phone)
      .nullable_text("email", &patch.email)
      .nullable_text("iin", &patch.iin)
      .nullable_text("doc_number", &patch.doc_number)
      .nullable_text("status", &patch.status)
      .nullable_text("photo", &patch.photo)
      .nullable_text("emergency_contact_id", &patch.emergency_contact_id)
      .finish()
  }

  fn to_patch(&self) -> ContactPatch {
    ContactPatch {
      name: Some(self.name.clone()),
      phone: Some(self.phone.clone()),
      email: Some(self.email.clone()),
      iin: Some(self.iin.clone()),
      doc_number: Some(self.doc_number.clone()),
      status: Some(self.status.clone()),
      photo: Some(self.photo.clone()),
      emergency_contact_id: Some(self.emergency_contact_id.clone()),
    }
  }

  fn sort_cmp(&self, other: &Self) -> Ordering {
    // Newest first; rows without a timestamp go last
    other.created_at.cmp(&self.created_at)
  }
}

// ============================================================================
// Warehouses
// ============================================================================

impl Entity for Warehouse {
  type Patch = WarehousePatch;

  const COLLECTION: &'static str = "warehouses";
  const ORDER: Order = Order::asc("name");

  fn from_row(row: &Row) -> Self {
    Warehouse {
      id: req_text(row, "id"),
      name: req_text(row, "name"),
      kind: req_text(row, "type"),
      created_at: timestamp(row, "created_at"),
    }
  }

  fn to_row(patch: &WarehousePatch) -> Row {
    RowWriter::new()
      .text("name", &patch.name)
      .text("type", &patch.kind)
      .finish()
  }

  fn to_patch(&self) -> WarehousePatch {
    WarehousePatch {
      name: Some(self.name.clone()),
      kind: Some(self.kind.clone()),
    }
  }

  fn sort_cmp(&self, other: &Self) -> Ordering {
    caseless_cmp(&self.name, &other.name)
  }
}

// ============================================================================
// Deals
// ============================================================================

impl Entity for Deal {
  type Patch = DealPatch;

  const COLLECTION: &'static str = "deals";
  const ORDER: Order = Order::desc("created_at");

  fn from_row(row: &Row) -> Self {
    Deal {
      id: req_text(row, "id"),
      client_name: req_text(row, "client_name"),
      phone: req_text(row, "phone"),
      stage: req_text(row, "stage"),
      source: opt_text(row, "source"),
      manager: opt_text(row, "manager"),
      moped_id: opt_text(row, "moped_id"),
      amount: opt_text(row, "amount"),
      comment: opt_text(row, "comment"),
      created_at: timestamp(row, "created_at"),
    }
  }

  fn to_row(patch: &DealPatch) -> Row {
    RowWriter::new()
      .text("client_name", &patch.client_name)
      .text("phone", &patch.phone)
      .text("stage", &patch.stage)
      .nullable_text("source", &patch.source)
      .nullable_text("manager", &patch.manager)
      .nullable_text("moped_id", &patch.moped_id)
      .nullable_text("amount", &patch.amount)
      .nullable_text("comment", &patch.comment)
      .finish()
  }

  fn to_patch(&self) -> DealPatch {
    DealPatch {
      client_name: Some(self.client_name.clone()),
      phone: Some(self.phone.clone()),
      stage: Some(self.stage.clone()),
      source: Some(self.source.clone()),
      manager: Some(self.manager.clone()),
      moped_id: Some(self.moped_id.clone()),
      amount: Some(self.amount.clone()),
      comment: Some(self.comment.clone()),
    }
  }

  fn sort_cmp(&self, other: &Self) -> Ordering {
    other.created_at.cmp(&self.created_at)
  }
}
