//! Domain entities and their typed patches.
//!
//! A patch lists exactly the fields a partial update may touch. `None`
//! leaves a column alone; for nullable columns `Some(None)` clears it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Rental availability of a moped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MopedStatus {
  #[default]
  Available,
  Rented,
  Maintenance,
}

impl MopedStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      MopedStatus::Available => "available",
      MopedStatus::Rented => "rented",
      MopedStatus::Maintenance => "maintenance",
    }
  }
}

impl FromStr for MopedStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "available" => Ok(MopedStatus::Available),
      "rented" => Ok(MopedStatus::Rented),
      "maintenance" => Ok(MopedStatus::Maintenance),
      other => Err(format!(
        "unknown status '{}' (expected available, rented or maintenance)",
        other
      )),
    }
  }
}

impl fmt::Display for MopedStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}

/// Physical condition of a moped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
  New,
  Good,
  Broken,
}

impl Condition {
  pub fn as_str(&self) -> &'static str {
    match self {
      Condition::New => "new",
      Condition::Good => "good",
      Condition::Broken => "broken",
    }
  }
}

impl FromStr for Condition {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "new" => Ok(Condition::New),
      "good" => Ok(Condition::Good),
      "broken" => Ok(Condition::Broken),
      other => Err(format!(
        "unknown condition '{}' (expected new, good or broken)",
        other
      )),
    }
  }
}

impl fmt::Display for Condition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}

/// A rentable vehicle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Moped {
  pub id: String,
  pub brand: String,
  pub model: String,
  pub license_plate: String,
  pub photo: Option<String>,
  pub status: MopedStatus,
  pub grnz: Option<String>,
  pub vin_code: Option<String>,
  pub color: Option<String>,
  pub mileage: Option<u64>,
  pub condition: Option<Condition>,
  pub insurance_date: Option<String>,
  pub tech_inspection_date: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MopedPatch {
  pub brand: Option<String>,
  pub model: Option<String>,
  pub license_plate: Option<String>,
  pub photo: Option<Option<String>>,
  pub status: Option<MopedStatus>,
  pub grnz: Option<Option<String>>,
  pub vin_code: Option<Option<String>>,
  pub color: Option<Option<String>>,
  pub mileage: Option<Option<u64>>,
  pub condition: Option<Option<Condition>>,
  pub insurance_date: Option<Option<String>>,
  pub tech_inspection_date: Option<Option<String>>,
}

/// A client (renter) record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contact {
  pub id: String,
  pub name: String,
  pub phone: String,
  pub email: Option<String>,
  pub iin: Option<String>,
  pub doc_number: Option<String>,
  pub status: Option<String>,
  pub photo: Option<String>,
  /// Another contact to call in an emergency
  pub emergency_contact_id: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactPatch {
  pub name: Option<String>,
  pub phone: Option<String>,
  pub email: Option<Option<String>>,
  pub iin: Option<Option<String>>,
  pub doc_number: Option<Option<String>>,
  pub status: Option<Option<String>>,
  pub photo: Option<Option<String>>,
  pub emergency_contact_id: Option<Option<String>>,
}

/// A storage location for inventory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warehouse {
  pub id: String,
  pub name: String,
  /// Warehouse type (stored in the `type` column)
  pub kind: String,
  pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarehousePatch {
  pub name: Option<String>,
  pub kind: Option<String>,
}

/// A rental deal on the sales board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deal {
  pub id: String,
  pub client_name: String,
  pub phone: String,
  pub stage: String,
  pub source: Option<String>,
  pub manager: Option<String>,
  /// The rented moped, resolved lazily through the moped store
  pub moped_id: Option<String>,
  pub amount: Option<String>,
  pub comment: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealPatch {
  pub client_name: Option<String>,
  pub phone: Option<String>,
  pub stage: Option<String>,
  pub source: Option<Option<String>>,
  pub manager: Option<Option<String>>,
  pub moped_id: Option<Option<String>>,
  pub amount: Option<Option<String>>,
  pub comment: Option<Option<String>>,
}
