//! Command-line subcommands and their execution.

use clap::{Args, Subcommand};
use color_eyre::{eyre::eyre, Report, Result};
use serde::Serialize;

use crate::render::{self, ContactView, DealView, Output};
use crate::store::mapper::{normalize_text, parse_mileage_text, Entity};
use crate::store::types::{
  Condition, Contact, ContactPatch, Deal, DealPatch, Moped, MopedPatch, MopedStatus, Warehouse,
  WarehousePatch,
};
use crate::store::{CollectionStore, StoreError, Stores};

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Moped inventory
  #[command(alias = "m")]
  Mopeds {
    #[command(subcommand)]
    action: MopedAction,
  },
  /// Clients and their emergency contacts
  #[command(alias = "c")]
  Contacts {
    #[command(subcommand)]
    action: ContactAction,
  },
  /// Warehouses
  #[command(alias = "w")]
  Warehouses {
    #[command(subcommand)]
    action: WarehouseAction,
  },
  /// Rental deals with their mopeds
  #[command(alias = "d")]
  Deals {
    #[command(subcommand)]
    action: DealAction,
  },
}

#[derive(Subcommand, Debug)]
pub enum MopedAction {
  /// List all mopeds by brand
  #[command(alias = "ls")]
  List,
  /// Show one moped
  Show { id: String },
  /// Add a moped (--brand, --model and --license-plate are required)
  Add(MopedFields),
  /// Change fields of a moped; an empty value clears an optional field
  Update {
    id: String,
    #[command(flatten)]
    fields: MopedFields,
  },
  /// Delete a moped
  #[command(alias = "rm")]
  Remove { id: String },
}

#[derive(Args, Debug, Default)]
pub struct MopedFields {
  #[arg(long)]
  brand: Option<String>,
  #[arg(long)]
  model: Option<String>,
  #[arg(long)]
  license_plate: Option<String>,
  #[arg(long)]
  status: Option<MopedStatus>,
  #[arg(long)]
  photo: Option<String>,
  #[arg(long)]
  grnz: Option<String>,
  #[arg(long)]
  vin_code: Option<String>,
  #[arg(long)]
  color: Option<String>,
  /// Free text is accepted; only the digits are kept ("15000 km")
  #[arg(long)]
  mileage: Option<String>,
  /// new, good or broken
  #[arg(long)]
  condition: Option<String>,
  #[arg(long)]
  insurance_date: Option<String>,
  #[arg(long)]
  tech_inspection_date: Option<String>,
}

impl MopedFields {
  fn into_patch(self) -> Result<MopedPatch> {
    let condition = match self.condition {
      Some(raw) => Some(match normalize_text(&raw) {
        Some(text) => Some(text.parse::<Condition>().map_err(|e| eyre!(e))?),
        None => None,
      }),
      None => None,
    };

    Ok(MopedPatch {
      brand: self.brand,
      model: self.model,
      license_plate: self.license_plate,
      photo: self.photo.map(Some),
      status: self.status,
      grnz: self.grnz.map(Some),
      vin_code: self.vin_code.map(Some),
      color: self.color.map(Some),
      mileage: self.mileage.map(|m| parse_mileage_text(&m)),
      condition,
      insurance_date: self.insurance_date.map(Some),
      tech_inspection_date: self.tech_inspection_date.map(Some),
    })
  }
}

#[derive(Subcommand, Debug)]
pub enum ContactAction {
  /// List all contacts, newest first
  #[command(alias = "ls")]
  List,
  /// Show one contact with their emergency contact
  Show { id: String },
  /// Find a contact by part of the name or by exact phone
  Find {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
  },
  /// Add a contact (--name and --phone are required)
  Add(ContactFields),
  /// Change fields of a contact; an empty value clears an optional field
  Update {
    id: String,
    #[command(flatten)]
    fields: ContactFields,
  },
  /// Delete a contact
  #[command(alias = "rm")]
  Remove { id: String },
}

#[derive(Args, Debug, Default)]
pub struct ContactFields {
  #[arg(long)]
  name: Option<String>,
  #[arg(long)]
  phone: Option<String>,
  #[arg(long)]
  email: Option<String>,
  #[arg(long)]
  iin: Option<String>,
  #[arg(long)]
  doc_number: Option<String>,
  #[arg(long)]
  status: Option<String>,
  #[arg(long)]
  photo: Option<String>,
  /// Id of another contact
  #[arg(long)]
  emergency_contact: Option<String>,
}

impl ContactFields {
  fn into_patch(self) -> ContactPatch {
    ContactPatch {
      name: self.name,
      phone: self.phone,
      email: self.email.map(Some),
      iin: self.iin.map(Some),
      doc_number: self.doc_number.map(Some),
      status: self.status.map(Some),
      photo: self.photo.map(Some),
      emergency_contact_id: self.emergency_contact.map(Some),
    }
  }
}

#[derive(Subcommand, Debug)]
pub enum WarehouseAction {
  /// List all warehouses by name
  #[command(alias = "ls")]
  List,
  /// Show one warehouse
  Show { id: String },
  /// Add a warehouse (--name and --type are required)
  Add(WarehouseFields),
  /// Rename or retype a warehouse
  Update {
    id: String,
    #[command(flatten)]
    fields: WarehouseFields,
  },
  /// Delete a warehouse
  #[command(alias = "rm")]
  Remove { id: String },
}

#[derive(Args, Debug, Default)]
pub struct WarehouseFields {
  #[arg(long)]
  name: Option<String>,
  #[arg(long = "type")]
  kind: Option<String>,
}

impl WarehouseFields {
  fn into_patch(self) -> WarehousePatch {
    WarehousePatch {
      name: self.name,
      kind: self.kind,
    }
  }
}

#[derive(Subcommand, Debug)]
pub enum DealAction {
  /// List all deals with their mopeds, newest first
  #[command(alias = "ls")]
  List,
  /// Show one deal with its moped
  Show { id: String },
  /// Add a deal (--client-name, --phone and --stage are required)
  Add(DealFields),
  /// Change fields of a deal; an empty value clears an optional field
  Update {
    id: String,
    #[command(flatten)]
    fields: DealFields,
  },
  /// Move a deal to another stage
  Stage { id: String, stage: String },
  /// Delete a deal
  #[command(alias = "rm")]
  Remove { id: String },
}

#[derive(Args, Debug, Default)]
pub struct DealFields {
  #[arg(long)]
  client_name: Option<String>,
  #[arg(long)]
  phone: Option<String>,
  #[arg(long)]
  stage: Option<String>,
  #[arg(long)]
  source: Option<String>,
  #[arg(long)]
  manager: Option<String>,
  /// Id of the rented moped
  #[arg(long)]
  moped: Option<String>,
  #[arg(long)]
  amount: Option<String>,
  #[arg(long)]
  comment: Option<String>,
}

impl DealFields {
  fn into_patch(self) -> DealPatch {
    DealPatch {
      client_name: self.client_name,
      phone: self.phone,
      stage: self.stage,
      source: self.source.map(Some),
      manager: self.manager.map(Some),
      moped_id: self.moped.map(Some),
      amount: self.amount.map(Some),
      comment: self.comment.map(Some),
    }
  }
}

/// Fail unless a required field has non-blank text.
fn require(field: &Option<String>, flag: &str) -> Result<()> {
  match field.as_deref().and_then(normalize_text) {
    Some(_) => Ok(()),
    None => Err(eyre!("{} is required", flag)),
  }
}

/// Execute a parsed command against the stores.
pub async fn run(command: Command, stores: &Stores, out: Output) -> Result<()> {
  match command {
    Command::Mopeds { action } => run_mopeds(action, &stores.mopeds, out).await,
    Command::Contacts { action } => run_contacts(action, &stores.contacts, out).await,
    Command::Warehouses { action } => run_warehouses(action, &stores.warehouses, out).await,
    Command::Deals { action } => run_deals(action, stores, out).await,
  }
}

async fn run_mopeds(
  action: MopedAction,
  store: &CollectionStore<Moped>,
  out: Output,
) -> Result<()> {
  match action {
    MopedAction::List => out.list(&store.list_all().await?, render::moped_line),
    MopedAction::Show { id } => show(store, &id, out, render::moped_detail).await,
    MopedAction::Add(fields) => {
      require(&fields.brand, "--brand")?;
      require(&fields.model, "--model")?;
      require(&fields.license_plate, "--license-plate")?;
      let created = store.create(&fields.into_patch()?).await?;
      out.one(&created, render::moped_detail)
    }
    MopedAction::Update { id, fields } => {
      let updated = store
        .update(&id, &fields.into_patch()?)
        .await
        .map_err(|e| missing_or::<Moped>(e, &id))?;
      out.one(&updated, render::moped_detail)
    }
    MopedAction::Remove { id } => remove(store, &id, out).await,
  }
}

async fn run_contacts(
  action: ContactAction,
  store: &CollectionStore<Contact>,
  out: Output,
) -> Result<()> {
  match action {
    ContactAction::List => out.list(&store.list_all().await?, render::contact_line),
    ContactAction::Show { id } => {
      let contact = store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| eyre!("No contact with id {}", id))?;
      let emergency_contact = store.emergency_contact(&contact).await?;
      out.one(
        &ContactView {
          contact,
          emergency_contact,
        },
        render::contact_view_detail,
      )
    }
    ContactAction::Find { name, phone } => {
      if name.is_none() && phone.is_none() {
        return Err(eyre!("Pass --name, --phone or both"));
      }
      match store
        .find_by_name_or_phone(name.as_deref(), phone.as_deref())
        .await?
      {
        Some(contact) => out.one(&contact, render::contact_detail),
        None => out.message("No matching contact"),
      }
    }
    ContactAction::Add(fields) => {
      require(&fields.name, "--name")?;
      require(&fields.phone, "--phone")?;
      let created = store.create(&fields.into_patch()).await?;
      out.one(&created, render::contact_detail)
    }
    ContactAction::Update { id, fields } => {
      let updated = store
        .update(&id, &fields.into_patch())
        .await
        .map_err(|e| missing_or::<Contact>(e, &id))?;
      out.one(&updated, render::contact_detail)
    }
    ContactAction::Remove { id } => remove(store, &id, out).await,
  }
}

async fn run_warehouses(
  action: WarehouseAction,
  store: &CollectionStore<Warehouse>,
  out: Output,
) -> Result<()> {
  match action {
    WarehouseAction::List => out.list(&store.list_all().await?, render::warehouse_line),
    WarehouseAction::Show { id } => show(store, &id, out, render::warehouse_detail).await,
    WarehouseAction::Add(fields) => {
      require(&fields.name, "--name")?;
      require(&fields.kind, "--type")?;
      let created = store.create(&fields.into_patch()).await?;
      out.one(&created, render::warehouse_detail)
    }
    WarehouseAction::Update { id, fields } => {
      let updated = store
        .update(&id, &fields.into_patch())
        .await
        .map_err(|e| missing_or::<Warehouse>(e, &id))?;
      out.one(&updated, render::warehouse_detail)
    }
    WarehouseAction::Remove { id } => remove(store, &id, out).await,
  }
}

async fn run_deals(action: DealAction, stores: &Stores, out: Output) -> Result<()> {
  let board = &stores.board;
  match action {
    DealAction::List => {
      let views: Vec<DealView> = board
        .list_with_mopeds()
        .await?
        .into_iter()
        .map(|(deal, moped)| DealView { deal, moped })
        .collect();
      out.list(&views, render::deal_line)
    }
    DealAction::Show { id } => {
      let (deal, moped) = board
        .show(&id)
        .await?
        .ok_or_else(|| eyre!("No deal with id {}", id))?;
      out.one(&DealView { deal, moped }, render::deal_detail)
    }
    DealAction::Add(fields) => {
      require(&fields.client_name, "--client-name")?;
      require(&fields.phone, "--phone")?;
      require(&fields.stage, "--stage")?;
      let deal = stores.deals.create(&fields.into_patch()).await?;
      let moped = board.moped_for(&deal).await?;
      out.one(&DealView { deal, moped }, render::deal_detail)
    }
    DealAction::Update { id, fields } => {
      let deal = stores
        .deals
        .update(&id, &fields.into_patch())
        .await
        .map_err(|e| missing_or::<Deal>(e, &id))?;
      let moped = board.moped_for(&deal).await?;
      out.one(&DealView { deal, moped }, render::deal_detail)
    }
    DealAction::Stage { id, stage } => {
      let deal = board
        .move_to_stage(&id, &stage)
        .await
        .map_err(|e| missing_or::<Deal>(e, &id))?;
      out.message(&format!("Deal {} moved to {}", deal.id, deal.stage))
    }
    DealAction::Remove { id } => remove(&stores.deals, &id, out).await,
  }
}

/// Turn a missing-record failure into a plain "no such id" message.
fn missing_or<E: Entity>(err: StoreError, id: &str) -> Report {
  if err.is_not_found() {
    eyre!("No {} with id {}", E::entity_type(), id)
  } else {
    err.into()
  }
}

async fn show<E: Entity + Serialize>(
  store: &CollectionStore<E>,
  id: &str,
  out: Output,
  detail: fn(&E) -> String,
) -> Result<()> {
  match store.find_by_id(id).await? {
    Some(entity) => out.one(&entity, detail),
    None => Err(eyre!("No {} with id {}", E::entity_type(), id)),
  }
}

async fn remove<E: Entity>(store: &CollectionStore<E>, id: &str, out: Output) -> Result<()> {
  store.remove(id).await?;
  out.message(&format!("Removed {} {}", E::entity_type(), id))
}
