//! Writes parsed records through an [`InventoryStore`].
//!
//! Best effort: a record that cannot be resolved or inserted is counted and
//! the run moves on. Re-running the same workbook is a no-op because active
//! items are matched by name before inserting.

use std::collections::HashMap;
use std::fmt;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument, warn};

use npi_core::{CategoryId, LocationId, SubCategoryId};
use npi_infra::{InventoryStore, StoreResult};
use npi_inventory::{ItemDetails, NewItem, StockMovement};

use crate::error::ImportError;
use crate::normalize::DEFAULT_LOCATION;
use crate::sheet::{ImportRecord, ParsedSheet};

pub const INITIAL_MOVEMENT_NOTE: &str = "Initial seed from Excel import";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub parsed: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub errors: usize,
    /// Flagged records: parsed ones on a dry run, inserted ones otherwise.
    pub needs_review: usize,
}

impl ImportCounts {
    fn add(&mut self, other: &ImportCounts) {
        self.parsed += other.parsed;
        self.inserted += other.inserted;
        self.skipped += other.skipped;
        self.errors += other.errors;
        self.needs_review += other.needs_review;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetSummary {
    pub sheet: String,
    pub category: String,
    #[serde(flatten)]
    pub counts: ImportCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub sheets: Vec<SheetSummary>,
    pub total: ImportCounts,
}

impl ImportSummary {
    fn push(&mut self, sheet: SheetSummary) {
        self.total.add(&sheet.counts);
        self.sheets.push(sheet);
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<16} {:<12} {:>7} {:>9} {:>8} {:>7} {:>7}",
            "sheet", "category", "parsed", "inserted", "skipped", "errors", "review"
        )?;
        let row = |f: &mut fmt::Formatter<'_>, sheet: &str, category: &str, c: &ImportCounts| {
            writeln!(
                f,
                "{:<16} {:<12} {:>7} {:>9} {:>8} {:>7} {:>7}",
                sheet, category, c.parsed, c.inserted, c.skipped, c.errors, c.needs_review
            )
        };
        for s in &self.sheets {
            row(f, &s.sheet, &s.category, &s.counts)?;
        }
        row(f, "total", "", &self.total)
    }
}

/// Summary of a parse without touching the datastore.
pub fn dry_run_summary(sheets: &[ParsedSheet]) -> ImportSummary {
    let mut summary = ImportSummary::default();
    for sheet in sheets {
        summary.push(SheetSummary {
            sheet: sheet.name.clone(),
            category: sheet.category.clone(),
            counts: ImportCounts {
                parsed: sheet.records.len(),
                needs_review: sheet.records.iter().filter(|r| r.needs_review).count(),
                ..ImportCounts::default()
            },
        });
    }
    summary
}

/// Name-keyed reference data, matched case-insensitively.
struct Lookups {
    categories: HashMap<String, CategoryId>,
    sub_categories: HashMap<(CategoryId, String), SubCategoryId>,
    locations: HashMap<String, LocationId>,
}

impl Lookups {
    async fn load(store: &impl InventoryStore) -> StoreResult<Self> {
        let categories = store
            .categories()
            .await?
            .into_iter()
            .map(|c| (key(&c.name), c.id))
            .collect();
        let sub_categories = store
            .sub_categories()
            .await?
            .into_iter()
            .map(|s| ((s.category_id, key(&s.name)), s.id))
            .collect();
        let locations = store
            .locations()
            .await?
            .into_iter()
            .map(|l| (key(&l.name), l.id))
            .collect();
        Ok(Self {
            categories,
            sub_categories,
            locations,
        })
    }

    fn location(&self, name: &str) -> Option<LocationId> {
        self.locations
            .get(&key(name))
            .or_else(|| self.locations.get(&key(DEFAULT_LOCATION)))
            .copied()
    }

    fn sub_category(&self, category: CategoryId, name: Option<&str>) -> Option<SubCategoryId> {
        name.and_then(|n| self.sub_categories.get(&(category, key(n))).copied())
    }
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

enum Outcome {
    Inserted { needs_review: bool },
    Skipped,
    Failed,
}

pub struct Loader<S> {
    store: S,
}

impl<S: InventoryStore> Loader<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_store(self) -> S {
        self.store
    }

    #[instrument(skip_all, fields(sheets = sheets.len()), err)]
    pub async fn load(&self, sheets: &[ParsedSheet]) -> Result<ImportSummary, ImportError> {
        let lookups = Lookups::load(&self.store).await.map_err(ImportError::Lookup)?;

        let mut summary = ImportSummary::default();
        for sheet in sheets {
            let mut counts = ImportCounts {
                parsed: sheet.records.len(),
                ..ImportCounts::default()
            };
            for record in &sheet.records {
                match self.load_record(&lookups, record).await {
                    Outcome::Inserted { needs_review } => {
                        counts.inserted += 1;
                        counts.needs_review += usize::from(needs_review);
                    }
                    Outcome::Skipped => counts.skipped += 1,
                    Outcome::Failed => counts.errors += 1,
                }
            }
            info!(
                sheet = %sheet.name,
                inserted = counts.inserted,
                skipped = counts.skipped,
                errors = counts.errors,
                "sheet imported"
            );
            summary.push(SheetSummary {
                sheet: sheet.name.clone(),
                category: sheet.category.clone(),
                counts,
            });
        }
        Ok(summary)
    }

    async fn load_record(&self, lookups: &Lookups, record: &ImportRecord) -> Outcome {
        let Some(&category_id) = lookups.categories.get(&key(&record.category)) else {
            warn!(item = %record.name, category = %record.category, "unknown category, skipping");
            return Outcome::Skipped;
        };
        let Some(location_id) = lookups.location(&record.location) else {
            warn!(item = %record.name, location = %record.location, "no location to file under, skipping");
            return Outcome::Skipped;
        };

        match self.store.find_active_by_name(&record.name).await {
            Ok(Some(_)) => {
                info!(item = %record.name, "already imported, skipping");
                return Outcome::Skipped;
            }
            Ok(None) => {}
            Err(error) => {
                warn!(item = %record.name, %error, "duplicate check failed");
                return Outcome::Failed;
            }
        }

        let mut item = NewItem::new(
            ItemDetails {
                name: record.name.clone(),
                category_id,
                sub_category_id: lookups.sub_category(category_id, record.sub_category.as_deref()),
                location_id,
                uom: record.uom.clone(),
                desired_count: record.desired_count,
                reorder_point: None,
                unit_cost: record.unit_cost.unwrap_or(0.0),
                gram_conversion: record.gram_conversion,
            },
            record.count,
        );
        item.pkg_size = record.pkg_size;
        item.price = record.price;
        item.lead_time = record.lead_time.clone();
        item.source = record.source.clone();
        item.staff = record.staff.clone();
        item.notes = record.notes.clone();
        item.needs_review = record.needs_review;
        item.review_source = record.review_source.clone();

        let inserted = match self.store.insert_item(item, None).await {
            Ok(inserted) => inserted,
            Err(error) => {
                warn!(item = %record.name, %error, "insert failed");
                return Outcome::Failed;
            }
        };

        if inserted.count > 0.0 {
            let movement = StockMovement::initial(
                inserted.id,
                inserted.count,
                Some(INITIAL_MOVEMENT_NOTE.to_string()),
                None,
                Utc::now(),
            );
            let recorded = match movement {
                Ok(movement) => self.store.record_movement(movement).await,
                Err(e) => Err(e.into()),
            };
            if let Err(error) = recorded {
                warn!(item = %record.name, %error, "initial movement not recorded");
            }
        }

        Outcome::Inserted {
            needs_review: inserted.needs_review,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use npi_infra::InMemoryInventoryStore;
    use npi_inventory::MovementType;

    fn record(name: &str, category: &str) -> ImportRecord {
        ImportRecord {
            name: name.to_string(),
            category: category.to_string(),
            sub_category: None,
            location: "Gummy Room".to_string(),
            count: 4.0,
            uom: "ea".to_string(),
            pkg_size: None,
            price: None,
            unit_cost: Some(1.5),
            desired_count: Some(10.0),
            lead_time: None,
            source: None,
            staff: None,
            gram_conversion: None,
            notes: None,
            needs_review: false,
            review_source: None,
        }
    }

    fn sheet(name: &str, category: &str, records: Vec<ImportRecord>) -> ParsedSheet {
        ParsedSheet {
            name: name.to_string(),
            category: category.to_string(),
            records,
        }
    }

    #[tokio::test]
    async fn duplicate_names_store_a_single_item() {
        let loader = Loader::new(InMemoryInventoryStore::seeded());
        let sheets = vec![sheet(
            "Packaging",
            "Packaging",
            vec![record("Jar Lids", "Packaging"), record("jar lids", "Packaging")],
        )];

        let first = loader.load(&sheets).await.unwrap();
        assert_eq!(first.total.inserted, 1);
        assert_eq!(first.total.skipped, 1);

        let again = loader.load(&sheets).await.unwrap();
        assert_eq!(again.total.inserted, 0);
        assert_eq!(again.total.skipped, 2);

        let items = loader.into_store().list_items().await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn inserted_items_get_an_initial_movement() {
        let loader = Loader::new(InMemoryInventoryStore::seeded());
        let mut empty = record("Gloves", "Supplies");
        empty.count = 0.0;
        let sheets = vec![sheet(
            "Other Supplies",
            "Supplies",
            vec![record("Tape", "Supplies"), empty],
        )];
        loader.load(&sheets).await.unwrap();

        let store = loader.into_store();
        let movements = store.recent_movements(10).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].movement_type, MovementType::Initial);
        assert_eq!(movements[0].new_count, 4.0);
        assert_eq!(movements[0].notes.as_deref(), Some(INITIAL_MOVEMENT_NOTE));
    }

    #[tokio::test]
    async fn unknown_category_is_skipped_and_unknown_location_falls_back() {
        let loader = Loader::new(InMemoryInventoryStore::seeded());
        let mut elsewhere = record("Funnel", "Supplies");
        elsewhere.location = "Loading Dock".to_string();
        let sheets = vec![sheet(
            "Other Supplies",
            "Supplies",
            vec![record("Mystery", "Gadgets"), elsewhere],
        )];

        let summary = loader.load(&sheets).await.unwrap();
        assert_eq!(summary.total.skipped, 1);
        assert_eq!(summary.total.inserted, 1);

        let items = loader.into_store().list_items().await.unwrap();
        assert_eq!(items[0].location.as_deref(), Some("Rear Storage"));
    }

    #[tokio::test]
    async fn rows_outside_form_limits_are_imported_verbatim() {
        let loader = Loader::new(InMemoryInventoryStore::seeded());
        let long_name = "L".repeat(120);
        let mut long = record(&long_name, "Supplies");
        long.count = 3.0;
        let mut negative = record("Tape", "Supplies");
        negative.count = -2.0;
        negative.unit_cost = Some(-0.5);
        negative.desired_count = Some(-1.0);

        let summary = loader
            .load(&[sheet("Other Supplies", "Supplies", vec![long, negative])])
            .await
            .unwrap();
        assert_eq!(summary.total.inserted, 2);
        assert_eq!(summary.total.errors, 0);

        let store = loader.into_store();
        let items = store.list_items().await.unwrap();
        let tape = items.iter().find(|i| i.name == "Tape").unwrap();
        assert_eq!(tape.count, -2.0);
        assert_eq!(tape.unit_cost, -0.5);
        assert!(items.iter().any(|i| i.name == long_name));

        // Only the positive count opens with a movement.
        let movements = store.recent_movements(10).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].new_count, 3.0);
    }

    #[tokio::test]
    async fn rows_without_a_fallback_location_are_skipped() {
        let seeded = InMemoryInventoryStore::seeded();
        let categories = seeded.categories().await.unwrap();
        let office: Vec<_> = seeded
            .locations()
            .await
            .unwrap()
            .into_iter()
            .filter(|l| l.name == "Office")
            .collect();
        let loader = Loader::new(InMemoryInventoryStore::with_reference_data(
            categories,
            Vec::new(),
            office,
        ));
        let mut nowhere = record("Funnel", "Supplies");
        nowhere.location = "Loading Dock".to_string();
        let mut filed = record("Gloves", "Supplies");
        filed.location = "office".to_string();

        let summary = loader
            .load(&[sheet("Other Supplies", "Supplies", vec![nowhere, filed])])
            .await
            .unwrap();
        assert_eq!(summary.total.skipped, 1);
        assert_eq!(summary.total.inserted, 1);

        let items = loader.into_store().list_items().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].location.as_deref(), Some("Office"));
    }

    #[tokio::test]
    async fn flagged_records_reach_the_review_queue() {
        let loader = Loader::new(InMemoryInventoryStore::seeded());
        let mut flagged = record("Front Label", "Labels");
        flagged.needs_review = true;
        flagged.review_source = Some("audit".to_string());

        let summary = loader
            .load(&[sheet("Labels", "Labels", vec![flagged, record("Back Label", "Labels")])])
            .await
            .unwrap();
        assert_eq!(summary.sheets[0].counts.inserted, 2);
        assert_eq!(summary.total.needs_review, 1);

        let queue = loader.into_store().review_queue().await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].review_source.as_deref(), Some("audit"));
    }

    #[test]
    fn dry_run_counts_without_writes() {
        let mut flagged = record("Front Label", "Labels");
        flagged.needs_review = true;
        let summary = dry_run_summary(&[
            sheet("Labels", "Labels", vec![flagged, record("Back Label", "Labels")]),
            sheet("Packaging", "Packaging", vec![record("Jar Lids", "Packaging")]),
        ]);
        assert_eq!(summary.total.parsed, 3);
        assert_eq!(summary.total.needs_review, 1);
        assert_eq!(summary.total.inserted, 0);
        assert!(summary.to_string().contains("total"));
    }
}
