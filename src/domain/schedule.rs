use crate::domain::money::Balance;
use crate::error::{FeeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// The fee categories a class schedule can bill for.
///
/// A closed enum rather than free-form strings: a payment tagged with a
/// category that does not exist cannot be constructed, so allocation never
/// has to guess about typos in billable category names.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Tuition,
    Materials,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::Tuition => write!(f, "tuition"),
            CategoryKind::Materials => write!(f, "materials"),
        }
    }
}

/// One billable line of a class schedule: a category and the amount owed.
///
/// Deserializes through `try_from` so a catalog file cannot smuggle in a
/// negative due amount.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(try_from = "RawFeeCategory")]
pub struct FeeCategory {
    pub kind: CategoryKind,
    pub due: Balance,
}

#[derive(Deserialize)]
struct RawFeeCategory {
    kind: CategoryKind,
    due: Balance,
}

impl TryFrom<RawFeeCategory> for FeeCategory {
    type Error = FeeError;

    fn try_from(raw: RawFeeCategory) -> Result<Self> {
        Self::new(raw.kind, raw.due)
    }
}

impl FeeCategory {
    pub fn new(kind: CategoryKind, due: Balance) -> Result<Self> {
        if due < Balance::ZERO {
            return Err(FeeError::Validation(format!(
                "due amount for {kind} must not be negative"
            )));
        }
        Ok(Self { kind, due })
    }
}

/// The fee structure of a single class: an ordered list of categories with
/// unique kinds. The uniqueness check also runs on deserialization.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(try_from = "RawFeeSchedule")]
pub struct FeeSchedule {
    categories: Vec<FeeCategory>,
}

#[derive(Deserialize)]
struct RawFeeSchedule {
    categories: Vec<FeeCategory>,
}

impl TryFrom<RawFeeSchedule> for FeeSchedule {
    type Error = FeeError;

    fn try_from(raw: RawFeeSchedule) -> Result<Self> {
        Self::new(raw.categories)
    }
}

impl FeeSchedule {
    pub fn new(categories: Vec<FeeCategory>) -> Result<Self> {
        for (i, c) in categories.iter().enumerate() {
            if categories[..i].iter().any(|other| other.kind == c.kind) {
                return Err(FeeError::Validation(format!(
                    "duplicate category {} in schedule",
                    c.kind
                )));
            }
        }
        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[FeeCategory] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total owed across all categories.
    pub fn total_due(&self) -> Balance {
        self.categories
            .iter()
            .fold(Balance::ZERO, |acc, c| acc + c.due)
    }
}

/// Class-to-schedule catalog with a default schedule for classes that have
/// no explicit entry. The default must be non-empty so a lookup can never
/// produce a schedule with nothing to allocate against.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(try_from = "RawFeeCatalog")]
pub struct FeeCatalog {
    classes: HashMap<String, FeeSchedule>,
    default: FeeSchedule,
}

#[derive(Deserialize)]
struct RawFeeCatalog {
    classes: HashMap<String, FeeSchedule>,
    default: FeeSchedule,
}

impl TryFrom<RawFeeCatalog> for FeeCatalog {
    type Error = FeeError;

    fn try_from(raw: RawFeeCatalog) -> Result<Self> {
        Self::new(raw.classes, raw.default)
    }
}

impl FeeCatalog {
    pub fn new(classes: HashMap<String, FeeSchedule>, default: FeeSchedule) -> Result<Self> {
        if default.is_empty() {
            return Err(FeeError::Validation(
                "default fee schedule must not be empty".to_string(),
            ));
        }
        Ok(Self { classes, default })
    }

    /// Loads a catalog from a JSON file. Deserialization runs through the
    /// constructors, so a file with a negative due, duplicate categories
    /// or an empty default schedule is rejected.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn lookup(&self, class_id: &str) -> &FeeSchedule {
        self.classes.get(class_id).unwrap_or(&self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn schedule(tuition: rust_decimal::Decimal, materials: rust_decimal::Decimal) -> FeeSchedule {
        FeeSchedule::new(vec![
            FeeCategory::new(CategoryKind::Tuition, Balance::new(tuition)).unwrap(),
            FeeCategory::new(CategoryKind::Materials, Balance::new(materials)).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let result = FeeSchedule::new(vec![
            FeeCategory::new(CategoryKind::Tuition, Balance::new(dec!(100))).unwrap(),
            FeeCategory::new(CategoryKind::Tuition, Balance::new(dec!(200))).unwrap(),
        ]);
        assert!(matches!(result, Err(FeeError::Validation(_))));
    }

    #[test]
    fn test_total_due() {
        let s = schedule(dec!(20000), dec!(6500));
        assert_eq!(s.total_due(), Balance::new(dec!(26500)));
    }

    #[test]
    fn test_catalog_falls_back_to_default() {
        let mut classes = HashMap::new();
        classes.insert("grade-5".to_string(), schedule(dec!(20000), dec!(6500)));
        let catalog = FeeCatalog::new(classes, schedule(dec!(15000), dec!(5000))).unwrap();

        assert_eq!(
            catalog.lookup("grade-5").total_due(),
            Balance::new(dec!(26500))
        );
        // Unknown class gets the default schedule, never an empty one.
        let fallback = catalog.lookup("grade-99");
        assert!(!fallback.is_empty());
        assert_eq!(fallback.total_due(), Balance::new(dec!(20000)));
    }

    #[test]
    fn test_empty_default_rejected() {
        let result = FeeCatalog::new(HashMap::new(), FeeSchedule::new(vec![]).unwrap());
        assert!(matches!(result, Err(FeeError::Validation(_))));
    }

    #[test]
    fn test_deserialize_rejects_negative_due() {
        let json = r#"{"categories":[{"kind":"tuition","due":"-500"}]}"#;
        assert!(serde_json::from_str::<FeeSchedule>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_duplicate_categories() {
        let json = r#"{"categories":[
            {"kind":"materials","due":"6500"},
            {"kind":"materials","due":"6500"}]}"#;
        assert!(serde_json::from_str::<FeeSchedule>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_empty_default() {
        let json = r#"{"classes":{},"default":{"categories":[]}}"#;
        assert!(serde_json::from_str::<FeeCatalog>(json).is_err());
    }

    #[test]
    fn test_catalog_file_with_invalid_schedule_rejected() {
        // A hand-edited catalog file must not load with a negative due or
        // a repeated category; allocation would otherwise report negative
        // paid amounts for students with no payments.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fees.json");
        std::fs::write(
            &path,
            r#"{"classes":{},"default":{"categories":[
                {"kind":"tuition","due":"-500"},
                {"kind":"materials","due":"6500"},
                {"kind":"materials","due":"6500"}]}}"#,
        )
        .unwrap();

        assert!(matches!(
            FeeCatalog::from_json_file(&path),
            Err(FeeError::Json(_))
        ));
    }

    #[test]
    fn test_catalog_json_round_trip() {
        let mut classes = HashMap::new();
        classes.insert("grade-5".to_string(), schedule(dec!(20000), dec!(6500)));
        let catalog = FeeCatalog::new(classes, schedule(dec!(15000), dec!(5000))).unwrap();

        let json = serde_json::to_string(&catalog).unwrap();
        let parsed: FeeCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.lookup("grade-5"), catalog.lookup("grade-5"));
    }
}
