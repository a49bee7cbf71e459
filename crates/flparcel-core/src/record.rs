//! Canonical, county-agnostic parcel record.
//!
//! Every value in a [`ParcelRecord`] is a [`Field`]: either a concrete typed
//! value or an explicit [`Field::Unknown`]. Nothing in this schema uses zero or
//! an empty string to stand in for data the county did not provide.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::county::CountyKey;

/// Version of the serialized [`ParcelRecord`] layout. Bumped on any breaking
/// change so report and favorites consumers can detect it.
pub const PARCEL_RECORD_SCHEMA_VERSION: u16 = 1;

/// A value that is either known or explicitly unknown.
///
/// Serializes as `{"status": "known", "value": ...}` or `{"status": "unknown"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Field<T> {
    Known(T),
    Unknown,
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Unknown
    }
}

impl<T> Field<T> {
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Field::Unknown)
    }

    #[must_use]
    pub fn as_known(&self) -> Option<&T> {
        match self {
            Field::Known(v) => Some(v),
            Field::Unknown => None,
        }
    }
}

impl<T: std::fmt::Display> Field<T> {
    /// Renders the value, or `"Unknown"`.
    #[must_use]
    pub fn display_or_unknown(&self) -> String {
        match self {
            Field::Known(v) => v.to_string(),
            Field::Unknown => "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailingAddress {
    pub street: Field<String>,
    pub city: Field<String>,
    pub state: Field<String>,
    pub zip: Field<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    pub owner_name: Field<String>,
    pub mailing_address: MailingAddress,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub address: Field<String>,
    pub city: Field<String>,
    pub zip: Field<String>,
    pub acreage: Field<Decimal>,
    pub land_area_sqft: Field<Decimal>,
    pub land_use_code: Field<String>,
    pub land_use_description: Field<String>,
    pub legal_description: Field<String>,
    /// Continuation line some appraisers split the legal description into.
    pub legal_description2: Field<String>,
    pub subdivision: Field<String>,
    pub block: Field<String>,
    pub lot: Field<String>,
    pub section: Field<String>,
    pub township: Field<String>,
    pub range: Field<String>,
    pub flood_zone: Field<String>,
    pub year_built: Field<i64>,
    pub building_count: Field<i64>,
    pub unit_count: Field<i64>,
    pub living_area_sqft: Field<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zoning {
    pub zoning_code: Field<String>,
    pub future_land_use: Field<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub land_value: Field<Decimal>,
    pub building_value: Field<Decimal>,
    pub total_assessed_value: Field<Decimal>,
    pub market_value: Field<Decimal>,
    pub tax_year: Field<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSale {
    pub date: Field<NaiveDate>,
    pub amount: Field<Decimal>,
}

/// The canonical parcel record produced by one successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParcelRecord {
    pub schema_version: u16,
    pub county: CountyKey,
    /// Normalized identifier (separators stripped, upper case).
    pub parcel_id: String,
    /// Identifier rendered in the county's separator format.
    pub display_parcel_id: String,
    pub ownership: Ownership,
    pub site: Site,
    pub zoning: Zoning,
    pub assessment: Assessment,
    pub last_sale: LastSale,
    pub property_card_url: Field<String>,
    /// When the source data was fetched. Consumers use it for staleness display.
    pub source_timestamp: DateTime<Utc>,
}

/// Shape of a canonical field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Date,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Integer => write!(f, "integer"),
            FieldKind::Decimal => write!(f, "decimal"),
            FieldKind::Date => write!(f, "date"),
        }
    }
}

/// Names every populatable slot of a [`ParcelRecord`].
///
/// County field maps refer to these names; nothing outside the record builder
/// needs to know where a slot lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    OwnerName,
    MailingStreet,
    MailingCity,
    MailingState,
    MailingZip,
    SiteAddress,
    SiteCity,
    SiteZip,
    Acreage,
    LandAreaSqft,
    LandUseCode,
    LandUseDescription,
    LegalDescription,
    LegalDescription2,
    Subdivision,
    Block,
    Lot,
    Section,
    Township,
    Range,
    FloodZone,
    YearBuilt,
    BuildingCount,
    UnitCount,
    LivingAreaSqft,
    ZoningCode,
    FutureLandUse,
    LandValue,
    BuildingValue,
    TotalAssessedValue,
    MarketValue,
    TaxYear,
    LastSaleDate,
    LastSaleAmount,
    PropertyCardUrl,
}

impl CanonicalField {
    #[must_use]
    pub fn kind(self) -> FieldKind {
        use CanonicalField as F;
        match self {
            F::YearBuilt | F::BuildingCount | F::UnitCount | F::LivingAreaSqft | F::TaxYear => {
                FieldKind::Integer
            }
            F::Acreage
            | F::LandAreaSqft
            | F::LandValue
            | F::BuildingValue
            | F::TotalAssessedValue
            | F::MarketValue
            | F::LastSaleAmount => FieldKind::Decimal,
            F::LastSaleDate => FieldKind::Date,
            F::OwnerName
            | F::MailingStreet
            | F::MailingCity
            | F::MailingState
            | F::MailingZip
            | F::SiteAddress
            | F::SiteCity
            | F::SiteZip
            | F::LandUseCode
            | F::LandUseDescription
            | F::LegalDescription
            | F::LegalDescription2
            | F::Subdivision
            | F::Block
            | F::Lot
            | F::Section
            | F::Township
            | F::Range
            | F::FloodZone
            | F::ZoningCode
            | F::FutureLandUse
            | F::PropertyCardUrl => FieldKind::Text,
        }
    }

    /// Dotted path of the slot within the serialized record, e.g.
    /// `"assessment.total_assessed_value"`.
    #[must_use]
    pub fn path(self) -> &'static str {
        use CanonicalField as F;
        match self {
            F::OwnerName => "ownership.owner_name",
            F::MailingStreet => "ownership.mailing_address.street",
            F::MailingCity => "ownership.mailing_address.city",
            F::MailingState => "ownership.mailing_address.state",
            F::MailingZip => "ownership.mailing_address.zip",
            F::SiteAddress => "site.address",
            F::SiteCity => "site.city",
            F::SiteZip => "site.zip",
            F::Acreage => "site.acreage",
            F::LandAreaSqft => "site.land_area_sqft",
            F::LandUseCode => "site.land_use_code",
            F::LandUseDescription => "site.land_use_description",
            F::LegalDescription => "site.legal_description",
            F::LegalDescription2 => "site.legal_description2",
            F::Subdivision => "site.subdivision",
            F::Block => "site.block",
            F::Lot => "site.lot",
            F::Section => "site.section",
            F::Township => "site.township",
            F::Range => "site.range",
            F::FloodZone => "site.flood_zone",
            F::YearBuilt => "site.year_built",
            F::BuildingCount => "site.building_count",
            F::UnitCount => "site.unit_count",
            F::LivingAreaSqft => "site.living_area_sqft",
            F::ZoningCode => "zoning.zoning_code",
            F::FutureLandUse => "zoning.future_land_use",
            F::LandValue => "assessment.land_value",
            F::BuildingValue => "assessment.building_value",
            F::TotalAssessedValue => "assessment.total_assessed_value",
            F::MarketValue => "assessment.market_value",
            F::TaxYear => "assessment.tax_year",
            F::LastSaleDate => "last_sale.date",
            F::LastSaleAmount => "last_sale.amount",
            F::PropertyCardUrl => "property_card_url",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// A coerced value on its way into a [`ParcelRecord`] slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Date(NaiveDate),
}

impl FieldValue {
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Decimal(_) => FieldKind::Decimal,
            FieldValue::Date(_) => FieldKind::Date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} expects a {expected} value, got {actual}")]
pub struct KindMismatch {
    pub field: CanonicalField,
    pub expected: FieldKind,
    pub actual: FieldKind,
}

/// Assembles a [`ParcelRecord`] one canonical field at a time.
///
/// Slots that are never set stay [`Field::Unknown`].
#[derive(Debug, Clone)]
pub struct ParcelRecordBuilder {
    record: ParcelRecord,
}

impl ParcelRecordBuilder {
    #[must_use]
    pub fn new(
        county: CountyKey,
        parcel_id: impl Into<String>,
        display_parcel_id: impl Into<String>,
        source_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            record: ParcelRecord {
                schema_version: PARCEL_RECORD_SCHEMA_VERSION,
                county,
                parcel_id: parcel_id.into(),
                display_parcel_id: display_parcel_id.into(),
                ownership: Ownership::default(),
                site: Site::default(),
                zoning: Zoning::default(),
                assessment: Assessment::default(),
                last_sale: LastSale::default(),
                property_card_url: Field::Unknown,
                source_timestamp,
            },
        }
    }

    /// Stores `value` in the slot named by `field`.
    ///
    /// # Errors
    ///
    /// Returns [`KindMismatch`] if the value's kind does not match the
    /// field's declared [`FieldKind`].
    pub fn set(&mut self, field: CanonicalField, value: FieldValue) -> Result<(), KindMismatch> {
        use CanonicalField as F;

        let mismatch = |actual: FieldKind| KindMismatch {
            field,
            expected: field.kind(),
            actual,
        };

        let r = &mut self.record;
        match value {
            FieldValue::Text(s) => {
                let slot = match field {
                    F::OwnerName => &mut r.ownership.owner_name,
                    F::MailingStreet => &mut r.ownership.mailing_address.street,
                    F::MailingCity => &mut r.ownership.mailing_address.city,
                    F::MailingState => &mut r.ownership.mailing_address.state,
                    F::MailingZip => &mut r.ownership.mailing_address.zip,
                    F::SiteAddress => &mut r.site.address,
                    F::SiteCity => &mut r.site.city,
                    F::SiteZip => &mut r.site.zip,
                    F::LandUseCode => &mut r.site.land_use_code,
                    F::LandUseDescription => &mut r.site.land_use_description,
                    F::LegalDescription => &mut r.site.legal_description,
                    F::LegalDescription2 => &mut r.site.legal_description2,
                    F::Subdivision => &mut r.site.subdivision,
                    F::Block => &mut r.site.block,
                    F::Lot => &mut r.site.lot,
                    F::Section => &mut r.site.section,
                    F::Township => &mut r.site.township,
                    F::Range => &mut r.site.range,
                    F::FloodZone => &mut r.site.flood_zone,
                    F::ZoningCode => &mut r.zoning.zoning_code,
                    F::FutureLandUse => &mut r.zoning.future_land_use,
                    F::PropertyCardUrl => &mut r.property_card_url,
                    _ => return Err(mismatch(FieldKind::Text)),
                };
                *slot = Field::Known(s);
            }
            FieldValue::Integer(n) => {
                let slot = match field {
                    F::YearBuilt => &mut r.site.year_built,
                    F::BuildingCount => &mut r.site.building_count,
                    F::UnitCount => &mut r.site.unit_count,
                    F::LivingAreaSqft => &mut r.site.living_area_sqft,
                    F::TaxYear => &mut r.assessment.tax_year,
                    _ => return Err(mismatch(FieldKind::Integer)),
                };
                *slot = Field::Known(n);
            }
            FieldValue::Decimal(d) => {
                let slot = match field {
                    F::Acreage => &mut r.site.acreage,
                    F::LandAreaSqft => &mut r.site.land_area_sqft,
                    F::LandValue => &mut r.assessment.land_value,
                    F::BuildingValue => &mut r.assessment.building_value,
                    F::TotalAssessedValue => &mut r.assessment.total_assessed_value,
                    F::MarketValue => &mut r.assessment.market_value,
                    F::LastSaleAmount => &mut r.last_sale.amount,
                    _ => return Err(mismatch(FieldKind::Decimal)),
                };
                *slot = Field::Known(d);
            }
            FieldValue::Date(d) => {
                if field != F::LastSaleDate {
                    return Err(mismatch(FieldKind::Date));
                }
                r.last_sale.date = Field::Known(d);
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn build(self) -> ParcelRecord {
        self.record
    }
}
