//! Florida county profile data.
//!
//! Adding a county means adding a profile here; no other module changes.

use flparcel_core::{CanonicalField as F, CountyKey};

use crate::registry::{
    Coercion as C, CountyProfile, CountyStatus, DispatchPolicy, FieldRule, IdPattern,
    QueryIdStyle, RelatedTable, Segment, ServiceEndpoint,
};

const SWFWMD_PARCEL_SEARCH: &str =
    "https://www25.swfwmd.state.fl.us/arcgis12/rest/services/BaseVector/parcel_search/MapServer";
const PINELLAS_ACCELA: &str =
    "https://egis.pinellas.gov/gis/rest/services/Accela/AccelaAddressParcel/MapServer";
const MANATEE_PLANNING: &str =
    "https://www.mymanatee.org/gisits/rest/services/opendata/Planning/MapServer";

/// Attribute schema shared by the water management district's county parcel
/// layers (Hillsborough and Pasco).
const SWFWMD_FIELDS: &[FieldRule] = &[
    FieldRule::layer(F::OwnerName, "OWNERNAME", C::Trim),
    FieldRule::layer(F::MailingStreet, "OWNERADD1", C::Trim),
    FieldRule::layer(F::MailingCity, "OWNERCITY", C::Trim),
    FieldRule::layer(F::MailingState, "OWNERSTATE", C::Trim),
    FieldRule::layer(F::MailingZip, "OWNERZIP", C::Trim),
    FieldRule::layer(F::SiteAddress, "SITUSADD1", C::Trim),
    FieldRule::layer(F::SiteAddress, "SITEADD", C::Trim),
    FieldRule::layer(F::SiteCity, "SCITY", C::Trim),
    FieldRule::layer(F::SiteZip, "SZIP", C::Trim),
    FieldRule::layer(F::Acreage, "ACRES", C::Decimal),
    FieldRule::layer(F::LandAreaSqft, "AREANO", C::Decimal),
    FieldRule::layer(F::LandUseCode, "DOR4CODE", C::Trim),
    FieldRule::layer(F::LandUseDescription, "PARUSEDESC", C::Trim),
    FieldRule::layer(F::LegalDescription, "LEGDECFULL", C::Trim),
    FieldRule::layer(F::LegalDescription2, "LEGAL2", C::Trim),
    FieldRule::layer(F::Subdivision, "SUBDIV_NM", C::Trim),
    FieldRule::layer(F::Block, "BLOCK", C::Trim),
    FieldRule::layer(F::Lot, "LOT", C::Trim),
    FieldRule::layer(F::Section, "S_SECTION", C::Trim),
    FieldRule::layer(F::Township, "S_TOWNSHIP", C::Trim),
    FieldRule::layer(F::Range, "S_RANGE", C::Trim),
    FieldRule::layer(F::YearBuilt, "YRBLT_ACT", C::Integer),
    FieldRule::layer(F::BuildingCount, "NO_BULDNG", C::Integer),
    FieldRule::layer(F::UnitCount, "NO_RES_UNITS", C::Integer),
    FieldRule::layer(F::LivingAreaSqft, "TOT_LVG_AREA", C::Integer),
    FieldRule::layer(F::ZoningCode, "ZONING", C::Trim),
    FieldRule::layer(F::LandValue, "ASSD_LND", C::Currency),
    FieldRule::layer(F::BuildingValue, "ASSD_BLD", C::Currency),
    FieldRule::layer(F::TotalAssessedValue, "ASSD_TOT", C::Currency),
    FieldRule::layer(F::MarketValue, "PARVAL", C::Currency),
    FieldRule::layer(F::LastSaleDate, "SALE1_DATE", C::Date),
    FieldRule::layer(F::LastSaleAmount, "SALE1_AMT", C::Currency),
    FieldRule::layer(F::PropertyCardUrl, "PAWEBPAGE", C::Trim),
];

/// Pinellas splits its data between the Accela parcel layer and the property
/// appraiser's general table, reached through relationship 0.
const PINELLAS_FIELDS: &[FieldRule] = &[
    FieldRule::related(F::OwnerName, "OWNERNAME", C::Trim),
    FieldRule::related(F::MailingStreet, "OWNERADD1", C::Trim),
    FieldRule::related(F::MailingCity, "OWNERCITY", C::Trim),
    FieldRule::related(F::MailingState, "OWNERSTATE", C::Trim),
    FieldRule::related(F::MailingZip, "OWNERZIP", C::Trim),
    FieldRule::related(F::SiteAddress, "SITUSSTREET", C::Trim),
    FieldRule::layer(F::SiteCity, "PGIS.PGIS.AccelaParcels.JURISDICTION", C::Trim),
    FieldRule::related(F::SiteCity, "SITUSCITY", C::Trim),
    FieldRule::related(F::SiteZip, "SITUSZIP", C::Trim),
    FieldRule::layer(F::Acreage, "PGIS.PGIS.AccelaParcels.STATEDAREA", C::Measure),
    FieldRule::layer(F::LandUseCode, "PGIS.PGIS.AccelaParcels.PAO_USECODE", C::Trim),
    FieldRule::layer(F::LegalDescription, "PGIS.PGIS.AccelaParcels.LEGAL", C::Trim),
    FieldRule::related(F::LegalDescription, "LEGALDESC", C::Trim),
    FieldRule::layer(F::Subdivision, "PGIS.PGIS.AccelaParcels.SUBDIVISION", C::Trim),
    FieldRule::layer(F::Block, "PGIS.PGIS.AccelaParcels.BK", C::Trim),
    FieldRule::layer(F::Lot, "PGIS.PGIS.AccelaParcels.LOT", C::Trim),
    FieldRule::layer(F::Section, "PGIS.PGIS.AccelaParcels.SC", C::Trim),
    FieldRule::layer(F::Township, "PGIS.PGIS.AccelaParcels.TW", C::Trim),
    FieldRule::layer(F::Range, "PGIS.PGIS.AccelaParcels.RG", C::Trim),
    FieldRule::layer(F::FloodZone, "PGIS.PGIS.AccelaParcels.FLOOD_ZONE", C::Trim),
    FieldRule::related(F::YearBuilt, "YRBLT", C::Integer),
    FieldRule::related(F::BuildingCount, "BLDGCNT", C::Integer),
    FieldRule::related(F::UnitCount, "UNITS", C::Integer),
    FieldRule::related(F::LivingAreaSqft, "TOTLIVAREA", C::Integer),
    FieldRule::layer(F::ZoningCode, "PGIS.PGIS.AccelaParcels.ZONECLASS", C::Trim),
    FieldRule::layer(
        F::FutureLandUse,
        "PGIS.PGIS.AccelaParcels.PROPOSEDLANDUSE",
        C::Trim,
    ),
    FieldRule::related(F::LandValue, "LANDVAL", C::Currency),
    FieldRule::related(F::BuildingValue, "BLDGVAL", C::Currency),
    FieldRule::related(F::TotalAssessedValue, "JUSTVAL", C::Currency),
    FieldRule::related(F::MarketValue, "ASMTVAL", C::Currency),
    FieldRule::related(F::LastSaleDate, "SALEDT1", C::Date),
    FieldRule::related(F::LastSaleAmount, "SALEPRICE1", C::Currency),
];

const MANATEE_FIELDS: &[FieldRule] = &[
    FieldRule::layer(F::OwnerName, "OWNER", C::Trim),
    FieldRule::layer(F::MailingStreet, "MAILING_ADDRESS", C::Trim),
    FieldRule::layer(F::MailingCity, "MAIL_CITY", C::Trim),
    FieldRule::layer(F::MailingState, "MAIL_STATE", C::Trim),
    FieldRule::layer(F::MailingZip, "MAIL_ZIP", C::Trim),
    FieldRule::layer(F::SiteAddress, "PRIMARY_ADDRESS", C::Trim),
    FieldRule::layer(F::SiteCity, "PROP_CITYNAME", C::Trim),
    FieldRule::layer(F::SiteZip, "PROP_ZIP", C::Trim),
    FieldRule::layer(F::Acreage, "ACRES", C::Decimal),
    FieldRule::layer(F::LandAreaSqft, "AREA_SQFT", C::Decimal),
    FieldRule::layer(F::LandUseCode, "DOR_UC", C::Trim),
    FieldRule::layer(F::LegalDescription, "LEGAL_DESCRIPTION", C::Trim),
    FieldRule::layer(F::Subdivision, "SUBDIVISION", C::Trim),
    FieldRule::layer(F::Block, "BLOCK", C::Trim),
    FieldRule::layer(F::Lot, "LOT", C::Trim),
    FieldRule::layer(F::Section, "SECTION", C::Trim),
    FieldRule::layer(F::Township, "TOWNSHIP", C::Trim),
    FieldRule::layer(F::Range, "RANGE", C::Trim),
    FieldRule::layer(F::YearBuilt, "YR_BLT", C::Integer),
    FieldRule::layer(F::BuildingCount, "NO_BLDG", C::Integer),
    FieldRule::layer(F::UnitCount, "NO_RES_UNTS", C::Integer),
    FieldRule::layer(F::LivingAreaSqft, "TOT_LVG_AREA", C::Integer),
    FieldRule::layer(F::ZoningCode, "ZONING", C::Trim),
    FieldRule::layer(F::FutureLandUse, "FUTURE_LAND_USE", C::Trim),
    FieldRule::layer(F::LandValue, "LAND_VALUE", C::Currency),
    FieldRule::layer(F::BuildingValue, "BLDG_VALUE", C::Currency),
    FieldRule::layer(F::TotalAssessedValue, "JUST_VALUE", C::Currency),
    FieldRule::layer(F::MarketValue, "MARKET_VALUE", C::Currency),
    FieldRule::layer(F::LastSaleDate, "SALE_DATE", C::Date),
    FieldRule::layer(F::LastSaleAmount, "SALE_PRC", C::Currency),
];

const HILLSBOROUGH_SEGMENTS: &[Segment] = &[
    Segment::digits(2),
    Segment::digits(2),
    Segment::digits(2),
    Segment::digits(5),
    Segment::digits(3),
    Segment::digits(1),
];

const PINELLAS_SEGMENTS: &[Segment] = &[
    Segment::digits(2),
    Segment::digits(2),
    Segment::digits(2),
    Segment::digits(5),
    Segment::digits(3),
    Segment::digits(4),
];

const MANATEE_SEGMENTS: &[Segment] = &[Segment::digits(10)];

const PASCO_SEGMENTS: &[Segment] = &[
    Segment::digits(2),
    Segment::digits(2),
    Segment::digits(2),
    Segment::digits(2),
    Segment::digits(3),
    Segment::digits(3),
    Segment::digits(4),
];

const SARASOTA_SEGMENTS: &[Segment] = &[
    Segment::digits(4),
    Segment::digits(2),
    Segment::digits(4),
    Segment::digits(2),
    Segment::digits(2),
    Segment::digits(4),
    Segment::alphanumeric(1),
];

/// All Florida county profiles, each using `policy` until overridden.
#[must_use]
pub(crate) fn florida(policy: DispatchPolicy) -> Vec<CountyProfile> {
    vec![
        CountyProfile {
            key: CountyKey::Hillsborough,
            status: CountyStatus::Active,
            id_pattern: IdPattern {
                segments: HILLSBOROUGH_SEGMENTS,
                joiners: &['-', '-', '-', '-', '.'],
                query_style: QueryIdStyle::Compact,
                hint: "XX-XX-XX-XXXXX-XXX.X or XXXXXXXXXXXXXXX",
            },
            id_attribute: "PARCELID",
            endpoint: Some(ServiceEndpoint::new(SWFWMD_PARCEL_SEARCH, 7)),
            field_map: SWFWMD_FIELDS,
            related: None,
            property_card_template: None,
            policy,
        },
        CountyProfile {
            key: CountyKey::Pinellas,
            status: CountyStatus::Active,
            id_pattern: IdPattern {
                segments: PINELLAS_SEGMENTS,
                joiners: &['-', '-', '-', '-', '-'],
                query_style: QueryIdStyle::Segmented,
                hint: "XX-XX-XX-XXXXX-XXX-XXXX",
            },
            id_attribute: "PGIS.PGIS.AccelaParcels.PARCELID",
            endpoint: Some(ServiceEndpoint::new(PINELLAS_ACCELA, 1)),
            field_map: PINELLAS_FIELDS,
            related: Some(RelatedTable {
                relationship_id: 0,
                object_id_attribute: "PGIS.PGIS.Parcels.OBJECTID",
            }),
            property_card_template: Some(
                "https://www.pcpao.gov/PropertyDetail?ParcelID={parcel_id}",
            ),
            policy,
        },
        CountyProfile {
            key: CountyKey::Manatee,
            status: CountyStatus::Active,
            id_pattern: IdPattern {
                segments: MANATEE_SEGMENTS,
                joiners: &[],
                query_style: QueryIdStyle::Compact,
                hint: "XXXXXXXXXX (10 digits)",
            },
            id_attribute: "PIN",
            endpoint: Some(ServiceEndpoint::new(MANATEE_PLANNING, 22)),
            field_map: MANATEE_FIELDS,
            related: None,
            property_card_template: None,
            policy,
        },
        CountyProfile {
            key: CountyKey::Pasco,
            status: CountyStatus::Unsupported {
                reason: "Pasco lookups are disabled until its field map is verified",
            },
            id_pattern: IdPattern {
                segments: PASCO_SEGMENTS,
                joiners: &['-', '-', '-', '-', '-', '-'],
                query_style: QueryIdStyle::Compact,
                hint: "XX-XX-XX-XX-XXX-XXX-XXXX",
            },
            id_attribute: "PARCELID",
            endpoint: Some(ServiceEndpoint::new(SWFWMD_PARCEL_SEARCH, 12)),
            field_map: SWFWMD_FIELDS,
            related: None,
            property_card_template: None,
            policy,
        },
        CountyProfile {
            key: CountyKey::Sarasota,
            status: CountyStatus::Unsupported {
                reason: "Sarasota lookups are not available yet",
            },
            id_pattern: IdPattern {
                segments: SARASOTA_SEGMENTS,
                joiners: &['-', '-', '-', '-', '-', '-'],
                query_style: QueryIdStyle::Compact,
                hint: "XXXX-XX-XXXX-XX-XX-XXXX-X",
            },
            id_attribute: "ID",
            endpoint: None,
            field_map: &[],
            related: None,
            property_card_template: None,
            policy,
        },
    ]
}
