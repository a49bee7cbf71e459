//! Rendering of parcel records for the terminal.
//!
//! Unknown fields always print as `Unknown`, never as `0` or a blank cell.

use clap::ValueEnum;
use flparcel_core::{Field, ParcelRecord};
use rust_decimal::Decimal;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Markdown,
    Json,
}

/// Renders `record` in the requested format.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub(crate) fn render(record: &ParcelRecord, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(record),
        OutputFormat::Markdown => render_markdown(record),
        OutputFormat::Json => serde_json::to_string_pretty(record)?,
    })
}

/// Label/value rows in display order, grouped by section.
fn sections(record: &ParcelRecord) -> Vec<(&'static str, Vec<(&'static str, String)>)> {
    let site = &record.site;
    let assessment = &record.assessment;
    vec![
        (
            "Ownership",
            vec![
                ("Owner", record.ownership.owner_name.display_or_unknown()),
                ("Mailing address", mailing_address(record)),
            ],
        ),
        (
            "Site",
            vec![
                ("Address", site.address.display_or_unknown()),
                ("City", site.city.display_or_unknown()),
                ("ZIP", site.zip.display_or_unknown()),
                ("Acreage", site.acreage.display_or_unknown()),
                ("Land area (sq ft)", site.land_area_sqft.display_or_unknown()),
                ("Land use code", site.land_use_code.display_or_unknown()),
                ("Land use", site.land_use_description.display_or_unknown()),
                ("Legal description", site.legal_description.display_or_unknown()),
                ("Legal description 2", site.legal_description2.display_or_unknown()),
                ("Subdivision", site.subdivision.display_or_unknown()),
                ("Block", site.block.display_or_unknown()),
                ("Lot", site.lot.display_or_unknown()),
                ("Section-Township-Range", str_location(record)),
                ("Flood zone", site.flood_zone.display_or_unknown()),
                ("Year built", site.year_built.display_or_unknown()),
                ("Buildings", site.building_count.display_or_unknown()),
                ("Units", site.unit_count.display_or_unknown()),
                ("Living area (sq ft)", site.living_area_sqft.display_or_unknown()),
            ],
        ),
        (
            "Zoning",
            vec![
                ("Zoning", record.zoning.zoning_code.display_or_unknown()),
                ("Future land use", record.zoning.future_land_use.display_or_unknown()),
            ],
        ),
        (
            "Assessment",
            vec![
                ("Land value", money(&assessment.land_value)),
                ("Building value", money(&assessment.building_value)),
                ("Total assessed value", money(&assessment.total_assessed_value)),
                ("Market value", money(&assessment.market_value)),
                ("Tax year", assessment.tax_year.display_or_unknown()),
            ],
        ),
        (
            "Last sale",
            vec![
                ("Date", record.last_sale.date.display_or_unknown()),
                ("Amount", money(&record.last_sale.amount)),
            ],
        ),
    ]
}

pub(crate) fn render_text(record: &ParcelRecord) -> String {
    let mut out = format!(
        "Parcel {} ({} County)\n",
        record.display_parcel_id, record.county
    );
    for (title, rows) in sections(record) {
        out.push('\n');
        out.push_str(title);
        out.push('\n');
        for (label, value) in rows {
            out.push_str(&format!("  {label:<24}{value}\n"));
        }
    }
    out.push('\n');
    out.push_str(&format!(
        "Property card: {}\n",
        record.property_card_url.display_or_unknown()
    ));
    out.push_str(&format!(
        "Fetched: {}\n",
        record.source_timestamp.format("%Y-%m-%d %H:%M UTC")
    ));
    out
}

pub(crate) fn render_markdown(record: &ParcelRecord) -> String {
    let mut out = format!("# Parcel Report: {}\n\n", record.display_parcel_id);
    out.push_str(&format!("**County**: {}\n", record.county));
    out.push_str(&format!(
        "**Fetched**: {}\n",
        record.source_timestamp.format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&format!(
        "**Property card**: {}\n",
        record.property_card_url.display_or_unknown()
    ));
    for (title, rows) in sections(record) {
        out.push_str(&format!("\n## {title}\n\n| Field | Value |\n|---|---|\n"));
        for (label, value) in rows {
            out.push_str(&format!("| {label} | {} |\n", value.replace('|', "\\|")));
        }
    }
    out
}

fn mailing_address(record: &ParcelRecord) -> String {
    let addr = &record.ownership.mailing_address;
    let city_line: Vec<&str> = [&addr.city, &addr.state, &addr.zip]
        .into_iter()
        .filter_map(Field::as_known)
        .map(String::as_str)
        .collect();
    let mut parts: Vec<String> = Vec::new();
    if let Some(street) = addr.street.as_known() {
        parts.push(street.clone());
    }
    if !city_line.is_empty() {
        parts.push(city_line.join(" "));
    }
    if parts.is_empty() {
        UNKNOWN.to_owned()
    } else {
        parts.join(", ")
    }
}

fn str_location(record: &ParcelRecord) -> String {
    let site = &record.site;
    match (
        site.section.as_known(),
        site.township.as_known(),
        site.range.as_known(),
    ) {
        (Some(s), Some(t), Some(r)) => format!("{s}-{t}-{r}"),
        _ => UNKNOWN.to_owned(),
    }
}

fn money(field: &Field<Decimal>) -> String {
    field
        .as_known()
        .map_or_else(|| UNKNOWN.to_owned(), |d| format_currency(*d))
}

/// `$1,234,567.89` style formatting.
fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{frac}")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use flparcel_core::{CountyKey, ParcelRecordBuilder};

    use super::*;

    fn record() -> ParcelRecord {
        let mut record = ParcelRecordBuilder::new(
            CountyKey::Manatee,
            "1234567890",
            "1234567890",
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
        .build();
        record.ownership.owner_name = Field::Known("SMITH JANE".to_owned());
        record.assessment.total_assessed_value = Field::Known(Decimal::new(12_500_000, 2));
        record
    }

    #[test]
    fn text_prints_unknown_not_zero() {
        let text = render_text(&record());
        assert!(text.contains("Parcel 1234567890 (Manatee County)"));
        assert!(text.contains("SMITH JANE"));
        assert!(text.contains("$125,000.00"));
        assert!(text.contains(&format!("{:<24}Unknown", "Land value")));
        assert!(!text.contains("$0.00"));
    }

    #[test]
    fn markdown_has_sections_and_escapes_pipes() {
        let mut record = record();
        record.site.legal_description = Field::Known("LOT 1 | BLK 2".to_owned());
        let md = render_markdown(&record);
        assert!(md.starts_with("# Parcel Report: 1234567890"));
        assert!(md.contains("## Assessment"));
        assert!(md.contains("| Total assessed value | $125,000.00 |"));
        assert!(md.contains("| Year built | Unknown |"));
        assert!(md.contains("LOT 1 \\| BLK 2"));
    }

    #[test]
    fn text_lists_plat_and_area_rows() {
        let mut record = record();
        record.site.block = Field::Known("C".to_owned());
        record.site.lot = Field::Known("12".to_owned());
        let text = render_text(&record);
        assert!(text.contains(&format!("{:<24}C", "Block")));
        assert!(text.contains(&format!("{:<24}12", "Lot")));
        assert!(text.contains(&format!("{:<24}Unknown", "Land area (sq ft)")));
        assert!(text.contains(&format!("{:<24}Unknown", "Legal description 2")));
    }

    #[test]
    fn json_keeps_unknown_status() {
        let json = render(&record(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["county"], "manatee");
        assert_eq!(value["site"]["year_built"]["status"], "unknown");
        assert_eq!(value["assessment"]["total_assessed_value"]["value"], "125000.00");
    }

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(Decimal::new(123_456_789, 2)), "$1,234,567.89");
        assert_eq!(format_currency(Decimal::from(500)), "$500.00");
        assert_eq!(format_currency(Decimal::new(-150_000, 2)), "-$1,500.00");
    }

    #[test]
    fn mailing_address_joins_known_parts() {
        let mut record = record();
        assert_eq!(mailing_address(&record), "Unknown");
        record.ownership.mailing_address.street = Field::Known("PO BOX 1".to_owned());
        record.ownership.mailing_address.state = Field::Known("FL".to_owned());
        assert_eq!(mailing_address(&record), "PO BOX 1, FL");
    }
}
