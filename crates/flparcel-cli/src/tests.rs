use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["flparcel"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_lookup_with_default_format() {
    let cli = Cli::try_parse_from(["flparcel", "lookup", "Pinellas", "03-32-16-11737-001-0010"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Lookup {
            ref county,
            ref parcel_id,
            format: OutputFormat::Text,
        }) if county == "Pinellas" && parcel_id == "03-32-16-11737-001-0010"
    ));
}

#[test]
fn parses_lookup_json_format() {
    let cli = Cli::try_parse_from([
        "flparcel",
        "lookup",
        "manatee",
        "1234567890",
        "--format",
        "json",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Lookup {
            format: OutputFormat::Json,
            ..
        })
    ));
}

#[test]
fn lookup_rejects_unknown_format() {
    let result = Cli::try_parse_from([
        "flparcel",
        "lookup",
        "manatee",
        "1234567890",
        "--format",
        "xml",
    ]);
    assert!(result.is_err());
}

#[test]
fn lookup_requires_parcel_id() {
    assert!(Cli::try_parse_from(["flparcel", "lookup", "Manatee"]).is_err());
}

#[test]
fn parses_batch_markdown() {
    let cli = Cli::try_parse_from([
        "flparcel",
        "batch",
        "--file",
        "parcels.csv",
        "--format",
        "markdown",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Batch {
            ref file,
            format: OutputFormat::Markdown,
        }) if file == std::path::Path::new("parcels.csv")
    ));
}

#[test]
fn batch_requires_file() {
    assert!(Cli::try_parse_from(["flparcel", "batch"]).is_err());
}

#[test]
fn parses_counties() {
    let cli = Cli::try_parse_from(["flparcel", "counties"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Counties)));
}

#[test]
fn parses_municode_with_city_and_search() {
    let cli = Cli::try_parse_from([
        "flparcel",
        "municode",
        "Hillsborough",
        "--city",
        "Tampa",
        "--search",
        "parking standards",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Municode {
            ref county,
            city: Some(ref city),
            search: Some(ref search),
        }) if county == "Hillsborough" && city == "Tampa" && search == "parking standards"
    ));
}

#[test]
fn parses_municode_county_only() {
    let cli = Cli::try_parse_from(["flparcel", "municode", "Pasco"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Municode {
            city: None,
            search: None,
            ..
        })
    ));
}

fn test_config(env: Environment) -> AppConfig {
    AppConfig {
        env,
        log_level: "info".to_owned(),
        request_timeout_secs: 10,
        max_attempts: 3,
        retry_backoff_base_ms: 500,
        user_agent: "flparcel-test".to_owned(),
        max_concurrent_lookups: 4,
        max_concurrent_per_county: 2,
        county_overrides_path: None,
    }
}

#[test]
fn build_registry_without_overrides_uses_defaults() {
    let registry = build_registry(&test_config(Environment::Test)).unwrap();
    assert!(registry.get(CountyKey::Manatee).is_ok());
    assert!(registry.get(CountyKey::Sarasota).is_err());
}

#[test]
fn production_logs_are_plain_text() {
    assert!(!log_ansi(&test_config(Environment::Production)));
    assert!(log_ansi(&test_config(Environment::Development)));
}
