use super::*;

const MINIMAL: &str = r#"
[retriever.source-registry]
type = "public"
url = "https://packages.fhir.org"
"#;

#[test]
fn test_parse_minimal_config() {
    let config = parse_config(MINIMAL).unwrap();

    assert_eq!(config.retriever.source_registry.registry_type, RegistryType::Public);
    assert_eq!(config.retriever.source_registry.url, "https://packages.fhir.org");
    assert!(!config.retriever.dependency_loading_enabled);
    assert!(!config.retriever.supply_chain_verification.enabled);
    assert!(config.initial_packages.is_empty());
}

#[test]
fn test_parse_full_config() {
    let toml = r#"
[retriever]
dependency-loading-enabled = true

[retriever.source-registry]
type = "artifact-registry-authenticated"
url = "https://registry.example.com/npm/fhir"
token-file = "/var/run/secrets/registry-token"

[retriever.supply-chain-verification]
enabled = true
signature-san = "signer@example.iam.gserviceaccount.com"
attestation-san = "attestor-prod@example.iam.gserviceaccount.com"

[[initial-packages]]
name = "de.basisprofil.r4"
versions = ["1.5.0", "1.4.0"]

[[initial-packages]]
name = "hl7.fhir.r4.core"
versions = ["4.0.1"]
"#;

    let config = parse_config(toml).unwrap();
    let source = &config.retriever.source_registry;
    assert_eq!(source.registry_type, RegistryType::ArtifactRegistryAuthenticated);
    assert_eq!(
        source.token_file.as_deref().map(|p| p.as_str()),
        Some("/var/run/secrets/registry-token")
    );
    assert!(config.retriever.dependency_loading_enabled);
    assert_eq!(
        config.retriever.supply_chain_verification.attestation_stage(),
        Some("prod")
    );

    let targets = config.preload_targets();
    assert_eq!(
        targets,
        vec![
            PackageId::new("de.basisprofil.r4", "1.5.0"),
            PackageId::new("de.basisprofil.r4", "1.4.0"),
            PackageId::new("hl7.fhir.r4.core", "4.0.1"),
        ]
    );
}

#[test]
fn test_parse_error_reports_location() {
    let toml = "[retriever.source-registry]\ntype = \"public\"\nurl = \n";

    match parse_config(toml) {
        Err(RegistryError::ConfigParse { line, column, .. }) => {
            assert_eq!(line, 3);
            assert!(column > 1);
        },
        other => panic!("Expected ConfigParse error, got {:?}", other),
    }
}

#[test]
fn test_unknown_registry_type() {
    let toml = r#"
[retriever.source-registry]
type = "ftp"
url = "ftp://example.com"
"#;
    assert!(matches!(parse_config(toml), Err(RegistryError::ConfigParse { .. })));
}

#[test]
fn test_blank_url() {
    let toml = r#"
[retriever.source-registry]
type = "public"
url = "  "
"#;
    match parse_config(toml) {
        Err(RegistryError::ConfigValidation { field, .. }) => {
            assert_eq!(field, "retriever.source-registry.url");
        },
        other => panic!("Expected ConfigValidation error, got {:?}", other),
    }
}

#[test]
fn test_authenticated_registry_requires_token_file() {
    let toml = r#"
[retriever.source-registry]
type = "artifact-registry-authenticated"
url = "https://registry.example.com"
"#;
    match parse_config(toml) {
        Err(RegistryError::ConfigValidation { field, reason }) => {
            assert_eq!(field, "retriever.source-registry.token-file");
            assert!(reason.contains("artifact-registry-authenticated"));
        },
        other => panic!("Expected ConfigValidation error, got {:?}", other),
    }
}

#[test]
fn test_verification_requires_signature_san() {
    let mut config = RegistryConfig::with_public_registry("https://packages.fhir.org");
    config.retriever.supply_chain_verification = SupplyChainVerificationConfig {
        enabled: true,
        signature_san: Some(String::new()),
        attestation_san: Some("attestor-prod@example.com".to_string()),
    };

    match validate_config(&config) {
        Err(RegistryError::ConfigValidation { field, .. }) => {
            assert_eq!(field, "retriever.supply-chain-verification.signature-san");
        },
        other => panic!("Expected ConfigValidation error, got {:?}", other),
    }
}

#[test]
fn test_verification_on_authenticated_registry_requires_attestation_san() {
    let mut config = RegistryConfig::with_public_registry("https://registry.example.com");
    config.retriever.source_registry.registry_type = RegistryType::ArtifactRegistryAuthenticated;
    config.retriever.source_registry.token_file = Some("/tmp/token".into());
    config.retriever.supply_chain_verification = SupplyChainVerificationConfig {
        enabled: true,
        signature_san: Some("signer@example.com".to_string()),
        attestation_san: None,
    };

    match validate_config(&config) {
        Err(RegistryError::ConfigValidation { field, .. }) => {
            assert_eq!(field, "retriever.supply-chain-verification.attestation-san");
        },
        other => panic!("Expected ConfigValidation error, got {:?}", other),
    }

    // Unauthenticated registries only need the signature signer
    config.retriever.source_registry.registry_type = RegistryType::ArtifactRegistry;
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_disabled_verification_needs_no_signers() {
    let mut config = RegistryConfig::with_public_registry("https://registry.example.com");
    config.retriever.source_registry.registry_type = RegistryType::ArtifactRegistryAuthenticated;
    config.retriever.source_registry.token_file = Some("/tmp/token".into());

    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_initial_package_needs_versions() {
    let toml = r#"
[retriever.source-registry]
type = "public"
url = "https://packages.fhir.org"

[[initial-packages]]
name = "de.basisprofil.r4"
versions = []
"#;
    match parse_config(toml) {
        Err(RegistryError::ConfigValidation { field, reason }) => {
            assert_eq!(field, "initial-packages[0].versions");
            assert!(reason.contains("de.basisprofil.r4"));
        },
        other => panic!("Expected ConfigValidation error, got {:?}", other),
    }
}

#[test]
fn test_attestation_stage() {
    let mut verification = SupplyChainVerificationConfig::default();
    assert_eq!(verification.attestation_stage(), None);

    verification.attestation_san = Some("attestor-ref-dev@example.com".to_string());
    assert_eq!(verification.attestation_stage(), Some("dev"));

    verification.attestation_san = Some("nodash@example.com".to_string());
    assert_eq!(verification.attestation_stage(), Some("nodash"));
}

#[test]
fn test_round_trip_serialization() {
    let config = parse_config(MINIMAL).unwrap();
    let serialized = toml::to_string_pretty(&config).unwrap();
    let reparsed = parse_config(&serialized).unwrap();

    assert_eq!(config, reparsed);
}

#[test]
fn test_line_and_column() {
    assert_eq!(line_and_column("abc", 0), (1, 1));
    assert_eq!(line_and_column("abc\ndef", 5), (2, 2));
    assert_eq!(line_and_column("abc", 99), (1, 4));
}
