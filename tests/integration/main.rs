//! Integration tests for Entitle

use std::path::{Path, PathBuf};
use tempfile::TempDir;

const STORE_FIXTURE: &str = r#"{
    "catalog": [
        {
            "id": "sub_premium_1",
            "price": { "formatted_recurrence_price": "$1.99" },
            "subscription": { "billing_period": 1, "billing_period_unit": "month" }
        },
        {
            "id": "sub_premium_2",
            "price": { "formatted_recurrence_price": "$2.99" },
            "subscription": { "billing_period": 1, "billing_period_unit": "month" }
        },
        {
            "id": "lifetime",
            "price": { "formatted_price": "$9.99", "formatted_base_price": "$9.99" }
        }
    ],
    "licenses": [
        { "offer_token": "lifetime" }
    ]
}"#;

const CONFIG: &str = r#"
[general]
audit_log = false

[store]
subscription_prefixes = ["sub_"]
lifetime_ids = ["lifetime"]
"#;

/// Temp directory holding a config and a store fixture
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(fixture: &str) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), CONFIG).unwrap();
        std::fs::write(dir.path().join("store.json"), fixture).unwrap();
        Self { dir }
    }

    fn config(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn fixture(&self) -> PathBuf {
        self.dir.path().join("store.json")
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }
}

mod cli_tests {
    use super::*;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn entitle(ws: &Workspace) -> Command {
        let mut cmd = cargo_bin_cmd!("entitle");
        cmd.env_remove("ENTITLE_CONFIG")
            .env_remove("ENTITLE_FIXTURE")
            .arg("--config")
            .arg(ws.config())
            .arg("--fixture")
            .arg(ws.fixture());
        cmd
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("entitle")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("In-app purchase entitlement engine"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("entitle")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("entitle"));
    }

    #[test]
    fn owned_matches_licenses_and_subscription_family() {
        let ws = Workspace::new(STORE_FIXTURE);
        entitle(&ws)
            .args(["owned", "lifetime", "sub_premium_1", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("lifetime\ttrue"))
            .stdout(predicate::str::contains("sub_premium_1\tfalse"));
    }

    #[test]
    fn owned_offline_reports_not_owned() {
        let ws = Workspace::new(
            r#"{ "connected": false, "licenses": [{ "offer_token": "lifetime" }] }"#,
        );
        entitle(&ws)
            .args(["owned", "lifetime", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::diff("lifetime\tfalse\n"));
    }

    #[test]
    fn price_latest_picks_highest_version() {
        let ws = Workspace::new(STORE_FIXTURE);
        entitle(&ws)
            .args(["price", "sub_premium_1", "--latest", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::diff("$2.99\n"));
    }

    #[test]
    fn price_unknown_product_is_dash() {
        let ws = Workspace::new(STORE_FIXTURE);
        entitle(&ws)
            .args(["price", "missing", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::diff("-\n"));
    }

    #[test]
    fn price_json_reports_subscription_terms() {
        let ws = Workspace::new(STORE_FIXTURE);
        entitle(&ws)
            .args(["price", "sub_premium_2", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"is_subscription\": true"))
            .stdout(predicate::str::contains("\"recurrence_unit\": \"month\""));
    }

    #[test]
    fn buy_with_yes_succeeds() {
        let ws = Workspace::new(STORE_FIXTURE);
        entitle(&ws)
            .args(["buy", "sub_premium", "--latest", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("sub_premium is owned"));
    }

    #[test]
    fn buy_without_confirmation_is_skipped() {
        let ws = Workspace::new(STORE_FIXTURE);
        entitle(&ws)
            .args(["buy", "lifetime"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Purchase skipped"));
    }

    #[test]
    fn buy_unknown_product_is_not_found() {
        let ws = Workspace::new(STORE_FIXTURE);
        entitle(&ws)
            .args(["buy", "missing", "--yes"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Product not found: missing"));
    }

    #[test]
    fn buy_failed_submission_exits_nonzero() {
        let ws = Workspace::new(r#"{ "catalog": [{ "id": "lifetime" }], "purchase_outcome": null }"#);
        entitle(&ws)
            .args(["buy", "lifetime", "--yes"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("did not complete: server error"));
    }

    #[test]
    fn buy_offline_is_network_error() {
        let ws = Workspace::new(r#"{ "connected": false, "catalog": [{ "id": "lifetime" }] }"#);
        entitle(&ws)
            .args(["buy", "lifetime", "--yes"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("network error"));
    }

    #[test]
    fn catalog_lists_latest_per_family() {
        let ws = Workspace::new(STORE_FIXTURE);
        entitle(&ws)
            .args(["catalog", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::diff("lifetime\nsub_premium_2\n"));
    }

    #[test]
    fn catalog_offline_fails() {
        let ws = Workspace::new(r#"{ "connected": false }"#);
        entitle(&ws)
            .args(["catalog"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Network unavailable"));
    }

    #[test]
    fn status_reports_store() {
        let ws = Workspace::new(STORE_FIXTURE);
        entitle(&ws)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Store reachable"))
            .stdout(predicate::str::contains("hidden"));
    }

    #[test]
    fn missing_fixture_has_hint() {
        let ws = Workspace::new(STORE_FIXTURE);
        cargo_bin_cmd!("entitle")
            .env_remove("ENTITLE_FIXTURE")
            .arg("--config")
            .arg(ws.config())
            .args(["owned", "lifetime"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No store fixture configured"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn invalid_fixture_is_reported() {
        let ws = Workspace::new("{ not json");
        entitle(&ws)
            .args(["owned", "lifetime"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid store fixture"));
    }

    #[test]
    fn config_path_uses_override() {
        let ws = Workspace::new(STORE_FIXTURE);
        entitle(&ws)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_set_then_show() {
        let ws = Workspace::new(STORE_FIXTURE);
        entitle(&ws)
            .args(["config", "set", "store.license_failures", "remember"])
            .assert()
            .success();

        entitle(&ws)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("license_failures = \"remember\""));
    }

    #[test]
    fn config_init_creates_file() {
        let ws = Workspace::new(STORE_FIXTURE);
        let path = ws.path().join("fresh").join("config.toml");

        cargo_bin_cmd!("entitle")
            .env_remove("ENTITLE_CONFIG")
            .arg("--config")
            .arg(&path)
            .args(["config", "init"])
            .assert()
            .success();

        assert!(path.exists());
    }
}

mod engine_tests {
    use entitle::config::{LicenseFailurePolicy, StoreConfig};
    use entitle::store::{AddOnLicense, ListingPrice, MemoryBackend, Product};
    use entitle::{EntitleError, EntitlementService, PurchaseOutcome, PurchaseRequest};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn store_config() -> StoreConfig {
        StoreConfig::new(vec!["sub_".to_string()], vec!["lifetime".to_string()])
    }

    fn listed(id: &str, price: &str) -> Product {
        Product::new(
            id,
            ListingPrice {
                formatted_price: price.to_string(),
                ..ListingPrice::default()
            },
        )
    }

    fn service(backend: MemoryBackend) -> (EntitlementService, Arc<MemoryBackend>) {
        let backend = Arc::new(backend);
        (
            EntitlementService::new(store_config(), backend.clone()),
            backend,
        )
    }

    #[tokio::test]
    async fn subscription_family_matches_any_active_sku() {
        let (service, _) = service(
            MemoryBackend::new(vec![]).with_licenses(vec![AddOnLicense::active("sub_premium_3")]),
        );
        let cancel = CancellationToken::new();

        assert!(service.is_owned("sub_basic_1", &cancel).await.unwrap());
        assert!(!service.is_owned("other_item", &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn offline_ownership_check_skips_backend() {
        let (service, backend) = service(
            MemoryBackend::new(vec![]).with_licenses(vec![AddOnLicense::active("lifetime")]),
        );
        backend.set_connected(false);

        let owned = service
            .is_owned("lifetime", &CancellationToken::new())
            .await
            .unwrap();
        assert!(!owned);
        assert_eq!(backend.license_fetches(), 0);
    }

    #[tokio::test]
    async fn repeated_check_fetches_licenses_once() {
        let (service, backend) = service(
            MemoryBackend::new(vec![]).with_licenses(vec![AddOnLicense::active("lifetime")]),
        );
        let cancel = CancellationToken::new();

        assert!(service.is_owned("lifetime", &cancel).await.unwrap());
        assert!(service.is_owned("lifetime", &cancel).await.unwrap());
        assert_eq!(backend.license_fetches(), 1);
    }

    #[tokio::test]
    async fn buy_latest_caches_ownership_and_notifies_once() {
        let (service, backend) = service(MemoryBackend::new(vec![
            listed("sub_premium_1", "$1.99"),
            listed("sub_premium_2", "$2.99"),
        ]));
        let cancel = CancellationToken::new();
        let mut purchases = service.subscribe();

        assert!(service.buy("sub_premium", true, None, &cancel).await.unwrap());
        assert!(service.is_owned("sub_premium", &cancel).await.unwrap());
        assert_eq!(backend.license_fetches(), 0);

        let event = purchases.try_recv().unwrap();
        assert_eq!(event.product_id, "sub_premium");
        assert!(purchases.try_recv().is_err());
    }

    #[tokio::test]
    async fn offline_price_is_sentinel_without_fetch() {
        let (service, backend) = service(MemoryBackend::new(vec![listed("lifetime", "$9.99")]));
        backend.set_connected(false);

        let price = service
            .get_price("lifetime", false, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(price.formatted_price, "-");
        assert_eq!(backend.catalog_fetches(), 0);
    }

    #[tokio::test]
    async fn price_recovers_after_reconnect() {
        let (service, backend) = service(MemoryBackend::new(vec![listed("lifetime", "$9.99")]));
        let cancel = CancellationToken::new();
        backend.set_connected(false);

        assert!(service
            .get_price("lifetime", false, &cancel)
            .await
            .unwrap()
            .is_not_found());

        backend.set_connected(true);
        let price = service.get_price("lifetime", false, &cancel).await.unwrap();
        assert_eq!(price.formatted_price, "$9.99");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_family_misses_share_one_fetch() {
        let catalog = (0..8)
            .flat_map(|family| {
                (1..=3).map(move |version| listed(&format!("family{}_{}", family, version), "$1"))
            })
            .collect();
        let (service, backend) =
            service(MemoryBackend::new(catalog).with_latency(Duration::from_millis(50)));
        let service = Arc::new(service);

        let lookups = (0..8).map(|family| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .get_latest_price(&format!("family{}", family), &CancellationToken::new())
                    .await
            })
        });

        for handle in lookups.collect::<Vec<_>>() {
            let price = handle.await.unwrap().unwrap();
            assert_eq!(price.formatted_price, "$1");
        }

        assert_eq!(backend.catalog_fetches(), 1);
        assert_eq!(service.catalog().latest_products().len(), 8);
        assert!(service
            .catalog()
            .latest_products()
            .iter()
            .all(|entry| entry.version == 3));
    }

    #[tokio::test]
    async fn unavailable_licenses_policy() {
        let cancel = CancellationToken::new();

        let (transient, backend) = service(MemoryBackend::new(vec![]).without_licenses());
        assert!(!transient.is_owned("lifetime", &cancel).await.unwrap());
        backend
            .set_licenses(Some(vec![AddOnLicense::active("lifetime")]))
            .await;
        assert!(transient.is_owned("lifetime", &cancel).await.unwrap());

        let mut config = store_config();
        config.license_failures = LicenseFailurePolicy::Remember;
        let backend = Arc::new(MemoryBackend::new(vec![]).without_licenses());
        let remembering = EntitlementService::new(config, backend.clone());
        assert!(!remembering.is_owned("lifetime", &cancel).await.unwrap());
        backend
            .set_licenses(Some(vec![AddOnLicense::active("lifetime")]))
            .await;
        assert!(!remembering.is_owned("lifetime", &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn cache_as_records_alias() {
        let (service, _) = service(MemoryBackend::new(vec![listed("promo_sub_1", "$0.99")]));
        let cancel = CancellationToken::new();

        let request = PurchaseRequest::exact("promo_sub_1").cache_as("sub_");
        let outcome = service.purchase(&request, &cancel).await.unwrap();
        assert_eq!(outcome, PurchaseOutcome::Succeeded);
        assert!(service.is_subscription_owned(&cancel).await.unwrap());
        assert!(!service.can_show_premium_buttons(&cancel).await.unwrap());
    }

    #[tokio::test]
    async fn canceled_token_propagates() {
        let (service, backend) = service(MemoryBackend::new(vec![listed("lifetime", "$9.99")]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(matches!(
            service.is_owned("lifetime", &cancel).await,
            Err(EntitleError::Canceled)
        ));
        assert!(matches!(
            service.get_price("lifetime", false, &cancel).await,
            Err(EntitleError::Canceled)
        ));
        assert!(matches!(
            service.purchase(&PurchaseRequest::exact("lifetime"), &cancel).await,
            Err(EntitleError::Canceled)
        ));
        assert_eq!(backend.catalog_fetches(), 0);
        assert_eq!(backend.purchase_submissions(), 0);
    }
}
