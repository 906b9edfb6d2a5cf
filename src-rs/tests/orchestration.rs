mod support;

use std::sync::Arc;
use std::time::Duration;

use specgen_rs::generation::{GeneralSpecRequest, GenerationRequest, Principal};
use specgen_rs::GenerationError;
use support::*;

fn request(model: &str) -> GenerationRequest {
    GenerationRequest::new(model, "area, filter grade", None, Principal::new("alice"))
}

async fn settle_background() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn model_ok_with_scrapes_timing_out() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(MAIN, spec_reply("MODEL-OK", "South Korea"))
            .reply(CERT, cert_reply()),
    );
    let ledger = Arc::new(CountingLedger::new(10));
    let gw = gateway(&config(Duration::from_secs(60)), backend, FakeCatalog::timing_out(), ledger.clone());

    let result = gw
        .orchestrator()
        .start(request("MODEL-OK"))
        .wait()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.product_name, "Air purifier");
    assert_eq!(result.specification, "40m2, HEPA");
    assert_eq!(result.model_name, "MODEL-OK");
    assert_eq!(result.kats_certification_number.as_deref(), Some("HU07123-20001"));
    assert_eq!(result.country_of_origin.as_deref(), Some("South Korea"));
    assert_eq!(result.g2b_classification_number, None);

    settle_background().await;
    assert_eq!(ledger.adjustments(), 1);
    assert_eq!(gw.balance(&Principal::new("alice")).await.unwrap(), 9);
}

#[tokio::test(start_paused = true)]
async fn certification_failure_still_completes() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(MAIN, spec_reply("AX40", "Korea"))
            .reply(CERT, Ok("no certificate found".to_string())),
    );
    let ledger = Arc::new(CountingLedger::new(10));
    let gw = gateway(&config(Duration::from_secs(60)), backend, FakeCatalog::timing_out(), ledger.clone());

    let result = gw.orchestrator().start(request("AX40")).wait().await.unwrap().unwrap();
    assert_eq!(result.kats_certification_number, None);
    assert_eq!(result.kc_certification_number, None);
    assert_eq!(result.product_name, "Air purifier");

    settle_background().await;
    assert_eq!(ledger.adjustments(), 1);
}

#[tokio::test(start_paused = true)]
async fn scraped_country_overwrites_generated_one() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(MAIN, spec_reply("AX40", "South Korea"))
            .reply(CERT, cert_reply()),
    );
    let catalog = FakeCatalog::page(catalog_page("4511190101-23642147", "TH")).delayed(Duration::from_secs(3));
    let gw = gateway(&config(Duration::from_secs(60)), backend, catalog, Arc::new(CountingLedger::new(10)));

    let result = gw.orchestrator().start(request("AX40")).wait().await.unwrap().unwrap();
    assert_eq!(result.country_of_origin.as_deref(), Some("Thailand"));
    assert_eq!(result.g2b_classification_number.as_deref(), Some("23642147"));
    assert_eq!(result.manufacturer.as_deref(), Some("Samsung"));
}

#[tokio::test(start_paused = true)]
async fn main_spec_failure_fails_run_without_charge() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(MAIN, Ok("Sorry, I cannot help with that.".to_string()))
            .reply(CERT, cert_reply()),
    );
    let ledger = Arc::new(CountingLedger::new(10));
    let catalog = FakeCatalog::page(catalog_page("1-2", "TH"));
    let gw = gateway(&config(Duration::from_secs(60)), backend, catalog, ledger.clone());

    let outcome = gw.orchestrator().start(request("AX40")).wait().await.unwrap();
    assert!(matches!(outcome, Err(GenerationError::MalformedUpstreamResponse(_))));

    settle_background().await;
    assert_eq!(ledger.adjustments(), 0);
}

#[tokio::test(start_paused = true)]
async fn model_retry_recovers_after_one_transient_failure() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(MAIN, transient())
            .reply(MAIN, spec_reply("MODEL-RETRY", "China"))
            .reply(CERT, cert_reply()),
    );
    let gw = gateway(
        &config(Duration::from_secs(60)),
        backend.clone(),
        FakeCatalog::timing_out(),
        Arc::new(CountingLedger::new(10)),
    );

    let result = gw.orchestrator().start(request("MODEL-RETRY")).wait().await.unwrap().unwrap();
    assert_eq!(result.model_name, "MODEL-RETRY");
    assert_eq!(gw.orchestrator().ai().retry_count(), 1);
    assert_eq!(backend.calls(MAIN), 2);
}

#[tokio::test(start_paused = true)]
async fn two_transient_failures_then_success_completes() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(MAIN, transient())
            .reply(MAIN, transient())
            .reply(MAIN, spec_reply("AX40", "China"))
            .reply(CERT, cert_reply()),
    );
    let gw = gateway(
        &config(Duration::from_secs(60)),
        backend,
        FakeCatalog::timing_out(),
        Arc::new(CountingLedger::new(10)),
    );
    let outcome = gw.orchestrator().start(request("AX40")).wait().await.unwrap();
    assert!(outcome.is_ok());
}

#[tokio::test(start_paused = true)]
async fn four_transient_failures_fail_after_three_attempts() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(MAIN, transient())
            .reply(MAIN, transient())
            .reply(MAIN, transient())
            .reply(MAIN, transient())
            .reply(CERT, cert_reply()),
    );
    let ledger = Arc::new(CountingLedger::new(10));
    let gw = gateway(
        &config(Duration::from_secs(60)),
        backend.clone(),
        FakeCatalog::timing_out(),
        ledger.clone(),
    );

    let outcome = gw.orchestrator().start(request("AX40")).wait().await.unwrap();
    assert!(matches!(outcome, Err(GenerationError::UpstreamUnavailable { attempts: 3, .. })));
    assert_eq!(backend.calls(MAIN), 3);

    settle_background().await;
    assert_eq!(ledger.adjustments(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_before_anything_settles_charges_nothing() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply_after(MAIN, Duration::from_secs(5), spec_reply("AX40", "China"))
            .reply_after(CERT, Duration::from_secs(5), cert_reply()),
    );
    let ledger = Arc::new(CountingLedger::new(10));
    let catalog = FakeCatalog::page(catalog_page("1-2", "TH")).delayed(Duration::from_secs(5));
    let gw = gateway(&config(Duration::from_secs(60)), backend, catalog, ledger.clone());

    let handle = gw.orchestrator().start(request("AX40"));
    assert!(handle.try_cancel());
    assert_eq!(handle.wait().await.unwrap(), Err(GenerationError::Cancelled));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(ledger.adjustments(), 0);
    assert_eq!(handle.peek(), Some(Err(GenerationError::Cancelled)));
}

#[tokio::test(start_paused = true)]
async fn ledger_failure_does_not_change_outcome() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(MAIN, spec_reply("AX40", "China"))
            .reply(CERT, cert_reply()),
    );
    let ledger = Arc::new(CountingLedger::failing(10));
    let gw = gateway(&config(Duration::from_secs(60)), backend, FakeCatalog::timing_out(), ledger.clone());

    let handle = gw.orchestrator().start(request("AX40"));
    assert!(handle.wait().await.unwrap().is_ok());
    settle_background().await;
    assert_eq!(ledger.adjustments(), 1);
    assert!(handle.peek().unwrap().is_ok());
}

#[tokio::test(start_paused = true)]
async fn general_spec_is_a_single_charged_lookup() {
    let backend = Arc::new(ScriptedBackend::new().reply(GENERAL, general_reply()));
    let ledger = Arc::new(CountingLedger::new(10));
    let gw = gateway(
        &config(Duration::from_secs(60)),
        backend.clone(),
        FakeCatalog::timing_out(),
        ledger.clone(),
    );

    let result = gw
        .orchestrator()
        .generate_general(GeneralSpecRequest {
            product_name: "Office desk".to_string(),
            spec_example: "WxDxH".to_string(),
            principal: Principal::new("bob"),
        })
        .await
        .unwrap();
    assert_eq!(result.specification, "1200x600x720mm");
    assert_eq!(result.manufacturer, None);
    assert_eq!(backend.calls(GENERAL), 1);
    assert_eq!(backend.calls(MAIN), 0);
    assert_eq!(ledger.adjustments(), 1);
}
