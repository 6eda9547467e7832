//! End-to-end scenarios across both contracts, exercised through the
//! public API and the wire-level response shape.

use tracebit_core::{BlockHeight, CaseId, ContractResponse, ErrorCode, Principal};
use tracebit_state::{
    CaseStatus, CaseStore, EntityRegistry, RegistryConfig, Roster,
};

fn p(s: &str) -> Principal {
    Principal::new(s).unwrap()
}

fn case_store() -> CaseStore {
    CaseStore::new(
        Roster::new(p("admin.test"))
            .with_reporter(p("reporter.test"))
            .with_reviewer(p("reviewer.test")),
    )
}

fn registry() -> EntityRegistry {
    EntityRegistry::new(p("ST1ADMIN"), RegistryConfig::default())
        .with_block_height(BlockHeight::new(100))
}

#[test]
fn first_submission_gets_id_one_and_is_reported() {
    let mut store = case_store();
    let id = store.submit_case(&p("reporter.test"), "Case A").unwrap();
    assert_eq!(id, CaseId::new(1).unwrap());
    assert_eq!(store.get_case(id).unwrap().status, CaseStatus::Reported);
}

#[test]
fn empty_metadata_consumes_no_id() {
    let mut store = case_store();
    let response: ContractResponse<CaseId> = store.submit_case(&p("reporter.test"), "").into();
    assert_eq!(response, ContractResponse::Error(ErrorCode::named("ERR-EMPTY-METADATA")));

    let id = store.submit_case(&p("reporter.test"), "Case A").unwrap();
    assert_eq!(id.get(), 1);
}

#[test]
fn double_review_is_invalid_state() {
    let mut store = case_store();
    let reviewer = p("reviewer.test");
    let id = store.submit_case(&p("reporter.test"), "Case A").unwrap();
    store.mark_under_review(&reviewer, id).unwrap();

    let response: ContractResponse<()> = store.mark_under_review(&reviewer, id).into();
    assert_eq!(response.error_code(), Some(&ErrorCode::named("ERR-INVALID-STATE")));
}

#[test]
fn full_review_then_second_finalize_is_invalid_state() {
    let mut store = case_store();
    let reviewer = p("reviewer.test");
    let id = store.submit_case(&p("reporter.test"), "Case A").unwrap();
    store.mark_under_review(&reviewer, id).unwrap();
    store.finalize_case(&reviewer, id, CaseStatus::Verified).unwrap();
    assert_eq!(store.get_case(id).unwrap().status, CaseStatus::Verified);

    let err = store
        .finalize_case(&reviewer, id, CaseStatus::Verified)
        .unwrap_err();
    assert_eq!(err.code_str(), "ERR-INVALID-STATE");
}

#[test]
fn added_entity_is_readable() {
    let mut reg = registry();
    reg.add_entity(&p("ST1ADMIN"), p("ST2ABC123"), "scam", 85, "phish")
        .unwrap();

    let entity = reg.get_entity(&p("ST2ABC123")).unwrap();
    assert_eq!(entity.risk_score, 85);
    assert_eq!(entity.metadata, "phish");
}

#[test]
fn non_admin_add_reports_code_100_and_leaves_registry_unchanged() {
    let mut reg = registry();
    let before = reg.clone();
    let response: ContractResponse<()> = reg
        .add_entity(&p("ST3XYZ456"), p("ST2ABC123"), "mixer", 60, "Uniswap fork")
        .into();

    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"error":100}"#
    );
    assert_eq!(reg, before);
}

#[test]
fn successful_write_renders_as_value_true() {
    let mut reg = registry();
    let response = ContractResponse::from(reg.add_entity(
        &p("ST1ADMIN"),
        p("ST2ABC123"),
        "exchange",
        20,
        "trusted",
    ))
    .map(|()| true);
    assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"value":true}"#);
}

#[test]
fn remove_then_get_is_102() {
    let mut reg = registry();
    let admin = p("ST1ADMIN");
    let wallet = p("ST2ABC123");
    reg.add_entity(&admin, wallet.clone(), "wallet", 5, "normal address")
        .unwrap();
    reg.remove_entity(&admin, &wallet).unwrap();

    let response: ContractResponse<_> = reg.get_entity(&wallet).map(Clone::clone).into();
    assert_eq!(response, ContractResponse::Error(ErrorCode::Numeric(102)));
}

#[test]
fn contracts_are_independent_instances() {
    let mut a = case_store();
    let b = case_store();
    a.submit_case(&p("reporter.test"), "only in a").unwrap();
    assert_eq!(a.case_count(), 1);
    assert_eq!(b.case_count(), 0);
    assert_eq!(b.next_case_id(), CaseId::FIRST);
}
