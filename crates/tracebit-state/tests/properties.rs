//! Property tests: arbitrary call sequences against both stores.
//!
//! Callers are drawn from a small pool that mixes privileged and
//! unprivileged identities so that every guard fires regularly.

use std::collections::BTreeMap;

use proptest::prelude::*;

use tracebit_core::{BlockHeight, CaseId, Principal};
use tracebit_state::{CaseStatus, CaseStore, EntityRegistry, RegistryConfig, Roster};

const CALLERS: [&str; 4] = ["admin.test", "reporter.test", "reviewer.test", "outsider.test"];
const WALLETS: [&str; 3] = ["ST2ABC123", "ST3XYZ456", tracebit_core::BURN_ADDRESS];

fn p(s: &str) -> Principal {
    Principal::new(s).unwrap()
}

fn status_rank(status: CaseStatus) -> u8 {
    match status {
        CaseStatus::Reported => 0,
        CaseStatus::UnderReview => 1,
        CaseStatus::Verified | CaseStatus::Rejected => 2,
    }
}

#[derive(Debug, Clone)]
enum CaseOp {
    Submit(usize, String),
    Review(usize, u64),
    Finalize(usize, u64, i64),
    Update(usize, u64, String),
}

fn metadata() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-z]{1,8}"]
}

fn case_op() -> impl Strategy<Value = CaseOp> {
    let caller = 0..CALLERS.len();
    let id = 1u64..6;
    prop_oneof![
        (caller.clone(), metadata()).prop_map(|(c, m)| CaseOp::Submit(c, m)),
        (caller.clone(), id.clone()).prop_map(|(c, i)| CaseOp::Review(c, i)),
        (caller.clone(), id.clone(), -2i64..=6).prop_map(|(c, i, s)| CaseOp::Finalize(c, i, s)),
        (caller, id, metadata()).prop_map(|(c, i, m)| CaseOp::Update(c, i, m)),
    ]
}

fn apply_case_op(store: &mut CaseStore, op: &CaseOp) -> bool {
    match op {
        CaseOp::Submit(c, m) => store.submit_case(&p(CALLERS[*c]), m).is_ok(),
        CaseOp::Review(c, i) => store
            .mark_under_review(&p(CALLERS[*c]), CaseId::new(*i).unwrap())
            .is_ok(),
        CaseOp::Finalize(c, i, s) => store
            .finalize_case_by_code(&p(CALLERS[*c]), CaseId::new(*i).unwrap(), *s)
            .is_ok(),
        CaseOp::Update(c, i, m) => store
            .update_case(&p(CALLERS[*c]), CaseId::new(*i).unwrap(), m)
            .is_ok(),
    }
}

#[derive(Debug, Clone)]
enum RegistryOp {
    Add(usize, usize, u64),
    Update(usize, usize, u64),
    Remove(usize, usize),
    Tick,
}

fn registry_op() -> impl Strategy<Value = RegistryOp> {
    let caller = 0..CALLERS.len();
    let wallet = 0..WALLETS.len();
    prop_oneof![
        (caller.clone(), wallet.clone(), any::<u64>()).prop_map(|(c, w, r)| RegistryOp::Add(c, w, r)),
        (caller.clone(), wallet.clone(), any::<u64>())
            .prop_map(|(c, w, r)| RegistryOp::Update(c, w, r)),
        (caller, wallet).prop_map(|(c, w)| RegistryOp::Remove(c, w)),
        Just(RegistryOp::Tick),
    ]
}

fn apply_registry_op(reg: &mut EntityRegistry, op: &RegistryOp) -> bool {
    match op {
        RegistryOp::Add(c, w, r) => reg
            .add_entity(&p(CALLERS[*c]), p(WALLETS[*w]), "flagged", *r, "note")
            .is_ok(),
        RegistryOp::Update(c, w, r) => reg
            .update_entity(&p(CALLERS[*c]), &p(WALLETS[*w]), *r, "renote")
            .is_ok(),
        RegistryOp::Remove(c, w) => reg.remove_entity(&p(CALLERS[*c]), &p(WALLETS[*w])).is_ok(),
        RegistryOp::Tick => {
            reg.increment_block();
            true
        }
    }
}

fn fresh_case_store() -> CaseStore {
    CaseStore::new(
        Roster::new(p("admin.test"))
            .with_reporter(p("reporter.test"))
            .with_reviewer(p("reviewer.test")),
    )
}

proptest! {
    /// Statuses never regress, never skip review, and `reviewed_by` is
    /// set exactly when a case has left `Reported`. Ids are never reused.
    #[test]
    fn case_status_is_monotonic(ops in prop::collection::vec(case_op(), 0..40)) {
        let mut store = fresh_case_store();
        let mut seen: BTreeMap<CaseId, CaseStatus> = BTreeMap::new();

        for op in &ops {
            apply_case_op(&mut store, op);
            for case in store.cases() {
                if let Some(prev) = seen.get(&case.id) {
                    let (before, after) = (status_rank(*prev), status_rank(case.status));
                    prop_assert!(after >= before, "{} regressed", case.id);
                    prop_assert!(after - before <= 1, "{} skipped review", case.id);
                    if prev.is_terminal() {
                        prop_assert_eq!(*prev, case.status);
                    }
                }
                prop_assert_eq!(case.reviewed_by.is_some(), case.status != CaseStatus::Reported);
                seen.insert(case.id, case.status);
            }
            prop_assert_eq!(store.next_case_id().get(), store.case_count() as u64 + 1);
        }
    }

    /// A rejected case operation leaves the store untouched.
    #[test]
    fn rejected_case_calls_do_not_mutate(
        setup in prop::collection::vec(case_op(), 0..20),
        op in case_op(),
    ) {
        let mut store = fresh_case_store();
        for s in &setup {
            apply_case_op(&mut store, s);
        }
        let before = store.clone();
        if !apply_case_op(&mut store, &op) {
            prop_assert_eq!(&store, &before);
        }
    }

    /// A rejected registry operation leaves the registry untouched, and
    /// the sentinel address never becomes a key.
    #[test]
    fn rejected_registry_calls_do_not_mutate(ops in prop::collection::vec(registry_op(), 0..40)) {
        let mut reg = EntityRegistry::new(p("admin.test"), RegistryConfig::default())
            .with_block_height(BlockHeight::new(100));

        for op in &ops {
            let before = reg.clone();
            if !apply_registry_op(&mut reg, op) {
                prop_assert_eq!(&reg, &before);
            }
            prop_assert!(reg.get_entity(&Principal::burn_address()).is_err());
            prop_assert!(reg.block_height() >= before.block_height());
            for (_, entity) in reg.entities() {
                prop_assert_eq!(entity.added_by.as_str(), "admin.test");
                prop_assert_eq!(entity.entity_type.as_str(), "flagged");
                prop_assert!(entity.timestamp <= reg.block_height());
            }
        }
    }
}
