//! Property tests for reply correlation.

use std::collections::HashSet;
use std::time::Duration;

use proptest::prelude::*;
use toop_core::LookupStatus;
use toop_gateway::{PendingRequestTable, WaitOutcome};
use toop_test_utils::fixtures::TestGateway;
use toop_test_utils::generators::{arb_correlation_id, arb_organization};
use toop_test_utils::MockBehavior;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Whatever order replies arrive in, and however often they are
    /// repeated, each registered waiter is completed exactly once with the
    /// first reply sent for its id.
    #[test]
    fn prop_each_waiter_completes_once(
        ids in prop::collection::vec(arb_correlation_id(), 1..12),
        order in prop::collection::vec(any::<prop::sample::Index>(), 1..40),
    ) {
        let ids: Vec<_> = ids.into_iter().collect::<HashSet<_>>().into_iter().collect();
        runtime().block_on(async {
            let table = PendingRequestTable::<usize>::new();
            let handles: Vec<_> = ids
                .iter()
                .map(|id| table.register(id.clone()).unwrap())
                .collect();

            let mut first_reply = vec![None; ids.len()];
            let mut delivered = 0;
            for (n, index) in order.iter().enumerate() {
                let slot = index.index(ids.len());
                if table.complete(&ids[slot], n) {
                    delivered += 1;
                    first_reply[slot] = Some(n);
                }
            }

            let completed: HashSet<_> = first_reply.iter().flatten().collect();
            prop_assert_eq!(delivered, completed.len());

            for (slot, handle) in handles.into_iter().enumerate() {
                let outcome = table.wait(handle, Duration::from_millis(1)).await;
                match first_reply[slot] {
                    Some(n) => prop_assert_eq!(outcome, WaitOutcome::Completed(n)),
                    None => prop_assert_eq!(outcome, WaitOutcome::TimedOut),
                }
            }
            prop_assert!(table.is_empty());
            Ok(())
        })?;
    }

    /// A correlated reply carries its organization through unchanged.
    #[test]
    fn prop_reply_organization_is_returned(organization in arb_organization()) {
        runtime().block_on(async {
            let gw = TestGateway::new(MockBehavior::Reply {
                organization: organization.clone(),
                delay: Duration::ZERO,
            });
            let response = gw.lookup_legal("SE", &organization.organization_number).await;
            prop_assert_eq!(response.status, LookupStatus::Ok);
            prop_assert_eq!(response.organization, Some(organization));
            prop_assert!(gw.pending.is_empty());
            Ok(())
        })?;
    }
}
