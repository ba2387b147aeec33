use proptest::prelude::*;
use std::sync::Arc;

use tanda_pools::RoundValidator;
use tanda_reputation::ReputationLedger;
use tanda_store::{
    IdentityRecord, IdentityStore, ParticipantRecord, PaymentRecord, PoolStore,
};
use tanda_store_mem::MemoryStore;
use tanda_types::{
    IdentityId, ParticipantId, PoolId, Timestamp, TrustParams, VerificationStatus,
};

fn harness() -> (Arc<MemoryStore>, RoundValidator<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let params = TrustParams::platform_defaults();
    let ledger = Arc::new(ReputationLedger::new(store.clone(), params.clone()));
    let validator = RoundValidator::new(store.clone(), ledger, &params);
    (store, validator)
}

fn seed_member(store: &MemoryStore) {
    store
        .put_identity(&IdentityRecord {
            id: IdentityId::new(1),
            display_name: "member".into(),
            verification_status: VerificationStatus::Approved,
            blocked: false,
            trust_score: 2.5,
            credit_balance: 0,
        })
        .unwrap();
    store
        .put_participant(&ParticipantRecord {
            id: ParticipantId::new(1),
            pool: PoolId::new(1),
            identity: IdentityId::new(1),
            active: true,
            received_payout: false,
            turn_position: Some(1),
        })
        .unwrap();
}

proptest! {
    /// A participant is expelled exactly when their lifetime miss count in
    /// the pool reaches 3 — never before, and never for misses that would
    /// have happened after expulsion already removed them from the sweep.
    #[test]
    fn expelled_iff_three_lifetime_misses(paid_per_round in prop::collection::vec(any::<bool>(), 1..12)) {
        let (store, validator) = harness();
        seed_member(&store);

        let mut misses_while_active = 0u32;
        for (i, paid) in paid_per_round.iter().enumerate() {
            let round = (i + 1) as u32;
            let was_active = store.get_participant(ParticipantId::new(1)).unwrap().active;
            if *paid {
                store
                    .put_payment(&PaymentRecord {
                        pool: PoolId::new(1),
                        participant: ParticipantId::new(1),
                        round,
                        amount_cents: 100,
                        paid_at: Timestamp::new(0),
                    })
                    .unwrap();
            }
            validator.validate_round(PoolId::new(1), round).unwrap();
            if was_active && !paid {
                misses_while_active += 1;
            }
        }

        let participant = store.get_participant(ParticipantId::new(1)).unwrap();
        let expected_active = misses_while_active < 3;
        prop_assert_eq!(participant.active, expected_active);
        prop_assert!(misses_while_active <= 3);
    }
}
