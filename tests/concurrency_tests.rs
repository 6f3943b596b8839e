mod common;

use common::{OWNER, addr, engine, fund};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tlalix_engine::domain::account::Recipient;
use tlalix_engine::domain::money::Usd;
use tlalix_engine::domain::remittance::RemittanceStatus;
use tlalix_engine::error::EngineError;

#[tokio::test]
async fn exactly_one_concurrent_claim_succeeds() {
    let (engine, _clock) = engine();
    fund(&engine, "alice", 100_000_000).await;
    for i in 0..8 {
        engine
            .register_cashout_point(&addr(&format!("p{i}")), format!("P{i}"), "CDMX".into(), 100)
            .await
            .unwrap();
    }
    engine
        .create_remittance(
            &addr("alice"),
            Usd(100_000_000),
            Recipient::ByAccount(addr("bob")),
            "RACE01",
        )
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine.claim_remittance(&addr(&format!("p{i}")), "RACE01").await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(EngineError::AlreadyClaimed) => {}
            Err(other) => panic!("unexpected claim error: {other}"),
        }
    }
    assert_eq!(successes, 1);

    // Exactly one point was paid.
    let paid: Vec<_> = engine
        .get_all_cashout_points()
        .await
        .unwrap()
        .into_iter()
        .filter(|p| !p.balance.is_zero())
        .collect();
    assert_eq!(paid.len(), 1);
}

#[tokio::test]
async fn concurrent_creates_with_one_code_yield_one_remittance() {
    let (engine, _clock) = engine();
    fund(&engine, "alice", 100_000_000).await;
    fund(&engine, "carol", 100_000_000).await;

    let a = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            engine
                .create_remittance(
                    &addr("alice"),
                    Usd(10_000_000),
                    Recipient::ByAccount(addr("bob")),
                    "RACE02",
                )
                .await
        })
    };
    let b = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            engine
                .create_remittance(
                    &addr("carol"),
                    Usd(10_000_000),
                    Recipient::ByAccount(addr("bob")),
                    "RACE02",
                )
                .await
        })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results.iter().any(|r| matches!(r, Err(EngineError::CodeTaken))));

    // The losing sender kept their funds.
    assert_eq!(engine.get_stats().await.total_remittances, 1);
    let balances: u128 = {
        let alice = engine.get_user(&addr("alice")).await.unwrap().unwrap();
        let carol = engine.get_user(&addr("carol")).await.unwrap().unwrap();
        alice.balance.0 + carol.balance.0
    };
    assert_eq!(balances, 190_000_000);
}

#[tokio::test]
async fn claim_and_cancel_race_has_one_winner() {
    let (engine, _clock) = engine();
    fund(&engine, "alice", 100_000_000).await;
    engine
        .register_cashout_point(&addr("p1"), "P1".into(), "CDMX".into(), 0)
        .await
        .unwrap();
    engine
        .create_remittance(
            &addr("alice"),
            Usd(100_000_000),
            Recipient::ByAccount(addr("bob")),
            "RACE03",
        )
        .await
        .unwrap();

    let claim = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.claim_remittance(&addr("p1"), "RACE03").await })
    };
    let cancel = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.cancel_remittance(&addr("alice"), "RACE03").await })
    };

    let claim = claim.await.unwrap();
    let cancel = cancel.await.unwrap();
    assert_eq!(claim.is_ok() as u8 + cancel.is_ok() as u8, 1);

    let stored = engine.get_remittance("RACE03").await.unwrap().unwrap();
    match stored.status {
        RemittanceStatus::Claimed => {
            assert!(claim.is_ok());
            assert!(matches!(cancel, Err(EngineError::NotCancellable)));
        }
        RemittanceStatus::Cancelled => {
            assert!(cancel.is_ok());
            assert!(matches!(claim, Err(EngineError::NotEligible)));
        }
        other => panic!("race left status {other:?}"),
    }
}

#[tokio::test]
async fn concurrent_alias_registration_binds_once() {
    let (engine, _clock) = engine();
    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .register_alias(&addr(&format!("acct{i}")), "hotalias")
                .await
        }));
    }
    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => successes += 1,
            Err(EngineError::AliasTaken) => {}
            Err(other) => panic!("unexpected register error: {other}"),
        }
    }
    assert_eq!(successes, 1);

    // And the binding is stable from here on.
    let bound = engine.get_user_by_alias("hotalias").await.unwrap().unwrap();
    for _ in 0..3 {
        let again = engine.get_user_by_alias("hotalias").await.unwrap().unwrap();
        assert_eq!(again.account, bound.account);
    }
}

/// No operation sequence creates or destroys value: everything ever
/// deposited is either sitting in a balance, outstanding in a non-terminal
/// remittance, or accounted as an external payout (withdrawals and the cash
/// margin points keep at the counter).
#[tokio::test]
async fn value_is_conserved_across_random_schedules() {
    const POINT_FEE_BPS: u128 = 200;

    let (engine, clock) = engine();
    let mut rng = StdRng::seed_from_u64(42);

    for s in 0..5 {
        fund(&engine, &format!("s{s}"), 1_000_000_000).await;
    }
    let total_deposited: u128 = 5 * 1_000_000_000;
    for p in 0..2 {
        engine
            .register_cashout_point(
                &addr(&format!("p{p}")),
                format!("P{p}"),
                "CDMX".into(),
                POINT_FEE_BPS as u32,
            )
            .await
            .unwrap();
    }
    for r in 0..3 {
        engine
            .register_alias(&addr(&format!("r{r}")), &format!("alias{r}"))
            .await
            .unwrap();
    }

    let mut external: u128 = 0;
    let mut codes = Vec::new();
    for i in 0..40 {
        let code = format!("CONS{i:03}");
        let sender = addr(&format!("s{}", rng.gen_range(0..5)));
        let recipient_idx = rng.gen_range(0..3);
        let recipient = if rng.gen_bool(0.5) {
            Recipient::ByAlias(format!("alias{recipient_idx}"))
        } else {
            Recipient::ByAccount(addr(&format!("r{recipient_idx}")))
        };
        let amount = Usd(rng.gen_range(1..=5) * 1_000_000);
        let created = engine
            .create_remittance(&sender, amount, recipient, &code)
            .await
            .unwrap();
        codes.push(code.clone());

        match rng.gen_range(0..6) {
            0 => {} // leave pending
            1 => {
                let point = addr(&format!("p{}", rng.gen_range(0..2)));
                engine.claim_remittance(&point, &code).await.unwrap();
            }
            2 => {
                engine.cancel_remittance(&sender, &code).await.unwrap();
            }
            3 => {
                engine
                    .claim_remittance(&created.recipient, &code)
                    .await
                    .unwrap();
            }
            4 => {
                engine.lock_remittance(&sender, &code).await.unwrap();
                engine.cancel_remittance(&sender, &code).await.unwrap();
            }
            _ => {
                let point = addr(&format!("p{}", rng.gen_range(0..2)));
                engine.mark_ready_for_pickup(&point, &code).await.unwrap();
                engine.claim_remittance(&point, &code).await.unwrap();
            }
        }

        if i % 13 == 12 {
            if let Ok(amount) = engine.withdraw_platform_fees(&addr(OWNER)).await {
                external += amount.0;
            }
            let point = addr(&format!("p{}", rng.gen_range(0..2)));
            if let Ok(amount) = engine.withdraw_point_balance(&point).await {
                external += amount.0;
            }
        }
    }
    clock.advance(common::EXPIRATION_SECS);

    let mut outstanding: u128 = 0;
    for code in &codes {
        let r = engine.get_remittance(code).await.unwrap().unwrap();
        let net = r.net_usd().0;
        match r.status {
            RemittanceStatus::Pending
            | RemittanceStatus::Locked
            | RemittanceStatus::ReadyForPickup => outstanding += net,
            RemittanceStatus::Claimed => {
                let direct = r.cashout_point.as_ref() == Some(&r.recipient);
                if !direct {
                    // The point's cut left the ledger as cash margin.
                    external += net * POINT_FEE_BPS / 10_000;
                }
            }
            RemittanceStatus::Expired | RemittanceStatus::Cancelled => {}
        }
    }

    let profile_total: u128 = engine
        .get_all_profiles()
        .await
        .unwrap()
        .iter()
        .map(|p| p.balance.0)
        .sum();
    let point_total: u128 = engine
        .get_all_cashout_points()
        .await
        .unwrap()
        .iter()
        .map(|p| p.balance.0)
        .sum();
    let platform_balance = engine.get_stats().await.platform_balance.0;

    assert_eq!(
        total_deposited,
        profile_total + point_total + platform_balance + outstanding + external
    );
}
