//! Property and scenario tests for the contextual bandit engines.

use platoon::{
    Context, ContextualPolicy, Error, LinTsConfig, LinUcb, LinUcbConfig, LinearThompsonSampling,
};
use proptest::prelude::*;

fn linucb(n_arms: usize, dim: usize, seed: u64) -> LinUcb {
    LinUcb::new(n_arms, LinUcbConfig { dim, alpha: 0.1, seed }).unwrap()
}

fn lints(n_arms: usize, dim: usize, seed: u64) -> LinearThompsonSampling {
    LinearThompsonSampling::new(
        n_arms,
        LinTsConfig {
            dim,
            alpha: 0.1,
            epsilon: 0.1,
            n_bootstrap: 2,
            seed,
        },
    )
    .unwrap()
}

fn arb_rows(n_arms: usize, dim: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(-5.0f64..5.0, dim), n_arms)
}

fn snapshot<P: ContextualPolicy>(p: &P) -> Vec<(Vec<f64>, Vec<f64>)> {
    p.arms()
        .iter()
        .map(|a| (a.a().to_vec(), a.b().to_vec()))
        .collect()
}

// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

proptest! {
    /// A stays symmetric positive definite under any sequence of updates.
    #[test]
    fn design_matrices_stay_positive_definite(
        steps in prop::collection::vec((arb_rows(3, 2), -20.0f64..0.0), 1..40),
        seed in any::<u64>(),
    ) {
        let mut ucb = linucb(3, 2, seed);
        let mut ts = lints(3, 2, seed);
        for (rows, r) in steps {
            let ctx = Context::per_arm(rows);
            ucb.select_arm(&ctx).unwrap();
            ucb.update_reward(r).unwrap();
            ts.select_arm(&ctx).unwrap();
            ts.update_reward(r).unwrap();
        }
        for arm in ucb.arms().iter().chain(ts.arms()) {
            prop_assert!(arm.is_positive_definite());
            let a = arm.a();
            prop_assert_eq!(a[1], a[2]);
        }
    }

    /// Only the selected arm changes, by exactly x xᵀ and r·x.
    #[test]
    fn reward_goes_to_the_selected_arm_only(
        rows in arb_rows(4, 2),
        r in -10.0f64..10.0,
        seed in any::<u64>(),
    ) {
        let mut p = linucb(4, 2, seed);
        let before = snapshot(&p);
        let ctx = Context::per_arm(rows.clone());
        let arm = p.select_arm(&ctx).unwrap();
        p.update_reward(r).unwrap();
        let after = snapshot(&p);

        for (i, ((a0, b0), (a1, b1))) in before.iter().zip(&after).enumerate() {
            if i != arm {
                prop_assert_eq!(a0, a1);
                prop_assert_eq!(b0, b1);
                continue;
            }
            let x = &rows[arm];
            for row in 0..2 {
                for col in 0..2 {
                    let want = a0[row * 2 + col] + x[row] * x[col];
                    prop_assert!((a1[row * 2 + col] - want).abs() < 1e-12);
                }
                prop_assert!((b1[row] - (b0[row] + r * x[row])).abs() < 1e-12);
            }
        }
    }

    /// Repeated selection without a reward returns the same arm and touches nothing.
    #[test]
    fn selection_is_idempotent(
        warmup in prop::collection::vec((arb_rows(3, 2), -10.0f64..0.0), 0..10),
        rows in arb_rows(3, 2),
        seed in any::<u64>(),
    ) {
        let mut ucb = linucb(3, 2, seed);
        let mut ts = lints(3, 2, seed);
        for (w, r) in warmup {
            let ctx = Context::per_arm(w);
            ucb.select_arm(&ctx).unwrap();
            ucb.update_reward(r).unwrap();
            ts.select_arm(&ctx).unwrap();
            ts.update_reward(r).unwrap();
        }
        let ctx = Context::per_arm(rows);

        let s_ucb = snapshot(&ucb);
        let first = ucb.select_arm(&ctx).unwrap();
        prop_assert_eq!(ucb.select_arm(&ctx).unwrap(), first);
        prop_assert_eq!(snapshot(&ucb), s_ucb);

        let s_ts = snapshot(&ts);
        let first = ts.select_arm(&ctx).unwrap();
        prop_assert_eq!(ts.select_arm(&ctx).unwrap(), first);
        prop_assert_eq!(snapshot(&ts), s_ts);
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn three_vehicle_first_tick() {
    // Gaps 3 and 6 against an ideal of 5, bias-deviation features.
    let mut p = linucb(2, 2, 0);
    let ctx = Context::per_arm(vec![vec![1.0, -2.0], vec![1.0, 1.0]]);

    let scores = p.scores(&ctx).unwrap();
    assert!((scores[0].score - 0.1 * 5f64.sqrt()).abs() < 1e-12);
    assert!((scores[1].score - 0.1 * 2f64.sqrt()).abs() < 1e-12);
    assert!((scores[0].score - 0.2236).abs() < 1e-4);
    assert!((scores[1].score - 0.1414).abs() < 1e-4);

    assert_eq!(p.select_arm(&ctx).unwrap(), 0);
    p.update_reward(-4.0).unwrap();

    let a0 = p.arm(0).unwrap();
    assert_eq!(a0.a(), &[2.0, -2.0, -2.0, 5.0]);
    assert_eq!(a0.b(), &[-4.0, 8.0]);
    let a1 = p.arm(1).unwrap();
    assert_eq!(a1.a(), &[1.0, 0.0, 0.0, 1.0]);
    assert_eq!(a1.b(), &[0.0, 0.0]);
    assert_eq!(p.rewards_applied(), 1);
}

#[test]
fn ties_spread_uniformly_across_seeds() {
    let trials = 3000u64;
    let ctx = Context::shared(vec![1.0, 0.5]);
    let mut ucb_counts = [0u32; 3];
    let mut ts_counts = [0u32; 3];
    for seed in 0..trials {
        ucb_counts[linucb(3, 2, seed).select_arm(&ctx).unwrap()] += 1;
        // epsilon = 0 and an identical prior leave posterior draws as the only spread.
        let mut ts = LinearThompsonSampling::new(
            3,
            LinTsConfig {
                dim: 2,
                alpha: 0.1,
                epsilon: 0.0,
                n_bootstrap: 1,
                seed,
            },
        )
        .unwrap();
        ts_counts[ts.select_arm(&ctx).unwrap()] += 1;
    }
    for counts in [ucb_counts, ts_counts] {
        for c in counts {
            let frac = f64::from(c) / trials as f64;
            assert!((frac - 1.0 / 3.0).abs() < 0.05, "counts {counts:?}");
        }
    }
}

#[test]
fn reward_without_selection_is_rejected() {
    let mut p = linucb(2, 2, 0);
    assert!(matches!(p.update_reward(-1.0), Err(Error::NoPendingSelection)));

    let ctx = Context::shared(vec![1.0, 0.0]);
    p.select_arm(&ctx).unwrap();
    p.update_reward(-1.0).unwrap();
    // The pending selection is consumed by the first reward.
    assert!(matches!(p.update_reward(-1.0), Err(Error::NoPendingSelection)));
}

#[test]
fn malformed_contexts_are_rejected() {
    let mut p = lints(3, 2, 0);
    assert!(matches!(
        p.select_arm(&Context::per_arm(vec![vec![1.0, 0.0]; 2])),
        Err(Error::ContextArity { got: 2, expected: 3 })
    ));
    assert!(matches!(
        p.select_arm(&Context::shared(vec![1.0])),
        Err(Error::ContextDimension { got: 1, expected: 2, .. })
    ));
    assert!(matches!(
        p.select_arm(&Context::shared(vec![1.0, f64::NAN])),
        Err(Error::NonFinite { .. })
    ));
    assert_eq!(p.pending_arm(), None);
}

#[test]
fn learning_prefers_the_arm_with_smaller_penalty() {
    // Arm 1 always costs less; both engines should end up favoring it.
    let ctx = Context::shared(vec![1.0, 0.0]);
    let mut ucb = linucb(2, 2, 7);
    let mut ts = lints(2, 2, 7);
    let mut late = [0u32; 2];
    for t in 0..400 {
        let a = ucb.select_arm(&ctx).unwrap();
        ucb.update_reward(if a == 1 { -1.0 } else { -4.0 }).unwrap();
        let b = ts.select_arm(&ctx).unwrap();
        ts.update_reward(if b == 1 { -1.0 } else { -4.0 }).unwrap();
        if t >= 300 {
            late[0] += u32::from(a == 1);
            late[1] += u32::from(b == 1);
        }
    }
    assert!(late[0] >= 95, "linucb late picks of arm 1: {}", late[0]);
    assert!(late[1] >= 80, "lints late picks of arm 1: {}", late[1]);
}
