//! `platoon`: contextual-bandit speed correction for a one-dimensional vehicle platoon.
//!
//! A lead vehicle drives ahead of `n - 1` followers. Every tick a control loop
//! observes the gaps between neighbours, turns them into per-follower context
//! rows, and asks a linear contextual bandit which single follower to correct.
//! The chosen follower gets a bounded speed change; the squared deviation of its
//! gap from the ideal distance is charged as the penalty, and its negation is
//! fed back to the bandit as the reward.
//!
//! **Engines:**
//! - [`LinUcb`]: disjoint LinUCB, `θᵀx + α·√(xᵀA⁻¹x)`.
//! - [`LinearThompsonSampling`]: linear Thompson sampling from `N(θ, α²A⁻¹)`,
//!   averaged over `n_bootstrap` draws, with an `epsilon` uniform-exploration floor.
//! - [`ContextualPolicy`]: common `decide`/`update_reward` surface; [`BanditModel`]
//!   is the closed set the simulation switches over.
//!
//! Both engines are deterministic given `(seed, rewards applied, context)`:
//! calling `decide` twice without an intervening `update_reward` returns the same
//! arm and leaves the per-arm statistics untouched. Exact score ties are broken
//! uniformly at random from that same seed.
//!
//! **Control loop** ([`ControlLoop`]):
//!
//! ```text
//! Subject ─▶ Monitor ─▶ Analyzer ─▶ Planner ─▶ Executer ─▶ Subject
//!                 └────────── Knowledge (per run) ──────────┘
//! ```
//!
//! Subjects are either a self-stepping [`LiveFleet`] or a recorded [`Trace`]
//! replayed through [`TracePlayback`]. [`Simulation`] wires everything from a
//! TOML [`Config`] and runs `num_simulation_runs` independent runs.
//!
//! ```
//! use platoon::{Config, ModelKind, Simulation};
//!
//! let cfg = Config::from_toml_str(
//!     r#"
//!     [acvs]
//!     num_acvs = 3
//!     [simulation]
//!     max_ticks = 20
//!     "#,
//! )
//! .unwrap();
//! let reports = Simulation::new(cfg, ModelKind::LinearUcb)
//!     .unwrap()
//!     .run_live()
//!     .unwrap();
//! assert_eq!(reports[0].ticks, 20);
//! ```

#![forbid(unsafe_code)]

mod error;
pub use error::*;

mod linalg;

mod stable_hash;
pub use stable_hash::*;

mod context;
pub use context::*;

mod arm;
pub use arm::*;

mod decision;
pub use decision::*;

mod contextual;
pub use contextual::*;

mod thompson;
pub use thompson::*;

mod policy;
pub use policy::*;

mod config;
pub use config::*;

mod acv;
pub use acv::*;

mod subject;
pub use subject::*;

mod trace;
pub use trace::*;

mod knowledge;
pub use knowledge::*;

mod monitor;
pub use monitor::*;

mod analyzer;
pub use analyzer::*;

mod planner;
pub use planner::*;

mod executer;
pub use executer::*;

mod control;
pub use control::*;

mod simulation;
pub use simulation::*;
