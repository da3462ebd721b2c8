//! Domain services composed from the repositories

pub mod balance;
pub mod levels;
pub mod lifecycle;
pub mod tfa;
pub mod users;

pub use balance::BalanceService;
pub use levels::LevelService;
pub use lifecycle::LifecycleService;
pub use tfa::TfaService;
pub use users::{PatchOutcome, UserService};
