//! Repositories for database operations

pub mod category;
pub mod ledger;
pub mod level;
pub mod notification;
pub mod slider;
pub mod staff;
pub mod template;
pub mod tfa;
pub mod user;

pub use category::CategoryRepository;
pub use ledger::LedgerRepository;
pub use level::LevelRepository;
pub use notification::NotificationRepository;
pub use slider::SliderRepository;
pub use staff::{RoleRepository, StaffRepository};
pub use template::TemplateRepository;
pub use tfa::TfaRepository;
pub use user::UserRepository;
