//! API models for request and response payloads

pub mod category;
pub mod document;
pub mod ledger;
pub mod level;
pub mod notification;
pub mod slider;
pub mod staff;
pub mod template;
pub mod tfa;
pub mod user;

pub use category::{Category, CategoryFields};
pub use document::{DocumentUpload, UserDocuments};
pub use ledger::{
    Balances, CategoryBalance, CoinAdjustment, CoinType, EditCoinsRequest, LedgerEntry,
    LedgerQuery, NewLedgerEntry, UserCoinTotal, UserLedger,
};
pub use level::{Level, LevelFields, ReassignRequest};
pub use notification::{
    DevicePushRequest, NewNotification, Notification, PushOutcome, TopicPushRequest,
};
pub use slider::{Slider, SliderFields};
pub use staff::{
    NewRole, NewStaff, Permission, Role, Staff, StaffStatus, UpdateRole, UpdateStaff,
};
pub use template::{RenderedTemplate, Template, TemplateFields};
pub use tfa::{SendCodeRequest, TfaIssued, TfaSession, TfaStatus, VerifyCodeRequest};
pub use user::{
    ChangeStatusRequest, EditLevelRequest, NewUser, SearchQuery, StatusChange, User,
    UserProfile, UserStatus,
};
