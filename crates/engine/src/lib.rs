pub use credentials::{Claims, TokenService, hash_password, verify_password};
pub use entities::EntityKind;
pub use error::{EngineError, FieldIssue};
pub use incomes::IncomeKind;
pub use ops::{
    Engine, EngineBuilder, EntityBreakdown, EntityFilter, EntityOverview, EntityRef, Estimator,
    IncomeFilter, IncomePatch, IncomeRecord, KindTotal, LoginOutcome, MonthlyTotal, NewEntity,
    NewIncome, NewSecurityQuestion, NewUser, PlaceholderEstimator, Projections, ProvinceTotal,
    ReportEntity, ReportTotals, UserOverview, UserPatch, UserRef, YearlyReport, month_label,
};
pub use users::UserRole;

mod credentials;
pub mod entities;
mod error;
pub mod incomes;
mod ops;
pub mod security_questions;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
