//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

mod common;

pub mod battalion_repo;
pub mod communication_repo;
pub mod dashboard_repo;
pub mod district_repo;
pub mod menu_repo;
pub mod module_repo;
pub mod performance_statistic_repo;
pub mod permission_repo;
pub mod question_repo;
pub mod range_repo;
pub mod report_repo;
pub mod role_repo;
pub mod session_repo;
pub mod state_repo;
pub mod sub_menu_repo;
pub mod sub_topic_repo;
pub mod topic_repo;
pub mod user_repo;

pub use battalion_repo::BattalionRepo;
pub use communication_repo::CommunicationRepo;
pub use dashboard_repo::DashboardRepo;
pub use district_repo::DistrictRepo;
pub use menu_repo::MenuRepo;
pub use module_repo::ModuleRepo;
pub use performance_statistic_repo::PerformanceStatisticRepo;
pub use permission_repo::PermissionRepo;
pub use question_repo::QuestionRepo;
pub use range_repo::RangeRepo;
pub use report_repo::ReportRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use state_repo::StateRepo;
pub use sub_menu_repo::SubMenuRepo;
pub use sub_topic_repo::SubTopicRepo;
pub use topic_repo::TopicRepo;
pub use user_repo::UserRepo;
