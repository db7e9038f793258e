pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{CatalogError, CatalogService, SeedSummary};
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod report_service;
pub mod report_service_impl;
pub use report_service::{ReportError, ReportService};
pub use report_service_impl::SeaOrmReportService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, BootstrapOutcome, SessionUser, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod login_throttle;
pub use login_throttle::LoginThrottle;

pub mod monitor;
pub use monitor::Monitor;
