//! Domain services: all business rules live here, between the HTTP handlers
//! and the repository interfaces. A service is constructed per request from
//! the repository handles in `AppState`.

pub mod accounts;
pub mod pathways;
pub mod progress;

pub use accounts::AccountService;
pub use pathways::PathwayService;
pub use progress::ProgressService;
