//! Custom field actions for the ConvertKit API: list, create, update and delete.
//!
//! [`ConvertkitApi`] performs each action as a single request through a [`Transport`].
//! [`actions::run_action`] exposes the same actions to a host runtime by name.

pub mod actions;
pub mod cli_app;
pub mod command_logic;
pub mod config;
pub mod constants;
pub mod external_api;

pub use actions::{run_action, ActionName, ActionOutcome};
pub use config::Config;
pub use external_api::convertkit_api::ConvertkitApi;
pub use external_api::{ApiError, BaseApiClient, HttpResponse, Transport};
