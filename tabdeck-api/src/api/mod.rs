//! HTTP API handlers for tabdeck-api

pub mod assist;
pub mod components;
pub mod extract;
pub mod health;
pub mod state;

pub use assist::{assist_routes, ask_question, detect_keyword};
pub use components::{add_component, clear_components, component_routes, update_component};
pub use extract::JsonBody;
pub use health::{get_build_info, health_check, health_routes};
pub use state::{get_state, merge_tabs, set_active_tab, state_routes};
