//! HTTP handlers for the admin API.

mod devices;
mod stats;
mod users;
mod verify;

pub use devices::{delete_device_handler, list_devices_handler};
pub use stats::stats_handler;
pub use users::{
    delete_user_handler, list_users_handler, update_user_handler, user_devices_handler,
    user_profile_handler,
};
pub use verify::verify_token_handler;

// utoipa path items, referenced by the OpenAPI document.
pub use devices::{__path_delete_device_handler, __path_list_devices_handler};
pub use stats::__path_stats_handler;
pub use users::{
    __path_delete_user_handler, __path_list_users_handler, __path_update_user_handler,
    __path_user_devices_handler, __path_user_profile_handler,
};
pub use verify::__path_verify_token_handler;
