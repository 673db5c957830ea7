//! Request and response models for the admin API.

mod requests;
mod responses;

pub use requests::{ListUsersQuery, UpdateUserRequest};
pub use responses::{
    DeviceListResponse, DeviceResponse, ProfileResponse, StatsResponse, StatusResponse,
    UserDeviceListResponse, UserDeviceResponse, UserListResponse, UserResponse, VerifyResponse,
};
