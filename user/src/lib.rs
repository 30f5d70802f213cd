//! Account management: the credential store, password hashing and the
//! stateless session-token service.

pub mod auth;
pub mod error;
pub mod store;

pub use auth::{Claims, TokenService};
pub use error::{Result as UserResult, UserError};
pub use store::{
    AccountStore, AdminAccountUpdate, AdminUserView, FacultyCard, NewAccount, ProfileUpdate,
    ProfileView, PublicMemberView, StudentCard, UserCategory, DEFAULT_RESET_PASSWORD,
};
