//! Authentication module for user sessions and the token login flow.
//!
//! This module provides:
//! - `Session`: bearer token + user id + expiration
//! - `SessionStore`: JSON persistence of a session for front ends
//! - `generate_login_url`: the tokenlogin.aspx URL with its secret key
//! - `AuthInfo`: user id / expiration captured from the login redirect

pub mod auth_info;
pub mod login;
pub mod session;

pub use auth_info::AuthInfo;
pub use login::{generate_login_url, generate_secret_key, LoginUrl};
pub use session::{Session, SessionStore};
