pub mod admin_user;
pub mod app_config;
pub mod record;
pub mod refresh_token;
