#[cfg(test)]
mod common;

#[cfg(test)]
mod form_submit_tests;


#[cfg(test)]
mod record_admin_tests;

#[cfg(test)]
mod bulk_delete_tests;

#[cfg(test)]
mod export_tests;

#[cfg(test)]
mod auth_tests;

#[cfg(test)]
mod settings_tests;

#[cfg(test)]
mod demo_mode_tests;

#[cfg(test)]
mod notification_tests;


#[cfg(test)]
mod client_tests;
