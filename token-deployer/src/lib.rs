pub mod helpers;
pub mod interfaces;
pub mod scripts;
pub mod services;
