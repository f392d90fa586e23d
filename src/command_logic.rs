pub mod custom_fields;
pub mod init;
