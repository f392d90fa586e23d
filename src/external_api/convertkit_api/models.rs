pub mod custom_field;
pub mod field_request;
pub mod status_record;
