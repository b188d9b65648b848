pub mod payload;
pub mod plant_id;
pub mod request_id;
