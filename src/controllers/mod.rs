pub mod document_controller;
pub mod part_controller;
pub mod vehicle_controller;
