pub mod controls;
pub mod events;
pub mod status;
