pub mod protected;
pub mod status;
