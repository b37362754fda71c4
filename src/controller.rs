/// Contact record endpoints
pub mod contacts;
