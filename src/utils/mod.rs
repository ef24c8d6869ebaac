pub mod time;
pub mod uri;
