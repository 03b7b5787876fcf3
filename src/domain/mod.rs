pub mod actor;
pub mod geom;
pub mod hold;
pub mod question;
pub mod rules;
