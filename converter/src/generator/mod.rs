pub mod dump;
pub mod template;
