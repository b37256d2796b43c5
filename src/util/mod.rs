//! Collaborators the engine consumes: dotted-path access and date parsing

pub mod date;
pub mod path;
