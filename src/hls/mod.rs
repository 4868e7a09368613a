pub mod cue;
pub mod manifest;
pub mod parser;
