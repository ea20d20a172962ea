pub mod helper;
pub mod moments;
