pub mod rate;
pub mod track;
