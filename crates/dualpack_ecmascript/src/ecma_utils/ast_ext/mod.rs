pub mod binding_pattern_ext;
pub mod statement_ext;
