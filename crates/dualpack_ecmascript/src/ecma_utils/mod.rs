pub mod ast_ext;
pub mod source_edits;
