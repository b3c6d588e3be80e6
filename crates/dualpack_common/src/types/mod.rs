pub mod bundle_result;
pub mod dependency_graph;
pub mod import_record;
pub mod output_artifact_set;
pub mod raw_idx;
pub mod rename_record;
pub mod source;
pub mod source_joiner;
pub mod source_unit;
