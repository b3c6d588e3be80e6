pub mod concat_string;
pub mod ecmascript;
pub mod indexmap;
pub mod node_builtins;
pub mod path_ext;
pub mod rayon;
