pub mod load_config;
pub mod module_locator;
pub mod name_generator;
pub mod normalize_options;
pub mod parse_unit;
