// A wrapper around the `oxc_resolver` crate that only knows about project-local files.

mod resolver;

pub use crate::resolver::{Resolver, is_local_specifier};
pub use oxc_resolver::ResolveError;
