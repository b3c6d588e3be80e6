oxc_index::define_index_type! {
  #[derive(Default)]
  pub struct UnitIdx = u32;
}
