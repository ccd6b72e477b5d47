//! CrudService: generic CRUD using the safe SQL builder, plus write validation.

mod crud;
pub mod validation;
pub use crud::CrudService;
pub use validation::{ensure_known_attributes, ensure_required_for_create};
