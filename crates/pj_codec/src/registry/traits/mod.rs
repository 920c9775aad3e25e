// -----------------------------------------------------------------------------
// Modules

mod cast;
mod deserialize;
mod element;

// -----------------------------------------------------------------------------
// Exports

pub use cast::TypeTraitCast;
pub use deserialize::TypeTraitDeserialize;
pub use element::TypeTraitElement;
