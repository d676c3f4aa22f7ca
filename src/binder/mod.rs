pub mod code_literal;
pub mod render;
pub mod value;

pub use code_literal::{json_literal, quoted_string_literal};
pub use render::{bind, BindingWarning, BoundTemplate, RenderContext, RenderMode};
pub use value::{Scalar, Value, ValueBag};
