pub mod error;
pub mod types;
pub mod vars;

pub use error::{ExprError, ExprErrorKind};
pub use types::*;
pub use vars::VariableSource;
