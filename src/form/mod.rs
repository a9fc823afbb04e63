//! Form registration, classification and validation.

pub mod category;
pub mod registry;
pub mod validator;

pub use category::{CategoryProfile, FormCategory, FormIdentity};
pub use registry::{FormRegistry, InFlightGuard, SiteForm, SubmitButton};
pub use validator::{is_valid_email, validate_field, FieldKind, FieldSpec};
