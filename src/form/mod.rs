//! Package form fields: rendering, validation and the base form screen
//!
//! A [`FieldRenderer`] turns field descriptors into label/input markup and
//! handles the input and invalid events of every rendered field. The
//! [`PackageForm`] screen arranges fields in collapsible sections and drives
//! submission.

pub mod deferred;
pub mod element;
pub mod ids;
pub mod markup;
pub mod package_form;
pub mod renderer;
pub mod traits;
pub mod tree;
pub mod ui;
pub mod validity;

pub use deferred::{Deferred, DeferredQueue};
pub use element::InputElement;
pub use ids::IdGenerator;
pub use markup::{Attribute, FieldMarkup, InputMarkup, LabelMarkup, MarkupNode, TooltipMarkup};
pub use package_form::{FormAction, PackageForm, PackageOptions, SubmitOutcome, ValidationBubble};
pub use renderer::{FieldRenderer, InvalidEvent, PreparedField};
pub use traits::{Disclosures, FieldSurface};
pub use tree::{FormTree, NodeId};
pub use validity::{Constraint, ValidityState};
