//! Editable form tree
//!
//! This module contains the uniform tree every configuration section is
//! rendered into:
//!
//! - `value`: the closed set of editable payloads ([`FieldValue`])
//! - `node`: tree nodes pairing identity, display metadata and a value
//! - `router` / `processor`: fixed-slot composite forms with named accessors
//! - `area`: one configuration section with its rolled-up finding
//! - `tooltip`: token → explanation table

pub mod area;
pub mod node;
pub mod processor;
pub mod router;
pub mod tooltip;
pub mod value;

pub use area::Area;
pub use node::InputNode;
pub use processor::{ProcessorFields, ProcessorFormValue};
pub use router::{RouterFields, RouterFormValue};
pub use tooltip::TooltipTable;
pub use value::{
    ArrayItem, ChoiceValue, FieldKind, FieldValue, HeaderEntry, HeaderMapValue, LabelValue,
    StringArrayValue, TextValue, INVALID, REJECTED, VALID,
};
