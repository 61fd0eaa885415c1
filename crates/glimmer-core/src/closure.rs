//! Closure registration records
//!
//! A renderer registers each closure it understands ahead of time: a name,
//! an integer identifier it will use to recognize the closure at render
//! time, and the memory layout of the closure's parameter block. The
//! library only stores the layout; closure *evaluation* belongs to the
//! renderer.

use crate::typedesc::TypeDesc;

/// Layout of one field in a closure's parameter block.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureParamDef {
    /// Type of the field.
    pub typedesc: TypeDesc,
    /// Byte offset of the field within the parameter block.
    pub offset: usize,
    /// Optional keyword-parameter name; `None` for positional fields.
    pub key: Option<String>,
    /// Declared byte size of the field.
    pub field_size: usize,
}

/// A registered closure: name, renderer-chosen id, and parameter layout.
#[derive(Debug, Clone)]
pub struct ClosureDef {
    pub name: String,
    pub id: i32,
    pub params: Vec<ClosureParamDef>,
}

impl ClosureDef {
    /// Total parameter-block size implied by the registered fields.
    pub fn struct_size(&self) -> usize {
        self.params
            .iter()
            .map(|p| p.offset + p.field_size.max(p.typedesc.size()))
            .max()
            .unwrap_or(0)
    }
}
