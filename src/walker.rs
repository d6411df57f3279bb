//! Depth-first traversal of a bindable struct.

use crate::configurable::{Configurable, Field, FieldDescriptor};
use crate::error::Error;
use crate::types::{Bind, Slot};

/// What the visitor wants done after a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    /// Do not descend into this field even if it holds a struct.
    SkipStruct,
}

/// The chain of enclosing fields, innermost first.
#[derive(Debug, Clone, Copy)]
pub struct Path<'p> {
    pub field: FieldDescriptor,
    pub parent: Option<&'p Path<'p>>,
}

impl Path<'_> {
    fn collect_into(&self, out: &mut Vec<FieldDescriptor>) {
        if let Some(parent) = self.parent {
            parent.collect_into(out);
        }
        out.push(self.field);
    }
}

/// A field reached during traversal.
pub struct FieldNode<'a, 'p> {
    pub field: FieldDescriptor,
    pub slot: &'a mut dyn Slot,
    pub parent: Option<&'p Path<'p>>,
}

impl FieldNode<'_, '_> {
    /// Every link from the root struct's field down to this one.
    pub fn lineage(&self) -> Vec<FieldDescriptor> {
        let mut out = Vec::new();
        if let Some(parent) = self.parent {
            parent.collect_into(&mut out);
        }
        out.push(self.field);
        out
    }

    /// Structural dotted path, used in diagnostics.
    pub fn dotted_name(&self) -> String {
        self.lineage()
            .iter()
            .map(|f| f.name)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Visit every field of `root`, nested structs included.
///
/// Fields are visited in declaration order, each before its children. An
/// empty `Option` around a struct is allocated before descending into it,
/// unless the visitor answered [`Visit::SkipStruct`].
pub fn walk<T, F>(root: &mut T, mut visit: F) -> Result<(), Error>
where
    T: Bind,
    F: FnMut(&mut FieldNode<'_, '_>) -> Result<Visit, Error>,
{
    let root = root.as_configurable().ok_or(Error::NotAStructPointer)?;
    walk_struct(root, None, &mut visit)
}

fn walk_struct<'p, F>(
    target: &mut dyn Configurable,
    parent: Option<&'p Path<'p>>,
    visit: &mut F,
) -> Result<(), Error>
where
    F: FnMut(&mut FieldNode<'_, '_>) -> Result<Visit, Error>,
{
    for Field { descriptor, slot } in target.fields() {
        let mut node = FieldNode {
            field: descriptor,
            slot,
            parent,
        };
        if visit(&mut node)? == Visit::SkipStruct {
            log::trace!("not descending into {}", node.dotted_name());
            continue;
        }
        if let Some(nested) = node.slot.nested_or_alloc() {
            let link = Path {
                field: descriptor,
                parent,
            };
            walk_struct(nested, Some(&link), visit)?;
        }
    }
    Ok(())
}
