use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};

/// What a placeholder path ends up pointing at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Collection,
    Record,
    Mapping,
    /// Executors, channels and error types.
    Opaque,
}

impl From<&TypeDescriptor> for Shape {
    fn from(ty: &TypeDescriptor) -> Self {
        match ty {
            TypeDescriptor::Scalar { .. } => Shape::Scalar,
            TypeDescriptor::Collection { .. } => Shape::Collection,
            TypeDescriptor::Record { .. } => Shape::Record,
            TypeDescriptor::Mapping { .. } => Shape::Mapping,
            TypeDescriptor::Executor | TypeDescriptor::Channel { .. } | TypeDescriptor::Error => {
                Shape::Opaque
            }
        }
    }
}

/// Reports the shape addressed by a dotted path inside a parameter type.
///
/// `path` holds every segment of the placeholder, including the parameter
/// name itself as the first element.
pub trait PathTypeResolver {
    fn resolve(&self, ty: &TypeDescriptor, path: &[&str]) -> Result<Shape>;
}

/// Walks the [`TypeDescriptor`] tree: record segments must name a field,
/// mapping segments accept any key.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorResolver;

impl PathTypeResolver for DescriptorResolver {
    fn resolve(&self, ty: &TypeDescriptor, path: &[&str]) -> Result<Shape> {
        let mut current = ty;
        for (depth, segment) in path.iter().enumerate().skip(1) {
            current = match current {
                TypeDescriptor::Record { fields } => fields.get(*segment).ok_or_else(|| {
                    Error::unresolvable(path.join("."), format!("no field named '{segment}'"))
                })?,
                TypeDescriptor::Mapping { value } => value,
                other => {
                    return Err(Error::unresolvable(
                        path.join("."),
                        format!(
                            "'{}' is a {:?} value and has no members",
                            path[..depth].join("."),
                            Shape::from(other)
                        ),
                    ))
                }
            };
        }
        Ok(Shape::from(current))
    }
}
