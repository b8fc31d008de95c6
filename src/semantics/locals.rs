//! Lexical frames of typed local bindings.
//!
//! Emitters and rewrite passes walk function bodies with a [`Locals`] value: a stack of frames mirroring the nesting
//! of blocks, plus the class `this` refers to. Lookups go innermost-first, so shadowing works as in the source.

use super::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Parameters of the function or method
    Function,
    Block,
    /// Body of a loop; `break`/`continue` unwind up to here
    Loop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub kind: FrameKind,
    pub bindings: Vec<(String, Type)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Locals {
    frames: Vec<Frame>,
    this_class: Option<String>,
}

impl Locals {
    /// Locals of a body, starting with an empty function frame.
    pub fn new(this_class: Option<String>) -> Self {
        Self {
            frames: vec![Frame {
                kind: FrameKind::Function,
                bindings: Vec::new(),
            }],
            this_class,
        }
    }

    pub fn this_class(&self) -> Option<&str> {
        self.this_class.as_deref()
    }

    pub fn push(&mut self, kind: FrameKind) {
        self.frames.push(Frame {
            kind,
            bindings: Vec::new(),
        });
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bind `name` in the innermost frame.
    pub fn declare(&mut self, name: impl Into<String>, ty: Type) {
        if let Some(frame) = self.frames.last_mut() {
            frame.bindings.push((name.into(), ty));
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.bindings.iter().rev())
            .find(|(bound, _)| bound == name)
            .map(|(_, ty)| ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::Primitive;

    #[test]
    fn test_inner_binding_shadows_outer() {
        let mut locals = Locals::new(None);
        locals.declare("c", Type::Class("Vec2".into()));
        locals.push(FrameKind::Block);
        locals.declare("c", Type::Primitive(Primitive::Number));

        assert_eq!(locals.lookup("c"), Some(&Type::Primitive(Primitive::Number)));

        locals.pop();
        assert_eq!(locals.lookup("c"), Some(&Type::Class("Vec2".into())));
    }

    #[test]
    fn test_unknown_name_is_none() {
        let locals = Locals::new(Some("Vec2".into()));
        assert_eq!(locals.lookup("missing"), None);
        assert_eq!(locals.this_class(), Some("Vec2"));
        assert_eq!(locals.depth(), 1);
    }
}
