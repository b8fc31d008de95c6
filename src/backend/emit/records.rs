//! Function and class records.
//!
//! A record is opened when the emitter enters a function-like or class declaration, filled while its members and
//! body are walked, and printed once when the declaration is left. Printing is the only place where the final
//! layout of a definition is decided.

use tscc_syntax::ast::Visibility;

use super::buffer::{AppendMode, CodeBuffer, Layout};
use crate::semantics::Ownership;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRecord {
    pub ty: String,
    pub name: String,
    /// Default value, printed only in in-class declarations
    pub default: Option<String>,
}

/// One function, method, constructor or destructor being emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRecord {
    /// `None` for constructors and destructors
    pub return_type: Option<String>,
    /// `Class::` for out-of-class member definitions
    pub name_prefix: Option<String>,
    pub name: String,
    pub params: Vec<ParamRecord>,
    /// `var` declarations, printed before the body
    pub hoisted: CodeBuffer,
    pub body: CodeBuffer,
}

impl FunctionRecord {
    pub fn new(layout: Layout, return_type: Option<String>, name_prefix: Option<String>, name: String) -> Self {
        Self {
            return_type,
            name_prefix,
            name,
            params: Vec::new(),
            hoisted: CodeBuffer::with_depth(layout, 1),
            body: CodeBuffer::with_depth(layout, 1),
        }
    }

    /// Signature without a trailing `;` or body.
    ///
    /// `qualified` prepends the `Class::` prefix; `with_defaults` prints parameter default values.
    pub fn print_declaration(&self, qualified: bool, with_defaults: bool) -> String {
        let mut out = String::new();
        if let Some(return_type) = &self.return_type {
            out.push_str(return_type);
            out.push(' ');
        }
        if let (true, Some(prefix)) = (qualified, &self.name_prefix) {
            out.push_str(prefix);
        }
        out.push_str(&self.name);
        let params: Vec<String> = self
            .params
            .iter()
            .map(|param| match (&param.default, with_defaults) {
                (Some(default), true) => format!("{} {} = {}", param.ty, param.name, default),
                _ => format!("{} {}", param.ty, param.name),
            })
            .collect();
        out.push('(');
        out.push_str(&params.join(", "));
        out.push(')');
        out
    }

    /// Full definition: declaration, then hoisted declarations and body inside braces.
    pub fn print(&self) -> String {
        let line_ending = self.body.layout().line_ending;
        let mut lines = vec![self.print_declaration(true, false), "{".to_string()];
        for part in [&self.hoisted, &self.body] {
            let text = part.text().trim_end();
            if !text.is_empty() {
                lines.push(text.to_string());
            }
        }
        lines.push("}".to_string());
        lines.join(line_ending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    pub visibility: Visibility,
    pub ty: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRecord {
    pub visibility: Visibility,
    pub function: FunctionRecord,
}

/// One class being emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    /// Emitted name
    pub name: String,
    pub ownership: Ownership,
    pub fields: Vec<FieldRecord>,
    /// Methods, constructor and destructor in declaration order
    pub methods: Vec<MethodRecord>,
}

impl ClassRecord {
    pub fn new(name: String, ownership: Ownership) -> Self {
        Self {
            name,
            ownership,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Class block followed by the out-of-class method definitions.
    ///
    /// Fields and method declarations are grouped by visibility (public, protected, private); declaration order is
    /// kept within each group.
    pub fn print(&self, layout: Layout) -> String {
        let mut block = CodeBuffer::new(layout);
        block.append(&format!("class {}", self.name), AppendMode::LINE);
        block.append("{", AppendMode::LINE);

        for visibility in Visibility::ORDER {
            let fields: Vec<&FieldRecord> = self.fields.iter().filter(|f| f.visibility == visibility).collect();
            if fields.is_empty() {
                continue;
            }
            block.append(&format!("{}:", visibility.as_str()), AppendMode::LINE);
            block.indent();
            for field in fields {
                block.append(&format!("{} {};", field.ty, field.name), AppendMode::LINE);
            }
            block.dedent();
        }

        for visibility in Visibility::ORDER {
            let methods: Vec<&MethodRecord> = self.methods.iter().filter(|m| m.visibility == visibility).collect();
            if methods.is_empty() {
                continue;
            }
            block.append(&format!("{}:", visibility.as_str()), AppendMode::LINE);
            block.indent();
            for method in methods {
                let declaration = method.function.print_declaration(false, true);
                block.append(&format!("{declaration};"), AppendMode::LINE);
            }
            block.dedent();
        }
        block.append("};", AppendMode::INLINE);

        let mut sections = vec![block.into_text()];
        sections.extend(self.methods.iter().map(|method| method.function.print()));
        let separator = format!("{0}{0}", layout.line_ending);
        sections.join(&separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout {
            indent_width: 4,
            line_ending: "\n",
        }
    }

    fn function(return_type: Option<&str>, name: &str) -> FunctionRecord {
        FunctionRecord::new(
            layout(),
            return_type.map(str::to_string),
            Some("tscc_Vec2::".to_string()),
            name.to_string(),
        )
    }

    // ========================================
    // Function record tests
    // ========================================

    #[test]
    fn test_declaration_forms() {
        let mut f = function(Some("i32"), "len");
        f.params.push(ParamRecord {
            ty: "i32".into(),
            name: "scale".into(),
            default: Some("1".into()),
        });
        assert_eq!(f.print_declaration(true, false), "i32 tscc_Vec2::len(i32 scale)");
        assert_eq!(f.print_declaration(false, true), "i32 len(i32 scale = 1)");
    }

    #[test]
    fn test_hoisted_declarations_precede_body() {
        let mut f = function(Some("void"), "run");
        f.name_prefix = None;
        f.body.append("x = 1;", AppendMode::LINE);
        f.hoisted.append("i32 x;", AppendMode::LINE);
        assert_eq!(f.print(), "void run()\n{\n    i32 x;\n    x = 1;\n}");
    }

    #[test]
    fn test_empty_body() {
        let f = function(None, "~tscc_Vec2");
        assert_eq!(f.print(), "tscc_Vec2::~tscc_Vec2()\n{\n}");
    }

    // ========================================
    // Class record tests
    // ========================================

    #[test]
    fn test_visibility_groups_keep_declaration_order() {
        let mut class = ClassRecord::new("tscc_Mixed".into(), Ownership::SharedHeap);
        for (visibility, name) in [
            (Visibility::Public, "a"),
            (Visibility::Private, "b"),
            (Visibility::Public, "c"),
            (Visibility::Protected, "d"),
        ] {
            class.fields.push(FieldRecord {
                visibility,
                ty: "i32".into(),
                name: name.into(),
            });
        }
        let printed = class.print(layout());
        assert_eq!(
            printed,
            "class tscc_Mixed\n{\npublic:\n    i32 a;\n    i32 c;\nprotected:\n    i32 d;\nprivate:\n    i32 b;\n};"
        );
    }

    #[test]
    fn test_method_groups_keep_declaration_order() {
        let mut class = ClassRecord::new("tscc_Vec2".into(), Ownership::Value);
        for (visibility, name) in [
            (Visibility::Public, "a"),
            (Visibility::Private, "b"),
            (Visibility::Public, "c"),
            (Visibility::Protected, "d"),
        ] {
            class.methods.push(MethodRecord {
                visibility,
                function: function(Some("void"), name),
            });
        }
        let printed = class.print(layout());
        let block = printed.split("\n\n").next().unwrap();
        assert_eq!(
            block,
            "class tscc_Vec2\n{\npublic:\n    void a();\n    void c();\nprotected:\n    void d();\nprivate:\n    void b();\n};"
        );
        let definitions: Vec<&str> = printed.split("\n\n").skip(1).collect();
        assert_eq!(
            definitions,
            [
                "void tscc_Vec2::a()\n{\n}",
                "void tscc_Vec2::b()\n{\n}",
                "void tscc_Vec2::c()\n{\n}",
                "void tscc_Vec2::d()\n{\n}",
            ]
        );
    }

    #[test]
    fn test_method_bodies_follow_class_block() {
        let mut class = ClassRecord::new("tscc_Vec2".into(), Ownership::Value);
        class.methods.push(MethodRecord {
            visibility: Visibility::Public,
            function: function(None, "~tscc_Vec2"),
        });
        let printed = class.print(layout());
        assert_eq!(
            printed,
            "class tscc_Vec2\n{\npublic:\n    ~tscc_Vec2();\n};\n\ntscc_Vec2::~tscc_Vec2()\n{\n}"
        );
    }
}
