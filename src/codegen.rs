//! IR → C source text.
//!
//! Output is deterministic: the same functions in the same order always render
//! to the same bytes. Definitions are each followed by one blank line;
//! prototypes are one per line.
use crate::ir::{Body, Function, Param};
use crate::lower::{role_fn, COMPARE, COPY_CONSTRUCTOR, DESTRUCTOR, HASH_FUNCTION};

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Definitions,
    Prototypes,
}

pub struct Codegen {
    mode: Mode,
    out: String,
}

impl Codegen {
    pub fn new(mode: Mode) -> Self {
        Self { mode, out: String::new() }
    }

    pub fn emit(&mut self, f: &Function) {
        let signature = signature(f);
        match self.mode {
            Mode::Prototypes => self.line(0, &format!("{signature};")),
            Mode::Definitions => {
                self.line(0, &format!("{signature} {{"));
                self.body(&f.body);
                self.line(0, "}");
                self.blank();
            }
        }
    }

    pub fn emit_all<'a>(&mut self, fns: impl IntoIterator<Item = &'a Function>) {
        for f in fns {
            self.emit(f);
        }
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn body(&mut self, body: &Body) {
        match body {
            Body::Subtract { c_type, null_guard } => {
                if *null_guard {
                    self.null_guard();
                }
                self.line(1, &format!("return *(({c_type}*) a) - *(({c_type}*) b);"));
            }
            Body::BranchCompare { c_type, null_guard } => {
                if *null_guard {
                    self.null_guard();
                }
                self.line(1, &format!("{c_type} aa = *(({c_type}*) a);"));
                self.line(1, &format!("{c_type} bb = *(({c_type}*) b);"));
                self.blank();
                self.line(1, "if ( aa == bb ) {");
                self.line(2, "return 0;");
                self.line(1, "}");
                self.blank();
                self.line(1, "return aa < bb ? -1 : 1;");
            }
            Body::DictionaryCreate { key, value } => {
                self.line(1, "return dictionary_create(");
                self.line(2, &format!(
                    "{}, {},",
                    role_fn(key, HASH_FUNCTION),
                    role_fn(key, COMPARE),
                ));
                self.line(2, &format!(
                    "{}, {},",
                    role_fn(key, COPY_CONSTRUCTOR),
                    role_fn(key, DESTRUCTOR),
                ));
                self.line(2, &format!(
                    "{}, {}",
                    role_fn(value, COPY_CONSTRUCTOR),
                    role_fn(value, DESTRUCTOR),
                ));
                self.line(1, ");");
            }
        }
    }

    // Same prologue the library's hand-written comparators use.
    fn null_guard(&mut self) {
        self.line(1, "if ( !a && !b ) {");
        self.line(2, "return 0;");
        self.line(1, "} else if ( !a || !b ) {");
        self.line(2, "return (!a) ? -1 : 1;");
        self.line(1, "}");
        self.blank();
    }

    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }
}

/// Render a batch of functions in one go.
pub fn render(fns: &[Function], mode: Mode) -> String {
    let mut cg = Codegen::new(mode);
    cg.emit_all(fns);
    cg.into_string()
}

fn signature(f: &Function) -> String {
    let params = if f.params.is_empty() {
        "void".to_string()
    } else {
        f.params.iter().map(param).collect::<Vec<_>>().join(", ")
    };
    format!("{} {}({params})", f.ret, f.name)
}

fn param(p: &Param) -> String {
    // `void *` hugs the name; `int` needs a space
    if p.ty.ends_with('*') {
        format!("{}{}", p.ty, p.name)
    } else {
        format!("{} {}", p.ty, p.name)
    }
}
