// Strongly-typed IR for codegen. No type-table lookups happen past this point.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub ret: String,         // e.g. `int`, `dictionary*`
    pub name: String,
    pub params: Vec<Param>,  // empty renders as `(void)`
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ty: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// `return *((T*) a) - *((T*) b);`
    Subtract { c_type: String, null_guard: bool },
    /// copy into locals, then `==` and `<`; never subtracts
    BranchCompare { c_type: String, null_guard: bool },
    /// `return dictionary_create(...)` wired with per-tag role functions
    DictionaryCreate { key: String, value: String },
}

impl Param {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self { ty: ty.into(), name: name.into() }
    }
}
