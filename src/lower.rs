use crate::ir::{Body, Function, Param};
use crate::table::{Signedness, TypeEntry, TypeTable};

// Role-function suffixes the collections library defines for every tag.
pub const HASH_FUNCTION: &str = "hash_function";
pub const COMPARE: &str = "compare";
pub const COPY_CONSTRUCTOR: &str = "copy_constructor";
pub const DESTRUCTOR: &str = "destructor";

/// `<tag>_<role>`
pub fn role_fn(tag: &str, role: &str) -> String {
    format!("{tag}_{role}")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompareOptions {
    pub null_guard: bool,
}

/// `<key>_to_<value>_dictionary_create`
pub fn dictionary_ctor_name(key: &str, value: &str) -> String {
    format!("{key}_to_{value}_dictionary_create")
}

/// One comparator per non-opaque entry, in table order.
pub fn lower_comparators(table: &TypeTable, opts: CompareOptions) -> Vec<Function> {
    table
        .entries()
        .filter_map(|entry| lower_comparator(entry, opts))
        .collect()
}

fn lower_comparator(entry: &TypeEntry, opts: CompareOptions) -> Option<Function> {
    let c_type = entry.c_type().into_owned();
    let null_guard = opts.null_guard;
    let body = match entry.signedness {
        Signedness::Signed => Body::Subtract { c_type, null_guard },
        Signedness::Unsigned => Body::BranchCompare { c_type, null_guard },
        Signedness::Opaque => return None,
    };
    Some(Function {
        ret: "int".to_string(),
        name: role_fn(&entry.tag, COMPARE),
        params: vec![Param::new("void *", "a"), Param::new("void *", "b")],
        body,
    })
}

/// One constructor per ordered (key, value) pair: key outer, value inner.
pub fn lower_dictionary_ctors(table: &TypeTable) -> Vec<Function> {
    let mut out = Vec::with_capacity(table.len() * table.len());
    for key in table.entries() {
        for value in table.entries() {
            out.push(Function {
                ret: "dictionary*".to_string(),
                name: dictionary_ctor_name(&key.tag, &value.tag),
                params: Vec::new(),
                body: Body::DictionaryCreate {
                    key: key.tag.clone(),
                    value: value.tag.clone(),
                },
            });
        }
    }
    out
}
