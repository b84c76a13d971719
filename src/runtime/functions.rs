use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::parser::{FunctionDef, Program};

/// Names handled by the evaluator itself; user definitions with these names are unreachable
pub const PRIMITIVES: [&str; 3] = ["print", "inputi", "inputs"];

/// Function table key: overloads are distinguished purely by parameter count
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionKey {
    /// Function name
    pub name: String,
    /// Number of parameters
    pub arity: usize,
}

impl FunctionKey {
    /// Creates a key from a name and parameter count
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        FunctionKey {
            name: name.into(),
            arity,
        }
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// Immutable `(name, arity) -> definition` mapping built once per program
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: HashMap<FunctionKey, Arc<FunctionDef>>,
}

impl FunctionTable {
    /// Builds the table from every top-level definition
    ///
    /// A later definition with the same name and arity replaces an earlier one.
    pub fn build(program: &Program) -> Self {
        let mut functions = HashMap::with_capacity(program.functions.len());

        for def in &program.functions {
            let key = FunctionKey::new(def.name.clone(), def.arity());
            if PRIMITIVES.contains(&def.name.as_str()) {
                warn!(function = %key, "definition shadowed by built-in primitive");
            }
            if functions.insert(key.clone(), Arc::new(def.clone())).is_some() {
                warn!(function = %key, "duplicate definition replaces earlier one");
            }
        }

        FunctionTable { functions }
    }

    /// Resolves a call by name and argument count
    pub fn get(&self, name: &str, arity: usize) -> Option<Arc<FunctionDef>> {
        self.functions.get(&FunctionKey::new(name, arity)).cloned()
    }

    /// Arities defined for `name`, sorted
    pub fn arities(&self, name: &str) -> Vec<usize> {
        let mut arities: Vec<usize> = self
            .functions
            .keys()
            .filter(|key| key.name == name)
            .map(|key| key.arity)
            .collect();
        arities.sort_unstable();
        arities
    }

    /// Number of distinct `(name, arity)` entries
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// True when the program defines no functions
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
