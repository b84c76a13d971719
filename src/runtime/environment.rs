use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::runtime::Value;

/// Environment for variable scoping
///
/// An outer stack of call frames, each an inner stack of block scopes. Lookups only ever
/// see the current (topmost) frame, so a callee can never observe its caller's variables.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Stack of active call frames
    frames: Vec<Frame>,
}

/// Scopes belonging to one active function call
#[derive(Debug, Clone)]
struct Frame {
    /// Nested block scopes; index 0 is the call's base scope and is never popped by a block
    scopes: Vec<Scope>,
}

/// Single block scope in a frame
#[derive(Debug, Clone, Default)]
struct Scope {
    /// Variables defined in this scope
    variables: HashMap<String, Value>,
}

impl Frame {
    fn new() -> Self {
        Frame {
            scopes: vec![Scope::default()],
        }
    }
}

impl Environment {
    /// Creates an environment with no active frames
    pub fn new() -> Self {
        Environment { frames: Vec::new() }
    }

    /// Pushes a fresh frame holding one empty scope
    pub fn enter_call(&mut self) {
        self.frames.push(Frame::new());
    }

    /// Pops the current frame together with all of its scopes
    pub fn exit_call(&mut self) -> Result<()> {
        self.frames
            .pop()
            .map(|_| ())
            .ok_or_else(|| Error::runtime("cannot exit call: no active frame"))
    }

    /// Pushes a new scope onto the current frame
    pub fn enter_block(&mut self) -> Result<()> {
        self.current_frame_mut()?.scopes.push(Scope::default());
        Ok(())
    }

    /// Pops the current frame's innermost scope
    pub fn exit_block(&mut self) -> Result<()> {
        let frame = self.current_frame_mut()?;
        if frame.scopes.len() <= 1 {
            return Err(Error::runtime(
                "cannot exit block: only the call's base scope remains",
            ));
        }
        frame.scopes.pop();
        Ok(())
    }

    /// Defines a new variable in the innermost scope of the current frame
    ///
    /// Fails if the name already exists in that exact scope; shadowing an outer
    /// scope is allowed.
    pub fn declare(&mut self, name: &str, value: Value) -> Result<()> {
        let scope = self
            .current_frame_mut()?
            .scopes
            .last_mut()
            .ok_or_else(|| Error::runtime("frame has no scope"))?;

        if scope.variables.contains_key(name) {
            return Err(Error::DuplicateVariable {
                name: name.to_string(),
            });
        }
        scope.variables.insert(name.to_string(), value);
        Ok(())
    }

    /// Gets the value of a variable, searching the current frame innermost to outermost
    pub fn lookup(&self, name: &str) -> Result<Value> {
        self.frames
            .last()
            .and_then(|frame| {
                frame
                    .scopes
                    .iter()
                    .rev()
                    .find_map(|scope| scope.variables.get(name))
            })
            .cloned()
            .ok_or_else(|| Error::UndefinedVariable {
                name: name.to_string(),
            })
    }

    /// Overwrites the nearest existing binding of `name` in the current frame
    ///
    /// Never creates a new binding.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<()> {
        let slot = self.frames.last_mut().and_then(|frame| {
            frame
                .scopes
                .iter_mut()
                .rev()
                .find_map(|scope| scope.variables.get_mut(name))
        });

        match slot {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::UndefinedVariable {
                name: name.to_string(),
            }),
        }
    }

    /// Number of active call frames
    pub fn call_depth(&self) -> usize {
        self.frames.len()
    }

    /// Number of scopes in the current frame (0 when no frame is active)
    pub fn block_depth(&self) -> usize {
        self.frames.last().map(|f| f.scopes.len()).unwrap_or(0)
    }

    fn current_frame_mut(&mut self) -> Result<&mut Frame> {
        self.frames
            .last_mut()
            .ok_or_else(|| Error::runtime("no active frame"))
    }
}
