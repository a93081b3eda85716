use super::symbols::SymbolTable;
use super::value::Value;

/// A variable cell. `None` means declared (by `local`) but not yet assigned.
pub type Cell = Option<Value>;

/// One call frame's bindings plus the flag set by `test`.
#[derive(Debug, Default)]
pub struct Frame {
    pub vars: SymbolTable<Cell>,
    pub test: Option<bool>,
}

/// Nested call frames. Index 0 is the global frame and is never popped.
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn global(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn innermost(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    pub fn innermost_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// The cell for `name`, searching innermost to outermost.
    pub fn lookup(&self, name: &str) -> Option<&Cell> {
        self.frames.iter().rev().find_map(|frame| frame.vars.get(name))
    }

    /// Value of `name`, if bound and assigned.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.lookup(name).and_then(Option::as_ref)
    }

    /// Assigns into the innermost frame that already has a cell for `name`;
    /// otherwise creates the cell in the global frame.
    pub fn set(&mut self, name: &str, value: Value) {
        for frame in self.frames.iter_mut().rev() {
            if let Some(cell) = frame.vars.get_mut(name) {
                *cell = Some(value);
                return;
            }
        }
        self.frames[0].vars.set(name, Some(value));
    }

    /// Binds `name` in the innermost frame, shadowing any outer cell.
    pub fn set_local(&mut self, name: &str, value: Value) {
        self.innermost_mut().vars.set(name, Some(value));
    }

    /// Declares an unassigned cell in the innermost frame unless one exists there.
    pub fn declare_local(&mut self, name: &str) {
        let frame = self.innermost_mut();
        if !frame.vars.has(name) {
            frame.vars.set(name, None);
        }
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
