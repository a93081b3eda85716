use std::collections::HashMap;

/// Case-folding name table used for the procedure registry and for every
/// scope's variable cells. Keys are stored lowercased; the original spelling
/// is not kept.
#[derive(Debug, Clone)]
pub struct SymbolTable<T> {
    entries: HashMap<String, T>,
}

impl<T> SymbolTable<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(&fold(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.entries.get_mut(&fold(name))
    }

    pub fn set(&mut self, name: &str, value: T) {
        self.entries.insert(fold(name), value);
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(&fold(name))
    }

    pub fn remove(&mut self, name: &str) -> Option<T> {
        self.entries.remove(&fold(name))
    }

    /// Folded keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}
