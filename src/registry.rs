use crate::config::TYPE_KEY;
use crate::prelude::*;
use std::collections::HashMap;

/// Builder invoked with the config minus its `"type"` key. Builders consume
/// the parameters they know and reject the rest, so a typo in an option name
/// surfaces as the constructor's own error.
pub type BuildFn<T> = fn(&mut Config) -> Result<T>;

enum Entry<T> {
    Builder(BuildFn<T>),
    /// Name claimed for a planned variant that is not selectable yet.
    Reserved,
}

/// Name -> constructor table. Populated through `&mut self` before the value
/// is shared; once shared it is read-only, so `build` is safe to call from
/// any number of threads.
pub struct Registry<T> {
    entries: HashMap<String, Entry<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Registry::new()
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a builder under `name`. Names are unique: claiming one twice
    /// is an error and leaves the first registration in place.
    pub fn register(&mut self, name: &str, builder: BuildFn<T>) -> Result<()> {
        self.insert(name, Entry::Builder(builder))
    }

    /// Claim a name without making it buildable. Selecting it reports
    /// `Unsupported` instead of `UnknownComponent`, so a known gap reads
    /// differently from a typo.
    pub fn reserve(&mut self, name: &str) -> Result<()> {
        self.insert(name, Entry::Reserved)
    }

    fn insert(&mut self, name: &str, entry: Entry<T>) -> Result<()> {
        if self.entries.contains_key(name) {
            return Err(BuildError::DuplicateComponent(name.to_string()));
        }
        self.entries.insert(name.to_string(), entry);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Build the component the config names. Works on a clone of `cfg`, so
    /// the caller's record is left untouched. Builder errors propagate as-is.
    pub fn build(&self, cfg: &Config) -> Result<T> {
        let name = cfg.component_type()?.to_string();
        let mut params = cfg.clone();
        params.remove(TYPE_KEY);
        match self.entries.get(name.as_str()) {
            None => Err(BuildError::UnknownComponent(name)),
            Some(Entry::Reserved) => Err(BuildError::Unsupported(name)),
            Some(Entry::Builder(builder)) => builder(&mut params),
        }
    }
}
