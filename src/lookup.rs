//! Code-to-name lookup table loader.
//!
//! Loads the mapping used by the reference rewriter from YAML. Recipes are
//! keyed by the number after `R-`, preparations by their `P-` code, and every
//! other prefix resolves through the product section.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::entity::EntityKind;
use crate::error::SeedError;

const BUILTIN_LOOKUP: &str = include_str!("../config/lookup.yaml");

/// Static code -> name mapping, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupTable {
    /// Recipe number -> name (`R-7` resolves through key `7`)
    #[serde(default)]
    pub recipes: IndexMap<u32, String>,

    /// Preparation code -> name
    #[serde(default)]
    pub preparations: IndexMap<String, String>,

    /// Product code -> name, used for every prefix other than `P-` and `R-`
    #[serde(default)]
    pub products: IndexMap<String, String>,
}

impl LookupTable {
    /// Load a lookup table from a YAML file.
    ///
    /// # Errors
    /// Returns `SeedError::Lookup` if the file can't be read or isn't a valid
    /// mapping file.
    ///
    /// # Example
    /// ```ignore
    /// use seedcodes::LookupTable;
    ///
    /// let table = LookupTable::load_from_file("config/lookup.yaml")?;
    /// assert_eq!(table.resolve("R-7"), Some("TomYum"));
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SeedError> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path).map_err(|e| {
            SeedError::Lookup(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_yaml_str(&contents)
            .map_err(|e| SeedError::Lookup(format!("{}: {}", path.display(), e)))
    }

    /// Parse a lookup table from YAML text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, SeedError> {
        serde_yaml::from_str(contents)
            .map_err(|e| SeedError::Lookup(format!("Failed to parse YAML: {}", e)))
    }

    /// The table shipped in `config/lookup.yaml`, compiled into the binary.
    pub fn builtin() -> Result<Self, SeedError> {
        Self::from_yaml_str(BUILTIN_LOOKUP)
    }

    /// Resolve a code to its recorded name.
    ///
    /// Returns `None` for codes missing from the applicable section and for
    /// `R-` codes whose suffix isn't a number.
    pub fn resolve(&self, code: &str) -> Option<&str> {
        if let Some(number) = code.strip_prefix("R-") {
            let number = number.parse::<u32>().ok()?;
            return self.recipes.get(&number).map(String::as_str);
        }

        if code.starts_with("P-") {
            return self.preparations.get(code).map(String::as_str);
        }

        self.products.get(code).map(String::as_str)
    }

    /// Number of entries recorded for one kind
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Product => self.products.len(),
            EntityKind::Preparation => self.preparations.len(),
            EntityKind::Recipe => self.recipes.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.recipes.len() + self.preparations.len() + self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
