use serde_json::Value;

use crate::error::{DollError, Result};

/// Key holding the base path that every part source is built from.
pub const BASE_PATH_KEY: &str = "Prop-path";

/// Parsed parts manifest: a base path plus the file list of each category,
/// in the order the categories appear in the document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    pub base_path: String,
    pub categories: Vec<(String, Vec<String>)>,
}

impl Manifest {
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(map) = value else {
            return Err(DollError::Manifest("top level is not an object".to_string()));
        };

        let base_path = match map.get(BASE_PATH_KEY) {
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(DollError::Manifest(format!(
                    "\"{}\" must be a string",
                    BASE_PATH_KEY
                )));
            }
            None => {
                return Err(DollError::Manifest(format!("missing \"{}\"", BASE_PATH_KEY)));
            }
        };

        let mut categories = Vec::new();
        for (key, val) in &map {
            if key == BASE_PATH_KEY {
                continue;
            }
            let Value::Array(items) = val else {
                crate::log_warn!("Manifest: ignoring non-list entry \"{}\"", key);
                continue;
            };
            let files: Vec<String> = items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    other => {
                        crate::log_warn!("Manifest: ignoring non-string file {} in \"{}\"", other, key);
                        None
                    }
                })
                .collect();
            categories.push((key.clone(), files));
        }

        Ok(Self { base_path, categories })
    }

    pub fn files(&self, category: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, files)| files.as_slice())
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(name, _)| name.as_str())
    }

    /// Location of one part image: `base + category + "/" + file`.
    pub fn part_source(&self, category: &str, file: &str) -> String {
        format!("{}{}/{}", self.base_path, category, file)
    }
}
