use crate::manifest::Manifest;

/// One selectable part image inside a drawer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Thumbnail {
    /// Full location of the image (path or URL).
    pub source: String,
    /// File name shown as alt text / tooltip.
    pub alt: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Drawer {
    pub name: String,
    pub thumbnails: Vec<Thumbnail>,
}

/// Category drawers, at most one open at a time.
#[derive(Clone, Debug, Default)]
pub struct Drawers {
    drawers: Vec<Drawer>,
    open: Option<usize>,
}

impl Drawers {
    /// Declare empty drawers for the given category names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            drawers: names
                .into_iter()
                .map(|n| Drawer {
                    name: n.into(),
                    thumbnails: Vec::new(),
                })
                .collect(),
            open: None,
        }
    }

    pub fn drawers(&self) -> &[Drawer] {
        &self.drawers
    }

    pub fn len(&self) -> usize {
        self.drawers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawers.is_empty()
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open == Some(index)
    }

    /// Close every drawer, then open the one at `index`.
    pub fn toggle(&mut self, index: usize) {
        if index >= self.drawers.len() {
            return;
        }
        self.open = Some(index);
    }

    /// Fill each declared drawer whose name matches a manifest category.
    /// Returns the number of thumbnails added.
    pub fn populate(&mut self, manifest: &Manifest) -> usize {
        let mut added = 0;
        for drawer in &mut self.drawers {
            let name = drawer.name.trim();
            let Some(files) = manifest.files(name) else {
                continue;
            };
            drawer.thumbnails = files
                .iter()
                .map(|file| Thumbnail {
                    source: manifest.part_source(name, file),
                    alt: file.clone(),
                })
                .collect();
            added += drawer.thumbnails.len();
        }
        added
    }

    /// Drawers for `declared` categories, or every manifest category in
    /// manifest order when nothing is declared.
    pub fn from_manifest(declared: &[String], manifest: &Manifest) -> Self {
        let mut drawers = if declared.is_empty() {
            Self::new(manifest.category_names())
        } else {
            Self::new(declared.iter().cloned())
        };
        drawers.populate(manifest);
        drawers
    }
}
