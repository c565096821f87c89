use std::path::{Path, PathBuf};

use crate::export::{DEFAULT_CAPTION, DEFAULT_FILE_NAME};

/// Settings that persist across sessions. The CLI can override any of them
/// for a single run.
#[derive(Clone, Debug, PartialEq)]
pub struct DollSettings {
    /// Manifest location (file path or http(s) URL)
    pub manifest: String,
    /// Doll-type tag shown in the window title
    pub doll_type: String,
    /// Canvas pixel size (what gets exported)
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// On-screen edge length of the canvas in points
    pub display_size: f32,
    /// Text stamped onto exported images (empty = no caption)
    pub caption: String,
    pub export_file_name: String,
    /// Save straight into this directory instead of asking
    pub export_dir: Option<PathBuf>,
    /// Category drawers in display order (empty = manifest order)
    pub categories: Vec<String>,
}

impl Default for DollSettings {
    fn default() -> Self {
        Self {
            manifest: "parts.json".to_string(),
            doll_type: "doll".to_string(),
            canvas_width: 400,
            canvas_height: 400,
            display_size: 200.0,
            caption: DEFAULT_CAPTION.to_string(),
            export_file_name: DEFAULT_FILE_NAME.to_string(),
            export_dir: None,
            categories: Vec::new(),
        }
    }
}

impl DollSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/dollmaker/dollmaker_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\Dollmaker\dollmaker_settings.cfg
    /// On macOS:   ~/Library/Application Support/Dollmaker/dollmaker_settings.cfg
    /// Fallback:   same directory as the executable.
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("dollmaker");
            Some(config_dir.join("dollmaker_settings.cfg"))
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").or_else(|_| std::env::var("USERPROFILE")).ok()?;
            Some(PathBuf::from(appdata).join("Dollmaker").join("dollmaker_settings.cfg"))
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("Dollmaker")
                    .join("dollmaker_settings.cfg"),
            )
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("dollmaker_settings.cfg")))
        }
    }

    /// Serialize as `key=value` lines.
    pub fn to_config_string(&self) -> String {
        format!(
            "manifest={}\n\
             doll_type={}\n\
             canvas_width={}\n\
             canvas_height={}\n\
             display_size={}\n\
             caption={}\n\
             export_file_name={}\n\
             export_dir={}\n\
             categories={}\n",
            self.manifest,
            self.doll_type,
            self.canvas_width,
            self.canvas_height,
            self.display_size,
            self.caption,
            self.export_file_name,
            self.export_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            self.categories.join(","),
        )
    }

    /// Parse `key=value` lines on top of the defaults. Unknown keys and
    /// unparsable values are ignored.
    pub fn from_config_str(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            match key {
                "manifest" => {
                    if !val.is_empty() {
                        s.manifest = val.to_string();
                    }
                }
                "doll_type" => s.doll_type = val.to_string(),
                "canvas_width" => {
                    s.canvas_width = val.parse::<u32>().ok().filter(|v| *v > 0).unwrap_or(s.canvas_width);
                }
                "canvas_height" => {
                    s.canvas_height = val.parse::<u32>().ok().filter(|v| *v > 0).unwrap_or(s.canvas_height);
                }
                "display_size" => {
                    s.display_size = val.parse::<f32>().ok().filter(|v| *v > 0.0).unwrap_or(s.display_size);
                }
                "caption" => s.caption = val.to_string(),
                "export_file_name" => {
                    if !val.is_empty() {
                        s.export_file_name = val.to_string();
                    }
                }
                "export_dir" => {
                    s.export_dir = if val.is_empty() { None } else { Some(PathBuf::from(val)) };
                }
                "categories" => {
                    s.categories = val
                        .split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                _ => {}
            }
        }
        s
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_config_str(&content),
            Err(_) => Self::default(),
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_config_string())
    }

    /// Load settings from disk (returns default if file missing or corrupt)
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        Self::load_from(&path)
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Err(e) = self.save_to(&path) {
            crate::log_warn!("Failed to save settings to {}: {}", path.display(), e);
        }
    }
}
