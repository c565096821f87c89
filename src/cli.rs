// ============================================================================
// Dollmaker CLI — start-up overrides and headless manifest checking
// ============================================================================
//
// Usage examples:
//   dollmaker --manifest dolls/fairy.json --doll-type fairy
//   dollmaker -m https://example.com/dolls/parts.json --width 300 --height 300
//   dollmaker -m parts.json --check          (no GUI: load every part, report)

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::drawers::Drawers;
use crate::manifest::Manifest;
use crate::settings::DollSettings;

/// Dress-up doll maker.
///
/// Drag part images from the category drawers onto the canvas and save the result as PNG.
#[derive(Parser, Debug, Default)]
#[command(name = "dollmaker", about = "Dress-up doll maker")]
pub struct CliArgs {
    /// Parts manifest: a JSON file path or http(s) URL.
    #[arg(short, long, value_name = "PATH|URL")]
    pub manifest: Option<String>,

    /// Doll-type tag shown in the window title.
    #[arg(short, long, value_name = "TAG")]
    pub doll_type: Option<String>,

    /// Canvas width in pixels (exported image width).
    #[arg(long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Canvas height in pixels (exported image height).
    #[arg(long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// On-screen canvas edge length in points.
    #[arg(long, value_name = "POINTS")]
    pub display_size: Option<f32>,

    /// Caption stamped onto saved images. Pass "" for none.
    #[arg(long)]
    pub caption: Option<String>,

    /// Save straight into this directory instead of opening a save dialog.
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Load the manifest and every part image without opening a window,
    /// then report failures.
    #[arg(long)]
    pub check: bool,
}

impl CliArgs {
    /// Apply command-line overrides on top of persisted settings.
    pub fn apply(&self, settings: &mut DollSettings) {
        if let Some(m) = &self.manifest {
            settings.manifest = m.clone();
        }
        if let Some(t) = &self.doll_type {
            settings.doll_type = t.clone();
        }
        if let Some(w) = self.width {
            settings.canvas_width = w;
        }
        if let Some(h) = self.height {
            settings.canvas_height = h;
        }
        if let Some(d) = self.display_size.filter(|d| *d > 0.0) {
            settings.display_size = d;
        }
        if let Some(c) = &self.caption {
            settings.caption = c.clone();
        }
        if let Some(dir) = &self.export_dir {
            settings.export_dir = Some(dir.clone());
        }
    }
}

// ============================================================================
// Headless manifest check
// ============================================================================

/// Load the manifest and every part it lists. `0` = everything loaded,
/// `1` = manifest or at least one part failed.
pub fn run_check(settings: &DollSettings) -> ExitCode {
    let start = Instant::now();
    let manifest = match crate::io::fetch_text(&settings.manifest).and_then(|t| Manifest::from_json(&t)) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {}", e);
            crate::log_err!("Check: manifest {} failed: {}", settings.manifest, e);
            return ExitCode::FAILURE;
        }
    };

    let drawers = Drawers::from_manifest(&settings.categories, &manifest);
    let mut failures = 0usize;
    let mut total = 0usize;
    for drawer in drawers.drawers() {
        println!("{} ({} parts)", drawer.name, drawer.thumbnails.len());
        for thumb in &drawer.thumbnails {
            total += 1;
            match crate::io::load_image_sync(&thumb.source) {
                Ok(img) => println!("  ok   {} ({}x{})", thumb.alt, img.width(), img.height()),
                Err(e) => {
                    failures += 1;
                    println!("  FAIL {}: {}", thumb.alt, e);
                }
            }
        }
    }

    println!(
        "{} of {} parts loaded ({:.0}ms)",
        total - failures,
        total,
        start.elapsed().as_secs_f64() * 1000.0
    );
    crate::log_info!("Check: {} of {} parts loaded", total - failures, total);
    if failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_fields() {
        let args = CliArgs::parse_from(["dollmaker", "-m", "dolls.json", "--width", "320", "--caption", ""]);
        let mut s = DollSettings::default();
        args.apply(&mut s);
        assert_eq!(s.manifest, "dolls.json");
        assert_eq!(s.canvas_width, 320);
        assert_eq!(s.canvas_height, 400);
        assert_eq!(s.caption, "");
        assert_eq!(s.doll_type, "doll");
    }

    #[test]
    fn zero_width_is_rejected() {
        assert!(CliArgs::try_parse_from(["dollmaker", "--width", "0"]).is_err());
    }

    #[test]
    fn check_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let part_dir = dir.path().join("Hair");
        std::fs::create_dir_all(&part_dir).unwrap();
        image::RgbaImage::new(4, 4).save(part_dir.join("ok.png")).unwrap();
        let manifest = dir.path().join("parts.json");
        std::fs::write(
            &manifest,
            format!(
                r#"{{"Prop-path": "{}/", "Hair": ["ok.png", "missing.png"]}}"#,
                dir.path().display()
            ),
        )
        .unwrap();

        let mut settings = DollSettings::default();
        settings.manifest = manifest.display().to_string();
        assert_eq!(run_check(&settings), ExitCode::FAILURE);

        std::fs::write(
            &manifest,
            format!(r#"{{"Prop-path": "{}/", "Hair": ["ok.png"]}}"#, dir.path().display()),
        )
        .unwrap();
        assert_eq!(run_check(&settings), ExitCode::SUCCESS);
    }
}
