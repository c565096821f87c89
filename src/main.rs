use dollmaker::app::DollmakerApp;
use dollmaker::cli::{self, CliArgs};
use dollmaker::settings::DollSettings;
use dollmaker::{log_info, logger};
use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    use clap::Parser;
    let args = CliArgs::parse();

    // Session log (overwrites previous session log)
    logger::init();

    let mut settings = DollSettings::load();
    if DollSettings::settings_path().is_some_and(|p| !p.exists()) {
        // First run: write defaults so there is a file to edit.
        settings.save();
    }
    args.apply(&mut settings);
    log_info!(
        "Config: manifest={} doll_type={} canvas={}x{}",
        settings.manifest,
        settings.doll_type,
        settings.canvas_width,
        settings.canvas_height
    );

    // -- Headless check -------------------------------------------------
    if args.check {
        let code = cli::run_check(&settings);
        std::process::exit(if code == std::process::ExitCode::SUCCESS {
            0
        } else {
            1
        });
    }

    // -- GUI mode -----------------------------------------------------
    let title = format!("Dollmaker - {}", settings.doll_type);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 520.0])
            .with_title(title.clone()),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Box::new(DollmakerApp::new(cc, settings))),
    )
}
