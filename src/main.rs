mod config;
mod engine;
mod model;
mod ui;

use std::sync::Arc;

use crate::engine::engine::EngineHandle;
use crate::engine::llm_client::{build_generator, AdviceGenerator, UnavailableGenerator};
use crate::engine::storage::JsonFileStorage;
use crate::model::catalog::Catalog;
use crate::model::session::ChecklistSession;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::load_config();
    let catalog = Catalog::witcher3()?;
    log::info!(
        "Loaded {} ({} phases, {} items)",
        catalog.title,
        catalog.phases.len(),
        catalog.total_items()
    );

    let storage = JsonFileStorage::in_dir(&config.data_dir(), &catalog.storage_key);
    log::info!("Progress file: {}", storage.path().display());

    let generator: Arc<dyn AdviceGenerator> = match build_generator(&config.advice) {
        Ok(generator) => Arc::from(generator),
        Err(e) => {
            log::warn!("Advice disabled: {e:#}");
            Arc::new(UnavailableGenerator::new(e.to_string()))
        }
    };

    let session = ChecklistSession::new(catalog, storage);
    let engine = EngineHandle::spawn(generator);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Completionist Hub",
        options,
        Box::new(move |_cc| Ok(Box::new(ui::app::HubApp::new(session, engine, &config)))),
    )
    .map_err(|e| anyhow::anyhow!(e.to_string()))
}
