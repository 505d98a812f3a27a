mod app;
mod effects;
mod input;
mod logging;
mod persistence;
mod render;

fn main() -> anyhow::Result<()> {
    logging::initialize(logging::LogDestination::File);
    app::run()
}
