//! Equine Glide entry point
//!
//! Runs one unattended race in the terminal, driven by the settings file.

use equine_glide::driver::{Driver, DriverCommand, DriverOptions};
use equine_glide::render::{AsciiFrameSink, FrameSink, NullFrameSink};
use equine_glide::wisdom::StaticWisdom;
use equine_glide::{Engine, Settings};
use tokio::sync::mpsc;

fn main() {
    env_logger::init();
    log::info!("Equine Glide starting...");

    if let Err(err) = run() {
        log::error!("Race aborted: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(&Settings::default_path());
    let placement = settings.placement();
    log::info!("Game initialized with seed: {}", placement.seed());

    let engine = Engine::new(Box::new(settings.high_score_store()), placement);
    let sink: Box<dyn FrameSink> = if settings.render {
        Box::new(AsciiFrameSink::new(std::io::stdout()))
    } else {
        Box::new(NullFrameSink)
    };
    let mut driver = Driver::new(engine, StaticWisdom, sink, DriverOptions::headless(&settings));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    // Held until the race ends; dropping it would stop the driver.
    let (commands, rx) = mpsc::unbounded_channel();
    commands.send(DriverCommand::Start(settings.difficulty))?;
    runtime.block_on(driver.run(rx))?;

    let state = driver.engine().state();
    println!(
        "\nFINAL SCORE: {}  LEVEL: {}  BEST: {}",
        state.score, state.level, state.high_score
    );
    println!("Horse Wisdom: {}", driver.wisdom().display());
    Ok(())
}
