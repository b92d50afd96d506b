use clap::Parser;

use tunescribe::cli::Cli;
use tunescribe::error::TsResult;
use tunescribe::{logging, Pipeline};

fn main() {
    let format = logging::init();
    tracing::debug!(?format, "logging initialized");
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run() -> TsResult<()> {
    let cli = Cli::parse();
    let url = cli.resolve_url()?;
    let cover = cli.resolve_cover()?;

    let pipeline = Pipeline::new(cli.to_config());
    let entry = pipeline.process(&url, &cover)?;

    println!(
        "finished: {} by {} -> {}",
        entry.song_name,
        entry.artists.join(", "),
        entry.final_audio_path
    );
    Ok(())
}
