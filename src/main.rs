use karaoke_melody::{AnalysisConfig, PitchMethod, analyze_library, version};
use log::{info, warn};
use std::path::Path;
use std::time::Instant;

fn main() -> std::io::Result<()> {
    // Initialize logger
    if std::env::var_os("RUST_LOG").is_none() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        eprintln!(
            "Usage: {} [songs_dir] [playlist_path] [num_threads] [pyin|mcleod|autocorrelation|praat]",
            args[0]
        );
        eprintln!("Version: {}", version());
        return Ok(());
    }

    let songs_dir = Path::new(args.get(1).map(String::as_str).unwrap_or("songs"));
    let playlist_path = Path::new(args.get(2).map(String::as_str).unwrap_or("playlist.json"));

    let num_threads = if args.len() >= 4 {
        parse_thread_count(&args[3]).unwrap_or_else(|| {
            let cpu_count = num_cpus::get();
            warn!(
                "Invalid thread count provided, defaulting to {} CPUs",
                cpu_count
            );
            cpu_count
        })
    } else {
        let cpu_count = num_cpus::get();
        info!("Using default thread count: {}", cpu_count);
        cpu_count
    };

    let method = if args.len() >= 5 {
        args[4].parse().unwrap_or_else(|e| {
            warn!("{}. Using pyin instead.", e);
            PitchMethod::Pyin
        })
    } else {
        PitchMethod::Pyin
    };
    let config = AnalysisConfig::default().with_method(method);

    info!("Karaoke Melody v{}", version());
    info!("Songs directory: {:?}", songs_dir);
    info!("Playlist: {:?}", playlist_path);
    info!("Using {} threads", num_threads);
    info!(
        "Pitch method: {} ({:.1}-{:.1} Hz, {} Hz, step {:.3}s)",
        config.method,
        config.fmin,
        config.fmax,
        config.sample_rate,
        config.time_step()
    );

    let start_time = Instant::now();

    let summary = analyze_library(songs_dir, playlist_path, num_threads, &config)?;

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2?}", elapsed);
    if summary.playlist_written {
        info!(
            "Playlist saved to {:?} with {} songs ({} failed)",
            playlist_path, summary.entries, summary.failed
        );
    }

    Ok(())
}

/// A positive thread count, `None` for anything else
fn parse_thread_count(arg: &str) -> Option<usize> {
    arg.parse().ok().filter(|&n| n > 0)
}
