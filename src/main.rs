use std::env;
use std::fs;
use std::process;

use keybard::format::format_duration;
use keybard::{
    EngineConfig, KeybardError, PlaybackScheduler, RecordingBackend, Song, TrackColorAssigner,
    TrackSettings,
};

const USAGE: &str = "Usage: keybard render <song.json> [--tick N] [--size WxH] [--config cfg.yaml] [-o out.svg]
       keybard schedule <song.json> [--from-tick N] [--config cfg.yaml]";

struct Options {
    input: String,
    tick: f64,
    width: f32,
    height: f32,
    config: Option<String>,
    output: Option<String>,
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn parse_options(args: &[String]) -> Options {
    let mut options = Options {
        input: String::new(),
        tick: 0.0,
        width: 880.0,
        height: 600.0,
        config: None,
        output: None,
    };

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = || {
            args.get(i + 1)
                .cloned()
                .unwrap_or_else(|| fail(&format!("Missing value for {}\n{}", flag, USAGE)))
        };
        match flag {
            "--tick" | "--from-tick" => {
                options.tick = value()
                    .parse()
                    .unwrap_or_else(|_| fail(&format!("Invalid tick for {}", flag)));
                i += 1;
            }
            "--size" => {
                let size = value();
                let parsed = size
                    .split_once('x')
                    .and_then(|(w, h)| Some((w.parse::<f32>().ok()?, h.parse::<f32>().ok()?)));
                match parsed {
                    Some((w, h)) => {
                        options.width = w;
                        options.height = h;
                    }
                    None => fail(&format!("Invalid size '{}', expected WxH", size)),
                }
                i += 1;
            }
            "--config" => {
                options.config = Some(value());
                i += 1;
            }
            "-o" | "--output" => {
                options.output = Some(value());
                i += 1;
            }
            _ if options.input.is_empty() && !flag.starts_with('-') => {
                options.input = flag.to_string();
            }
            _ => fail(&format!("Unexpected argument '{}'\n{}", flag, USAGE)),
        }
        i += 1;
    }

    if options.input.is_empty() {
        fail(USAGE);
    }
    options
}

fn load(options: &Options) -> Result<(Song, EngineConfig), KeybardError> {
    let config = match &options.config {
        Some(path) => EngineConfig::from_yaml(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    let song = Song::from_json(&fs::read_to_string(&options.input)?)?;
    Ok((song, config))
}

fn render(options: Options) -> Result<(), KeybardError> {
    let (song, config) = load(&options)?;
    let svg = keybard::render_svg(song, config, options.width, options.height, options.tick)?;

    match &options.output {
        Some(path) => {
            fs::write(path, &svg)?;
            eprintln!("Wrote SVG to {}", path);
        }
        None => println!("{}", svg),
    }
    Ok(())
}

fn schedule(options: Options) -> Result<(), KeybardError> {
    let (song, config) = load(&options)?;
    let settings = TrackSettings::for_song(
        &song,
        &TrackColorAssigner::new(config.saturation, config.lightness),
    );

    let backend = RecordingBackend::new();
    let mut scheduler = PlaybackScheduler::new(backend.clone(), &config);
    scheduler.start(&song, &settings, options.tick)?;

    let triggers = backend.triggers();
    let json = serde_json::to_string_pretty(&triggers)
        .map_err(|e| KeybardError::RenderError(e.to_string()))?;
    println!("{}", json);
    eprintln!(
        "{} triggers on {} voices, song ends at {}",
        triggers.len(),
        backend.voices_created(),
        format_duration(scheduler.song_end())
    );
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        fail(USAGE);
    }

    let options = parse_options(&args[2..]);
    let result = match args[1].as_str() {
        "render" => render(options),
        "schedule" => schedule(options),
        other => fail(&format!("Unknown command '{}'\n{}", other, USAGE)),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
