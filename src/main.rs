use gridlife::{
    draw::{self, App},
    engine::Engine,
    patterns,
};

use std::io::stdin;

use tracing::info;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gridlife=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let size: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(30);
    let delay_ms: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(200);
    let seed = args.get(3).map(|s| s.as_str()).unwrap_or("random");

    let mut engine = Engine::new(size)?;
    match seed {
        "random" => engine.randomize(),
        "-" => {
            // seed board typed or piped on stdin, blank line ends it
            let cells = patterns::parse_cells(&readlines());
            let (row, col) = patterns::centered_origin(size, &cells);
            engine.stamp_pattern(&cells, row, col);
        }
        name => match patterns::find(name) {
            Some(pattern) => {
                let cells = pattern.cells();
                let (row, col) = patterns::centered_origin(size, &cells);
                engine.stamp_pattern(&cells, row, col);
            }
            None => {
                let known: Vec<_> = patterns::PATTERNS.iter().map(|p| p.name).collect();
                anyhow::bail!("unknown seed {name:?}, expected \"random\", \"-\" or one of {known:?}");
            }
        },
    }

    info!(
        size,
        delay_ms,
        alive = engine.living_count(),
        "starting session"
    );
    draw::run(App::new(engine, delay_ms))?;
    Ok(())
}

fn readlines() -> String {
    let mut s = String::new();
    for w in stdin().lines() {
        let w = match w {
            Ok(w) => w,
            Err(_) => break,
        };
        if !w.is_empty() {
            s.push_str(&w);
            s.push('\n')
        } else {
            break;
        }
    }
    s
}
