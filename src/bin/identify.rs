// Terminal identification session
//
// Purpose: walk the guided flow on stdin/stdout against a JSON catalog
// Usage: cargo run --features cli --bin identify
//
// Commands while running:
//   <number>            pick an option of the current step
//   b                   back one step
//   r                   reset
//   /<text>             set search text ("/" alone clears it)
//   f <category> <val>  toggle an advanced filter (e.g. f economicValue Pangan)
//   q                   quit

use anyhow::Context;
use plant_identifier::{
    basic_steps, dicot_rule_steps, expanded_steps, Catalog, CurrentStep, FilterCategory,
    IdentificationSession, MatchOutcome, QuestionSequence, SearchPolicy, SessionConfig,
};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plant_identifier=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Configuration from environment variables
    let catalog_path = std::env::var("CATALOG_PATH")
        .unwrap_or_else(|_| "data/catalog.json".to_string());

    let step_set = std::env::var("STEP_SET")
        .unwrap_or_else(|_| "expanded".to_string());

    let mut config = match std::env::var("SESSION_CONFIG") {
        Ok(path) => SessionConfig::load(Path::new(&path))?,
        Err(_) => SessionConfig::default(),
    };
    if let Ok(policy) = std::env::var("SEARCH_POLICY") {
        config = config.with_search_policy(policy.parse::<SearchPolicy>()?);
    }

    tracing::info!("Configuration:");
    tracing::info!("  CATALOG_PATH: {}", catalog_path);
    tracing::info!("  STEP_SET: {}", step_set);
    tracing::info!("  SESSION: {:?}", config);

    let catalog = Catalog::load(Path::new(&catalog_path))?;
    let steps = match step_set.as_str() {
        "basic" => basic_steps(),
        "expanded" => expanded_steps(),
        "dicot" => dicot_rule_steps(),
        path => QuestionSequence::load(Path::new(path))
            .with_context(|| format!("STEP_SET is neither a built-in set nor a readable file: {}", path))?,
    };

    let mut session = IdentificationSession::new(&catalog, &steps, config);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        render(&session);
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let input = line.trim();

        match input {
            "q" => break,
            "b" => {
                session.back();
            }
            "r" => {
                session.reset();
            }
            _ if input.starts_with('/') => {
                session.set_query_text(&input[1..]);
            }
            _ if input.starts_with("f ") => toggle_filter(&mut session, &input[2..]),
            _ => answer_by_number(&mut session, input),
        }
    }

    Ok(())
}

fn answer_by_number(session: &mut IdentificationSession<'_>, input: &str) {
    let CurrentStep::Asking { step, .. } = session.current_step() else {
        println!("All steps answered. Use b, r, / or f.");
        return;
    };

    let picked = input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| step.options.get(i));

    match picked {
        Some(option) => {
            if let Err(e) = session.answer(&step.trait_key, &option.value) {
                println!("{}", e);
            }
        }
        None => println!("Pick a number between 1 and {}", step.options.len()),
    }
}

fn toggle_filter(session: &mut IdentificationSession<'_>, args: &str) {
    let Some((category, value)) = args.trim().split_once(' ') else {
        println!("Usage: f <category> <value>");
        return;
    };

    match category.parse::<FilterCategory>() {
        Ok(category) => {
            session.toggle_advanced_filter(category, value.trim());
        }
        Err(e) => println!("{}", e),
    }
}

fn render(session: &IdentificationSession<'_>) {
    println!();
    if !session.query().is_empty() {
        println!("Search: \"{}\"", session.query());
    }
    for (category, values) in session.filters().iter() {
        let values: Vec<&str> = values.iter().map(|v| v.as_str()).collect();
        println!("Filter {}: {}", category, values.join(", "));
    }

    if let CurrentStep::Asking { index, step } = session.current_step() {
        let (_, total) = session.progress();
        println!("[{}/{}] {}", index + 1, total, step.title);
        if !step.description.is_empty() {
            println!("{}", step.description);
        }
        for (i, option) in step.options.iter().enumerate() {
            match &option.description {
                Some(d) => println!("  {}. {} - {}", i + 1, option.label, d),
                None => println!("  {}. {}", i + 1, option.label),
            }
        }
    }

    match session.matches() {
        MatchOutcome::NotRun => {}
        MatchOutcome::Empty => println!("Tidak ada tanaman yang cocok."),
        MatchOutcome::Found(plants) => {
            println!("Hasil Identifikasi ({}):", plants.len());
            for plant in plants {
                println!("  - {}", plant.display_name());
                if !plant.unique_features().is_empty() {
                    println!("    Keunikan: {}", plant.unique_features().join(", "));
                }
            }
        }
    }
}
