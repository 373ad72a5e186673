use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use questforge::content::schema::CONTENT_SCHEMA_VERSION;
use questforge::content::{CatalogQuestRepository, QuestRepository, SqliteQuestRepository};
use questforge::core::{load_quests_or_builtin, QuestIntent, QuestRunner, QuestSnapshot};
use questforge::data::{builtin_zone_catalog, load_zone_catalog, QuestCatalog, ZoneCatalog};
use questforge::flows::{generate_or_default, FlowRequest, TemplateBackend};
use questforge::persistence::{PrefStore, DEFAULT_PREFS_PATH};
use questforge::session::SessionStatus;
use questforge::ui::render_authoring_dashboard;

struct LaunchOptions {
    content_db: Option<PathBuf>,
    zones_path: Option<String>,
    quests_path: Option<String>,
    prefs_path: PathBuf,
    seed: Option<u64>,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questforge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("Initializing QuestForge...");
    let opts = parse_args(env::args().collect());
    let seed = opts.seed.unwrap_or_else(clock_seed);

    let (repo, zones, catalog): (Box<dyn QuestRepository>, ZoneCatalog, QuestCatalog) =
        match &opts.content_db {
            Some(path) => {
                if !path.exists() {
                    eprintln!(
                        "Content DB not found at {}. Use --content-db <path> to point at a valid SQLite file.",
                        path.display()
                    );
                    std::process::exit(1);
                }
                let repo = match SqliteQuestRepository::open(path) {
                    Ok(repo) => repo,
                    Err(err) => {
                        eprintln!("Failed to open content DB: {}", err);
                        std::process::exit(1);
                    }
                };
                let (zones, catalog) = match collect_catalogs(&repo) {
                    Ok(pair) => pair,
                    Err(err) => {
                        eprintln!("Failed to read content DB: {}", err);
                        std::process::exit(1);
                    }
                };
                (Box::new(repo), zones, catalog)
            }
            None => {
                let zones = load_zones_or_builtin(opts.zones_path.as_deref());
                let catalog = load_quests_or_builtin(opts.quests_path.as_deref());
                let repo = match CatalogQuestRepository::new(zones.clone(), catalog.clone()) {
                    Ok(repo) => repo,
                    Err(err) => {
                        eprintln!("Invalid content catalogs: {}", err);
                        std::process::exit(1);
                    }
                };
                (Box::new(repo), zones, catalog)
            }
        };

    print_stats(repo.as_ref());

    let mut prefs = PrefStore::open(&opts.prefs_path);
    println!("Locale: {} | Seed: {}", prefs.locale(), seed);

    let backend = TemplateBackend::new(seed);
    let mut runner = QuestRunner::with_catalog(seed, catalog.clone());
    let mut printed_events = 0usize;
    let mut printed_feedback = 0usize;

    print_help();
    loop {
        print!("> ");
        io::stdout().flush().unwrap();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            break;
        }
        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or("").to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" => break,
            "help" => print_help(),
            "zones" => match repo.zones() {
                Ok(zones) => {
                    println!("Zones:");
                    for zone in zones {
                        println!(
                            "  {} [{}] {} | {}",
                            zone.id,
                            zone.difficulty.as_str(),
                            zone.title,
                            zone.subject
                        );
                    }
                }
                Err(err) => println!("Failed to list zones: {}", err),
            },
            "quests" => {
                let zone_filter = parts.next();
                match list_quests(repo.as_ref(), zone_filter) {
                    Ok(lines) => {
                        if lines.is_empty() {
                            println!("No quests found.");
                        } else {
                            println!("Quests:");
                            for line in lines {
                                println!("{}", line);
                            }
                        }
                    }
                    Err(err) => println!("Failed to list quests: {}", err),
                }
            }
            "play" => {
                if let Some(quest_id) = parts.next() {
                    let snapshot = runner.tick(vec![QuestIntent::Start {
                        quest_id: quest_id.to_string(),
                    }]);
                    print_new_events(&snapshot, &mut printed_events);
                    if snapshot.status == Some(SessionStatus::Playing) {
                        print_status(&snapshot);
                        print_choices(&snapshot);
                    }
                } else {
                    println!("Usage: play <quest_id>");
                }
            }
            "status" => {
                let snapshot = runner.snapshot();
                if snapshot.quest_id.is_none() {
                    println!("No active session. Use `play <quest_id>`.");
                } else {
                    print_status(&snapshot);
                    print_choices(&snapshot);
                }
            }
            "choices" => {
                let snapshot = runner.snapshot();
                if snapshot.quest_id.is_none() {
                    println!("No active session. Use `play <quest_id>`.");
                } else {
                    print_choices(&snapshot);
                }
            }
            "choose" => {
                if let Some(choice_id) = parts.next() {
                    let stage_id = runner.snapshot().stage_id.unwrap_or_default();
                    let snapshot = runner.tick(vec![QuestIntent::Choose {
                        stage_id,
                        choice_id: choice_id.to_string(),
                    }]);
                    print_new_events(&snapshot, &mut printed_events);
                    print_new_feedback(&snapshot, &mut printed_feedback);
                    if snapshot.status == Some(SessionStatus::Playing) {
                        print_status(&snapshot);
                        print_choices(&snapshot);
                    }
                } else {
                    println!("Usage: choose <choice_id>");
                }
            }
            "restart" => {
                let snapshot = runner.tick(vec![QuestIntent::Restart]);
                print_new_events(&snapshot, &mut printed_events);
                if snapshot.status == Some(SessionStatus::Playing) {
                    print_status(&snapshot);
                    print_choices(&snapshot);
                }
            }
            "abandon" => {
                let snapshot = runner.tick(vec![QuestIntent::Abandon]);
                print_new_events(&snapshot, &mut printed_events);
            }
            "flow" | "flows" => {
                let sub = parts.next().unwrap_or("");
                match sub {
                    "outline" => {
                        let topic = parts.collect::<Vec<&str>>().join(" ");
                        if topic.is_empty() {
                            println!("Usage: flow outline <topic>");
                        } else {
                            let response = generate_or_default(
                                &backend,
                                &FlowRequest::Outline { topic },
                                "No outline available.",
                            );
                            println!("{}", response.text);
                        }
                    }
                    "name" => {
                        let habitat = parts.collect::<Vec<&str>>().join(" ");
                        if habitat.is_empty() {
                            println!("Usage: flow name <habitat>");
                        } else {
                            let response = generate_or_default(
                                &backend,
                                &FlowRequest::Name { habitat },
                                "No names available.",
                            );
                            println!("{}", response.text);
                        }
                    }
                    "summary" => {
                        let snapshot = runner.snapshot();
                        let Some(title) = snapshot.title.clone() else {
                            println!("No active session. Use `play <quest_id>`.");
                            continue;
                        };
                        let mut highlights: Vec<String> = snapshot
                            .events
                            .iter()
                            .filter(|line| line.starts_with('['))
                            .rev()
                            .take(3)
                            .cloned()
                            .collect();
                        highlights.reverse();
                        let response = generate_or_default(
                            &backend,
                            &FlowRequest::Summary {
                                quest_title: title,
                                turns: snapshot.turn,
                                victory: snapshot.status == Some(SessionStatus::Won),
                                highlights,
                            },
                            "No summary available.",
                        );
                        println!("{}", response.text);
                    }
                    _ => println!("Usage: flow <outline <topic>|name <habitat>|summary>"),
                }
            }
            "authoring" => {
                print!("{}", render_authoring_dashboard(&zones, &catalog));
            }
            "prefs" => match parts.next() {
                None => {
                    let entries: Vec<(String, String)> = prefs
                        .entries()
                        .map(|(key, value)| (key.to_string(), value.to_string()))
                        .collect();
                    if entries.is_empty() {
                        println!("Prefs: none");
                    } else {
                        println!("Prefs:");
                        for (key, value) in entries {
                            println!("  {} = {}", key, value);
                        }
                    }
                }
                Some("set") => {
                    let Some(key) = parts.next() else {
                        println!("Usage: prefs set <key> <value>");
                        continue;
                    };
                    let value = parts.collect::<Vec<&str>>().join(" ");
                    if value.is_empty() {
                        println!("Usage: prefs set <key> <value>");
                    } else {
                        prefs.set(key, &value);
                        println!("Set {} = {}", key, value);
                    }
                }
                Some(_) => println!("Usage: prefs [set <key> <value>]"),
            },
            "seed" => println!("Seed: {}", runner.seed()),
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}

fn print_help() {
    println!("Commands: zones | quests [zone] | play <quest_id> | status | choices | choose <choice_id> | restart | abandon | flow <outline|name|summary> | authoring | prefs [set <key> <value>] | seed | quit");
}

fn parse_args(args: Vec<String>) -> LaunchOptions {
    let mut opts = LaunchOptions {
        content_db: None,
        zones_path: None,
        quests_path: None,
        prefs_path: PathBuf::from(DEFAULT_PREFS_PATH),
        seed: None,
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--content-db" => {
                if let Some(value) = iter.next() {
                    opts.content_db = Some(PathBuf::from(value));
                }
            }
            "--zones" => {
                if let Some(value) = iter.next() {
                    opts.zones_path = Some(value.clone());
                }
            }
            "--quests" => {
                if let Some(value) = iter.next() {
                    opts.quests_path = Some(value.clone());
                }
            }
            "--prefs" => {
                if let Some(value) = iter.next() {
                    opts.prefs_path = PathBuf::from(value);
                }
            }
            "--seed" => {
                if let Some(value) = iter.next() {
                    match value.parse::<u64>() {
                        Ok(seed) => opts.seed = Some(seed),
                        Err(_) => eprintln!("Ignoring invalid --seed value: {}", value),
                    }
                }
            }
            _ => {}
        }
    }
    opts
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(7)
}

fn load_zones_or_builtin(path: Option<&str>) -> ZoneCatalog {
    let Some(path) = path else {
        return builtin_zone_catalog();
    };
    match load_zone_catalog(path) {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("Failed to load zones from {}: {}", path, err);
            builtin_zone_catalog()
        }
    }
}

/// Rebuild in-memory catalogs from a repository so every launch path hands
/// the runner the same shape of data.
fn collect_catalogs(
    repo: &dyn QuestRepository,
) -> Result<(ZoneCatalog, QuestCatalog), Box<dyn std::error::Error>> {
    let zone_defs = repo.zones()?;
    let mut quests = Vec::new();
    for zone in &zone_defs {
        for summary in repo.quests_in_zone(&zone.id)? {
            if let Some(quest) = repo.quest(&summary.id)? {
                quests.push(quest);
            }
        }
    }
    Ok((
        ZoneCatalog {
            schema_version: CONTENT_SCHEMA_VERSION,
            zones: zone_defs,
        },
        QuestCatalog {
            schema_version: CONTENT_SCHEMA_VERSION,
            quests,
        },
    ))
}

fn list_quests(
    repo: &dyn QuestRepository,
    zone_filter: Option<&str>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut lines = Vec::new();
    let zones = match zone_filter {
        Some(zone_id) => vec![zone_id.to_string()],
        None => repo.zones()?.into_iter().map(|zone| zone.id).collect(),
    };
    for zone_id in zones {
        for summary in repo.quests_in_zone(&zone_id)? {
            lines.push(format!(
                "  {}: {} ({} stages)",
                summary.id, summary.title, summary.stage_count
            ));
        }
    }
    Ok(lines)
}

fn print_stats(repo: &dyn QuestRepository) {
    match repo.stats() {
        Ok(stats) => println!(
            "Stats: zones={}, quests={}, stages={}",
            stats.zone_count, stats.quest_count, stats.stage_count
        ),
        Err(err) => println!("Stats unavailable: {}", err),
    }
}

fn print_status(snapshot: &QuestSnapshot) {
    let title = snapshot.title.as_deref().unwrap_or("(unknown quest)");
    let status = snapshot
        .status
        .map(|status| format!("{:?}", status))
        .unwrap_or_else(|| "Idle".to_string());
    println!(
        "Quest: {} | Status: {} | Turn: {}",
        title, status, snapshot.turn
    );
    if let Some(target) = snapshot.score_target {
        println!("Score: {}/{}", snapshot.score, target);
    }
    if !snapshot.vitals.is_empty() {
        let line = snapshot
            .vitals
            .iter()
            .map(|vital| match vital.target {
                Some(target) => format!(
                    "{} {}/{} (target {})",
                    vital.id, vital.value, vital.max, target
                ),
                None => format!("{} {}/{}", vital.id, vital.value, vital.max),
            })
            .collect::<Vec<String>>()
            .join(" | ");
        println!("Vitals: {}", line);
    }
    if !snapshot.flags.is_empty() {
        println!("Flags: {}", snapshot.flags.join(", "));
    }
    if snapshot.status == Some(SessionStatus::Playing) {
        if let Some(prompt) = snapshot.prompt.as_deref() {
            println!("{}", prompt);
        }
    }
}

fn print_choices(snapshot: &QuestSnapshot) {
    if snapshot.available.is_empty() {
        println!("Choices: none");
        return;
    }
    println!("Choices:");
    for choice in &snapshot.available {
        if choice.cost > 0 {
            println!("  [{}] {} (cost {})", choice.id, choice.label, choice.cost);
        } else {
            println!("  [{}] {}", choice.id, choice.label);
        }
    }
}

fn print_new_events(snapshot: &QuestSnapshot, printed: &mut usize) {
    for line in &snapshot.events[*printed..] {
        println!("{}", line);
    }
    *printed = snapshot.events.len();
}

fn print_new_feedback(snapshot: &QuestSnapshot, printed: &mut usize) {
    if snapshot.feedback.len() <= *printed {
        return;
    }
    println!("Analyzing...");
    for line in &snapshot.feedback[*printed..] {
        println!("  {}", line);
    }
    *printed = snapshot.feedback.len();
}
