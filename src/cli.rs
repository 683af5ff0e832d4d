//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Contains the prompt
//! loops, the SIGINT flag behind the orchestrator's `StopSignal`, and the
//! execution logic for each subcommand. User-facing prompt and summary text
//! follows the Spanish-language conventions of the tool's audience.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;

use dialforge::analyzer::{AnalysisRecord, LineType, PhoneAnalyzer, RequestContext};
use dialforge::batch::{self, BatchProgress, WallClockPacer};
use dialforge::countries::CountryStore;
use dialforge::history::HistoryStore;
use dialforge::provider::OfflineProvider;
use dialforge::synth::Synthesizer;
use dialforge::verify::ExistenceSimulator;

use super::Cli;

// ── Cancellation ────────────────────────────────────────────────

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigint(_sig: libc::c_int) {
    INTERRUPTED.store(true, Ordering::Relaxed);
}

/// Route Ctrl-C into the cooperative stop flag the batch loop polls.
fn install_sigint_handler() {
    let handler: extern "C" fn(libc::c_int) = on_sigint;
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }
}

// ── Prompt Helpers ──────────────────────────────────────────────

/// Print `msg`, read one trimmed line. `None` on EOF.
fn prompt(msg: &str) -> Option<String> {
    print!("{}", msg);
    std::io::stdout().flush().ok();
    let mut line = String::new();
    match std::io::stdin().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}

fn prompt_country(store: &CountryStore) -> Result<String> {
    println!("{}", "Países disponibles:".blue());
    for name in store.names() {
        println!("- {}", name);
    }
    loop {
        let Some(answer) = prompt("\nIntroduce el país para generar números: ") else {
            bail!("stdin closed before a country was chosen");
        };
        if store.contains(&answer) {
            return Ok(answer);
        }
        println!(
            "{}",
            "País no válido. Por favor, elige uno de la lista.".red()
        );
    }
}

fn prompt_size() -> Result<u64> {
    loop {
        let Some(answer) = prompt("Cantidad de números a generar (1-1000): ") else {
            bail!("stdin closed before a batch size was chosen");
        };
        match answer.parse::<u64>() {
            Ok(n) if (1..=1000).contains(&n) => return Ok(n),
            _ => println!(
                "{}",
                "Por favor, introduce un número entre 1 y 1000.".red()
            ),
        }
    }
}

fn prompt_delay() -> Result<f64> {
    loop {
        let Some(answer) = prompt("Tiempo de espera entre números (en segundos, 0-5): ") else {
            bail!("stdin closed before a delay was chosen");
        };
        match answer.parse::<f64>() {
            Ok(d) if (0.0..=5.0).contains(&d) => return Ok(d),
            _ => println!("{}", "Por favor, introduce un número entre 0 y 5.".red()),
        }
    }
}

// ── Generate ────────────────────────────────────────────────────

pub fn run_generate(
    cli: &Cli,
    country: Option<&str>,
    size: Option<u64>,
    delay: Option<f64>,
) -> Result<()> {
    if !(0.0..=1.0).contains(&cli.existence_probability) {
        bail!(
            "--existence-probability {} outside 0.0..=1.0",
            cli.existence_probability
        );
    }
    let store = CountryStore::load_or_default(&cli.countries)?;

    let country = match country {
        Some(c) if store.contains(c) => c.to_string(),
        Some(c) => {
            let available: Vec<&str> = store.names().collect();
            bail!(
                "country {:?} is not configured (available: {})",
                c,
                available.join(", ")
            );
        }
        None => prompt_country(&store)?,
    };
    let size = match size {
        Some(n) if (1..=1000).contains(&n) => n,
        Some(n) => bail!("--size {} outside 1..=1000", n),
        None => prompt_size()?,
    };
    let delay = match delay {
        Some(d) if (0.0..=5.0).contains(&d) => d,
        Some(d) => bail!("--delay {} outside 0.0..=5.0", d),
        None => prompt_delay()?,
    };

    install_sigint_handler();
    info!(country = %country, size, delay, "generation starting");
    println!(
        "\n{}\n",
        format!("Generando números para {}...", country).blue()
    );

    let mut synth = Synthesizer::new(&store);
    let mut simulator =
        ExistenceSimulator::with_probability(cli.existence_probability, StdRng::from_os_rng());

    let mut sink = |p: BatchProgress<'_>| {
        let mark = if p.exists {
            format!("{} ✓", p.number.full).green()
        } else {
            format!("{} ✗", p.number.full).red()
        };
        println!("[{:>5.1}%] {}", p.percent, mark);
    };

    let stats = batch::run_batch(
        &mut synth,
        &mut simulator,
        &country,
        size,
        Duration::from_secs_f64(delay),
        &WallClockPacer,
        &INTERRUPTED,
        &mut sink,
    )?;

    if INTERRUPTED.load(Ordering::Relaxed) {
        println!("\n{}", "Generación interrumpida por el usuario.".yellow());
    }

    let pct = |count: u64| {
        if stats.total_generated > 0 {
            count as f64 / stats.total_generated as f64 * 100.0
        } else {
            0.0
        }
    };
    println!("\n{}", "Estadísticas:".blue());
    println!("Total números generados: {}", stats.total_generated);
    println!(
        "Números válidos: {} ({:.1}%)",
        stats.valid_count,
        pct(stats.valid_count)
    );
    println!(
        "Números inválidos: {} ({:.1}%)",
        stats.invalid_count,
        pct(stats.invalid_count)
    );
    println!("Tiempo total: {:.2} segundos", stats.duration_seconds);
    println!("Velocidad: {:.2} números/segundo", stats.rate);
    Ok(())
}

// ── Analyze ─────────────────────────────────────────────────────

pub fn run_analyze(
    cli: &Cli,
    number: Option<&str>,
    history_out: &Path,
    no_save: bool,
) -> Result<()> {
    let mut analyzer = PhoneAnalyzer::new(OfflineProvider::new());
    let mut history = HistoryStore::new();
    let user = cli
        .user
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "anonymous".to_string());

    if let Some(raw) = number {
        analyze_one(&mut analyzer, &mut history, &user, raw);
    } else {
        println!("{}", "Analizador de Números Telefónicos".blue().bold());
        println!("Para salir, escribe 'salir', 'exit' o 'quit'\n");
        loop {
            let Some(line) = prompt(
                "Ingresa un número telefónico (con código de país, ej: +34612345678): ",
            ) else {
                break;
            };
            if line.is_empty() {
                continue;
            }
            if ["salir", "exit", "quit"].contains(&line.to_lowercase().as_str()) {
                println!("\n{}", "¡Hasta luego!".green());
                break;
            }
            analyze_one(&mut analyzer, &mut history, &user, &line);
        }
    }

    if !no_save && !history.is_empty() {
        history
            .save(history_out)
            .context("saving the history snapshot")?;
        println!(
            "Historial guardado en '{}' ({} entradas)",
            history_out.display(),
            history.len()
        );
    }
    Ok(())
}

fn analyze_one(
    analyzer: &mut PhoneAnalyzer<OfflineProvider>,
    history: &mut HistoryStore,
    user: &str,
    raw: &str,
) {
    let ctx = RequestContext::new(user, Utc::now());
    match analyzer.analyze(raw, &ctx) {
        Ok(record) => {
            display_record(&record);
            history.record_success(record);
        }
        Err(err) => {
            println!("{}", format!("Error: {}", err).red());
            history.record_failure(err.to_string());
        }
    }
}

fn display_record(record: &AnalysisRecord) {
    let yes_no = |flag: bool, yes: &str, no: &str| {
        if flag {
            format!("✓ {}", yes).green()
        } else {
            format!("✗ {}", no).red()
        }
    };
    let or_unknown = |s: &str| {
        if s.is_empty() {
            "Desconocido".to_string()
        } else {
            s.to_string()
        }
    };

    println!("\n{}", "=".repeat(50).blue());
    println!("{}", "Información del número telefónico".bold());
    println!("{}\n", "=".repeat(50).blue());
    println!("{}", "Número analizado:".blue());
    println!("  Nacional: {}", record.formatted_national.as_str().green());
    println!(
        "  Internacional: {}",
        record.formatted_international.as_str().green()
    );
    println!("\n{}", "Estado:".blue());
    println!("  Validez: {}", yes_no(record.is_valid, "Válido", "No válido"));
    println!(
        "  Posibilidad: {}",
        yes_no(record.is_possible, "Posible", "No posible")
    );
    println!("\n{}", "Detalles:".blue());
    println!("  País: {}", or_unknown(&record.country_name).yellow());
    println!("  Operador: {}", or_unknown(&record.carrier_name).yellow());
    println!("  Tipo: {}", line_type_es(record.line_type).yellow());
    println!("\n{}", "Zonas horarias:".blue());
    for zone in &record.time_zones {
        println!("  • {}", zone.yellow());
    }
}

/// Spanish display labels for the closed line-type enumeration.
fn line_type_es(line_type: LineType) -> &'static str {
    match line_type {
        LineType::Mobile => "Móvil",
        LineType::FixedLine => "Fijo",
        LineType::FixedOrMobile => "Fijo o Móvil",
        LineType::TollFree => "Gratuito",
        LineType::PremiumRate => "Premium",
        LineType::SharedCost => "Costo Compartido",
        LineType::Voip => "VoIP",
        LineType::Personal => "Personal",
        LineType::Pager => "Localizador",
        LineType::Uan => "UAN",
        LineType::Unknown => "Desconocido",
    }
}

// ── Countries / History ─────────────────────────────────────────

pub fn run_countries(cli: &Cli) -> Result<()> {
    let store = CountryStore::load_or_default(&cli.countries)?;
    println!("{}", "Países disponibles:".blue());
    for (name, profile) in store.iter() {
        println!(
            "- {} (prefijo {}, {} códigos de área, {} dígitos locales)",
            name,
            profile.prefix,
            profile.area_codes.len(),
            profile.phone_length
        );
    }
    Ok(())
}

pub fn run_history(file: &Path) -> Result<()> {
    let entries = HistoryStore::load(file)?;
    if entries.is_empty() {
        println!("No hay búsquedas en el historial.");
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
