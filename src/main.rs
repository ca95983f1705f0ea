//! govcycle CLI
//!
//! Usage:
//!   govcycle                          # Interactive REPL (wall clock start)
//!   govcycle --demo                   # Scripted walkthrough of a full cycle
//!   govcycle --json                   # JSON output for status/results
//!   govcycle --snapshot-dir ./snaps   # Persist iteration snapshots as JSON
//!
//! The REPL drives a simulated clock: `now <ts>` moves time, and every
//! submission happens at the current clock value, so a whole governance
//! cycle can be walked through in seconds.

use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, Write};

use govcycle::core::{
    Calendar, GovEngine, RecordingPublisher, SharedPrice, SharedRoster, SharedParams,
};
use govcycle::types::{GovError, IterationWindow, SurplusAllocation, VoteResponse};
use govcycle::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "govcycle",
    version = VERSION,
    about = "Iteration-based governance lifecycle engine",
    long_about = "govcycle drives a periodic collective decision process:\n\n\
                  a calendar of iteration windows, a rotating participation\n\
                  ledger, a running-average vote tally, and a lazy iteration\n\
                  transition that snapshots results and publishes the locking\n\
                  threshold when quorum is met.\n\n\
                  Modes:\n  \
                  (default)  Interactive REPL over a simulated clock\n  \
                  --demo     Scripted walkthrough of two full iterations"
)]
struct Args {
    /// Run the scripted demo instead of the REPL
    #[arg(short, long)]
    demo: bool,

    /// Output status and results as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Directory for iteration snapshots (not persisted unless set)
    #[arg(long)]
    snapshot_dir: Option<String>,
}

/// REPL state: the engine plus the shared collaborator handles the
/// commands mutate, and the simulated clock.
struct Session {
    engine: GovEngine,
    params: SharedParams,
    roster: SharedRoster,
    price: SharedPrice,
    publisher: RecordingPublisher,
    clock: i64,
    json: bool,
}

impl Session {
    fn new(args: &Args) -> Self {
        let params = SharedParams::new();
        let roster = SharedRoster::new();
        let price = SharedPrice::new();
        let publisher = RecordingPublisher::new();

        let mut engine = GovEngine::new(
            Calendar::new(),
            Box::new(params.clone()),
            Box::new(roster.clone()),
            Box::new(price.clone()),
            Box::new(publisher.clone()),
        );
        if let Some(dir) = &args.snapshot_dir {
            engine = engine.with_snapshot_dir(dir);
        }

        Session {
            engine,
            params,
            roster,
            price,
            publisher,
            clock: chrono::Utc::now().timestamp(),
            json: args.json,
        }
    }
}

fn main() {
    let args = Args::parse();

    if args.no_color {
        colored::control::set_override(false);
    }

    if args.demo {
        run_demo(&args);
    } else {
        run_repl(&args);
    }
}

// =============================================================================
// REPL
// =============================================================================

fn run_repl(args: &Args) {
    let mut session = Session::new(args);

    print_header();
    println!("Type 'help' for commands, 'quit' to exit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        let iteration = session.engine.current_iteration(session.clock);
        print!("{} ", format!("[t={} it={}]>", session.clock, iteration).bold());
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            println!("Session ended.");
            break;
        }
        if line.is_empty() {
            continue;
        }

        if let Err(message) = dispatch(&mut session, line) {
            println!("{} {}", "error:".red().bold(), message);
        }
    }
}

/// Parse and execute one REPL line. Err carries the message to print.
fn dispatch(session: &mut Session, line: &str) -> Result<(), String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens[0] {
        "help" => {
            print_help();
            Ok(())
        }
        "now" => cmd_now(session, &tokens[1..]),
        "init" => {
            session.engine.init(session.clock);
            println!("{}", "initialized".green());
            Ok(())
        }
        "window" => cmd_window(session, &tokens[1..]),
        "param" => cmd_param(session, &tokens[1..]),
        "dparam" => cmd_dparam(session, &tokens[1..]),
        "price" => cmd_price(session, &tokens[1..]),
        "register" => cmd_register(session, &tokens[1..]),
        "survey" => cmd_survey(session, &tokens[1..]),
        "vote" => cmd_vote(session, &tokens[1..]),
        "ratify" => cmd_ratify(session, &tokens[1..]),
        "tick" => {
            report(session.engine.tick(session.clock), "ticked")?;
            Ok(())
        }
        "status" => {
            print_status(session);
            Ok(())
        }
        "snapshots" => {
            print_snapshots(session);
            Ok(())
        }
        other => Err(format!("unknown command '{}', try 'help'", other)),
    }
}

fn cmd_now(session: &mut Session, args: &[&str]) -> Result<(), String> {
    match args.first() {
        None => {
            println!("t = {}", session.clock);
            Ok(())
        }
        Some(raw) => {
            session.clock = raw
                .parse()
                .map_err(|_| format!("'{}' is not a Unix timestamp", raw))?;
            Ok(())
        }
    }
}

fn cmd_window(session: &mut Session, args: &[&str]) -> Result<(), String> {
    if args.len() < 3 {
        return Err("usage: window <iteration> <start> <end> [claim] [tokens]".into());
    }
    let iteration: u32 = args[0].parse().map_err(|_| "bad iteration number")?;
    let start: i64 = args[1].parse().map_err(|_| "bad start timestamp")?;
    let end: i64 = args[2].parse().map_err(|_| "bad end timestamp")?;

    let mut window = IterationWindow::new(iteration, start, end);
    if let Some(raw) = args.get(3) {
        window.claim_amount = raw.parse().map_err(|_| "bad claim amount")?;
    }
    if let Some(raw) = args.get(4) {
        window.tokens_required = raw.parse().map_err(|_| "bad tokens-required")?;
    }

    report(session.engine.add_window(window), "window added")
}

fn cmd_param(session: &mut Session, args: &[&str]) -> Result<(), String> {
    match args {
        ["str", key, value] => {
            session.params.0.borrow_mut().upsert_string(key, value);
            println!("{} {} = {}", "set".green(), key, value);
            Ok(())
        }
        ["num", key, raw] => {
            let value: f64 = raw.parse().map_err(|_| format!("'{}' is not a number", raw))?;
            session.params.0.borrow_mut().upsert_f64(key, value);
            println!("{} {} = {}", "set".green(), key, value);
            Ok(())
        }
        _ => Err("usage: param str|num <key> <value>".into()),
    }
}

fn cmd_dparam(session: &mut Session, args: &[&str]) -> Result<(), String> {
    match args {
        ["str", key] => {
            session.params.0.borrow_mut().erase_string(key);
            println!("{} {}", "erased".yellow(), key);
            Ok(())
        }
        ["num", key] => {
            session.params.0.borrow_mut().erase_f64(key);
            println!("{} {}", "erased".yellow(), key);
            Ok(())
        }
        _ => Err("usage: dparam str|num <key>".into()),
    }
}

fn cmd_price(session: &mut Session, args: &[&str]) -> Result<(), String> {
    let raw = args.first().ok_or("usage: price <value>")?;
    let value: f64 = raw.parse().map_err(|_| format!("'{}' is not a price", raw))?;
    session.price.set(value);
    println!("{} price = {}", "set".green(), value);
    Ok(())
}

fn cmd_register(session: &mut Session, args: &[&str]) -> Result<(), String> {
    let name = args.first().ok_or("usage: register <name> [staked] [verified]")?;
    let staked = args.contains(&"staked");
    let verified = args.contains(&"verified");
    session.roster.add(name, staked, verified);
    println!(
        "{} {} (staked: {}, verified: {})",
        "registered".green(),
        name,
        staked,
        verified
    );
    Ok(())
}

fn cmd_survey(session: &mut Session, args: &[&str]) -> Result<(), String> {
    let name = args.first().ok_or("usage: survey <name>")?;
    let clock = session.clock;
    report(session.engine.submit_survey(name, clock), "survey recorded")
}

fn cmd_vote(session: &mut Session, args: &[&str]) -> Result<(), String> {
    if args.len() < 6 {
        return Err(
            "usage: vote <name> <q1> <q2> <q3> <POOL|BURN> <q5> [partners e.g. 1,3,5]".into(),
        );
    }
    let name = args[0];
    let response = VoteResponse {
        issuance_rate: args[1].parse().map_err(|_| "bad q1 (issuance rate)")?,
        mint_fee_percent: args[2].parse().map_err(|_| "bad q2 (mint fee)")?,
        locking_threshold: args[3].parse().map_err(|_| "bad q3 (locking threshold)")?,
        surplus_allocation: match args[4].to_uppercase().as_str() {
            "POOL" => SurplusAllocation::Pool,
            "BURN" => SurplusAllocation::Burn,
            other => return Err(format!("q4 must be POOL or BURN, got '{}'", other)),
        },
        reserve_release_percent: args[5].parse().map_err(|_| "bad q5 (reserve release)")?,
        partners: match args.get(6) {
            None => Vec::new(),
            Some(raw) => raw
                .split(',')
                .map(|p| p.trim().parse::<u8>().map_err(|_| format!("bad partner pick '{}'", p)))
                .collect::<Result<Vec<u8>, String>>()?,
        },
    };

    let clock = session.clock;
    report(session.engine.submit_vote(name, &response, clock), "vote recorded")
}

fn cmd_ratify(session: &mut Session, args: &[&str]) -> Result<(), String> {
    let name = args.first().ok_or("usage: ratify <name> <yes|no>")?;
    let approve = match args.get(1).copied() {
        Some("yes") => true,
        Some("no") => false,
        _ => return Err("usage: ratify <name> <yes|no>".into()),
    };
    let clock = session.clock;
    report(session.engine.submit_ratify(name, approve, clock), "ratification recorded")
}

/// Print an engine result: green on success, red (tagged FATAL when it is)
/// on failure. The failure is reported but never bubbles out of the REPL.
fn report(result: Result<(), GovError>, success: &str) -> Result<(), String> {
    match result {
        Ok(()) => {
            println!("{}", success.green());
            Ok(())
        }
        Err(err) if err.is_fatal() => Err(format!("{} {}", "FATAL:".red().bold(), err)),
        Err(err) => Err(err.to_string()),
    }
}

// =============================================================================
// STATUS OUTPUT
// =============================================================================

fn print_status(session: &Session) {
    let iteration = session.engine.current_iteration(session.clock);
    let window = session.engine.calendar().window(iteration);

    if session.json {
        let status = serde_json::json!({
            "clock": session.clock,
            "current_iteration": iteration,
            "window": window,
            "system": session.engine.system(),
            "tally": session.engine.tally(),
            "ratify": session.engine.ratify_record(),
            "published": session.publisher.published(),
        });
        println!("{}", serde_json::to_string_pretty(&status).unwrap_or_default());
        return;
    }

    println!("{}", "-- status ------------------------------------".bold());
    println!("  clock:              {}", session.clock);
    println!("  current iteration:  {}", iteration);
    if let Some(window) = window {
        println!("  window:             [{} - {}]", window.start, window.end);
    }

    match session.engine.system() {
        Some(sys) => {
            println!("  system iteration:   {}", sys.iteration);
            println!("  distinct voters:    {}", sys.participants);
        }
        None => println!("  {}", "system: not initialized".yellow()),
    }

    if let Some(tally) = session.engine.tally() {
        println!(
            "  tally (it {}): {} votes, q3 avg {:.6}",
            tally.iteration, tally.participants, tally.locking_threshold_average
        );
        println!(
            "    q1 {:.2}  q2 {:.2}  q5 {:.2}  pool/burn {}/{}  partners {:?}",
            tally.issuance_average,
            tally.mint_fee_average,
            tally.reserve_release_average,
            tally.surplus_pool,
            tally.surplus_burn,
            tally.partner_choices
        );
    }
    if let Some(ratify) = session.engine.ratify_record() {
        println!(
            "  ratify (it {}): {} responses, {} approved",
            ratify.iteration, ratify.participants, ratify.ratified
        );
    }

    let published = session.publisher.published();
    if published.is_empty() {
        println!("  published targets:  none");
    } else {
        for (iteration, rate) in published {
            println!(
                "  published target:   it {} -> {}",
                iteration,
                format!("{:.6}", rate).green()
            );
        }
    }
}

fn print_snapshots(session: &Session) {
    let snapshots = session.engine.snapshots();

    if session.json {
        println!(
            "{}",
            serde_json::to_string_pretty(snapshots).unwrap_or_default()
        );
        return;
    }

    if snapshots.is_empty() {
        println!("no closed iterations yet");
        return;
    }
    for snap in snapshots {
        let verdict = if snap.quorum_met {
            format!("quorum met ({}/{})", snap.vote_participants, snap.quorum).green()
        } else {
            format!("below quorum ({}/{})", snap.vote_participants, snap.quorum).yellow()
        };
        println!(
            "  {}  it {}  q3 avg {:.6}  {}  ratified {}/{}",
            snap.id,
            snap.iteration,
            snap.locking_threshold_average,
            verdict,
            snap.ratified,
            snap.ratify_participants
        );
    }
}

fn print_header() {
    println!("{}", "==============================================".bold());
    println!("{}", format!("  govcycle v{}", VERSION).bold());
    println!("{}", "==============================================".bold());
    println!();
}

fn print_help() {
    println!("commands:");
    println!("  now [ts]                              show or set the clock");
    println!("  init                                  create the system records");
    println!("  window <it> <start> <end> [c] [t]     add an iteration window");
    println!("  param str|num <key> <value>           upsert a parameter");
    println!("  dparam str|num <key>                  erase a parameter");
    println!("  price <value>                         set the price feed");
    println!("  register <name> [staked] [verified]   add a participant");
    println!("  survey <name>                         submit a survey");
    println!("  vote <name> <q1> <q2> <q3> <POOL|BURN> <q5> [1,3,5]");
    println!("  ratify <name> <yes|no>                submit a ratification");
    println!("  tick                                  run the transition check");
    println!("  status                                show records and results");
    println!("  snapshots                             list closed iterations");
    println!("  quit");
}

// =============================================================================
// DEMO
// =============================================================================

/// Scripted walkthrough: two windows, two voters, one published result.
fn run_demo(args: &Args) {
    let mut session = Session::new(args);

    print_header();
    println!("Demo: two iteration windows, quorum 2, price 0.02.");
    println!();

    let script = [
        "now 1000",
        "window 1 1000 1999",
        "window 2 2000 2999",
        "window 3 3000 3999",
        "param str lockquorum 2",
        "param num lockfactor 3.0",
        "price 0.02",
        "init",
        "register alice staked verified",
        "register bob staked",
        "survey alice",
        "vote alice 60 12 0.05 POOL 25 1,3",
        "ratify alice yes",
        "vote bob 40 8 0.03 BURN 15 2",
        "status",
        "now 2500",
        "tick",
        "snapshots",
        "status",
    ];

    for line in script {
        println!("{} {}", ">".bold(), line.cyan());
        if let Err(message) = dispatch(&mut session, line) {
            println!("{} {}", "error:".red().bold(), message);
        }
        println!();
    }
}
