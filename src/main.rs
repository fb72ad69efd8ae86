//! Intcode program runner.
//!
//! Loads a program file and runs it on a single machine, or on a chain or
//! feedback loop of machines seeded with phase settings.
//!
//! # Usage
//! ```text
//! intcode <program> [OPTIONS]
//! ```
//!
//! # Arguments
//! - `program`: File holding comma-separated integers
//!
//! # Options
//! - `-i, --input <n>`: Queue an input value (repeatable)
//! - `-m, --memory <cells>`: Memory capacity (defaults to `INTCODE_MEMORY` or 4096)
//! - `--first`: Stop after the first output
//! - `--patch <addr>=<value>`: Overwrite a program cell before running (repeatable)
//! - `--chain <phases>`: Run one machine per phase in series
//! - `--feedback <phases>`: Run one machine per phase in a feedback loop
//! - `--best-chain <phases>` / `--best-feedback <phases>`: Search every phase ordering
//! - `-d, --disassemble`: Print a listing instead of running
//! - `-t, --trace`: Log every executed instruction
//! - `-p, --profile`: Print executed instruction counts

use intcode::utils::log::{Level, set_min_level};
use intcode::virtual_machine::disassembler::disassemble;
use intcode::virtual_machine::pipeline::{
    FeedbackLoop, INITIAL_SIGNAL, LoopMode, best_phase_setting, run_chain,
};
use intcode::virtual_machine::program::Program;
use intcode::virtual_machine::vm::{ExecutionProfile, Machine, MachineConfig};
use intcode::{error, info};
use std::env;
use std::process;

/// What to do with the loaded program.
enum Mode {
    Run,
    Disassemble,
    Chain(Vec<i64>),
    Feedback(Vec<i64>),
    Best(LoopMode, Vec<i64>),
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(&args[0]);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let program_path = &args[1];
    let mut inputs: Vec<i64> = Vec::new();
    let mut patches: Vec<(usize, i64)> = Vec::new();
    let mut config = MachineConfig::from_env();
    let mut stop_after_first_output = false;
    let mut show_profile = false;
    let mut mode = Mode::Run;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            k @ ("--input" | "-i") => {
                let value = next_arg(&args, &mut i, k);
                inputs.push(parse_number(k, value));
            }
            k @ ("--memory" | "-m") => {
                let value = next_arg(&args, &mut i, k);
                config = match value.parse::<usize>() {
                    Ok(cells) if cells > 0 => MachineConfig::with_memory(cells),
                    _ => {
                        error!("Invalid memory size: '{value}' is not a positive number");
                        process::exit(1);
                    }
                };
            }
            "--first" => {
                stop_after_first_output = true;
                i += 1;
            }
            k @ "--patch" => {
                let value = next_arg(&args, &mut i, k);
                patches.push(parse_patch(value));
            }
            k @ "--chain" => {
                mode = Mode::Chain(parse_phases(next_arg(&args, &mut i, k)));
            }
            k @ "--feedback" => {
                mode = Mode::Feedback(parse_phases(next_arg(&args, &mut i, k)));
            }
            k @ "--best-chain" => {
                mode = Mode::Best(LoopMode::Serial, parse_phases(next_arg(&args, &mut i, k)));
            }
            k @ "--best-feedback" => {
                mode = Mode::Best(LoopMode::Feedback, parse_phases(next_arg(&args, &mut i, k)));
            }
            "--disassemble" | "-d" => {
                mode = Mode::Disassemble;
                i += 1;
            }
            "--trace" | "-t" => {
                set_min_level(Level::Trace);
                i += 1;
            }
            "--profile" | "-p" => {
                show_profile = true;
                i += 1;
            }
            other => {
                error!("Unexpected argument: {}\n", other);
                print_usage(&args[0]);
                process::exit(1);
            }
        }
    }

    let mut program = Program::load(program_path).unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1)
    });
    for (address, value) in patches {
        if let Err(e) = program.patch(address, value) {
            error!("Invalid patch {address}={value}: {e}");
            process::exit(1);
        }
    }

    let initial = inputs.first().copied().unwrap_or(INITIAL_SIGNAL);

    match mode {
        Mode::Run => {
            let mut vm = Machine::with_config(&program, &config);
            let outputs = vm.run(inputs, stop_after_first_output).unwrap_or_else(|e| {
                error!("Machine faulted at {}: {e}", vm.program_counter());
                process::exit(1)
            });

            for value in &outputs {
                println!("{value}");
            }
            if outputs.is_empty()
                && let Some(first) = vm.memory().first()
            {
                info!("No output; memory[0] = {first}");
            }
            info!("{:?} after {} instructions", vm.status(), vm.steps());

            if show_profile {
                print_profile(vm.profile());
            }
        }
        Mode::Disassemble => {
            for line in disassemble(program.cells(), 0, program.len()) {
                println!("{line}");
            }
        }
        Mode::Chain(phases) => {
            let signal = run_chain(&program, &phases, initial, &config).unwrap_or_else(|e| {
                error!("Chain faulted: {e}");
                process::exit(1)
            });
            print_signal(signal);
        }
        Mode::Feedback(phases) => {
            let signal = FeedbackLoop::new(&program, &phases, &config)
                .and_then(|mut pipeline| pipeline.run([initial]))
                .unwrap_or_else(|e| {
                    error!("Feedback loop faulted: {e}");
                    process::exit(1)
                });
            print_signal(signal);
        }
        Mode::Best(loop_mode, phases) => {
            let best =
                best_phase_setting(&program, &phases, loop_mode, &config).unwrap_or_else(|e| {
                    error!("Phase search faulted: {e}");
                    process::exit(1)
                });
            match best {
                Some((order, signal)) => {
                    println!("{signal}");
                    info!("Best phase setting: {}", join(&order));
                }
                None => {
                    error!("No phase setting produced a signal");
                    process::exit(1);
                }
            }
        }
    }
}

/// Advances past a flag and returns its value, exiting if it is missing.
fn next_arg<'a>(args: &'a [String], i: &mut usize, flag: &str) -> &'a str {
    *i += 1;
    if *i >= args.len() {
        error!("{flag} requires an argument");
        process::exit(1);
    }
    let value = &args[*i];
    *i += 1;
    value
}

fn parse_number(what: &str, raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or_else(|_| {
        error!("Invalid {what} value: '{raw}' is not a valid number");
        process::exit(1)
    })
}

fn parse_phases(raw: &str) -> Vec<i64> {
    raw.split(',')
        .map(|phase| parse_number("phase", phase))
        .collect()
}

fn parse_patch(raw: &str) -> (usize, i64) {
    let Some((address, value)) = raw.split_once('=') else {
        error!("Invalid patch '{raw}': expected ADDR=VALUE");
        process::exit(1);
    };
    let address = address.trim().parse::<usize>().unwrap_or_else(|_| {
        error!("Invalid patch address: '{address}'");
        process::exit(1)
    });
    (address, parse_number("patch", value))
}

fn print_signal(signal: Option<i64>) {
    match signal {
        Some(value) => println!("{value}"),
        None => info!("No signal produced"),
    }
}

fn print_profile(profile: &ExecutionProfile) {
    let total_u = profile.total();
    let total = total_u as f64;

    let cat_w = 2 + profile
        .iter()
        .map(|(c, _)| c.as_str().chars().count())
        .max()
        .unwrap_or(0)
        .max("total".chars().count());
    let amt_w = format_with_commas(total_u).chars().count();
    let dash_w = cat_w + 1 + amt_w + 2 + "( 100.0%)".len();

    println!("Instruction Profile:");
    println!("{}", "-".repeat(dash_w));

    for (category, count) in profile.iter() {
        if count == 0 {
            continue;
        }
        let percent = if total > 0.0 {
            (count as f64 / total) * 100.0
        } else {
            0.0
        };
        println!(
            "{:<cat_w$} {:>amt_w$} ({:>5.1}%)",
            category.as_str(),
            format_with_commas(count),
            percent,
        );
    }

    println!("{}", "-".repeat(dash_w));
    println!(
        "{:<cat_w$} {:>amt_w$} ({:>5.1}%)",
        "total",
        format_with_commas(total_u),
        100.0,
    );
}

fn join(values: &[i64]) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn format_with_commas(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

const USAGE: &str = "\
Intcode Runner

USAGE:
    {program} <program> [OPTIONS]

ARGS:
    <program>    File holding comma-separated integers

OPTIONS:
    -i, --input <n>              Queue an input value (repeatable)
    -m, --memory <cells>         Memory capacity (defaults to INTCODE_MEMORY or 4096)
        --first                  Stop after the first output
        --patch <addr>=<value>   Overwrite a program cell before running (repeatable)
        --chain <phases>         Run one machine per phase in series
        --feedback <phases>      Run one machine per phase in a feedback loop
        --best-chain <phases>    Search every ordering of a serial chain
        --best-feedback <phases> Search every ordering of a feedback loop
    -d, --disassemble            Print a listing instead of running
    -t, --trace                  Log every executed instruction
    -p, --profile                Print executed instruction counts
    -h, --help                   Print this help message

EXAMPLES:
    # Run with one input
    {program} diagnostic.txt -i 5

    # Restore the alarm state before running
    {program} gravity.txt --patch 1=12 --patch 2=2

    # Find the best feedback-loop phase setting
    {program} amplifier.txt --best-feedback 5,6,7,8,9
";

fn print_usage(program: &str) {
    info!("{}", USAGE.replace("{program}", program));
}
