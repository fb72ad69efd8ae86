//! VM benchmark binary.
//!
//! Measures execution time for representative Intcode programs.
//! Run with: `cargo run --release --bin bench`

use std::time::{Duration, Instant};

use intcode::virtual_machine::pipeline::{FeedbackLoop, INITIAL_SIGNAL};
use intcode::virtual_machine::program::Program;
use intcode::virtual_machine::vm::{Machine, MachineConfig};

// ---------------------------------------------------------------------------
// Benchmark harness
// ---------------------------------------------------------------------------

struct BenchResult {
    name: String,
    iterations: u64,
    total: Duration,
    /// Instructions executed by the last run.
    instructions: u64,
}

impl BenchResult {
    fn avg(&self) -> Duration {
        self.total / self.iterations as u32
    }

    fn print(&self) {
        let avg = self.avg();
        let ns_per_op = avg.as_nanos();
        let ns_per_instr = if self.instructions > 0 {
            format!("{:>8.1}", ns_per_op as f64 / self.instructions as f64)
        } else {
            "       -".to_string()
        };
        println!(
            "  {:<30} {:>7} iters {:>10.3} us/iter {:>12} instrs  {} ns/instr",
            self.name,
            self.iterations,
            ns_per_op as f64 / 1000.0,
            self.instructions,
            ns_per_instr,
        );
    }
}

/// Runs `f` for at least `min_duration`, returning aggregated results.
///
/// `f` returns the number of instructions it executed.
fn bench<F>(name: impl Into<String>, min_duration: Duration, mut f: F) -> BenchResult
where
    F: FnMut() -> u64,
{
    // Warmup
    for _ in 0..5 {
        f();
    }

    let mut iterations = 0u64;
    let mut last_instructions = 0u64;
    let start = Instant::now();
    while start.elapsed() < min_duration {
        last_instructions = f();
        iterations += 1;
    }
    let total = start.elapsed();

    BenchResult {
        name: name.into(),
        iterations,
        total,
        instructions: last_instructions,
    }
}

/// Runs `program` to completion on a fresh machine, returning instructions executed.
fn run_to_halt(program: &Program, config: &MachineConfig, inputs: &[i64]) -> u64 {
    let mut vm = Machine::with_config(program, config);
    vm.run(inputs.iter().copied(), false).expect("run failed");
    assert!(vm.is_halted());
    vm.steps()
}

// ---------------------------------------------------------------------------
// Benchmark definitions
// ---------------------------------------------------------------------------

/// Outputs a copy of itself.
const QUINE: &str = "109,1,204,-1,1001,100,1,100,1008,100,16,101,1006,101,0,99";

/// Counts [100] down from N to zero.
fn counting_loop(n: u64) -> String {
    format!("1101,{n},0,100,1001,100,-1,100,1005,100,4,99")
}

/// Sums N..1 into relative-mode cells.
fn relative_sum(n: u64) -> String {
    format!("109,200,21101,{n},0,0,22201,0,1,1,21201,0,-1,0,1205,0,6,99")
}

/// Outputs 999 below 8, 1000 at 8, 1001 above 8.
const COMPARE_TO_EIGHT: &str = "3,21,1008,21,8,20,1005,20,22,107,8,21,20,1006,20,31,\
    1106,0,36,98,0,0,1002,21,125,20,4,20,1105,1,46,104,999,1105,1,46,1101,1000,1,20,4,20,\
    1105,1,46,98,99";

/// Five-stage feedback amplifier.
const FEEDBACK: &str = "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,27,4,27,\
    1001,28,-1,28,1005,28,6,99,0,0,5";

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let min = Duration::from_secs(2);
    let config = MachineConfig::default();

    println!("VM Benchmarks (each runs for >= 2s)\n");
    println!(
        "  {:<30} {:>7}       {:>14} {:>12}         {:>10}",
        "benchmark", "iters", "avg time", "instrs/run", "ns/instr"
    );
    println!("  {}", "-".repeat(90));

    // Pre-parse programs (parsing cost excluded from benchmark)
    let quine: Program = QUINE.parse().expect("parse");
    let compare: Program = COMPARE_TO_EIGHT.parse().expect("parse");
    let feedback: Program = FEEDBACK.parse().expect("parse");

    // 1. Quine
    bench("quine", min, || run_to_halt(&quine, &config, &[])).print();

    // 2. Counting loops
    for &n in &[1_000u64, 100_000] {
        let prog: Program = counting_loop(n).parse().expect("parse");
        bench(format!("counting_loop({n})"), min, || {
            run_to_halt(&prog, &config, &[])
        })
        .print();
    }

    // 3. Relative-mode accumulation (10K iterations)
    let prog: Program = relative_sum(10_000).parse().expect("parse");
    bench("relative_sum(10K)", min, || run_to_halt(&prog, &config, &[])).print();

    // 4. Compare-and-branch on each side of 8
    for &input in &[7i64, 8, 9] {
        bench(format!("compare_to_eight({input})"), min, || {
            run_to_halt(&compare, &config, &[input])
        })
        .print();
    }

    // 5. Feedback loop, five machines
    bench("feedback_loop(9,8,7,6,5)", min, || {
        let mut pipeline =
            FeedbackLoop::new(&feedback, &[9, 8, 7, 6, 5], &config).expect("pipeline");
        pipeline.run([INITIAL_SIGNAL]).expect("run failed");
        pipeline.machines().iter().map(Machine::steps).sum()
    })
    .print();

    // 6. Machine construction alone (memory allocation dominates)
    bench("construct(4096 cells)", min, || {
        let vm = Machine::with_config(&quine, &config);
        std::hint::black_box(vm.memory_len());
        0
    })
    .print();

    println!();
}
