//! Multi-machine pipelines.
//!
//! [`FeedbackLoop`] wires N machines into a cycle: machine `i`'s output batch
//! is relayed as machine `i + 1`'s input, and the last machine feeds the
//! first. Machines are interleaved cooperatively on the calling thread, each
//! running until it produces one output (or halts) before the next one is
//! resumed.
//!
//! [`run_chain`] is the open-ended variant where each stage runs once on a
//! fresh machine, and [`best_phase_setting`] searches every ordering of a set
//! of phase seeds for the largest final signal.

use crate::trace;
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::program::Program;
use crate::virtual_machine::vm::{Machine, MachineConfig};
use std::iter;

/// Signal fed to the first stage when none is given.
pub const INITIAL_SIGNAL: i64 = 0;

/// How the stages of an amplifier search are connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopMode {
    /// Each stage runs once, in order.
    Serial,
    /// Stages form a cycle until every machine halts.
    Feedback,
}

/// Cycle of machines passing outputs round-robin.
pub struct FeedbackLoop {
    machines: Vec<Machine>,
    /// One seed per machine, injected before its first run.
    seeds: Vec<i64>,
    /// Whether each machine already received its seed.
    seeded: Vec<bool>,
    /// Index of the machine visited next.
    cursor: usize,
    /// Outputs of the most recent visit, handed to the next machine.
    relay: Vec<i64>,
    /// Last value observed on the relay.
    last: Option<i64>,
}

impl FeedbackLoop {
    /// Builds one machine per phase from the same program.
    pub fn new(program: &Program, phases: &[i64], config: &MachineConfig) -> Result<Self, VMError> {
        let machines = phases
            .iter()
            .map(|_| Machine::with_config(program, config))
            .collect();
        Self::from_machines(machines, phases.to_vec())
    }

    /// Wraps independently built machines. `seeds[i]` goes to `machines[i]`.
    pub fn from_machines(machines: Vec<Machine>, seeds: Vec<i64>) -> Result<Self, VMError> {
        if machines.is_empty() {
            return Err(VMError::EmptyPipeline);
        }
        if machines.len() != seeds.len() {
            return Err(VMError::SeedCountMismatch {
                machines: machines.len(),
                seeds: seeds.len(),
            });
        }

        Ok(Self {
            seeded: vec![false; machines.len()],
            machines,
            seeds,
            cursor: 0,
            relay: Vec::new(),
            last: None,
        })
    }

    /// Returns the number of machines in the loop.
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    /// Always `false`: construction rejects empty loops.
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Returns the machines, in visiting order.
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Returns `true` once every machine has halted.
    pub fn is_halted(&self) -> bool {
        self.machines.iter().all(Machine::is_halted)
    }

    /// Returns the last value observed on the relay.
    pub fn last_signal(&self) -> Option<i64> {
        self.last
    }

    /// Runs the loop until every machine halts.
    ///
    /// `initial` is handed to the first machine visited, after its seed.
    /// Halted machines are skipped and pass the relay through unchanged.
    /// Returns the last relayed value, or the first fault of any machine.
    pub fn run<I: IntoIterator<Item = i64>>(&mut self, initial: I) -> Result<Option<i64>, VMError> {
        self.relay.extend(initial);

        while !self.is_halted() {
            let index = self.cursor;
            self.cursor = (self.cursor + 1) % self.machines.len();

            if self.machines[index].is_halted() {
                trace!("pipeline: machine {index} halted, relaying {:?}", self.relay);
                continue;
            }

            let seed = (!self.seeded[index]).then(|| self.seeds[index]);
            self.seeded[index] = true;
            let inputs: Vec<i64> = seed.into_iter().chain(self.relay.drain(..)).collect();

            let outputs = self.machines[index].run(inputs, true)?;
            trace!("pipeline: machine {index} -> {outputs:?}");

            if let Some(&value) = outputs.last() {
                self.last = Some(value);
            }
            self.relay = outputs;
        }

        Ok(self.last)
    }
}

/// Runs each phase on a fresh machine in order, feeding every stage the
/// previous stage's output. Returns the final stage's output.
pub fn run_chain(
    program: &Program,
    phases: &[i64],
    initial: i64,
    config: &MachineConfig,
) -> Result<Option<i64>, VMError> {
    let mut signal = vec![initial];
    for &phase in phases {
        let mut machine = Machine::with_config(program, config);
        signal = machine.run(iter::once(phase).chain(signal), true)?;
        trace!("chain: phase {phase} -> {signal:?}");
    }
    Ok(signal.last().copied())
}

/// Runs `phases` in the given mode, starting from [`INITIAL_SIGNAL`].
pub fn run_phases(
    program: &Program,
    phases: &[i64],
    mode: LoopMode,
    config: &MachineConfig,
) -> Result<Option<i64>, VMError> {
    match mode {
        LoopMode::Serial => run_chain(program, phases, INITIAL_SIGNAL, config),
        LoopMode::Feedback => FeedbackLoop::new(program, phases, config)?.run([INITIAL_SIGNAL]),
    }
}

/// Tries every ordering of `phases` and returns the one producing the largest
/// signal, with that signal. The first ordering wins ties.
///
/// Returns `None` if no ordering produced any output.
pub fn best_phase_setting(
    program: &Program,
    phases: &[i64],
    mode: LoopMode,
    config: &MachineConfig,
) -> Result<Option<(Vec<i64>, i64)>, VMError> {
    let mut best: Option<(Vec<i64>, i64)> = None;
    for order in Permutations::new(phases) {
        let Some(signal) = run_phases(program, &order, mode, config)? else {
            continue;
        };
        if best.as_ref().is_none_or(|(_, b)| signal > *b) {
            best = Some((order, signal));
        }
    }
    Ok(best)
}

/// Lexicographic permutations of a slice, by position.
///
/// The first permutation is the slice itself.
pub struct Permutations<'a> {
    items: &'a [i64],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> Permutations<'a> {
    pub fn new(items: &'a [i64]) -> Self {
        Self {
            items,
            indices: (0..items.len()).collect(),
            done: false,
        }
    }

    /// Advances `indices` to the next lexicographic permutation.
    fn advance(&mut self) -> bool {
        let idx = &mut self.indices;
        let Some(pivot) = (1..idx.len()).rev().find(|&i| idx[i - 1] < idx[i]) else {
            return false;
        };
        let pivot = pivot - 1;
        let Some(successor) = (pivot + 1..idx.len()).rev().find(|&j| idx[j] > idx[pivot]) else {
            return false;
        };
        idx.swap(pivot, successor);
        idx[pivot + 1..].reverse();
        true
    }
}

impl Iterator for Permutations<'_> {
    type Item = Vec<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.iter().map(|&i| self.items[i]).collect();
        self.done = !self.advance();
        Some(current)
    }
}
