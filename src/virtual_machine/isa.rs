//! Instruction Set Architecture (ISA) definitions.
//!
//! The [`for_each_instruction!`](crate::for_each_instruction) macro holds the
//! canonical opcode table and invokes a callback macro for code generation, so
//! the decoder, the profiler and the disassembler all derive from one list.
//!
//! This module generates:
//! - The [`Instruction`] enum with opcode mappings
//! - `TryFrom<i64>` for decoding opcodes
//! - Static per-opcode metadata ([`OperationDescriptor`])
//!
//! # Instruction Format
//!
//! An instruction is one opcode cell followed by its operand cells. The opcode
//! cell packs the operation in its two low decimal digits and one addressing
//! mode digit per operand above them (see [`operand`](super::operand)).
//! A `Write` operand names the cell the result is stored into and is always
//! the last operand of its instruction.

use crate::virtual_machine::errors::VMError;

/// Invokes a callback macro with the complete instruction definition list.
#[macro_export]
macro_rules! for_each_instruction {
    ($callback:ident) => {
        $callback! {
            // =========================
            // Arithmetic
            // =========================
            /// ADD a, b, dst ; dst = a + b
            Add = 1, "ADD" => [a: Read, b: Read, dst: Write], Arithmetic,
            /// MUL a, b, dst ; dst = a * b
            Mul = 2, "MUL" => [a: Read, b: Read, dst: Write], Arithmetic,
            // =========================
            // Input / output
            // =========================
            /// IN dst ; dst = next queued input
            In = 3, "IN" => [dst: Write], Input,
            /// OUT value ; emit value to the output stream
            Out = 4, "OUT" => [value: Read], Output,
            // =========================
            // Control flow
            // =========================
            /// JNZ cond, target ; if cond != 0 then PC = target
            JumpIfTrue = 5, "JNZ" => [cond: Read, target: Read], Jump,
            /// JZ cond, target ; if cond == 0 then PC = target
            JumpIfFalse = 6, "JZ" => [cond: Read, target: Read], Jump,
            // =========================
            // Comparison
            // =========================
            /// LT a, b, dst ; dst = (a < b) as 1 or 0
            LessThan = 7, "LT" => [a: Read, b: Read, dst: Write], Compare,
            /// EQ a, b, dst ; dst = (a == b) as 1 or 0
            Equals = 8, "EQ" => [a: Read, b: Read, dst: Write], Compare,
            // =========================
            // Machine state
            // =========================
            /// ARB delta ; relative base += delta
            AdjustRelativeBase = 9, "ARB" => [delta: Read], Base,
            /// HALT ; stop the machine permanently
            Halt = 99, "HALT" => [], Halt,
        }
    };
}

/// Generates the [`Instruction`] enum and its static metadata from the table.
#[macro_export]
macro_rules! define_instructions {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:literal, $mnemonic:literal => [
                $( $field:ident : $kind:ident ),* $(,)?
            ], $category:ident
        ),* $(,)?
    ) => {
        // =========================
        // VM instruction enum
        // =========================
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum Instruction {
            $(
                $(#[$doc])*
                $name = $opcode,
            )*
        }

        impl TryFrom<i64> for Instruction {
            type Error = VMError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                match value {
                    $( $opcode => Ok(Instruction::$name), )*
                    _ => Err(VMError::UnknownOpcode(value)),
                }
            }
        }

        impl Instruction {
            /// Every instruction, in opcode order.
            pub const ALL: &'static [Instruction] = &[ $( Instruction::$name, )* ];

            /// Returns the numeric opcode.
            pub const fn opcode(&self) -> i64 {
                *self as i64
            }

            /// Returns the assembly mnemonic for this instruction.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Instruction::$name => $mnemonic, )*
                }
            }

            /// Returns the number of operand cells following the opcode cell.
            pub const fn param_count(&self) -> usize {
                match self {
                    $( Instruction::$name => 0 $( + define_instructions!(@one $kind) )*, )*
                }
            }

            /// Returns `true` if the last operand is a write target.
            pub const fn writes(&self) -> bool {
                match self {
                    $(
                        Instruction::$name => false $( || define_instructions!(@is_write $kind) )*,
                    )*
                }
            }

            /// Returns the profiling category of this instruction.
            pub const fn category(&self) -> OpCategory {
                match self {
                    $( Instruction::$name => OpCategory::$category, )*
                }
            }

            /// Returns the names of the operands, in encoding order.
            pub const fn operand_names(&self) -> &'static [&'static str] {
                match self {
                    $( Instruction::$name => &[ $( stringify!($field), )* ], )*
                }
            }
        }
    };

    (@one $kind:ident) => { 1 };
    (@is_write Write) => { true };
    (@is_write Read) => { false };
}

/// Coarse grouping of instructions used for execution profiling.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum OpCategory {
    Arithmetic = 0,
    Input = 1,
    Output = 2,
    Jump = 3,
    Compare = 4,
    Base = 5,
    Halt = 6,
}

impl OpCategory {
    /// Number of categories.
    pub const COUNT: usize = 7;

    /// All categories in discriminant order.
    pub const ALL: [OpCategory; Self::COUNT] = [
        OpCategory::Arithmetic,
        OpCategory::Input,
        OpCategory::Output,
        OpCategory::Jump,
        OpCategory::Compare,
        OpCategory::Base,
        OpCategory::Halt,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OpCategory::Arithmetic => "Arithmetic",
            OpCategory::Input => "Input",
            OpCategory::Output => "Output",
            OpCategory::Jump => "Jump",
            OpCategory::Compare => "Compare",
            OpCategory::Base => "Relative Base",
            OpCategory::Halt => "Halt",
        }
    }
}

for_each_instruction!(define_instructions);

/// Static description of one operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OperationDescriptor {
    pub opcode: i64,
    pub mnemonic: &'static str,
    /// Number of operand cells.
    pub params: usize,
    /// Consumes exactly one queued input value.
    pub reads_input: bool,
    /// Last operand is a write target rather than a read value.
    pub writes: bool,
    /// Produces one observable output value.
    pub produces_output: bool,
}

impl Instruction {
    /// Returns `true` if executing this instruction consumes one input value.
    pub const fn reads_input(&self) -> bool {
        matches!(self.category(), OpCategory::Input)
    }

    /// Returns `true` if executing this instruction yields one output value.
    pub const fn produces_output(&self) -> bool {
        matches!(self.category(), OpCategory::Output)
    }

    /// Returns the full static descriptor of this instruction.
    pub const fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor {
            opcode: self.opcode(),
            mnemonic: self.mnemonic(),
            params: self.param_count(),
            reads_input: self.reads_input(),
            writes: self.writes(),
            produces_output: self.produces_output(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_try_from_valid() {
        for instr in Instruction::ALL {
            assert_eq!(Instruction::try_from(instr.opcode()), Ok(*instr));
        }
    }

    #[test]
    fn instruction_try_from_invalid() {
        for value in [0, 10, 98, 100, -1] {
            assert_eq!(
                Instruction::try_from(value),
                Err(VMError::UnknownOpcode(value))
            );
        }
    }

    #[test]
    fn arity_matches_table() {
        assert_eq!(Instruction::Add.param_count(), 3);
        assert_eq!(Instruction::Mul.param_count(), 3);
        assert_eq!(Instruction::In.param_count(), 1);
        assert_eq!(Instruction::Out.param_count(), 1);
        assert_eq!(Instruction::JumpIfTrue.param_count(), 2);
        assert_eq!(Instruction::JumpIfFalse.param_count(), 2);
        assert_eq!(Instruction::LessThan.param_count(), 3);
        assert_eq!(Instruction::Equals.param_count(), 3);
        assert_eq!(Instruction::AdjustRelativeBase.param_count(), 1);
        assert_eq!(Instruction::Halt.param_count(), 0);
    }

    #[test]
    fn only_input_reads_and_only_output_emits() {
        for instr in Instruction::ALL {
            assert_eq!(instr.reads_input(), *instr == Instruction::In);
            assert_eq!(instr.produces_output(), *instr == Instruction::Out);
        }
    }

    #[test]
    fn write_targets() {
        let writers: Vec<_> = Instruction::ALL.iter().filter(|i| i.writes()).collect();
        assert_eq!(
            writers,
            vec![
                &Instruction::Add,
                &Instruction::Mul,
                &Instruction::In,
                &Instruction::LessThan,
                &Instruction::Equals,
            ]
        );
    }

    #[test]
    fn operand_names_follow_arity() {
        for instr in Instruction::ALL {
            assert_eq!(instr.operand_names().len(), instr.param_count());
        }
        assert_eq!(Instruction::Add.operand_names(), &["a", "b", "dst"]);
        // The write target is always the last operand.
        for instr in Instruction::ALL.iter().filter(|i| i.writes()) {
            assert_eq!(instr.operand_names().last(), Some(&"dst"));
        }
    }

    #[test]
    fn descriptor_fields() {
        let d = Instruction::In.descriptor();
        assert_eq!(d.opcode, 3);
        assert_eq!(d.mnemonic, "IN");
        assert_eq!(d.params, 1);
        assert!(d.reads_input);
        assert!(d.writes);
        assert!(!d.produces_output);
    }

    #[test]
    fn opcodes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for instr in Instruction::ALL {
            assert!(seen.insert(instr.opcode()));
        }
        assert_eq!(seen.len(), 10);
    }
}
