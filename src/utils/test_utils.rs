//! Test fixtures shared by the machine and pipeline tests.

#[cfg(test)]
pub mod utils {
    use crate::virtual_machine::program::Program;
    use crate::virtual_machine::vm::Machine;

    /// Program that outputs a copy of itself.
    pub const QUINE: &[i64] = &[
        109, 1, 204, -1, 1001, 100, 1, 100, 1008, 100, 16, 101, 1006, 101, 0, 99,
    ];

    /// Outputs 999 below 8, 1000 at 8, 1001 above 8.
    pub const COMPARE_TO_EIGHT: &str = "3,21,1008,21,8,20,1005,20,22,107,8,21,20,1006,20,31,\
        1106,0,36,98,0,0,1002,21,125,20,4,20,1105,1,46,104,999,1105,1,46,1101,1000,1,20,4,20,\
        1105,1,46,98,99";

    /// Serial amplifier: best phases 4,3,2,1,0 give 43210.
    pub const AMPLIFIER_A: &str = "3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0";

    /// Serial amplifier: best phases 0,1,2,3,4 give 54321.
    pub const AMPLIFIER_B: &str =
        "3,23,3,24,1002,24,10,24,1002,23,-1,23,101,5,23,23,1,24,23,23,4,23,99,0,0";

    /// Serial amplifier: best phases 1,0,4,3,2 give 65210.
    pub const AMPLIFIER_C: &str = "3,31,3,32,1002,32,10,32,1001,31,-2,31,1007,31,0,33,\
        1002,33,7,33,1,33,31,31,1,32,31,31,4,31,99,0,0,0";

    /// Feedback amplifier: best phases 9,8,7,6,5 give 139629729.
    pub const FEEDBACK_A: &str = "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,27,4,27,\
        1001,28,-1,28,1005,28,6,99,0,0,5";

    /// Feedback amplifier: best phases 9,7,8,5,6 give 18216.
    pub const FEEDBACK_B: &str = "3,52,1001,52,-5,52,3,53,1,52,56,54,1007,54,5,55,1005,55,26,\
        1001,54,-5,54,1105,1,12,1,53,54,53,1008,54,0,55,1001,55,1,55,2,53,55,53,4,53,\
        1001,56,-1,56,1005,56,6,99,0,0,0,0,10";

    /// Parses a program literal, panicking on malformed text.
    pub fn program(text: &str) -> Program {
        text.parse().expect("fixture program must parse")
    }

    /// Builds a machine with the default configuration.
    pub fn machine(text: &str) -> Machine {
        Machine::new(&program(text))
    }
}
