use intcode::virtual_machine::errors::VMError;
use intcode::virtual_machine::pipeline::{
    FeedbackLoop, INITIAL_SIGNAL, LoopMode, best_phase_setting,
};
use intcode::virtual_machine::program::Program;
use intcode::virtual_machine::vm::{Machine, MachineConfig, Status};
use std::fs;
use std::io::ErrorKind;
use tempfile::tempdir;

fn write_program(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn load_tolerates_trailing_newline_and_spaces() {
    let dir = tempdir().unwrap();
    let path = write_program(&dir, "gravity.txt", "1,9,10,3,\n2, 3,11,0,\n99,30,40,50\n");

    let program = Program::load(&path).unwrap();
    assert_eq!(program.len(), 12);

    let mut vm = Machine::new(&program);
    assert_eq!(vm.run([], false).unwrap(), Vec::<i64>::new());
    assert_eq!(vm.peek(0).unwrap(), 3500);
    assert_eq!(vm.status(), Status::Halted);
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = Program::load(dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(
        err,
        VMError::Io {
            kind: ErrorKind::NotFound,
            ..
        }
    ));
}

#[test]
fn load_malformed_file_reports_token() {
    let dir = tempdir().unwrap();
    let path = write_program(&dir, "bad.txt", "1,2,x3,4");
    assert_eq!(
        Program::load(&path).unwrap_err(),
        VMError::MalformedProgramText {
            index: 2,
            token: "x3".to_string()
        }
    );
}

#[test]
fn patched_program_runs() {
    let dir = tempdir().unwrap();
    // ADD [x], [y], [0] with x and y selected by patching cells 1 and 2.
    let path = write_program(&dir, "noun_verb.txt", "1,0,0,0,99,7,35");

    let mut program = Program::load(&path).unwrap();
    program.patch(1, 5).unwrap();
    program.patch(2, 6).unwrap();

    let mut vm = Machine::new(&program);
    vm.run([], false).unwrap();
    assert_eq!(vm.peek(0).unwrap(), 42);
}

#[test]
fn patch_outside_loaded_program_fails() {
    let dir = tempdir().unwrap();
    let path = write_program(&dir, "short.txt", "1,0,0,0,99");

    let mut program = Program::load(&path).unwrap();
    assert_eq!(
        program.patch(5, 1),
        Err(VMError::AddressOutOfRange {
            address: 5,
            capacity: 5
        })
    );
    assert!(program.patch(usize::MAX, 1).is_err());

    let mut vm = Machine::new(&program);
    vm.run([], false).unwrap();
    assert_eq!(vm.peek(0).unwrap(), 2);
}

#[test]
fn large_numbers_survive_round_trip() {
    let dir = tempdir().unwrap();
    let path = write_program(&dir, "big.txt", "1102,34915192,34915192,7,4,7,99,0");

    let mut vm = Machine::new(&Program::load(&path).unwrap());
    assert_eq!(vm.run([], false).unwrap(), vec![1_219_070_632_396_864]);
}

#[test]
fn feedback_search_from_file() {
    let dir = tempdir().unwrap();
    let path = write_program(
        &dir,
        "amplifier.txt",
        "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,27,4,27,1001,28,-1,28,1005,28,6,99,0,0,5\n",
    );
    let program = Program::load(&path).unwrap();
    let config = MachineConfig::default();

    let (order, signal) =
        best_phase_setting(&program, &[5, 6, 7, 8, 9], LoopMode::Feedback, &config)
            .unwrap()
            .unwrap();
    assert_eq!(order, vec![9, 8, 7, 6, 5]);
    assert_eq!(signal, 139_629_729);

    let mut pipeline = FeedbackLoop::new(&program, &order, &config).unwrap();
    assert_eq!(pipeline.run([INITIAL_SIGNAL]).unwrap(), Some(signal));
}

#[test]
fn small_memory_config_limits_addresses() {
    let dir = tempdir().unwrap();
    let path = write_program(&dir, "far.txt", "1101,1,1,50,99");
    let program = Program::load(&path).unwrap();

    let mut vm = Machine::with_config(&program, &MachineConfig::with_memory(10));
    assert_eq!(
        vm.run([], false),
        Err(VMError::AddressOutOfRange {
            address: 50,
            capacity: 10
        })
    );
    assert_eq!(vm.status(), Status::Faulted);

    let mut vm = Machine::with_config(&program, &MachineConfig::with_memory(64));
    vm.run([], false).unwrap();
    assert_eq!(vm.peek(50).unwrap(), 2);
}
