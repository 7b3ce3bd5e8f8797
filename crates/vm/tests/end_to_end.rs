use beast_config::SessionLimits;
use beast_program::{Program, VariableType};
use beast_vm::session::VariableIoBehavior;
use beast_vm::vm::{CpuVirtualMachine, MessageSeverity};
use beast_vm::VmSession;

fn run_to_completion(vm: &CpuVirtualMachine, session: &mut VmSession) {
    while vm.step(session, false).unwrap() {}
}

/// Scenario 1: bubblesort ten input values in place via a straight-line compare-and-swap
/// network (no runtime loop — the network is unrolled at assembly time, `n*(n-1)/2` passes).
#[test]
fn bubblesort_sorts_ten_values() {
    const INPUT: [i32; 10] = [7, 1, 199, -44, 2356, -881, 0, 406, 1, 9];
    const EXPECTED: [i32; 10] = [-881, -44, 0, 1, 1, 7, 9, 199, 406, 2356];
    const COND: i32 = 20;
    const SWAP_INSTRUCTION_SIZE: i32 = 11;

    let mut program = Program::new_growing();
    for i in 0..10 {
        program.declare_variable(i, VariableType::Int32).unwrap();
        program.set_variable(i, false, INPUT[i as usize]).unwrap();
    }
    for i in 0..10 {
        program.declare_variable(10 + i, VariableType::Int32).unwrap();
        program.copy_variable(i, false, 10 + i, false).unwrap();
    }
    program.declare_variable(COND, VariableType::Int32).unwrap();

    for pass in 0..9 {
        for j in 0..(9 - pass) {
            let a = 10 + j;
            let b = 10 + j + 1;
            program.compare_if_variable_gt_variable(a, false, b, false, COND, false).unwrap();
            program.relative_jump_if_variable_eq_0(COND, false, SWAP_INSTRUCTION_SIZE).unwrap();
            program.swap_variables(a, false, b, false).unwrap();
        }
    }
    program.terminate(0).unwrap();

    let mut session = VmSession::new(program, SessionLimits::default());
    let vm = CpuVirtualMachine::new(MessageSeverity::Warning);
    run_to_completion(&vm, &mut session);

    assert_eq!(session.statistics().return_code(), 0);
    for (offset, expected) in EXPECTED.iter().enumerate() {
        assert_eq!(session.read(10 + offset as i32, false).unwrap(), *expected);
    }
}

/// Scenario 2: hello world — a string table entry printed leaves the exact text in the
/// print buffer and a clean return code.
#[test]
fn hello_world_prints_and_terminates_cleanly() {
    let mut program = Program::new_growing();
    program.set_string_table_entry(0, b"Hello World!").unwrap();
    program.print_string_from_string_table(0).unwrap();
    program.terminate(0).unwrap();

    let mut session = VmSession::new(program, SessionLimits::default());
    let vm = CpuVirtualMachine::new(MessageSeverity::Warning);
    run_to_completion(&vm, &mut session);

    assert_eq!(session.print_buffer(), b"Hello World!");
    assert_eq!(session.statistics().return_code(), 0);
}

/// Scenario 3: adder streaming — the same program, reset and re-triggered per pair, sums
/// each pair of Input variables into the Output variable in order.
#[test]
fn adder_streams_sums_across_repeated_triggers() {
    const OPERAND_A: i32 = 0;
    const OPERAND_B: i32 = 1;
    const OUTPUT: i32 = 2;
    const PAIRS: [(i32, i32); 5] = [(1, 1), (7, 2), (100, 1000), (1, -1), (-10000, -81)];
    const EXPECTED: [i32; 5] = [2, 9, 1100, 0, -10081];

    let mut program = Program::new_growing();
    program.copy_variable(OPERAND_B, false, OUTPUT, false).unwrap();
    program.add_variable_to_variable(OPERAND_A, false, OUTPUT, false).unwrap();
    program.terminate(0).unwrap();

    // Declared directly on the session: the streaming contract fixes these variables'
    // indices and behavior up front, independent of what runs each trigger.
    let mut session = VmSession::new(program, SessionLimits::default());
    session.declare(OPERAND_A, VariableType::Int32).unwrap();
    session.declare(OPERAND_B, VariableType::Int32).unwrap();
    session.declare(OUTPUT, VariableType::Int32).unwrap();
    session.set_variable_behavior(OPERAND_A, VariableIoBehavior::Input).unwrap();
    session.set_variable_behavior(OPERAND_B, VariableIoBehavior::Input).unwrap();
    session.set_variable_behavior(OUTPUT, VariableIoBehavior::Output).unwrap();
    let vm = CpuVirtualMachine::new(MessageSeverity::Warning);

    let mut results = Vec::new();
    for (a, b) in PAIRS {
        session.reset();
        session.write_from_outside(OPERAND_A, a).unwrap();
        session.write_from_outside(OPERAND_B, b).unwrap();
        run_to_completion(&vm, &mut session);
        results.push(session.read_from_outside(OUTPUT).unwrap());
    }
    assert_eq!(results, EXPECTED);
}

/// Scenario 4: static noop ratio (2/5 across the whole program) differs from the dynamic
/// noop ratio (1/4 of the operators that actually execute, since the trailing NoOp is
/// never reached once `Terminate` stops the session).
#[test]
fn static_and_dynamic_noop_ratios_differ() {
    use beast_vm::evaluators::OperatorUsageEvaluator;
    use beast_vm::Evaluator;

    let mut program = Program::new_growing();
    program.no_op().unwrap();
    program.set_string_table_entry(0, b"x").unwrap();
    program.print_string_from_string_table(0).unwrap();
    program.terminate(0).unwrap();
    program.no_op().unwrap();

    let evaluator = OperatorUsageEvaluator::no_op();

    let static_limits = SessionLimits::default();
    let mut static_session = VmSession::new(program.clone(), static_limits);
    let dry_run_vm = CpuVirtualMachine::new(MessageSeverity::Warning);
    while dry_run_vm.step(&mut static_session, true).unwrap() {}
    let static_ratio = evaluator.evaluate(&mut static_session).unwrap();
    assert_eq!(static_ratio, 2.0 / 5.0);

    let mut dynamic_session = VmSession::new(program, static_limits);
    let live_vm = CpuVirtualMachine::new(MessageSeverity::Warning);
    run_to_completion(&live_vm, &mut dynamic_session);
    let dynamic_ratio = evaluator.evaluate(&mut dynamic_session).unwrap();
    assert_eq!(dynamic_ratio, 1.0 / 4.0);
}

/// Scenario 5: `Terminate` short-circuits the program — the instruction after it never runs.
#[test]
fn terminate_short_circuits_remaining_instructions() {
    let mut program = Program::new_growing();
    program.declare_variable(0, VariableType::Int32).unwrap();
    program.terminate(127).unwrap();
    program.set_variable(0, false, 1).unwrap();

    let mut session = VmSession::new(program, SessionLimits::default());
    let vm = CpuVirtualMachine::new(MessageSeverity::Warning);
    run_to_completion(&vm, &mut session);

    assert_eq!(session.read(0, false).unwrap(), 0);
    assert_eq!(session.statistics().return_code(), 127);
}
