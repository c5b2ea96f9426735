use std::io;
use std::time::Duration;

use base::prelude::*;

use super::{ControlUnit, ExecutedInstruction, PriorityLevel};
use crate::alarm::{Alarm, StopReason};
use crate::config::Config;
use crate::diagnostics::{Console, Diagnostics};
use crate::io::DeviceManager;
use crate::memory::Store;

const COMPLAIN: &str = "failed to set up test data";

/// The instruction under test is always placed here.
const HERE: u16 = 100;
/// Operand location for tests which need one.
const DATA: u16 = 200;

struct Machine {
    control: ControlUnit,
    store: Store,
    devices: DeviceManager,
    diag: Diagnostics,
}

fn setup_with_config(config: &Config) -> Machine {
    let mut store = Store::new();
    store.load_initial_orders();
    Machine {
        control: ControlUnit::new(),
        store,
        devices: DeviceManager::new(config),
        diag: Diagnostics::new(
            Console::new(Box::new(io::sink()), Box::new(io::sink())),
            config,
        ),
    }
}

fn setup() -> Machine {
    setup_with_config(&Config::default())
}

fn w(n: i64) -> Word {
    Word::from_signed(n)
}

fn addr(n: u16) -> Address {
    Address::new(n)
}

impl Machine {
    fn poke(&mut self, at: u16, value: Word) {
        self.store.write(addr(at), value).expect(COMPLAIN);
    }

    fn peek(&self, at: u16) -> Word {
        self.store.read(addr(at)).expect(COMPLAIN)
    }

    /// Places `inst` at `at`, points the SCR at it and executes it.
    fn execute_at(
        &mut self,
        at: u16,
        inst: Instruction,
    ) -> Result<ExecutedInstruction, StopReason> {
        self.poke(at, inst.bits());
        self.control
            .set_sequence_control(&mut self.store, addr(at))
            .expect(COMPLAIN);
        self.control
            .execute_instruction(&mut self.store, &mut self.devices, &mut self.diag)
    }

    fn execute(&mut self, inst: Instruction) -> Result<ExecutedInstruction, StopReason> {
        self.execute_at(HERE, inst)
    }

    fn execute_ok(&mut self, inst: Instruction) {
        if let Err(e) = self.execute(inst) {
            panic!("execution of {inst} should succeed, but failed with {e}");
        }
    }

    fn scr(&self) -> Word {
        self.control.sequence_control(&self.store).expect(COMPLAIN)
    }
}

fn inst(f: Function, operand: u16) -> Instruction {
    Instruction::new(false, f, operand)
}

fn modified(f: Function, operand: u16) -> Instruction {
    Instruction::new(true, f, operand)
}

#[test]
fn test_fetch_advances_scr() {
    let mut m = setup();
    let executed = m
        .execute(inst(Function::LoadA, DATA))
        .expect("load should succeed");
    assert_eq!(executed.at, addr(HERE));
    assert_eq!(executed.instruction, inst(Function::LoadA, DATA));
    assert_eq!(m.scr(), w(i64::from(HERE) + 1));
}

#[test]
fn test_fetch_outside_store() {
    let mut m = setup();
    m.poke(0, w(16384));
    let result = m
        .control
        .execute_instruction(&mut m.store, &mut m.devices, &mut m.diag);
    assert!(matches!(
        result,
        Err(StopReason::Alarm(Alarm::AddressOutOfRange(16384)))
    ));
    // The SCR has already been advanced.
    assert_eq!(m.scr(), w(16385));
}

#[test]
fn test_load_b() {
    let mut m = setup();
    m.poke(DATA, w(12345));
    m.execute_ok(inst(Function::LoadB, DATA));
    assert_eq!(m.control.q_register(), w(12345));
    assert_eq!(m.peek(1), w(12345));
}

#[test]
fn test_add_wraps() {
    let mut m = setup();
    m.control.a = w(5);
    m.poke(DATA, w(7));
    m.execute_ok(inst(Function::Add, DATA));
    assert_eq!(m.control.accumulator(), w(12));

    m.control.a = w(131071);
    m.poke(DATA, w(1));
    m.execute_ok(inst(Function::Add, DATA));
    assert_eq!(m.control.accumulator().to_signed(), -131072);
}

#[test]
fn test_negate_add() {
    let mut m = setup();
    m.control.a = w(5);
    m.poke(DATA, w(7));
    m.execute_ok(inst(Function::NegateAdd, DATA));
    assert_eq!(m.control.accumulator(), w(2));

    m.control.a = w(7);
    m.poke(DATA, w(5));
    m.execute_ok(inst(Function::NegateAdd, DATA));
    assert_eq!(m.control.accumulator().to_signed(), -2);
}

#[test]
fn test_store_q_drops_least_significant_bit() {
    let mut m = setup();
    m.control.q = w(0o777_777);
    m.execute_ok(inst(Function::StoreQ, DATA));
    assert_eq!(m.peek(DATA), w(0o377_777));
}

#[test]
fn test_load_and_store_a() {
    let mut m = setup();
    m.poke(DATA, w(-42));
    m.execute_ok(inst(Function::LoadA, DATA));
    assert_eq!(m.control.accumulator().to_signed(), -42);
    m.execute_ok(inst(Function::StoreA, DATA + 1));
    assert_eq!(m.peek(DATA + 1).to_signed(), -42);
}

#[test]
fn test_initial_orders_protected_at_level_1() {
    let mut m = setup();
    let before = m.peek(8185);
    m.control.a = w(7);
    m.execute_ok(inst(Function::StoreA, 8185));
    assert_eq!(m.peek(8185), before);

    // The location just below the initial orders is not protected.
    m.execute_ok(inst(Function::StoreA, 8179));
    assert_eq!(m.peek(8179), w(7));

    m.control.level = PriorityLevel::Level4;
    m.execute_ok(inst(Function::StoreA, 8185));
    assert_eq!(m.peek(8185), w(7));
}

#[test]
fn test_collate() {
    let mut m = setup();
    m.control.a = w(0o707_070);
    m.poke(DATA, w(0o777_000));
    m.execute_ok(inst(Function::Collate, DATA));
    assert_eq!(m.control.accumulator(), w(0o707_000));
}

#[test]
fn test_jump_if_zero() {
    let mut m = setup();
    m.control.a = Word::ZERO;
    m.execute_ok(inst(Function::JumpIfZero, DATA));
    assert_eq!(m.scr(), w(DATA.into()));

    m.control.a = w(1);
    m.execute_ok(inst(Function::JumpIfZero, DATA));
    assert_eq!(m.scr(), w(i64::from(HERE) + 1));
}

#[test]
fn test_jump_if_negative() {
    let mut m = setup();
    m.control.a = w(-1);
    m.execute_ok(inst(Function::JumpIfNegative, DATA));
    assert_eq!(m.scr(), w(DATA.into()));

    m.control.a = Word::ZERO;
    m.execute_ok(inst(Function::JumpIfNegative, DATA));
    assert_eq!(m.scr(), w(i64::from(HERE) + 1));
}

#[test]
fn test_jump_is_module_relative() {
    let mut m = setup();
    m.execute_at(8192 + 5, inst(Function::Jump, 10))
        .expect("jump should succeed");
    assert_eq!(m.scr(), w(8192 + 10));
}

#[test]
fn test_increment_wraps() {
    let mut m = setup();
    m.poke(DATA, w(-1));
    m.execute_ok(inst(Function::Increment, DATA));
    assert_eq!(m.peek(DATA), Word::ZERO);
}

#[test]
fn test_store_s() {
    let mut m = setup();
    m.execute_ok(inst(Function::StoreS, DATA));
    assert_eq!(m.peek(DATA), w(i64::from(HERE) + 1));
    assert_eq!(m.control.q_register(), Word::ZERO);

    // In module 1, the module goes to Q and the offset to store.
    m.execute_at(8192 + HERE, inst(Function::StoreS, DATA))
        .expect("store S should succeed");
    assert_eq!(m.peek(8192 + DATA), w(i64::from(HERE) + 1));
    assert_eq!(m.control.q_register(), w(8192));
}

#[test]
fn test_multiply() {
    let mut m = setup();
    m.control.a = w(3);
    m.poke(DATA, w(5));
    m.execute_ok(inst(Function::Multiply, DATA));
    assert_eq!(m.control.accumulator(), Word::ZERO);
    assert_eq!(m.control.q_register(), w(30));

    // A negative multiplier sets the bottom bit of Q.
    m.control.a = w(-3);
    m.execute_ok(inst(Function::Multiply, DATA));
    assert_eq!(m.control.accumulator().to_signed(), -1);
    assert_eq!(m.control.q_register(), w(0o777_743));
}

#[test]
fn test_multiply_large_operands() {
    let mut m = setup();
    m.control.a = w(1 << 16);
    m.poke(DATA, w(4));
    m.execute_ok(inst(Function::Multiply, DATA));
    // The product is 2^18, which is 2 in A with Q zero.
    assert_eq!(m.control.accumulator(), w(2));
    assert_eq!(m.control.q_register(), Word::ZERO);
}

#[test]
fn test_divide() {
    let mut m = setup();
    m.control.a = w(1);
    m.control.q = Word::ZERO;
    m.poke(DATA, w(2));
    m.execute_ok(inst(Function::Divide, DATA));
    assert_eq!(m.control.accumulator(), w(65537));
    assert_eq!(m.control.q_register(), w(65536));

    m.control.a = w(-1);
    m.control.q = Word::ZERO;
    m.execute_ok(inst(Function::Divide, DATA));
    assert_eq!(m.control.accumulator().to_signed(), -65535);
    assert_eq!(m.control.q_register().to_signed(), -65536);
}

#[test]
fn test_divide_by_zero() {
    let mut m = setup();
    m.control.a = w(1);
    let result = m.execute(inst(Function::Divide, DATA));
    match result {
        Err(StopReason::Alarm(Alarm::DivideByZero { at, instruction })) => {
            assert_eq!(at, addr(HERE));
            assert_eq!(instruction, inst(Function::Divide, DATA));
        }
        other => panic!("expected a divide-by-zero alarm, got {other:?}"),
    }
}

#[test]
fn test_shift_left_crosses_into_a() {
    let mut m = setup();
    m.control.a = Word::ZERO;
    m.control.q = w(0o400_000);
    m.execute_ok(inst(Function::Shift, 1));
    assert_eq!(m.control.accumulator(), w(1));
    assert_eq!(m.control.q_register(), Word::ZERO);
}

#[test]
fn test_shift_right_is_arithmetic() {
    let mut m = setup();
    m.control.a = w(-2);
    m.control.q = Word::ZERO;
    // 8191 is a right shift of one place.
    m.execute_ok(inst(Function::Shift, 8191));
    assert_eq!(m.control.accumulator().to_signed(), -1);
    assert_eq!(m.control.q_register(), Word::ZERO);
}

#[test]
fn test_long_shifts_saturate() {
    let mut m = setup();
    m.control.a = w(-1);
    m.control.q = Word::ZERO;
    m.execute_ok(inst(Function::Shift, 6144));
    assert_eq!(m.control.accumulator().to_signed(), -1);
    assert_eq!(m.control.q_register(), w(0o777_777));

    m.execute_ok(inst(Function::Shift, 2047));
    assert_eq!(m.control.accumulator(), Word::ZERO);
    assert_eq!(m.control.q_register(), Word::ZERO);
}

#[test]
fn test_unassigned_shift_is_rejected() {
    let mut m = setup();
    let result = m.execute(inst(Function::Shift, 3000));
    assert!(matches!(
        result,
        Err(StopReason::Alarm(Alarm::Unsupported {
            failure: DecodeFailure::UnsupportedShift(3000),
            ..
        }))
    ));
}

#[test]
fn test_unassigned_io_is_rejected() {
    let mut m = setup();
    let result = m.execute(inst(Function::InputOutput, 1000));
    match result {
        Err(reason @ StopReason::Alarm(Alarm::Unsupported { .. })) => {
            assert_eq!(
                reason.to_string(),
                "*** Unsupported 15 1000 i/o instruction at 0^0100 (15 1000)"
            );
        }
        other => panic!("expected an unsupported instruction alarm, got {other:?}"),
    }
}

#[test]
fn test_b_modification() {
    let mut m = setup();
    m.poke(1, w(10));
    m.poke(DATA + 10, w(99));
    m.execute_ok(modified(Function::LoadA, DATA));
    assert_eq!(m.control.accumulator(), w(99));
    // 23 for the load, 6 for the modification.
    assert_eq!(m.control.elapsed(), Duration::from_micros(29));
}

#[test]
fn test_b_modification_beyond_store() {
    let mut m = setup();
    m.poke(1, w(16000));
    let result = m.execute(modified(Function::LoadA, 1000));
    assert!(matches!(
        result,
        Err(StopReason::Alarm(Alarm::AddressOutOfRange(17000)))
    ));
}

#[test]
fn test_level_terminate_switches_registers() {
    let mut m = setup();
    m.poke(6, w(300));
    m.poke(7, w(4));
    m.execute_ok(inst(Function::InputOutput, 7168));
    assert_eq!(m.control.level(), PriorityLevel::Level4);
    assert_eq!(m.scr(), w(300));
    assert_eq!(m.control.b_register(&m.store).expect(COMPLAIN), w(4));
    // The level 1 SCR is left where it was.
    assert_eq!(m.peek(0), w(i64::from(HERE) + 1));
}

#[test]
fn test_timing_accumulates() {
    let mut m = setup();
    m.execute_ok(inst(Function::LoadA, DATA));
    m.execute_ok(inst(Function::Jump, DATA));
    assert_eq!(m.control.elapsed(), Duration::from_micros(23 + 23));
}

#[test]
fn test_function_counts() {
    let mut m = setup();
    m.execute_ok(inst(Function::LoadA, DATA));
    m.execute_ok(inst(Function::LoadA, DATA));
    m.execute_ok(inst(Function::Increment, DATA));
    let stats = m.control.stats();
    assert_eq!(stats.instructions, 3);
    assert_eq!(stats.function_count(Function::LoadA), 2);
    assert_eq!(stats.function_count(Function::Increment), 1);
    assert_eq!(stats.function_count(Function::Add), 0);
    assert_eq!(stats.percentage(2), 66);
}

#[test]
fn test_read_tape_shifts_character_into_a() {
    let dir = tempfile::tempdir().expect(COMPLAIN);
    let reader = dir.path().join("reader");
    std::fs::write(&reader, [0o101]).expect(COMPLAIN);
    let config = Config {
        reader_path: reader,
        ..Config::default()
    };
    let mut m = setup_with_config(&config);
    m.control.a = w(1);
    m.execute_ok(inst(Function::InputOutput, 2048));
    assert_eq!(m.control.accumulator(), w((1 << 7) | 0o101));

    let result = m.execute(inst(Function::InputOutput, 2048));
    assert!(matches!(result, Err(StopReason::ReaderExhausted)));
}
