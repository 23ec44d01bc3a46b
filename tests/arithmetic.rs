use synacor::{
    emulator::{Config, Emulator, ReturnPolicy, State, TestIo},
    error::Fault,
    image::Image,
    instruction::Register,
    memory::Memory,
};

use slog::{o, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

fn emulator(words: Vec<u16>, io: TestIo) -> Emulator<TestIo> {
    let memory = Memory::with_image(&Image::from_words(words))
        .expect("image does not fit in memory");

    Emulator::new(memory, io)
}

#[test]
fn test_add_registers() {
    // set r0 4; set r1 5; add r0 r0 r1; halt
    let mut e = emulator(
        vec![1, 32768, 4, 1, 32769, 5, 9, 32768, 32768, 32769, 0],
        TestIo::new(),
    );

    assert_eq!(e.run().unwrap(), State::Halted);
    assert_eq!(e.context.register(Register::R0), 9);
    assert_eq!(e.context.register(Register::R1), 5);
}

#[test]
fn test_add_wraps_around() {
    // set r0 32767; add r0 r0 r0; halt
    let mut e = emulator(vec![1, 32768, 32767, 9, 32768, 32768, 32768, 0], TestIo::new());

    assert_eq!(e.run().unwrap(), State::Halted);
    assert_eq!(e.context.register(Register::R0), 32766);
}

#[test]
fn test_echo_lines() {
    // loop: in r0; out r0; eq r1 r0 10; jf r1 loop; halt
    let program = vec![
        20, 32768,
        19, 32768,
        4, 32769, 32768, 10,
        8, 32769, 0,
        0,
    ];

    let mut e = emulator(program, TestIo::with_input("hello\nworld\n"));

    assert_eq!(e.run().unwrap(), State::Halted);
    assert_eq!(e.io.output_string(), "hello\n");
}

#[test]
fn test_input_closed() {
    // in r0; halt
    let mut e = emulator(vec![20, 32768, 0], TestIo::new());

    assert_eq!(e.run(), Err(Fault::InputClosed));
    assert_eq!(e.state, State::Faulted);
}

#[test]
fn test_call_and_return() {
    // call 5; out 66; halt; (5:) out 65; ret
    let mut e = emulator(vec![17, 5, 19, 66, 0, 19, 65, 18], TestIo::new());

    assert_eq!(e.run().unwrap(), State::Halted);
    assert_eq!(e.io.output_string(), "AB");
    assert!(e.context.stack.is_empty());
}

#[test]
fn test_empty_return_policy() {
    let mut e = emulator(vec![18], TestIo::new());
    assert_eq!(e.run(), Err(Fault::StackUnderflow));

    let mut e = emulator(vec![18], TestIo::new())
        .with_config(Config { empty_return: ReturnPolicy::Halt });
    assert_eq!(e.run().unwrap(), State::Halted);
}

#[test]
fn test_countdown_with_logger() {
    // set r0 3; (3:) add r0 r0 32767; jt r0 3; halt
    let program = vec![1, 32768, 3, 9, 32768, 32768, 32767, 7, 32768, 3, 0];
    let memory = Memory::with_image(&Image::from_words(program)).unwrap();

    let decorator = TermDecorator::new().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let logger = Logger::root(drain, o!());

    let mut io = TestIo::new();
    let mut e = Emulator::with_logger(memory, &mut io, logger);

    let mut steps = 0;

    while e.state == State::Running {
        println!("{:?}", e.get_current_instruction());
        e.step().unwrap();
        steps += 1;
    }

    assert_eq!(steps, 1 + 3 * 2 + 1);
    assert_eq!(e.context.register(Register::R0), 0);
}
