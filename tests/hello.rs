use synacor::{
    emulator::{Emulator, State, TestIo},
    image::Image,
    memory::Memory,
};

fn read_image() -> Image {
    let bytes = include_bytes!("hello.bin");

    Image::parse(bytes)
}

#[test]
fn test_hello_read_image() {
    let image = read_image();

    assert_eq!(image.words, vec![19, 72, 19, 105, 19, 10, 0]);
    assert_eq!(image.to_bytes(), include_bytes!("hello.bin").to_vec());
}

#[test]
fn test_hello_emulate_image() {
    let image = read_image();
    let memory = Memory::with_image(&image).expect("image does not fit in memory");

    let mut io = TestIo::new();
    let mut e = Emulator::new(memory, &mut io);

    while e.state == State::Running {
        println!("{:?}", e.get_current_instruction());
        e.step().unwrap();
        println!("{:?}", e.context);
    }

    assert_eq!(e.context.pc, 7);
    assert_eq!(io.output_string(), "Hi\n");
}

#[test]
fn test_out_then_halt() {
    let memory = Memory::with_image(&Image::from_words(vec![19, 65, 0])).unwrap();
    let mut e = Emulator::new(memory, TestIo::new());

    assert_eq!(e.run().unwrap(), State::Halted);
    assert_eq!(e.io.into_output(), [65]);
}
