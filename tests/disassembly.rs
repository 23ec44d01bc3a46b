use synacor::{
    disassembler::{disassemble, write_listing},
    image::Image,
    instruction::Instruction,
    memory::Memory,
};

#[test]
fn test_disassemble_hello() {
    let image = Image::parse(include_bytes!("hello.bin"));
    let memory = Memory::with_image(&image).unwrap();

    let mut listing = Vec::new();
    let lines = write_listing(memory.words(), 0..image.len(), &mut listing).unwrap();

    assert_eq!(lines, 4);
    assert_eq!(
        String::from_utf8(listing).unwrap(),
        "00000 out  72\n00002 out  105\n00004 out  10\n00006 halt\n"
    );
}

#[test]
fn test_disassemble_at_base() {
    let image = Image::from_words(vec![6, 32770, 21, 65535]);
    let mut memory = Memory::new();
    memory.load(100, &image).unwrap();

    let lines: Vec<String> = disassemble(memory.words(), 100..100 + image.len())
        .map(|line| line.to_string())
        .collect();

    assert_eq!(
        lines,
        vec![
            "00100 jmp  r2",
            "00102 noop",
            "00103 unknown instruction 65535",
        ]
    );
}

#[test]
fn test_disassembly_matches_decoder() {
    let words = vec![1, 32768, 4, 2, 32768, 3, 32769, 0];
    let image = Image::from_words(words.clone());
    let memory = Memory::with_image(&image).unwrap();

    for line in disassemble(memory.words(), 0..words.len()) {
        assert_eq!(line.result, Instruction::decode(&words, line.address));
    }
}

#[test]
fn test_listing_covers_every_opcode() {
    let table: Vec<(Vec<u16>, &str)> = vec![
        (vec![0], "halt"),
        (vec![1, 32768, 4], "set  r0 4"),
        (vec![2, 32776], "push <BAD>"),
        (vec![3, 32769], "pop  r1"),
        (vec![4, 32770, 32771, 5], "eq   r2 r3 5"),
        (vec![5, 32772, 7, 32773], "gt   r4 7 r5"),
        (vec![6, 100], "jmp  100"),
        (vec![7, 32774, 200], "jt   r6 200"),
        (vec![8, 0, 32775], "jf   0 r7"),
        (vec![9, 32768, 32769, 32767], "add  r0 r1 32767"),
        (vec![10, 32769, 2, 3], "mult r1 2 3"),
        (vec![11, 32770, 17, 65535], "mod  r2 17 <BAD>"),
        (vec![12, 32771, 32772, 255], "and  r3 r4 255"),
        (vec![13, 32773, 1, 2], "or   r5 1 2"),
        (vec![14, 32774, 32775], "not  r6 r7"),
        (vec![15, 32768, 1000], "rmem r0 1000"),
        (vec![16, 32769, 32770], "wmem r1 r2"),
        (vec![17, 42], "call 42"),
        (vec![18], "ret"),
        (vec![19, 65], "out  65"),
        (vec![20, 32771], "in   r3"),
        (vec![21], "noop"),
    ];

    let mut words = Vec::new();
    let mut expected = String::new();

    for (encoded, text) in &table {
        expected.push_str(&format!("{:05} {}\n", words.len(), text));
        words.extend(encoded);
    }

    let image = Image::parse(&Image::from_words(words).to_bytes());
    let memory = Memory::with_image(&image).unwrap();

    let mut listing = Vec::new();
    let lines = write_listing(memory.words(), 0..image.len(), &mut listing).unwrap();

    assert_eq!(lines, 22);
    assert_eq!(String::from_utf8(listing).unwrap(), expected);
}
