use synacor::tools::{
    teleporter::{find_key, find_key_in, teleporter_patches},
    vault::{find_path, vault_goal, vault_start, Graph, Position, VAULT},
};

use synacor::{
    emulator::{Emulator, TestIo},
    instruction::Register,
    memory::Memory,
};

#[test]
fn test_vault_route() {
    let path = find_path(&VAULT, &vault_start(), &vault_goal())
        .expect("no route through the vault");

    println!("{}", path);

    assert!(path.len() <= 6);
    assert_eq!(path.end, vault_goal());

    let weight = path
        .operations
        .iter()
        .try_fold(path.start, |weight, op| op.apply(weight));

    assert_eq!(weight, Some(30));
    assert!(path.trace().starts_with("22"));
}

#[test]
fn test_vault_start_is_goal() {
    let mut graph = Graph::new();
    graph.add_room("A");

    let position = Position::new("A", 7);
    let path = find_path(&graph, &position, &position).unwrap();

    assert!(path.is_empty());
    assert_eq!(path.trace(), "7");
}

#[test]
fn test_teleporter_window() {
    assert_eq!(find_key_in(25700..25800, 4, 1, 6), Some(25734));
}

#[test]
#[ignore]
fn test_teleporter_full_search() {
    assert_eq!(find_key(4, 1, 6), Some(25734));
}

#[test]
fn test_teleporter_patches_apply() {
    let mut e = Emulator::new(Memory::new(), TestIo::new());
    e.patch(&teleporter_patches(25734)).unwrap();

    assert_eq!(e.memory.read(521).unwrap(), 1);
    assert_eq!(e.memory.read(522).unwrap(), Register::R7.address());
    assert_eq!(e.memory.read(523).unwrap(), 25734);
    assert_eq!(e.memory.read(5485).unwrap(), 6);
    assert_eq!(e.memory.read(5490).unwrap(), 21);
}
