//! Shortest route through the orb vault.
//!
//! The vault is a grid of rooms holding either a number or an arithmetic operator. Walking from
//! a number room through an operator room into the next number room applies the operation to
//! the weight of the orb. We treat the numbered rooms as nodes and the operator rooms as edges:
//!
//! ```text
//!   ( * ) ( 8 ) ( - ) ( 1 )        *  E  *  H
//!   ( 4 ) ( * ) ( 11) ( * )        B  *  F  *
//!   ( + ) ( 4 ) ( - ) ( 18)        *  C  *  G
//!   ( 22) ( - ) ( 9 ) ( * )        A  *  D  *
//! ```
//!
//! The orb starts in `A` weighing 22 and must arrive in `H` weighing exactly 30. If the weight
//! leaves the 15-bit range the orb shatters.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use lazy_static::lazy_static;
use nom::{
    character::complete::{digit1, one_of},
    combinator::{all_consuming, map_res},
    error::ErrorKind,
    sequence::pair,
    IResult,
};
use slog::{debug, o, trace, Discard, Logger};

use crate::error::ParseError;
use crate::instruction::WORD_MASK;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Add,
    Subtract,
    Multiply,
}

/// An arithmetic operation with its explicit argument, such as `+4` or `*11`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Operation {
    pub kind: OperationKind,
    pub argument: i32,
}

impl Operation {
    pub fn new(kind: OperationKind, argument: i32) -> Operation {
        Operation { kind, argument }
    }

    /// Applies the operation to `weight`. Returns `None` if the result overflows an `i32`.
    pub fn apply(&self, weight: i32) -> Option<i32> {
        match self.kind {
            OperationKind::Add => weight.checked_add(self.argument),
            OperationKind::Subtract => weight.checked_sub(self.argument),
            OperationKind::Multiply => weight.checked_mul(self.argument),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = match self.kind {
            OperationKind::Add => '+',
            OperationKind::Subtract => '-',
            OperationKind::Multiply => '*',
        };

        write!(f, "{}{}", sign, self.argument)
    }
}

fn take_operation(input: &str) -> IResult<&str, Operation, (&str, ErrorKind)> {
    map_res(pair(one_of("+-*"), digit1), |(sign, digits): (char, &str)| {
        let kind = match sign {
            '+' => OperationKind::Add,
            '-' => OperationKind::Subtract,
            _ => OperationKind::Multiply,
        };

        digits.parse().map(|argument| Operation::new(kind, argument))
    })(input)
}

impl FromStr for Operation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Operation, ParseError> {
        match all_consuming(take_operation)(s.trim()) {
            Ok((_, operation)) => Ok(operation),
            Err(_) => Err(ParseError::new(s, "an operation like +4")),
        }
    }
}

/// Outgoing edges of a room that share one operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub operation: Operation,
    pub destinations: Vec<String>,
}

/// A directed multigraph of rooms connected by operations.
///
/// Edges are explored in the order they were added.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    rooms: HashMap<String, Vec<Edge>>,
}

impl Graph {
    pub fn new() -> Graph {
        Graph::default()
    }

    /// Adds a room without outgoing edges, if it does not exist yet.
    pub fn add_room(&mut self, room: &str) -> &mut Graph {
        self.rooms.entry(room.to_string()).or_default();
        self
    }

    /// Adds edges from `from` to every room in `to`, all applying `operation`.
    pub fn connect(&mut self, from: &str, operation: Operation, to: &[&str]) -> &mut Graph {
        for room in to {
            self.add_room(room);
        }

        self.rooms.entry(from.to_string()).or_default().push(Edge {
            operation,
            destinations: to.iter().map(|room| room.to_string()).collect(),
        });

        self
    }

    pub fn edges(&self, room: &str) -> &[Edge] {
        self.rooms.get(room).map(|edges| &edges[..]).unwrap_or(&[])
    }

    pub fn contains(&self, room: &str) -> bool {
        self.rooms.contains_key(room)
    }
}

/// A room together with the weight of the orb in it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub room: String,
    pub weight: i32,
}

impl Position {
    pub fn new(room: &str, weight: i32) -> Position {
        Position {
            room: room.to_string(),
            weight,
        }
    }
}

/// A route found by [find_path].
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    /// Weight of the orb before the first operation.
    pub start: i32,

    /// Where the route ends.
    pub end: Position,

    /// The operations applied along the route, in order.
    pub operations: Vec<Operation>,
}

impl Path {
    /// The starting weight followed by every operation, e.g. `22+4-11*4-18-11-1`.
    pub fn trace(&self) -> String {
        format!("{}{}", self.start, self.operations.iter().join(""))
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.trace())
    }
}

/// Breadth-first search for the shortest route from `start` to `goal`.
///
/// Operations producing a weight outside `0..=32767` are pruned, and a room is never entered
/// twice with the same weight.
pub fn find_path(graph: &Graph, start: &Position, goal: &Position) -> Option<Path> {
    find_path_with_logger(graph, start, goal, None::<Logger>)
}

pub fn find_path_with_logger<L>(
    graph: &Graph,
    start: &Position,
    goal: &Position,
    logger: L,
) -> Option<Path>
where
    L: Into<Option<Logger>>,
{
    let logger = logger
        .into()
        .unwrap_or(Logger::root(Discard, o!()))
        .new(o!("stage" => "vault"));

    let mut visited: HashMap<&str, HashSet<i32>> = HashMap::new();
    let mut queue = VecDeque::new();
    let mut explored = 0usize;

    queue.push_back(Path {
        start: start.weight,
        end: start.clone(),
        operations: Vec::new(),
    });

    while let Some(path) = queue.pop_front() {
        explored += 1;

        if path.end == *goal {
            debug!(logger, "found route"; "explored" => explored, "length" => path.len());
            return Some(path);
        }

        for edge in graph.edges(&path.end.room) {
            let weight = match edge.operation.apply(path.end.weight) {
                Some(weight) if weight >= 0 && weight <= WORD_MASK as i32 => weight,
                _ => continue,
            };

            for destination in &edge.destinations {
                if !visited.entry(destination.as_str()).or_default().insert(weight) {
                    continue;
                }

                trace!(logger, "enqueue"; "room" => destination.as_str(), "weight" => weight);

                let mut operations = path.operations.clone();
                operations.push(edge.operation);

                queue.push_back(Path {
                    start: path.start,
                    end: Position {
                        room: destination.clone(),
                        weight,
                    },
                    operations,
                });
            }
        }
    }

    debug!(logger, "no route"; "explored" => explored);
    None
}

type VaultTable = &'static [(&'static str, &'static [(OperationKind, i32, &'static [&'static str])])];

const VAULT_EDGES: VaultTable = {
    use OperationKind::{Add as P, Multiply as M, Subtract as S};

    &[
        ("A", &[(P, 4, &["B", "C"]), (S, 4, &["C"]), (S, 9, &["D"])]),
        ("B", &[(M, 8, &["E"]), (M, 11, &["F"]), (M, 4, &["B", "C"]), (P, 4, &["B", "C"])]),
        ("C", &[
            (M, 8, &["E"]),
            (M, 4, &["B", "C"]),
            (M, 11, &["F"]),
            (P, 4, &["B", "C"]),
            (S, 11, &["F"]),
            (S, 18, &["G"]),
            (S, 9, &["D"]),
            (S, 4, &["C"]),
        ]),
        ("D", &[
            (S, 11, &["F"]),
            (S, 4, &["C"]),
            (S, 18, &["G"]),
            (M, 18, &["G"]),
            (S, 9, &["D"]),
            (M, 9, &["D"]),
        ]),
        ("E", &[
            (S, 1, &["H"]),
            (M, 4, &["B", "C"]),
            (S, 11, &["F"]),
            (M, 11, &["F"]),
            (M, 8, &["E"]),
            (S, 8, &["E"]),
        ]),
        ("F", &[
            (S, 8, &["E"]),
            (S, 1, &["H"]),
            (M, 8, &["E"]),
            (M, 1, &["H"]),
            (M, 4, &["B", "C"]),
            (M, 18, &["G"]),
            (S, 4, &["C"]),
            (S, 18, &["G"]),
            (S, 9, &["D"]),
            (S, 11, &["F"]),
            (M, 11, &["F"]),
        ]),
        ("G", &[
            (M, 1, &["H"]),
            (M, 11, &["F"]),
            (S, 11, &["F"]),
            (S, 4, &["C"]),
            (S, 9, &["D"]),
            (M, 9, &["D"]),
            (M, 18, &["G"]),
            (S, 18, &["G"]),
        ]),
        ("H", &[]),
    ]
};

lazy_static! {
    /// The transition graph of the orb vault.
    pub static ref VAULT: Graph = {
        let mut graph = Graph::new();

        for (room, edges) in VAULT_EDGES {
            graph.add_room(room);

            for (kind, argument, destinations) in edges.iter() {
                graph.connect(room, Operation::new(*kind, *argument), destinations);
            }
        }

        graph
    };
}

/// Where the orb starts.
pub fn vault_start() -> Position {
    Position::new("A", 22)
}

/// Where the orb has to be delivered.
pub fn vault_goal() -> Position {
    Position::new("H", 30)
}
