// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::BTreeSet;

use crate::alphabet::Letter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
	Any,
	Char(char),
}

impl Edge {
	/// Whether this edge is taken by the alphabet symbol `symbol`, where `None` stands for every
	/// character outside the pattern's literals.
	pub fn accepts(&self, symbol: Option<char>) -> bool {
		match self {
			Edge::Any => true,
			Edge::Char(c) => symbol == Some(*c),
		}
	}
}

#[derive(Debug, Default)]
pub struct State {
	pub edges: Vec<(Edge, usize)>,
	pub epsilon: Vec<usize>,
}

/// Concatenation of one state per letter; `%` contributes an epsilon edge into a state that loops
/// on any character.
#[derive(Debug)]
pub struct Nfa {
	pub states: Vec<State>,
	pub accept: usize,
}

impl Nfa {
	pub const START: usize = 0;

	pub fn build(letters: &[Letter]) -> Self {
		let mut states = vec![State::default()];
		let mut current = Self::START;
		let mut previous = None;
		for letter in letters {
			if *letter == Letter::ZeroOrMore && previous == Some(Letter::ZeroOrMore) {
				continue;
			}
			let next = states.len();
			states.push(State::default());
			match letter {
				Letter::Char(c) => states[current].edges.push((Edge::Char(*c), next)),
				Letter::AnyOne => states[current].edges.push((Edge::Any, next)),
				Letter::ZeroOrMore => {
					states[current].epsilon.push(next);
					states[next].edges.push((Edge::Any, next));
				}
			}
			current = next;
			previous = Some(*letter);
		}
		Self {
			states,
			accept: current,
		}
	}

	pub fn closure(&self, seed: impl IntoIterator<Item = usize>) -> BTreeSet<usize> {
		let mut result = BTreeSet::new();
		let mut pending: Vec<usize> = seed.into_iter().collect();
		while let Some(state) = pending.pop() {
			if result.insert(state) {
				pending.extend(self.states[state].epsilon.iter().copied());
			}
		}
		result
	}

	pub fn step(&self, from: &BTreeSet<usize>, symbol: Option<char>) -> BTreeSet<usize> {
		let targets = from.iter().flat_map(|state| {
			self.states[*state].edges.iter().filter(|(edge, _)| edge.accepts(symbol)).map(|(_, to)| *to)
		});
		self.closure(targets)
	}
}
