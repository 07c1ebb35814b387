// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::{BTreeSet, HashMap};

use quill_value::{CancellationToken, Result, return_internal_error};
use tracing::trace;

use crate::nfa::Nfa;

/// Deterministic automaton over the pattern's literal characters plus one class for every other
/// character. A missing transition is the dead state.
#[derive(Debug, Clone)]
pub struct Dfa {
	literals: Vec<char>,
	transitions: Vec<Vec<Option<usize>>>,
	accepting: Vec<bool>,
}

impl Dfa {
	pub const START: usize = 0;

	/// Subset construction. Polls `cancel` before every transition it adds.
	pub fn build(nfa: &Nfa, literals: Vec<char>, cancel: &CancellationToken) -> Result<Self> {
		let symbols: Vec<Option<char>> = literals.iter().copied().map(Some).chain(std::iter::once(None)).collect();

		let mut ids: HashMap<BTreeSet<usize>, usize> = HashMap::new();
		let mut sets: Vec<BTreeSet<usize>> = Vec::new();
		let mut edges: HashMap<(usize, usize), usize> = HashMap::new();

		let start = nfa.closure([Nfa::START]);
		ids.insert(start.clone(), Self::START);
		sets.push(start);

		let mut next = 0;
		while next < sets.len() {
			for (symbol_index, symbol) in symbols.iter().enumerate() {
				let target = nfa.step(&sets[next], *symbol);
				if target.is_empty() {
					continue;
				}
				cancel.check("LIKE pattern compilation")?;
				let to = match ids.get(&target) {
					Some(id) => *id,
					None => {
						let id = sets.len();
						ids.insert(target.clone(), id);
						sets.push(target);
						id
					}
				};
				link(&mut edges, next, symbol_index, to)?;
			}
			next += 1;
		}

		let mut transitions = vec![vec![None; symbols.len()]; sets.len()];
		for ((from, symbol), to) in edges {
			transitions[from][symbol] = Some(to);
		}
		let accepting = sets.iter().map(|set| set.contains(&nfa.accept)).collect();
		trace!(nfa_states = nfa.states.len(), dfa_states = sets.len(), "LIKE automaton built");

		Ok(Self {
			literals,
			transitions,
			accepting,
		})
	}

	pub fn state_count(&self) -> usize {
		self.transitions.len()
	}

	fn symbol(&self, c: char) -> usize {
		self.literals.binary_search(&c).unwrap_or(self.literals.len())
	}

	pub fn matches(&self, text: &str) -> bool {
		let mut state = Self::START;
		for c in text.chars() {
			match self.transitions[state][self.symbol(c)] {
				Some(next) => state = next,
				None => return false,
			}
		}
		self.accepting[state]
	}
}

fn link(edges: &mut HashMap<(usize, usize), usize>, from: usize, symbol: usize, to: usize) -> Result<()> {
	if let Some(existing) = edges.get(&(from, symbol))
		&& *existing != to
	{
		return_internal_error!(
			"DFA state {} already moves to {} on symbol {}, cannot also move to {}",
			from,
			existing,
			symbol,
			to
		);
	}
	edges.insert((from, symbol), to);
	Ok(())
}

#[cfg(test)]
mod tests {
	use quill_value::ErrorCode;

	use super::*;
	use crate::alphabet::{letters, literals};

	fn dfa(pattern: &str) -> Dfa {
		let letters = letters(pattern, None);
		Dfa::build(&Nfa::build(&letters), literals(&letters), &CancellationToken::new()).unwrap()
	}

	#[test]
	fn test_other_class() {
		let dfa = dfa("a_");
		assert!(dfa.matches("ax"));
		assert!(dfa.matches("aa"));
		assert!(!dfa.matches("xa"));
	}

	#[test]
	fn test_trailing_zero_or_more_loops() {
		let dfa = dfa("ab%");
		assert!(dfa.matches("ab"));
		assert!(dfa.matches("abzzzz"));
		assert!(!dfa.matches("a"));
	}

	#[test]
	fn test_cancellation() {
		let token = CancellationToken::new();
		token.cancel();
		let letters = letters("%a%b%", None);
		let err = Dfa::build(&Nfa::build(&letters), literals(&letters), &token).unwrap_err();
		assert_eq!(err.code(), ErrorCode::Interrupted);
	}

	#[test]
	fn test_empty_pattern_has_single_state() {
		let dfa = dfa("");
		assert_eq!(dfa.state_count(), 1);
		assert!(dfa.matches(""));
		assert!(!dfa.matches("a"));
	}

	#[test]
	fn test_link_rejects_second_destination() {
		let mut edges = HashMap::new();
		link(&mut edges, 0, 1, 2).unwrap();
		link(&mut edges, 0, 1, 2).unwrap();
		let err = link(&mut edges, 0, 1, 3).unwrap_err();
		assert_eq!(err.code(), ErrorCode::Internal);
		assert_eq!(edges[&(0, 1)], 2);
	}
}
