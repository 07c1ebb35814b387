// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

/// One position of a LIKE pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Letter {
	/// `_`
	AnyOne,
	/// `%`
	ZeroOrMore,
	Char(char),
}

/// Splits an already validated pattern into letters, resolving escapes.
pub fn letters(pattern: &str, escape: Option<char>) -> Vec<Letter> {
	let mut result = Vec::with_capacity(pattern.len());
	let mut chars = pattern.chars();
	while let Some(c) = chars.next() {
		let letter = match c {
			c if Some(c) == escape => match chars.next() {
				Some(escaped) => Letter::Char(escaped),
				None => break,
			},
			'%' => Letter::ZeroOrMore,
			'_' => Letter::AnyOne,
			c => Letter::Char(c),
		};
		result.push(letter);
	}
	result
}

/// Distinct literal characters of `letters`, sorted.
pub fn literals(letters: &[Letter]) -> Vec<char> {
	let mut chars: Vec<char> = letters
		.iter()
		.filter_map(|letter| match letter {
			Letter::Char(c) => Some(*c),
			_ => None,
		})
		.collect();
	chars.sort_unstable();
	chars.dedup();
	chars
}
