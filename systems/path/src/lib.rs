#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Outline description decoding and per-vertex temporal perturbation.
//!
//! An outline description is a concatenation of command runs. Each run starts
//! with a command letter followed by numbers separated by whitespace or
//! commas. Only `M` (two parameters) and `Q` (four parameters) are
//! interpreted; any other letter is carried through as
//! [`PathCommand::Unsupported`] so callers can see it but never draw it.
//! Numbers that fail to parse become `NaN` rather than aborting the decode.

mod perturbation;

pub use perturbation::{is_seam, VertexPerturbation, PERTURBATION_AMPLITUDE, SEAM_LENGTH};

use blobsync_core::PathCommand;

/// Decodes an outline description into its ordered command sequence.
///
/// Text preceding the first command letter is ignored. Missing parameters of
/// interpreted commands decode as `NaN`.
#[must_use]
pub fn parse(outline: &str) -> Vec<PathCommand> {
    let mut commands = Vec::new();
    let mut current: Option<(char, usize)> = None;

    for (index, ch) in outline.char_indices() {
        if !is_command_letter(ch) {
            continue;
        }
        if let Some((letter, start)) = current {
            commands.push(decode(letter, &outline[start..index]));
        }
        current = Some((ch, index + ch.len_utf8()));
    }

    if let Some((letter, start)) = current {
        commands.push(decode(letter, &outline[start..]));
    }

    commands
}

/// `e` and `E` never start a command so exponents like `1e3` stay numeric.
fn is_command_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() && !matches!(ch, 'e' | 'E')
}

fn decode(letter: char, body: &str) -> PathCommand {
    let params: Vec<f32> = body
        .split(|ch: char| ch.is_whitespace() || ch == ',')
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f32>().unwrap_or(f32::NAN))
        .collect();

    match letter.to_ascii_uppercase() {
        'M' => PathCommand::Move {
            x: param(&params, 0),
            y: param(&params, 1),
        },
        'Q' => PathCommand::QuadraticCurve {
            cx: param(&params, 0),
            cy: param(&params, 1),
            x: param(&params, 2),
            y: param(&params, 3),
        },
        _ => PathCommand::Unsupported {
            command: letter,
            params,
        },
    }
}

fn param(params: &[f32], index: usize) -> f32 {
    params.get(index).copied().unwrap_or(f32::NAN)
}
