use crate::fen::is_starting_fen;
use crate::position::Position;
use crate::termination::Outcome;
use crate::types::PieceColor;

/// Movetext lines are wrapped at this width.
const LINE_WIDTH: usize = 80;

/// Seven-tag roster values for an exported game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnTags {
    pub event: String,
    pub site: String,
    /// `YYYY.MM.DD`
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
}

impl Default for PgnTags {
    fn default() -> Self {
        Self {
            event: "Casual Game".to_string(),
            site: "?".to_string(),
            date: "????.??.??".to_string(),
            round: "1".to_string(),
            white: "White".to_string(),
            black: "Black".to_string(),
        }
    }
}

/// Render `position`'s move history as PGN.
///
/// Adds `SetUp`/`FEN` tags when the game did not begin from the standard position.
pub fn write_pgn(tags: &PgnTags, position: &Position, result: Outcome) -> String {
    let mut out = String::new();
    let mut tag = |name: &str, value: &str| {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        out.push_str(&format!("[{name} \"{escaped}\"]\n"));
    };

    tag("Event", &tags.event);
    tag("Site", &tags.site);
    tag("Date", &tags.date);
    tag("Round", &tags.round);
    tag("White", &tags.white);
    tag("Black", &tags.black);
    tag("Result", result.as_str());
    if !is_starting_fen(position.start_fen()) {
        tag("SetUp", "1");
        tag("FEN", position.start_fen());
    }

    out.push('\n');
    out.push_str(&movetext(position, result));
    out.push('\n');
    out
}

/// Numbered SAN movetext terminated by the result token.
pub fn movetext(position: &Position, result: Outcome) -> String {
    let mut tokens = Vec::with_capacity(position.moves().len() * 3 / 2 + 1);
    let mut number = u32::from(position.start_board().fullmove_number());

    for (i, applied) in position.moves().iter().enumerate() {
        match applied.color {
            PieceColor::White => tokens.push(format!("{number}.")),
            PieceColor::Black if i == 0 => tokens.push(format!("{number}...")),
            PieceColor::Black => {}
        }
        tokens.push(applied.san.clone());
        if applied.color == PieceColor::Black {
            number += 1;
        }
    }
    tokens.push(result.as_str().to_string());

    wrap(&tokens)
}

fn wrap(tokens: &[String]) -> String {
    let mut lines = Vec::new();
    let mut line = String::new();
    for token in tokens {
        if !line.is_empty() && line.len() + 1 + token.len() > LINE_WIDTH {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(token);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::STARTING_FEN;
    use crate::pgn::parser::parse_pgn;

    #[test]
    fn test_movetext_numbering() {
        let pos = Position::replay(STARTING_FEN, ["e2e4", "e7e5", "g1f3"]).unwrap();
        assert_eq!(movetext(&pos, Outcome::InProgress), "1. e4 e5 2. Nf3 *");
    }

    #[test]
    fn test_black_start_uses_ellipsis_and_setup() {
        let fen = "4k3/8/8/8/8/8/4P3/4K3 b - - 0 7";
        let pos = Position::replay(fen, ["e8d7", "e2e4"]).unwrap();
        assert_eq!(movetext(&pos, Outcome::InProgress), "7... Kd7 8. e4 *");

        let pgn = write_pgn(&PgnTags::default(), &pos, Outcome::InProgress);
        assert!(pgn.contains("[SetUp \"1\"]"));
        assert!(pgn.contains(&format!("[FEN \"{fen}\"]")));
    }

    #[test]
    fn test_export_import_round_trip() {
        let pos = Position::replay(STARTING_FEN, ["f2f3", "e7e5", "g2g4", "d8h4"]).unwrap();
        let tags = PgnTags {
            white: "Human".into(),
            black: "Oracle \"GPT\"".into(),
            ..PgnTags::default()
        };
        let pgn = write_pgn(&tags, &pos, Outcome::BlackWins);
        assert!(pgn.starts_with("[Event \"Casual Game\"]\n[Site \"?\"]"));
        assert!(pgn.trim_end().ends_with("2. g4 Qh4# 0-1"));

        let parsed = parse_pgn(&pgn).unwrap();
        assert_eq!(parsed.tags.get("Black").map(String::as_str), Some("Oracle \"GPT\""));
        assert_eq!(parsed.result, Outcome::BlackWins);
        assert_eq!(parsed.replay().unwrap().to_fen(), pos.to_fen());
    }

    #[test]
    fn test_rank_disambiguated_bishop_round_trips() {
        let fen = "k7/5B2/8/8/8/8/8/4KB2 w - - 0 1";
        let mut pos = Position::from_fen(fen).unwrap();
        let mv = pos.apply("Bf1c4").unwrap();
        assert_eq!(mv.san, "B1c4");
        assert_eq!(mv.uci, "f1c4");

        let mut again = Position::from_fen(fen).unwrap();
        assert_eq!(again.apply("B1c4").unwrap().uci, "f1c4");

        let pgn = write_pgn(&PgnTags::default(), &pos, Outcome::InProgress);
        let replayed = parse_pgn(&pgn).unwrap().replay().unwrap();
        assert_eq!(replayed.to_fen(), pos.to_fen());
    }

    #[test]
    fn test_long_games_wrap() {
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        let pos = Position::replay(STARTING_FEN, shuffle.iter().copied().cycle().take(40)).unwrap();
        let text = movetext(&pos, Outcome::InProgress);
        assert!(text.lines().count() > 1);
        assert!(text.lines().all(|l| l.len() <= LINE_WIDTH));
    }
}
