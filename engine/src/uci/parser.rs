use super::{EngineInfo, Score, UciError};
use cozy_chess::Move;
use std::str::FromStr;

/// Incoming message from a UCI engine.
#[derive(Debug, Clone, PartialEq)]
pub enum UciMessage {
    Id { name: String, value: String },
    UciOk,
    ReadyOk,
    /// `mv` is `None` for `bestmove (none)` / `bestmove 0000`.
    BestMove { mv: Option<Move>, ponder: Option<Move> },
    Info(EngineInfo),
}

/// Parse a UCI message line
pub fn parse_uci_message(line: &str) -> Result<UciMessage, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.first() {
        Some(&"uciok") => Ok(UciMessage::UciOk),
        Some(&"readyok") => Ok(UciMessage::ReadyOk),

        Some(&"id") => {
            if tokens.len() < 3 {
                return Err(UciError::MalformedMessage(line.to_string()));
            }
            let name = tokens[1].to_string();
            let value = tokens[2..].join(" ");
            Ok(UciMessage::Id { name, value })
        }

        Some(&"bestmove") => {
            let Some(&mv_token) = tokens.get(1) else {
                return Err(UciError::MalformedMessage(line.to_string()));
            };
            let mv = match mv_token {
                "(none)" | "0000" => None,
                s => Some(parse_uci_move(s)?),
            };
            let ponder = if tokens.len() >= 4 && tokens[2] == "ponder" {
                parse_uci_move(tokens[3]).ok()
            } else {
                None
            };
            Ok(UciMessage::BestMove { mv, ponder })
        }

        Some(&"info") => Ok(UciMessage::Info(parse_info_line(&tokens[1..]))),

        _ => Err(UciError::UnknownMessage(line.to_string())),
    }
}

/// Parse the tokens of an "info" line after the keyword itself
fn parse_info_line(tokens: &[&str]) -> EngineInfo {
    let mut info = EngineInfo::default();
    let mut rest = tokens.iter().copied().peekable();

    while let Some(key) = rest.next() {
        match key {
            "depth" => info.depth = parse_next(&mut rest),
            "seldepth" => info.seldepth = parse_next(&mut rest),
            "time" => info.time_ms = parse_next(&mut rest),
            "nodes" => info.nodes = parse_next(&mut rest),
            "nps" => info.nps = parse_next(&mut rest),
            "multipv" => info.multipv = parse_next(&mut rest),
            "hashfull" => info.hashfull = parse_next(&mut rest),
            "currmove" => info.currmove = rest.next().and_then(|s| parse_uci_move(s).ok()),
            "score" => {
                info.score = match (rest.next(), rest.next()) {
                    (Some("cp"), Some(value)) => value.parse().ok().map(Score::Centipawns),
                    (Some("mate"), Some(value)) => value.parse().ok().map(Score::Mate),
                    _ => None,
                };
            }
            "pv" => {
                while let Some(token) = rest.next_if(|t| !is_keyword(t)) {
                    if let Ok(mv) = parse_uci_move(token) {
                        info.pv.push(mv);
                    }
                }
            }
            "string" => {
                // Free text to end of line
                info.string = Some(rest.by_ref().collect::<Vec<_>>().join(" "));
            }
            _ => {}
        }
    }

    info
}

fn parse_next<'a, T: FromStr>(rest: &mut impl Iterator<Item = &'a str>) -> Option<T> {
    rest.next().and_then(|s| s.parse().ok())
}

fn is_keyword(token: &str) -> bool {
    matches!(
        token,
        "depth"
            | "seldepth"
            | "time"
            | "nodes"
            | "score"
            | "pv"
            | "multipv"
            | "currmove"
            | "hashfull"
            | "nps"
            | "tbhits"
            | "cpuload"
            | "string"
    )
}

/// Parse UCI move format (e2e4, e7e8q)
pub fn parse_uci_move(s: &str) -> Result<Move, UciError> {
    s.parse::<Move>()
        .map_err(|_| UciError::InvalidMove(s.to_string()))
}

/// Format move for UCI (e2e4, e7e8q)
pub fn format_uci_move(mv: &Move) -> String {
    mv.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_handshake_tokens() {
        assert_eq!(parse_uci_message("uciok").unwrap(), UciMessage::UciOk);
        assert_eq!(parse_uci_message("readyok").unwrap(), UciMessage::ReadyOk);
        assert_eq!(
            parse_uci_message("id name Cloak 1.0").unwrap(),
            UciMessage::Id {
                name: "name".to_string(),
                value: "Cloak 1.0".to_string()
            }
        );
        assert!(parse_uci_message("id").is_err());
    }

    #[test]
    fn test_parse_bestmove() {
        let msg = parse_uci_message("bestmove e2e4 ponder e7e5").unwrap();
        match msg {
            UciMessage::BestMove { mv, ponder } => {
                assert_eq!(format_uci_move(&mv.unwrap()), "e2e4");
                assert_eq!(format_uci_move(&ponder.unwrap()), "e7e5");
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_parse_bestmove_promotion_and_none() {
        match parse_uci_message("bestmove a7a8q").unwrap() {
            UciMessage::BestMove { mv, ponder } => {
                assert_eq!(format_uci_move(&mv.unwrap()), "a7a8q");
                assert!(ponder.is_none());
            }
            _ => panic!("Wrong message type"),
        }
        assert_eq!(
            parse_uci_message("bestmove (none)").unwrap(),
            UciMessage::BestMove {
                mv: None,
                ponder: None
            }
        );
        assert!(parse_uci_message("bestmove").is_err());
        assert!(parse_uci_message("bestmove z9z9").is_err());
    }

    #[test]
    fn test_parse_info() {
        let msg = parse_uci_message("info depth 12 score cp 35 nodes 15234 pv e2e4 e7e5").unwrap();
        match msg {
            UciMessage::Info(info) => {
                assert_eq!(info.depth, Some(12));
                assert_eq!(info.score, Some(Score::Centipawns(35)));
                assert_eq!(info.nodes, Some(15234));
                assert_eq!(info.pv.len(), 2);
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_parse_info_string() {
        match parse_uci_message("info string book move found").unwrap() {
            UciMessage::Info(info) => {
                assert_eq!(info.string.as_deref(), Some("book move found"));
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_unknown_message() {
        assert!(matches!(
            parse_uci_message("option name Hash type spin"),
            Err(UciError::UnknownMessage(_))
        ));
        assert!(parse_uci_message("").is_err());
    }

    #[test]
    fn test_score_display() {
        assert_eq!(Score::Centipawns(35).to_string(), "+0.35");
        assert_eq!(Score::Centipawns(-120).to_string(), "-1.20");
        assert_eq!(Score::Mate(-3).to_string(), "#-3");
    }
}
