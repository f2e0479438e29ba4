//! SFEN 解析和生成
//!
//! 格式: `<棋盘> <回合> <持驹> <手数>`
//!
//! 棋盘符号：
//! - 先手：P L N S G B R K，成驹加前缀 `+`（如 `+P`）
//! - 后手：对应小写
//! - 空格：数字 (1-9)
//!
//! 棋盘从段 a（后手底线）写到段 i，每段从 9 筋写到 1 筋。

use crate::types::{Color, Piece, PieceType, Square, HAND_TYPES};
use thiserror::Error;

/// 初始局面
pub const STARTPOS: &str = "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1";

/// SFEN 解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SfenError {
    #[error("expected '<board> <turn> <hand> [move number]', got: {0}")]
    Format(String),
    #[error("expected 9 rows, got {0}")]
    RowCount(usize),
    #[error("row {row} has {cols} columns, expected 9")]
    RowWidth { row: usize, cols: usize },
    #[error("invalid character in board: {0}")]
    BoardChar(char),
    #[error("piece {0} cannot be promoted")]
    BadPromotion(char),
    #[error("invalid turn: {0}")]
    Turn(String),
    #[error("invalid hand: {0}")]
    Hand(String),
    #[error("invalid move number: {0}")]
    MoveNumber(String),
}

/// SFEN 解析后的状态
#[derive(Debug, Clone)]
pub struct SfenState {
    pub pieces: Vec<(Square, Piece)>,
    /// [color][hand_index]
    pub hands: [[u8; 7]; 2],
    pub turn: Color,
    pub move_number: u32,
}

/// 解析 SFEN 字符串（可带 `sfen ` 前缀）
pub fn parse_sfen(sfen: &str) -> Result<SfenState, SfenError> {
    let sfen = sfen.trim();
    let sfen = sfen.strip_prefix("sfen ").unwrap_or(sfen);
    let parts: Vec<&str> = sfen.split_whitespace().collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(SfenError::Format(sfen.to_string()));
    }

    let pieces = parse_board(parts[0])?;
    let turn = single_char(parts[1])
        .and_then(Color::from_sfen_char)
        .ok_or_else(|| SfenError::Turn(parts[1].to_string()))?;
    let hands = parse_hand(parts[2])?;
    check_piece_totals(&pieces, &hands, parts[2])?;
    let move_number = match parts.get(3) {
        Some(s) => s
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| SfenError::MoveNumber(s.to_string()))?,
        None => 1,
    };

    Ok(SfenState {
        pieces,
        hands,
        turn,
        move_number,
    })
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// 每种棋子的总枚数，按 hand_index 排列：步 香 桂 银 金 角 飞
const PIECE_TOTALS: [u8; 7] = [18, 4, 4, 4, 4, 2, 2];

/// 盘上（成驹按原驹计）加双方持驹不能超过实际枚数
fn check_piece_totals(
    pieces: &[(Square, Piece)],
    hands: &[[u8; 7]; 2],
    hand_str: &str,
) -> Result<(), SfenError> {
    let mut totals = [0u32; 7];
    for (_, piece) in pieces {
        if let Some(idx) = piece.piece_type.unpromote().hand_index() {
            totals[idx] += 1;
        }
    }
    for hand in hands {
        for (idx, n) in hand.iter().enumerate() {
            totals[idx] += *n as u32;
        }
    }
    if totals
        .iter()
        .zip(PIECE_TOTALS.iter())
        .any(|(total, limit)| *total > *limit as u32)
    {
        return Err(SfenError::Hand(hand_str.to_string()));
    }
    Ok(())
}

/// 解析棋盘字符串
fn parse_board(board_str: &str) -> Result<Vec<(Square, Piece)>, SfenError> {
    let rows: Vec<&str> = board_str.split('/').collect();
    if rows.len() != 9 {
        return Err(SfenError::RowCount(rows.len()));
    }

    let mut pieces = Vec::new();

    for (row, row_str) in rows.iter().enumerate() {
        let mut col: usize = 0;
        let mut promoted = false;

        for ch in row_str.chars() {
            if col >= 9 {
                return Err(SfenError::RowWidth { row, cols: col + 1 });
            }

            if ch == '+' {
                promoted = true;
            } else if let Some(n) = ch.to_digit(10) {
                if promoted || n == 0 {
                    return Err(SfenError::BoardChar(ch));
                }
                col += n as usize;
            } else {
                let base = PieceType::from_sfen_char(ch).ok_or(SfenError::BoardChar(ch))?;
                let piece_type = if promoted {
                    base.promote().ok_or(SfenError::BadPromotion(ch))?
                } else {
                    base
                };
                let color = if ch.is_ascii_uppercase() {
                    Color::Black
                } else {
                    Color::White
                };
                pieces.push((
                    Square::new(row as i8, col as i8),
                    Piece::new(piece_type, color),
                ));
                promoted = false;
                col += 1;
            }
        }

        if col != 9 || promoted {
            return Err(SfenError::RowWidth { row, cols: col });
        }
    }

    Ok(pieces)
}

/// 解析持驹字符串
fn parse_hand(hand_str: &str) -> Result<[[u8; 7]; 2], SfenError> {
    let mut hands = [[0u8; 7]; 2];
    if hand_str == "-" {
        return Ok(hands);
    }

    let mut count: u32 = 0;
    for ch in hand_str.chars() {
        if let Some(d) = ch.to_digit(10) {
            count = count * 10 + d;
            if count > 18 {
                return Err(SfenError::Hand(hand_str.to_string()));
            }
            continue;
        }
        let idx = PieceType::from_sfen_char(ch)
            .and_then(|pt| pt.hand_index())
            .ok_or_else(|| SfenError::Hand(hand_str.to_string()))?;
        let color = if ch.is_ascii_uppercase() {
            Color::Black
        } else {
            Color::White
        };
        let n = if count == 0 { 1 } else { count as u8 };
        hands[color.index()][idx] = hands[color.index()][idx].saturating_add(n);
        count = 0;
    }

    if count != 0 {
        return Err(SfenError::Hand(hand_str.to_string()));
    }
    Ok(hands)
}

/// 生成 SFEN 字符串
pub fn to_sfen(
    squares: &[Option<Piece>],
    hands: &[[u8; 7]; 2],
    turn: Color,
    move_number: u32,
) -> String {
    let mut rows = Vec::with_capacity(9);

    for row in 0..9 {
        let mut row_str = String::new();
        let mut empty_count = 0;

        for col in 0..9 {
            match squares[row * 9 + col] {
                Some(piece) => {
                    if empty_count > 0 {
                        row_str.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    if piece.piece_type.is_promoted() {
                        row_str.push('+');
                    }
                    let ch = piece.piece_type.to_sfen_char();
                    row_str.push(match piece.color {
                        Color::Black => ch,
                        Color::White => ch.to_ascii_lowercase(),
                    });
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            row_str.push_str(&empty_count.to_string());
        }
        rows.push(row_str);
    }

    let mut hand_str = String::new();
    for color in [Color::Black, Color::White] {
        for pt in HAND_TYPES {
            let idx = pt.hand_index().unwrap_or(0);
            let n = hands[color.index()][idx];
            if n == 0 {
                continue;
            }
            if n > 1 {
                hand_str.push_str(&n.to_string());
            }
            let ch = pt.to_sfen_char();
            hand_str.push(match color {
                Color::Black => ch,
                Color::White => ch.to_ascii_lowercase(),
            });
        }
    }
    if hand_str.is_empty() {
        hand_str.push('-');
    }

    format!(
        "{} {} {} {}",
        rows.join("/"),
        turn.to_sfen_char(),
        hand_str,
        move_number
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_startpos() {
        let state = parse_sfen(STARTPOS).unwrap();
        assert_eq!(state.pieces.len(), 40);
        assert_eq!(state.turn, Color::Black);
        assert_eq!(state.move_number, 1);
        assert_eq!(state.hands, [[0; 7]; 2]);

        let king = state
            .pieces
            .iter()
            .find(|(sq, _)| *sq == Square::new(8, 4))
            .map(|(_, p)| *p);
        assert_eq!(king, Some(Piece::new(PieceType::King, Color::Black)));
    }

    #[test]
    fn test_parse_promoted_and_hand() {
        let state = parse_sfen("4k4/9/4+P4/9/9/9/9/9/4K4 w 2Pg 10").unwrap();
        assert_eq!(state.turn, Color::White);
        assert_eq!(state.move_number, 10);
        assert_eq!(state.hands[Color::Black.index()][0], 2);
        assert_eq!(state.hands[Color::White.index()][4], 1);
        assert!(state
            .pieces
            .contains(&(Square::new(2, 4), Piece::new(PieceType::ProPawn, Color::Black))));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_sfen("9/9/9 b -"),
            Err(SfenError::RowCount(3))
        ));
        assert!(matches!(
            parse_sfen("4k4/9/9/9/9/9/9/9/4K3 b - 1"),
            Err(SfenError::RowWidth { row: 8, .. })
        ));
        assert!(matches!(
            parse_sfen("4k4/9/9/9/9/9/9/9/4K4 x - 1"),
            Err(SfenError::Turn(_))
        ));
        assert!(matches!(
            parse_sfen("4k4/9/9/9/9/9/9/9/4+G4 b - 1"),
            Err(SfenError::BadPromotion('G'))
        ));
        assert!(matches!(
            parse_sfen("4k4/9/9/9/9/9/9/9/4K4 b 2K 1"),
            Err(SfenError::Hand(_))
        ));
        // 重复写同一种持驹，累计超过 18 枚
        assert!(matches!(
            parse_sfen("4k4/9/9/9/9/9/9/9/4K4 b 18P18P 1"),
            Err(SfenError::Hand(_))
        ));
        assert!(matches!(
            parse_sfen("4k4/9/9/9/9/9/9/9/4K4 b 10P9p 1"),
            Err(SfenError::Hand(_))
        ));
        // 盘上 + 持驹
        assert!(matches!(
            parse_sfen("4k4/9/9/9/9/9/9/4R4/4K4 b Rr 1"),
            Err(SfenError::Hand(_))
        ));
        assert!(matches!(
            parse_sfen("4k4/9/9/9/9/9/9/9/4K4 b bb 1"),
            Ok(_)
        ));
        assert!(matches!(
            parse_sfen("4k4/9/9/9/9/9/9/9/4K4 bw - 1"),
            Err(SfenError::Turn(_))
        ));
    }

    #[test]
    fn test_full_pawn_hand_accepted() {
        let state = parse_sfen("4k4/9/9/9/9/9/9/9/4K4 b 9P9p 1").unwrap();
        assert_eq!(state.hands[Color::Black.index()][0], 9);
        assert_eq!(state.hands[Color::White.index()][0], 9);
        assert!(parse_sfen("4k4/9/9/9/9/9/9/9/4K4 b 18P 1").is_ok());
    }

    #[test]
    fn test_sfen_round_trip() {
        let sfen = "ln1g1g1nl/1ks2r3/1pppp1bpp/p3spp2/9/P1P1P4/1P1PSPPPP/1BK1GS1R1/LN1G3NL b Pp 33";
        let state = parse_sfen(sfen).unwrap();
        let mut squares = [None; 81];
        for (sq, piece) in &state.pieces {
            squares[sq.to_index()] = Some(*piece);
        }
        assert_eq!(
            to_sfen(&squares, &state.hands, state.turn, state.move_number),
            sfen
        );
    }
}
