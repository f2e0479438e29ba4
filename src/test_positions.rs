//! 将棋测试局面库
//!
//! 提供命名的 SFEN 测试局面，方便测试和调试
//!
//! 命名规范:
//! - START: 初始局面
//! - EARLY_n: 开局数步后
//! - MID_n: 中局
//! - 其余为单一用途的构造局面（将军、杀棋、和棋）

use crate::sfen::STARTPOS;

// =============================================================================
// 开局 (START / EARLY)
// =============================================================================

/// 初始局面
pub const START: &str = STARTPOS;

/// ▲7六步 △3四步
pub const EARLY_1: &str = "lnsgkgsnl/1r5b1/pppppp1pp/6p2/9/2P6/PP1PPPPPP/1B5R1/LNSGKGSNL b - 3";

/// 角换后双方持角
pub const EARLY_2: &str = "lnsgkg1nl/1r5s1/pppppp1pp/6p2/9/2P6/PP1PPPPPP/7R1/LNSGKGSNL b Bb 7";

/// 先手矢仓进行中
pub const EARLY_3: &str = "ln1g1gsnl/1r1s2kb1/p1pppp1pp/1p4p2/9/2PP5/PPSGPPPPP/1BK4R1/LN3GSNL b - 13";

// =============================================================================
// 中局 (MID)
// =============================================================================

/// 双方都有持驹的中局
pub const MID_1: &str = "ln1g1g1nl/1ks2r3/1ppp2bpp/p3spp2/9/P1P1P4/1P1PS1PPP/1BK1GS1R1/LN1G3NL b Pp 33";

/// 先手美浓围已成
pub const MID_2: &str = "ln1g1r1nl/1ks1g1sb1/1ppp1p1pp/p3p1p2/9/2P3P2/PPSPPP1PP/1B1RG1SK1/LN3G1NL b - 25";

// =============================================================================
// 构造局面
// =============================================================================

/// 先手被香将军，唯一应手 8g9e
pub const ONE_EVASION: &str = "l7k/9/9/9/9/9/1N7/2g6/K8 b - 1";

/// 先手一步杀：G*5b
pub const MATE_IN_ONE: &str = "4k4/9/4P4/9/9/9/9/9/4K4 b G 1";

/// 后手已被将死（MATE_IN_ONE 走 G*5b 之后）
pub const CHECKMATED: &str = "4k4/4G4/4P4/9/9/9/9/9/4K4 w - 2";

/// 后手无子可动且未被将军
pub const STALEMATE: &str = "k8/9/G8/9/9/9/9/9/1L6K w - 1";

/// 打步诘：P*1b 会将死后手，因此不合法
pub const DROP_PAWN_MATE: &str = "8k/9/8G/9/9/9/9/9/K6L1 b P 1";

/// 所有可正常对局的局面
pub const PLAYABLE: [&str; 6] = [START, EARLY_1, EARLY_2, EARLY_3, MID_1, MID_2];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::types::GameResult;

    #[test]
    fn test_all_positions_parse() {
        for sfen in PLAYABLE {
            let board = Board::from_sfen(sfen).unwrap();
            assert_eq!(board.to_sfen(), sfen);
            assert_eq!(board.get_game_result(), GameResult::Ongoing, "{}", sfen);
        }
        for sfen in [ONE_EVASION, MATE_IN_ONE, CHECKMATED, STALEMATE, DROP_PAWN_MATE] {
            assert!(Board::from_sfen(sfen).is_ok(), "{}", sfen);
        }
    }
}
