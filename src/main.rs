//! Shogi AI CLI
//!
//! 命令行界面，用于测试 AI
//!
//! 支持三种模式：
//! 1. 单次命令模式：每次执行一个命令
//! 2. 自我对局：两个独立的 AI 对下
//! 3. Server 模式：长驻进程，通过 stdin/stdout 通信

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use shogi_ai::{
    get_legal_moves_from_sfen, AIConfig, Board, Color, Difficulty, EvalDetail, Evaluator,
    FuzzyProfile, GameResult, SearchStats, ShogiAI, STARTPOS,
};
use std::io::{self, BufRead, Write};

#[derive(Parser)]
#[command(name = "shogi-ai")]
#[command(about = "Shogi AI Engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 获取合法走法
    Moves {
        /// SFEN 字符串
        #[arg(long, default_value = STARTPOS)]
        sfen: String,
    },

    /// 选择最佳走法
    Best {
        /// SFEN 字符串
        #[arg(long, default_value = STARTPOS)]
        sfen: String,

        /// 难度 (easy, medium, hard, expert)
        #[arg(long, default_value = "medium")]
        difficulty: String,

        /// 覆盖难度的搜索深度
        #[arg(long)]
        depth: Option<u32>,

        /// 覆盖难度的时间限制（秒）
        #[arg(long)]
        time_limit: Option<f64>,

        /// 随机种子
        #[arg(long)]
        seed: Option<u64>,

        /// 棋风 (balanced, aggressive, defensive)
        #[arg(long, default_value = "balanced")]
        profile: String,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 静态评估（先手视角）
    Eval {
        /// SFEN 字符串
        #[arg(long, default_value = STARTPOS)]
        sfen: String,

        /// 棋风
        #[arg(long, default_value = "balanced")]
        profile: String,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 两个 AI 对局
    Selfplay {
        /// 初始局面
        #[arg(long, default_value = STARTPOS)]
        sfen: String,

        /// 难度
        #[arg(long, default_value = "easy")]
        difficulty: String,

        /// 先手棋风
        #[arg(long, default_value = "aggressive")]
        black_profile: String,

        /// 后手棋风
        #[arg(long, default_value = "defensive")]
        white_profile: String,

        /// 最大步数，超过判和
        #[arg(long, default_value = "200")]
        max_moves: usize,

        /// 随机种子（后手使用 seed + 1）
        #[arg(long)]
        seed: Option<u64>,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 启动 server 模式（stdin/stdout 通信）
    Server {
        /// 初始难度
        #[arg(long, default_value = "medium")]
        difficulty: String,

        /// 棋风
        #[arg(long, default_value = "balanced")]
        profile: String,

        /// 随机种子
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Serialize)]
struct BestResponse {
    #[serde(rename = "move")]
    mv: Option<String>,
    stats: SearchStats,
}

#[derive(Serialize)]
struct EvalResponse {
    sfen: String,
    score: f64,
    detail: EvalDetail,
}

#[derive(Serialize)]
struct SelfplayResponse {
    moves: Vec<String>,
    result: String,
    final_sfen: String,
}

// Server 模式的请求和响应结构
#[derive(Deserialize)]
struct ServerRequest {
    cmd: String,
    #[serde(default)]
    sfen: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
}

#[derive(Serialize, Default)]
struct ServerResponse {
    ok: bool,
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    mv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    game_over: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<SearchStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    legal_moves: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    eval: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServerResponse {
    fn success() -> Self {
        Self {
            ok: true,
            ..Default::default()
        }
    }

    fn error(msg: &str) -> Self {
        Self {
            ok: false,
            error: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

fn build_config(
    difficulty: &str,
    depth: Option<u32>,
    time_limit: Option<f64>,
    seed: Option<u64>,
) -> AIConfig {
    let base = AIConfig::from_difficulty(Difficulty::from_name(difficulty));
    AIConfig {
        depth: depth.unwrap_or(base.depth),
        time_limit: time_limit.or(base.time_limit),
        seed,
        ..base
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => fail(&format!("JSON encode failed: {}", e)),
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Moves { sfen } => match get_legal_moves_from_sfen(&sfen) {
            Ok(moves) => {
                println!("Legal moves ({}):", moves.len());
                for mv in &moves {
                    println!("  {}", mv);
                }
            }
            Err(e) => fail(&e.to_string()),
        },

        Commands::Best {
            sfen,
            difficulty,
            depth,
            time_limit,
            seed,
            profile,
            json,
        } => {
            let mut board = Board::from_sfen(&sfen).unwrap_or_else(|e| fail(&e.to_string()));
            let config = build_config(&difficulty, depth, time_limit, seed);
            let mut ai = ShogiAI::new(config, FuzzyProfile::from_name(&profile));

            let mv = ai.get_best_move(&mut board).map(|m| m.to_usi());
            let stats = ai.stats().clone();

            if json {
                print_json(&BestResponse { mv, stats });
            } else {
                match mv {
                    Some(mv) => println!("Best move: {}", mv),
                    None => println!("No legal moves ({})", board.get_game_result()),
                }
                println!(
                    "\nStats: depth={}, nodes={}, evals={}, cache_hits={}, time={}ms",
                    stats.depth_reached,
                    stats.nodes,
                    stats.evaluations,
                    stats.cache_hits,
                    stats.elapsed_ms
                );
            }
        }

        Commands::Eval {
            sfen,
            profile,
            json,
        } => {
            let board = Board::from_sfen(&sfen).unwrap_or_else(|e| fail(&e.to_string()));
            let evaluator = Evaluator::new(FuzzyProfile::from_name(&profile));
            let score = evaluator.evaluate(&board);

            if json {
                let detail = evaluator.evaluate_detail(&board);
                print_json(&EvalResponse {
                    sfen,
                    score,
                    detail,
                });
            } else {
                println!("局面评估 (先手视角): {:.2}", score);
            }
        }

        Commands::Selfplay {
            sfen,
            difficulty,
            black_profile,
            white_profile,
            max_moves,
            seed,
            json,
        } => {
            let board = Board::from_sfen(&sfen).unwrap_or_else(|e| fail(&e.to_string()));
            let black = ShogiAI::new(
                build_config(&difficulty, None, None, seed),
                FuzzyProfile::from_name(&black_profile),
            );
            let white = ShogiAI::new(
                build_config(&difficulty, None, None, seed.map(|s| s.wrapping_add(1))),
                FuzzyProfile::from_name(&white_profile),
            );

            let (moves, result, board) = run_selfplay(board, black, white, max_moves);

            if json {
                print_json(&SelfplayResponse {
                    moves,
                    result: result.to_string(),
                    final_sfen: board.to_sfen(),
                });
            } else {
                println!("Moves ({}): {}", moves.len(), moves.join(" "));
                println!("Result: {}", result);
                println!("Final: {}", board.to_sfen());
            }
        }

        Commands::Server {
            difficulty,
            profile,
            seed,
        } => {
            let config = build_config(&difficulty, None, None, seed);
            let ai = ShogiAI::new(config, FuzzyProfile::from_name(&profile));
            run_server(ai);
        }
    }
}

/// 两个 AI 轮流走，直到终局或达到步数上限（判和）
fn run_selfplay(
    mut board: Board,
    mut black: ShogiAI,
    mut white: ShogiAI,
    max_moves: usize,
) -> (Vec<String>, GameResult, Board) {
    black.reset_memory();
    white.reset_memory();
    let mut moves = Vec::new();

    while moves.len() < max_moves {
        let ai = match board.current_turn() {
            Color::Black => &mut black,
            Color::White => &mut white,
        };
        let mv = match ai.get_best_move(&mut board) {
            Some(mv) => mv,
            None => break,
        };
        log::debug!("{} plays {}", board.current_turn(), mv);
        board.make_move(&mv);
        moves.push(mv.to_usi());
    }

    let result = match board.get_game_result() {
        GameResult::Ongoing => GameResult::Draw,
        other => other,
    };
    (moves, result, board)
}

/// Server 模式主循环
/// 从 stdin 读取 JSON 请求，返回 JSON 响应到 stdout
fn run_server(mut ai: ShogiAI) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        // 空行跳过
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<ServerRequest>(&line) {
            Ok(request) => match request.cmd.as_str() {
                "best" => handle_best_request(&mut ai, &request),
                "moves" => handle_moves_request(&request),
                "eval" => handle_eval_request(&ai, &request),
                "difficulty" => handle_difficulty_request(&mut ai, &request),
                "reset" => {
                    ai.reset_memory();
                    ServerResponse::success()
                }
                "quit" => break,
                _ => ServerResponse::error(&format!("Unknown command: {}", request.cmd)),
            },
            Err(e) => ServerResponse::error(&format!("Invalid JSON: {}", e)),
        };

        match serde_json::to_string(&response) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Error: {}", e),
        }
        let _ = stdout.flush();
    }
}

fn request_board(request: &ServerRequest) -> Result<Board, String> {
    let sfen = request.sfen.as_deref().unwrap_or(STARTPOS);
    Board::from_sfen(sfen).map_err(|e| format!("Invalid SFEN: {}", e))
}

/// 处理 best 命令
fn handle_best_request(ai: &mut ShogiAI, request: &ServerRequest) -> ServerResponse {
    let mut board = match request_board(request) {
        Ok(b) => b,
        Err(e) => return ServerResponse::error(&e),
    };
    let mv = ai.get_best_move(&mut board);
    ServerResponse {
        ok: true,
        game_over: Some(mv.is_none()),
        mv: mv.map(|m| m.to_usi()),
        stats: Some(ai.stats().clone()),
        ..Default::default()
    }
}

/// 处理 moves 命令
fn handle_moves_request(request: &ServerRequest) -> ServerResponse {
    let sfen = request.sfen.as_deref().unwrap_or(STARTPOS);
    match get_legal_moves_from_sfen(sfen) {
        Ok(moves) => ServerResponse {
            ok: true,
            legal_moves: Some(moves),
            ..Default::default()
        },
        Err(e) => ServerResponse::error(&format!("Invalid SFEN: {}", e)),
    }
}

/// 处理 eval 命令（静态评估）
fn handle_eval_request(ai: &ShogiAI, request: &ServerRequest) -> ServerResponse {
    match request_board(request) {
        Ok(board) => ServerResponse {
            ok: true,
            eval: Some(ai.evaluate_static(&board)),
            ..Default::default()
        },
        Err(e) => ServerResponse::error(&e),
    }
}

/// 处理 difficulty 命令
fn handle_difficulty_request(ai: &mut ShogiAI, request: &ServerRequest) -> ServerResponse {
    match request.difficulty.as_deref() {
        Some(name) => ServerResponse {
            ok: true,
            difficulty: Some(ai.set_difficulty(name)),
            ..Default::default()
        },
        None => ServerResponse::error("Missing difficulty"),
    }
}
