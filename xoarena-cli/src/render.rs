//! Plain-text rendering of a match
//!
//! Boards are drawn four to a row. Cells are numbered 1-9 like a phone
//! keypad, boards 1-8.

use xoarena_core::{Board, Cell, GameMode, GameState, MatchEngine, MatchEvent};

const BOARDS_PER_ROW: usize = 4;

/// Full match view: status line followed by all boards
pub fn render_match(engine: &MatchEngine) -> String {
    let mut out = String::new();
    out.push_str(&status_line(engine));
    out.push('\n');

    let boards = engine.boards();
    for row in boards.chunks(BOARDS_PER_ROW) {
        out.push('\n');
        let headers: Vec<String> = row.iter().map(board_header).collect();
        out.push_str(headers.join("  ").trim_end());
        out.push('\n');
        for line in 0..3 {
            let cells: Vec<String> = row.iter().map(|b| board_line(b, line)).collect();
            out.push_str(&cells.join("  "));
            out.push('\n');
        }
    }
    out
}

/// One-line score and turn summary
pub fn status_line(engine: &MatchEngine) -> String {
    let mut line = format!(
        "X {} - {} O   draws {}",
        engine.x_score(),
        engine.o_score(),
        engine.draws()
    );

    match engine.game_state() {
        GameState::Menu => line.push_str("   (no match)"),
        GameState::Finished => line.push_str("   match over"),
        GameState::Paused => line.push_str("   paused"),
        GameState::Playing => {
            let who = match engine.ai_player() {
                Some(ai) if ai == engine.current_player() => " (computer)",
                _ => "",
            };
            line.push_str(&format!(
                "   board {}   {}{} to move",
                engine.current_board_index() + 1,
                engine.current_player(),
                who
            ));
        }
    }

    if engine.game_mode() == GameMode::Timed {
        if let Some(remaining) = engine.time_remaining() {
            line.push_str(&format!("   [{}]", format_clock(remaining)));
        }
    }
    line
}

/// Text for events worth telling the player about
pub fn describe_event(event: &MatchEvent) -> Option<String> {
    match event {
        MatchEvent::GameStarted { mode, ai_player } => Some(match ai_player {
            Some(ai) => format!("New {} match. Computer plays {}, you play {}.", mode, ai, ai.opposite()),
            None => format!("New {} match. X moves first.", mode),
        }),
        MatchEvent::BoardCompleted { board, winner } => Some(match winner {
            Some(p) => format!("Board {} won by {}.", board + 1, p),
            None => format!("Board {} is a draw.", board + 1),
        }),
        MatchEvent::TimerWarning { remaining } => Some(format!("{} seconds left!", remaining)),
        MatchEvent::Paused => Some("Paused. Type r to resume.".to_string()),
        MatchEvent::Resumed => Some("Resumed.".to_string()),
        MatchEvent::GameFinished { winner } => Some(match winner {
            Some(p) => format!("Match over: {} wins! Type n for a new match or q to quit.", p),
            None => "Match over: draw. Type n for a new match or q to quit.".to_string(),
        }),
        _ => None,
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

fn board_header(board: &Board) -> String {
    let marker = if board.is_active() { '*' } else { ' ' };
    let result = match (board.winner(), board.is_complete()) {
        (Some(p), _) => format!("{} won", p),
        (None, true) => "draw".to_string(),
        (None, false) => String::new(),
    };
    format!("{}{}{:<7}", marker, board.id() + 1, format!(" {}", result))
}

fn board_line(board: &Board, line: usize) -> String {
    let glyphs: Vec<String> = (0..3)
        .map(|col| {
            let index = line * 3 + col;
            match board.cell(index) {
                Some(Cell::X) => "X".to_string(),
                Some(Cell::O) => "O".to_string(),
                _ => (index + 1).to_string(),
            }
        })
        .collect();
    format!(" {}  ", glyphs.join(" "))
}

fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
