//! GameView: maps an [`EngineSnapshot`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{ControllerState, EngineSnapshot};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Coord, TileType, EMPTY_TILE};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Front-end state drawn on top of the engine snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overlay<'a> {
    pub cursor: Option<Coord>,
    pub hint: Option<(Coord, Coord)>,
    /// Latest engine message ("Chain x2!", "No more moves")
    pub message: Option<&'a str>,
}

const BOARD_BG: Rgb = Rgb::new(28, 28, 38);
const PANEL_BG: Rgb = Rgb::new(0, 0, 0);

/// Tile colours and glyphs, indexed by `kind - 1`
const PALETTE: [(Rgb, char); 12] = [
    (Rgb::new(230, 70, 70), '●'),
    (Rgb::new(80, 200, 100), '◆'),
    (Rgb::new(80, 140, 240), '▲'),
    (Rgb::new(240, 210, 70), '■'),
    (Rgb::new(190, 110, 230), '★'),
    (Rgb::new(250, 150, 60), '♥'),
    (Rgb::new(70, 220, 220), '✚'),
    (Rgb::new(240, 240, 240), '♣'),
    (Rgb::new(160, 160, 160), '♠'),
    (Rgb::new(240, 120, 180), '◉'),
    (Rgb::new(150, 230, 90), '▼'),
    (Rgb::new(120, 100, 240), '♦'),
];

/// Colour and glyph of a tile kind; `None` for empty and unknown kinds
pub fn tile_glyph(kind: TileType) -> Option<(Rgb, char)> {
    if kind == EMPTY_TILE {
        return None;
    }
    PALETTE.get(kind as usize - 1).copied()
}

/// A lightweight terminal renderer for the match-3 board.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 3x1 leaves room for the cursor brackets around the glyph.
        Self {
            cell_w: 3,
            cell_h: 1,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    /// Top-left terminal position of the board frame
    fn frame_origin(&self, size: u8, viewport: Viewport) -> (u16, u16, u16, u16) {
        let frame_w = size as u16 * self.cell_w + 2;
        let frame_h = size as u16 * self.cell_h + 2;
        let x = viewport.width.saturating_sub(frame_w + PANEL_W) / 2;
        let y = viewport.height.saturating_sub(frame_h) / 2;
        (x, y, frame_w, frame_h)
    }

    /// Terminal position of the top-left character of board cell `c`
    pub fn cell_position(&self, size: u8, viewport: Viewport, c: Coord) -> (u16, u16) {
        let (x, y, _, _) = self.frame_origin(size, viewport);
        (
            x + 1 + c.col as u16 * self.cell_w,
            y + 1 + c.row as u16 * self.cell_h,
        )
    }

    /// Board cell under terminal position `(x, y)`, for mouse input
    pub fn cell_at(&self, size: u8, viewport: Viewport, x: u16, y: u16) -> Option<Coord> {
        let (ox, oy) = self.cell_position(size, viewport, Coord::new(0, 0));
        let col = x.checked_sub(ox)? / self.cell_w;
        let row = y.checked_sub(oy)? / self.cell_h;
        if row >= size as u16 || col >= size as u16 {
            return None;
        }
        Some(Coord::new(row as u8, col as u8))
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(
        &self,
        snap: &EngineSnapshot,
        overlay: &Overlay<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));
        if snap.size == 0 {
            return;
        }

        let (start_x, start_y, frame_w, frame_h) = self.frame_origin(snap.size, viewport);
        let border = CellStyle::fg_on(Rgb::new(200, 200, 200), PANEL_BG);
        fb.draw_box(start_x, start_y, frame_w, frame_h, border);

        for row in 0..snap.size {
            for col in 0..snap.size {
                self.draw_tile(fb, snap, overlay, viewport, Coord::new(row, col));
            }
        }

        self.draw_side_panel(fb, snap, overlay, viewport, start_x + frame_w + 2, start_y);

        if snap.state == ControllerState::Deadlocked {
            let style = CellStyle::fg_on(Rgb::new(255, 255, 255), Rgb::new(120, 20, 20)).bold();
            let mid_y = start_y + frame_h / 2;
            fb.put_str_centered(start_x, mid_y, frame_w, " NO MOVES ", style);
            fb.put_str_centered(start_x, mid_y + 1, frame_w, " press r ", style);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        snap: &EngineSnapshot,
        overlay: &Overlay<'_>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, overlay, viewport, &mut fb);
        fb
    }

    fn draw_tile(
        &self,
        fb: &mut FrameBuffer,
        snap: &EngineSnapshot,
        overlay: &Overlay<'_>,
        viewport: Viewport,
        c: Coord,
    ) {
        let (px, py) = self.cell_position(snap.size, viewport, c);
        let selected = snap.selected() == Some(c);
        let hinted = overlay.hint.is_some_and(|(a, b)| a == c || b == c);

        let mut bg = BOARD_BG;
        if selected {
            bg = Rgb::new(90, 90, 120);
        } else if hinted {
            bg = Rgb::new(50, 70, 50);
        }

        let (mut style, glyph) = if snap.is_marked(c) {
            (CellStyle::fg_on(Rgb::new(255, 255, 255), Rgb::new(150, 40, 40)).bold(), '✖')
        } else {
            match tile_glyph(snap.kind(c)) {
                Some((fg, ch)) => (CellStyle::fg_on(fg, bg).bold(), ch),
                None => (CellStyle::fg_on(Rgb::new(90, 90, 100), bg).dim(), '·'),
            }
        };
        if selected {
            style.fg = style.fg.scale(5, 4);
        }

        fb.fill_rect(px, py, self.cell_w, self.cell_h, ' ', style);
        let mid = self.cell_w / 2;
        fb.put_char(px + mid, py + self.cell_h / 2, glyph, style);

        if overlay.cursor == Some(c) && self.cell_w >= 3 {
            let bracket = CellStyle {
                fg: Rgb::new(255, 255, 255),
                ..style
            }
            .bold();
            fb.put_char(px, py + self.cell_h / 2, '[', bracket);
            fb.put_char(px + self.cell_w - 1, py + self.cell_h / 2, ']', bracket);
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &EngineSnapshot,
        overlay: &Overlay<'_>,
        viewport: Viewport,
        panel_x: u16,
        start_y: u16,
    ) {
        if panel_x.saturating_add(12) > viewport.width {
            return;
        }

        let label = CellStyle::fg_on(Rgb::new(220, 220, 220), PANEL_BG).bold();
        let value = CellStyle::fg_on(Rgb::new(200, 200, 200), PANEL_BG);

        let mut y = start_y;
        for (name, v) in [
            ("SCORE", snap.score),
            ("MOVES", snap.moves_used),
            ("CHAIN", snap.chain_count),
            ("ROUND", snap.round_id + 1),
        ] {
            fb.put_str(panel_x, y, name, label);
            fb.put_u32(panel_x + 7, y, v, value);
            y = y.saturating_add(1);
        }

        y = y.saturating_add(1);
        let state = match snap.state {
            ControllerState::Idle => "pick a tile",
            ControllerState::Selected(_) => "pick a neighbour",
            ControllerState::Resolving => "resolving...",
            ControllerState::Deadlocked => "no moves left",
        };
        fb.put_str(panel_x, y, state, value);
        y = y.saturating_add(1);

        if let Some(message) = overlay.message {
            let accent = CellStyle::fg_on(Rgb::new(250, 210, 90), PANEL_BG).bold();
            fb.put_str(panel_x, y, message, accent);
        }
        y = y.saturating_add(2);

        let help = value.dim();
        for line in [
            "arrows/hjkl move",
            "space  select",
            "n      hint",
            "r      restart",
            "q      quit",
        ] {
            if y >= viewport.height {
                break;
            }
            fb.put_str(panel_x, y, line, help);
            y = y.saturating_add(1);
        }
    }
}

/// Width reserved to the right of the board for the side panel
const PANEL_W: u16 = 20;

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> EngineSnapshot {
        EngineSnapshot {
            size: 3,
            tiles: vec![1, 2, 3, 2, 3, 1, 3, 1, 2],
            ..EngineSnapshot::default()
        }
    }

    fn glyph_at(
        view: &GameView,
        fb: &FrameBuffer,
        snap: &EngineSnapshot,
        vp: Viewport,
        c: Coord,
    ) -> char {
        let (x, y) = view.cell_position(snap.size, vp, c);
        fb.get(x + 1, y).map(|cell| cell.ch).unwrap_or(' ')
    }

    #[test]
    fn renders_tile_glyphs() {
        let view = GameView::default();
        let vp = Viewport::new(60, 12);
        let snap = snapshot();
        let fb = view.render(&snap, &Overlay::default(), vp);

        assert_eq!(glyph_at(&view, &fb, &snap, vp, Coord::new(0, 0)), '●');
        assert_eq!(glyph_at(&view, &fb, &snap, vp, Coord::new(0, 1)), '◆');
        assert_eq!(glyph_at(&view, &fb, &snap, vp, Coord::new(2, 2)), '◆');
    }

    #[test]
    fn marked_and_empty_cells_are_distinct() {
        let view = GameView::default();
        let vp = Viewport::new(60, 12);
        let mut snap = snapshot();
        snap.tiles[0] = EMPTY_TILE;
        snap.tiles[1] = EMPTY_TILE;
        snap.marked = vec![Coord::new(0, 0)];
        let fb = view.render(&snap, &Overlay::default(), vp);

        assert_eq!(glyph_at(&view, &fb, &snap, vp, Coord::new(0, 0)), '✖');
        assert_eq!(glyph_at(&view, &fb, &snap, vp, Coord::new(0, 1)), '·');
    }

    #[test]
    fn cursor_brackets_and_selection_background() {
        let view = GameView::default();
        let vp = Viewport::new(60, 12);
        let mut snap = snapshot();
        snap.state = ControllerState::Selected(Coord::new(1, 1));
        let overlay = Overlay {
            cursor: Some(Coord::new(1, 2)),
            ..Overlay::default()
        };
        let fb = view.render(&snap, &overlay, vp);

        let (x, y) = view.cell_position(3, vp, Coord::new(1, 2));
        assert_eq!(fb.get(x, y).map(|c| c.ch), Some('['));
        assert_eq!(fb.get(x + 2, y).map(|c| c.ch), Some(']'));

        let (sx, sy) = view.cell_position(3, vp, Coord::new(1, 1));
        let (ux, uy) = view.cell_position(3, vp, Coord::new(0, 0));
        assert_ne!(fb.get(sx, sy).map(|c| c.style.bg), fb.get(ux, uy).map(|c| c.style.bg));
    }

    #[test]
    fn deadlock_overlay_and_panel() {
        let view = GameView::default();
        let vp = Viewport::new(60, 12);
        let mut snap = snapshot();
        snap.state = ControllerState::Deadlocked;
        snap.score = 120;
        let overlay = Overlay {
            message: Some("No more moves"),
            ..Overlay::default()
        };
        let fb = view.render(&snap, &overlay, vp);

        let text: String = (0..vp.height).map(|y| fb.row_text(y)).collect::<Vec<_>>().join("\n");
        assert!(text.contains("NO MOVES"));
        assert!(text.contains("SCORE  120"));
        assert!(text.contains("No more moves"));
    }

    #[test]
    fn cell_at_inverts_cell_position() {
        let view = GameView::default();
        let vp = Viewport::new(80, 24);
        for c in [Coord::new(0, 0), Coord::new(3, 5), Coord::new(7, 7)] {
            let (x, y) = view.cell_position(8, vp, c);
            assert_eq!(view.cell_at(8, vp, x + 2, y), Some(c));
        }
        assert_eq!(view.cell_at(8, vp, 0, 0), None);
    }

    #[test]
    fn tiny_viewport_does_not_panic() {
        let view = GameView::default();
        let snap = snapshot();
        let fb = view.render(&snap, &Overlay::default(), Viewport::new(4, 2));
        assert_eq!(fb.width(), 4);
        let _ = view.render(&EngineSnapshot::default(), &Overlay::default(), Viewport::new(0, 0));
    }

    #[test]
    fn palette_covers_every_kind() {
        for kind in 1..=12u8 {
            assert!(tile_glyph(kind).is_some());
        }
        assert_eq!(tile_glyph(EMPTY_TILE), None);
        assert_eq!(tile_glyph(13), None);
    }
}
